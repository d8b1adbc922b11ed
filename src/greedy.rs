use crate::scallop::{Path, Scallop};
use crate::types::{EdgeId, VertexId};
use anyhow::{anyhow, ensure, Result};

impl Scallop {
    /// Edges already running from source to sink are complete transcripts.
    pub fn collect_existing_st_paths(&mut self) -> Result<usize> {
        let (source, sink) = (self.graph.source(), self.graph.sink());
        let ready: Vec<EdgeId> = self
            .graph
            .edges()
            .filter(|(_, e)| e.source == source && e.target == sink)
            .map(|(i, _)| i)
            .collect();
        for &e in &ready {
            self.collect_path(e)?;
        }
        Ok(ready.len())
    }

    /// Repeatedly peel off the heaviest remaining source-to-sink path.
    pub fn greedy_decompose(&mut self) -> Result<usize> {
        let mut count = 0;
        loop {
            if let Some(max) = self.config.max_paths
                && count >= max
            {
                break;
            }
            let (w, path) = self.graph.max_bottleneck_path()?;
            if w <= 0.0 || w <= self.config.transcript_min_expression {
                break;
            }
            tracing::debug!(weight = w, edges = path.len(), "extract heaviest path");
            let e = self.split_merge_path(&path, w)?;
            self.collect_path(e)?;
            count += 1;
        }
        tracing::debug!(count, "greedy decomposition finished");
        Ok(count)
    }

    /// Split `w` off every edge of `path` and fuse the pieces into one edge.
    fn split_merge_path(&mut self, path: &[EdgeId], w: f64) -> Result<EdgeId> {
        let (&first, rest) = path
            .split_first()
            .ok_or_else(|| anyhow!("cannot merge an empty path"))?;
        let mut merged = self.split_edge(first, w)?;
        for &e in rest {
            let piece = self.split_edge(e, w)?;
            merged = self
                .merge_adjacent_equal_edges(merged, piece)?
                .ok_or_else(|| anyhow!("path edges {} and {} do not abut", merged, piece))?;
        }
        Ok(merged)
    }

    /// Turn the source-to-sink edge `e` into a [`Path`] and remove it.
    fn collect_path(&mut self, e: EdgeId) -> Result<()> {
        let edge = self.graph.remove_edge(e)?;
        self.hs.remove(e);

        let mut vertices: Vec<VertexId> = edge.provenance.iter().map(|&v| self.v2v[v]).collect();
        vertices.sort_unstable();
        vertices.dedup();

        let sink = self.v2v[self.graph.sink()];
        ensure!(
            vertices.first() == Some(&self.graph.source()),
            "path from edge {} does not start at the source",
            e
        );
        ensure!(
            vertices.last().is_some_and(|&v| v < sink),
            "path from edge {} runs past the sink",
            e
        );
        vertices.push(sink);

        self.paths.push(Path { vertices, abundance: edge.weight });
        Ok(())
    }
}
