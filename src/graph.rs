use crate::types::{EdgeId, VertexId};
use anyhow::{anyhow, bail, ensure, Result};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexInfo {
    pub length: u32,
    pub reliability: f64,
    pub inferred: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeInfo {
    pub length: u32,
    pub inferred: bool,
}

/// A live edge record. `provenance` lists the original vertices the edge
/// stands for, left to right; it is owned by the record and never shared.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
    pub weight: f64,
    pub info: EdgeInfo,
    pub provenance: Vec<VertexId>,
}

#[derive(Debug, Clone, Default)]
struct Vertex {
    weight: f64,
    info: VertexInfo,
    in_edges: Vec<EdgeId>,
    out_edges: Vec<EdgeId>,
}

/// Weighted DAG with source `0` and sink `n - 1`.
///
/// Edges live in an arena indexed by [`EdgeId`]; a removed edge leaves an
/// empty slot so indices stay stable for the whole decomposition.
#[derive(Debug, Clone, Default)]
pub struct SpliceGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Option<Edge>>,
    live: usize,
}

impl SpliceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, weight: f64, info: VertexInfo) -> VertexId {
        self.vertices.push(Vertex {
            weight,
            info,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        });
        self.vertices.len() - 1
    }

    /// Add an edge whose provenance is its own source vertex.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        weight: f64,
        info: EdgeInfo,
    ) -> Result<EdgeId> {
        self.insert_edge(Edge {
            source,
            target,
            weight,
            info,
            provenance: vec![source],
        })
    }

    pub(crate) fn insert_edge(&mut self, edge: Edge) -> Result<EdgeId> {
        ensure!(
            edge.source < self.vertices.len() && edge.target < self.vertices.len(),
            "edge {} -> {} references a missing vertex",
            edge.source,
            edge.target
        );
        let id = self.edges.len();
        self.vertices[edge.source].out_edges.push(id);
        self.vertices[edge.target].in_edges.push(id);
        self.edges.push(Some(edge));
        self.live += 1;
        Ok(id)
    }

    pub fn remove_edge(&mut self, e: EdgeId) -> Result<Edge> {
        let edge = self
            .edges
            .get_mut(e)
            .and_then(Option::take)
            .ok_or_else(|| anyhow!("edge {} is null", e))?;
        self.vertices[edge.source].out_edges.retain(|&x| x != e);
        self.vertices[edge.target].in_edges.retain(|&x| x != e);
        self.live -= 1;
        Ok(edge)
    }

    /// Re-attach edge `e` so that it runs `source -> target`.
    pub fn move_edge(&mut self, e: EdgeId, source: VertexId, target: VertexId) -> Result<()> {
        ensure!(
            source < self.vertices.len() && target < self.vertices.len(),
            "cannot move edge {} to missing vertex",
            e
        );
        let (old_s, old_t) = {
            let edge = self.edge(e)?;
            (edge.source, edge.target)
        };
        self.vertices[old_s].out_edges.retain(|&x| x != e);
        self.vertices[old_t].in_edges.retain(|&x| x != e);
        self.vertices[source].out_edges.push(e);
        self.vertices[target].in_edges.push(e);
        let edge = self.edge_mut(e)?;
        edge.source = source;
        edge.target = target;
        Ok(())
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    pub fn num_edges(&self) -> usize {
        self.live
    }

    /// Number of edge slots ever allocated, including null ones.
    pub fn edge_capacity(&self) -> usize {
        self.edges.len()
    }

    pub fn source(&self) -> VertexId {
        0
    }

    pub fn sink(&self) -> VertexId {
        self.vertices.len().saturating_sub(1)
    }

    pub fn get(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e).and_then(Option::as_ref)
    }

    /// Like [`SpliceGraph::get`], but a null edge is a defect.
    pub fn edge(&self, e: EdgeId) -> Result<&Edge> {
        self.get(e).ok_or_else(|| anyhow!("edge {} is null", e))
    }

    pub(crate) fn edge_mut(&mut self, e: EdgeId) -> Result<&mut Edge> {
        self.edges
            .get_mut(e)
            .and_then(Option::as_mut)
            .ok_or_else(|| anyhow!("edge {} is null", e))
    }

    pub fn edge_weight(&self, e: EdgeId) -> Result<f64> {
        Ok(self.edge(e)?.weight)
    }

    pub fn set_edge_weight(&mut self, e: EdgeId, weight: f64) -> Result<()> {
        self.edge_mut(e)?.weight = weight;
        Ok(())
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i, e)))
    }

    pub fn in_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertices[v].in_edges
    }

    pub fn out_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertices[v].out_edges
    }

    pub fn in_degree(&self, v: VertexId) -> usize {
        self.vertices[v].in_edges.len()
    }

    pub fn out_degree(&self, v: VertexId) -> usize {
        self.vertices[v].out_edges.len()
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.in_degree(v) + self.out_degree(v)
    }

    pub fn in_weight(&self, v: VertexId) -> f64 {
        self.sum_weights(self.in_edges(v))
    }

    pub fn out_weight(&self, v: VertexId) -> f64 {
        self.sum_weights(self.out_edges(v))
    }

    pub fn sum_weights(&self, edges: &[EdgeId]) -> f64 {
        edges
            .iter()
            .filter_map(|&e| self.get(e))
            .map(|e| e.weight)
            .sum()
    }

    pub fn vertex_weight(&self, v: VertexId) -> f64 {
        self.vertices[v].weight
    }

    pub fn set_vertex_weight(&mut self, v: VertexId, weight: f64) {
        self.vertices[v].weight = weight;
    }

    pub fn vertex_info(&self, v: VertexId) -> &VertexInfo {
        &self.vertices[v].info
    }

    pub fn set_vertex_info(&mut self, v: VertexId, info: VertexInfo) {
        self.vertices[v].info = info;
    }

    /// Vertices with at least one incident edge.
    pub fn num_active_vertices(&self) -> usize {
        (0..self.num_vertices()).filter(|&v| self.degree(v) > 0).count()
    }

    /// Point every edge's provenance back at its own source vertex.
    pub(crate) fn reset_provenance(&mut self) {
        for edge in self.edges.iter_mut().flatten() {
            edge.provenance = vec![edge.source];
        }
    }

    /// Reject graphs the engine cannot work on: fewer than two vertices,
    /// negative or non-finite weights, edges into the source or out of the
    /// sink, or a cycle.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_vertices() >= 2,
            "splice graph needs a source and a sink, got {} vertices",
            self.num_vertices()
        );
        for (i, edge) in self.edges() {
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                bail!("edge {} ({} -> {}) has invalid weight {}", i, edge.source, edge.target, edge.weight);
            }
            ensure!(
                edge.target != self.source(),
                "edge {} ({} -> {}) enters the source",
                i,
                edge.source,
                edge.target
            );
            ensure!(
                edge.source != self.sink(),
                "edge {} ({} -> {}) leaves the sink",
                i,
                edge.source,
                edge.target
            );
        }
        self.topological_order()?;
        Ok(())
    }

    /// Kahn's algorithm over the live edges. Vertex ids no longer follow
    /// topological order once vertices have been split.
    pub fn topological_order(&self) -> Result<Vec<VertexId>> {
        let n = self.num_vertices();
        let mut indegree: Vec<usize> = (0..n).map(|v| self.in_degree(v)).collect();
        let mut queue: VecDeque<VertexId> = (0..n).filter(|&v| indegree[v] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &e in self.out_edges(v) {
                let t = self.edge(e)?.target;
                indegree[t] -= 1;
                if indegree[t] == 0 {
                    queue.push_back(t);
                }
            }
        }
        ensure!(order.len() == n, "splice graph contains a cycle");
        Ok(order)
    }

    /// Heaviest source-to-sink path, where a path weighs as much as its
    /// lightest edge. Returns weight 0 and no edges when the sink is unreachable.
    pub fn max_bottleneck_path(&self) -> Result<(f64, Vec<EdgeId>)> {
        let n = self.num_vertices();
        let mut best = vec![0.0_f64; n];
        let mut back: Vec<Option<EdgeId>> = vec![None; n];
        best[self.source()] = f64::INFINITY;

        for v in self.topological_order()? {
            if best[v] <= 0.0 {
                continue;
            }
            for &e in self.out_edges(v) {
                let edge = self.edge(e)?;
                let w = best[v].min(edge.weight);
                if w > best[edge.target] {
                    best[edge.target] = w;
                    back[edge.target] = Some(e);
                }
            }
        }

        let sink = self.sink();
        if back[sink].is_none() {
            return Ok((0.0, Vec::new()));
        }

        let mut path = Vec::new();
        let mut v = sink;
        while let Some(e) = back[v] {
            path.push(e);
            v = self.edge(e)?.source;
        }
        ensure!(v == self.source(), "bottleneck path does not start at the source");
        path.reverse();
        Ok((best[sink], path))
    }

    /// Number of distinct source-to-sink paths, saturating at `u64::MAX`.
    pub fn count_paths(&self) -> Result<u64> {
        let mut count = vec![0_u64; self.num_vertices()];
        count[self.source()] = 1;
        for v in self.topological_order()? {
            if count[v] == 0 {
                continue;
            }
            for &e in self.out_edges(v) {
                let t = self.edge(e)?.target;
                count[t] = count[t].saturating_add(count[v]);
            }
        }
        Ok(count[self.sink()])
    }

    /// Lower bound on the paths needed to cover every edge:
    /// `edges - active vertices + 2`.
    pub fn required_paths(&self) -> i64 {
        self.num_edges() as i64 - self.num_active_vertices() as i64 + 2
    }
}
