//! Structural edits on the splice graph. Each edit keeps edge provenance,
//! the vertex map and (where it says so) the route evidence in step.

use crate::graph::{Edge, EdgeInfo};
use crate::router::TreeAdjacency;
use crate::scallop::Scallop;
use crate::types::{EdgeId, SMIN, VertexId};
use anyhow::{anyhow, ensure, Result};

impl Scallop {
    /// Carve a parallel edge of weight `w` off `e`. Returns `e` itself when
    /// its weight already equals `w`.
    pub fn split_edge(&mut self, e: EdgeId, w: f64) -> Result<EdgeId> {
        let edge = self.graph.edge(e)?;
        let ww = edge.weight;
        if (ww - w).abs() <= SMIN {
            return Ok(e);
        }
        ensure!(
            ww >= w + SMIN,
            "cannot split weight {} off edge {} of weight {}",
            w,
            e,
            ww
        );
        let mut piece = edge.clone();
        piece.weight = w;
        self.graph.set_edge_weight(e, ww - w)?;
        self.graph.insert_edge(piece)
    }

    /// Join `x` and `y` (one ending where the other starts, equal weights)
    /// into a single edge. `None` if either is gone or they do not abut.
    pub fn merge_adjacent_equal_edges(&mut self, x: EdgeId, y: EdgeId) -> Result<Option<EdgeId>> {
        let (Some(ex), Some(ey)) = (self.graph.get(x), self.graph.get(y)) else {
            return Ok(None);
        };
        if ex.target != ey.source && ey.target != ex.source {
            return Ok(None);
        }
        if ex.target != ey.source {
            return self.merge_adjacent_equal_edges(y, x);
        }
        ensure!(
            (ex.weight - ey.weight).abs() <= SMIN,
            "cannot merge edges {} ({}) and {} ({}) of different weight",
            x,
            ex.weight,
            y,
            ey.weight
        );

        let mid = ex.target;
        let length = ex
            .info
            .length
            .saturating_add(ey.info.length)
            .saturating_add(self.graph.vertex_info(mid).length);
        let mut provenance = ex.provenance.clone();
        provenance.extend_from_slice(&ey.provenance);
        let merged = Edge {
            source: ex.source,
            target: ey.target,
            weight: ex.weight,
            info: EdgeInfo { length, inferred: ex.info.inferred || ey.info.inferred },
            provenance,
        };
        let w = merged.weight;

        let n = self.graph.insert_edge(merged)?;
        let wv = self.graph.vertex_weight(mid);
        self.graph.set_vertex_weight(mid, wv - w);
        self.graph.remove_edge(x)?;
        self.graph.remove_edge(y)?;
        Ok(Some(n))
    }

    /// Merge as much of `x` and `y` as both can carry; the heavier edge
    /// keeps its remainder.
    pub fn merge_adjacent_edges(&mut self, x: EdgeId, y: EdgeId) -> Result<Option<EdgeId>> {
        let (Some(ex), Some(ey)) = (self.graph.get(x), self.graph.get(y)) else {
            return Ok(None);
        };
        let (x, y) = if ex.target == ey.source {
            (x, y)
        } else if ey.target == ex.source {
            (y, x)
        } else {
            return Ok(None);
        };
        let ww = ex.weight.min(ey.weight);
        let x1 = self.split_edge(x, ww)?;
        let y1 = self.split_edge(y, ww)?;
        self.merge_adjacent_equal_edges(x1, y1)
    }

    /// Drop `e` from the graph and break every route through it.
    pub fn remove_edge(&mut self, e: EdgeId) -> Result<()> {
        self.graph.remove_edge(e)?;
        self.hs.remove(e);
        Ok(())
    }

    /// Give the in-edges `s` and out-edges `t` of `x` their own copy of `x`.
    ///
    /// The sink always keeps the last id: it moves to a fresh slot and its
    /// old slot becomes the copy. Returns the id of the copy.
    pub fn split_vertex(&mut self, x: VertexId, s: &[EdgeId], t: &[EdgeId]) -> Result<VertexId> {
        ensure!(
            x != self.graph.source() && x != self.graph.sink(),
            "cannot split source or sink vertex {}",
            x
        );
        ensure!(!s.is_empty() && !t.is_empty(), "vertex {} split needs edges on both sides", x);
        for &e in s {
            ensure!(self.graph.edge(e)?.target == x, "edge {} does not enter vertex {}", e, x);
        }
        for &e in t {
            ensure!(self.graph.edge(e)?.source == x, "edge {} does not leave vertex {}", e, x);
        }

        let old_sink = self.graph.sink();
        ensure!(self.v2v.len() == old_sink + 1, "vertex map out of sync with graph");

        let sink_info = self.graph.vertex_info(old_sink).clone();
        let new_sink = self.graph.add_vertex(self.graph.vertex_weight(old_sink), sink_info);
        let (wx, info_x) = (self.graph.vertex_weight(x), self.graph.vertex_info(x).clone());
        self.graph.set_vertex_weight(old_sink, wx);
        self.graph.set_vertex_info(old_sink, info_x);

        self.v2v.push(self.v2v[old_sink]);
        self.v2v[old_sink] = self.v2v[x];

        for e in self.graph.in_edges(old_sink).to_vec() {
            let source = self.graph.edge(e)?.source;
            self.graph.move_edge(e, source, new_sink)?;
        }
        ensure!(self.graph.degree(old_sink) == 0, "sink {} has outgoing edges", old_sink);

        for &e in s {
            let source = self.graph.edge(e)?.source;
            self.graph.move_edge(e, source, old_sink)?;
        }
        for &e in t {
            let target = self.graph.edge(e)?.target;
            self.graph.move_edge(e, old_sink, target)?;
        }
        Ok(old_sink)
    }

    /// Contract the adjacency tree leaf by leaf, merging each pair of
    /// adjacent edges and rewriting the routes that used them.
    pub fn decompose_tree(&mut self, adjacency: &TreeAdjacency) -> Result<()> {
        let mut remaining = adjacency.edges.clone();
        let degree = |edges: &[(usize, usize)], u: usize| {
            edges.iter().filter(|&&(a, b)| a == u || b == u).count()
        };

        while let Some(i) = remaining
            .iter()
            .position(|&(a, b)| degree(&remaining, a) == 1 || degree(&remaining, b) == 1)
        {
            let (a, b) = remaining.remove(i);
            let (x, y) = (a.min(b), a.max(b));
            let (xx, yy) = (adjacency.u2e[x], adjacency.u2e[y]);
            let e = self
                .merge_adjacent_edges(xx, yy)?
                .ok_or_else(|| anyhow!("edges {} and {} cannot be merged", xx, yy))?;
            self.hs.replace_pair(xx, yy, e);
            if adjacency.degree(x) == 1 {
                self.hs.replace(xx, e);
            }
            if adjacency.degree(y) == 1 {
                self.hs.replace(yy, e);
            }
        }
        ensure!(remaining.is_empty(), "edge adjacency is not a tree");

        for &e in &adjacency.u2e {
            self.hs.remove(e);
        }
        Ok(())
    }
}
