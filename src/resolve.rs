//! The resolution loop: apply the highest-priority applicable strategy,
//! then start over, until a full pass changes nothing.

use crate::balance::{balance_tree, balance_vertex};
use crate::router::{classify, Classification, Equation, TreeAdjacency};
use crate::scallop::Scallop;
use crate::types::{EdgeId, SMIN, VertexId};
use anyhow::{anyhow, ensure, Result};
use std::ops::Range;

impl Scallop {
    /// Run the strategies to a fixed point. Returns the number of actions taken.
    pub fn resolve(&mut self) -> Result<usize> {
        let mut actions = 0;
        loop {
            let progressed = self.resolve_ignorable_edges()?
                || self.resolve_hyper_vertex()?
                || self.resolve_hyper_tree()?
                || self.resolve_trivial_vertex()?
                || self.resolve_normal_vertex()?;
            if !progressed {
                break;
            }
            actions += 1;
            self.log_round()?;
        }
        Ok(actions)
    }

    fn internal_vertices(&self) -> Range<VertexId> {
        1..self.graph.num_vertices().saturating_sub(1)
    }

    fn is_ambiguous(&self, v: VertexId) -> bool {
        self.graph.in_degree(v) >= 2 && self.graph.out_degree(v) >= 2
    }

    /// Remove light edges that no route extends through their vertex.
    pub fn resolve_ignorable_edges(&mut self) -> Result<bool> {
        let mut removed = false;
        for i in self.internal_vertices() {
            let (din, dout) = (self.graph.in_degree(i), self.graph.out_degree(i));
            if din == 0 || dout == 0 || din.max(dout) < 2 {
                continue;
            }

            let Some((ei, ratio)) = self.smallest_edge(i)? else { continue };
            let edge = self.graph.edge(ei)?;
            let w = edge.weight;
            if w > self.config.max_ignorable_edge_weight {
                continue;
            }
            if edge.source == i {
                if self.hs.left_extend(ei) || self.graph.in_degree(edge.target) <= 1 {
                    continue;
                }
            } else if edge.target == i {
                if self.hs.right_extend(ei) || self.graph.out_degree(edge.source) <= 1 {
                    continue;
                }
            } else {
                return Err(anyhow!("edge {} is not incident to vertex {}", ei, i));
            }

            tracing::info!(edge = ei, vertex = i, weight = w, ratio, din, dout, "remove ignorable edge");
            self.remove_edge(ei)?;
            removed = true;
        }
        Ok(removed)
    }

    /// Split the ambiguous vertex whose route evidence leaves the cheapest
    /// two-way split.
    pub fn resolve_hyper_vertex(&mut self) -> Result<bool> {
        let mut best: Option<(VertexId, f64, Equation)> = None;
        for i in self.internal_vertices() {
            if !self.is_ambiguous(i) {
                continue;
            }
            let routes = self.hs.get_routes(i, &self.graph);
            if routes.is_empty() {
                continue;
            }
            let Classification::Split { equations, ratio } = classify(i, &self.graph, &routes)? else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.1 < ratio) {
                continue;
            }
            let [first, _] = equations;
            best = Some((i, ratio, first));
        }

        let Some((root, ratio, eqn)) = best else { return Ok(false) };
        if ratio > self.config.max_split_error_ratio {
            return Ok(false);
        }

        tracing::info!(
            vertex = root,
            ratio,
            din = self.graph.in_degree(root),
            dout = self.graph.out_degree(root),
            s = ?eqn.s,
            t = ?eqn.t,
            "split hyper vertex"
        );
        self.split_vertex(root, &eqn.s, &eqn.t)?;
        Ok(true)
    }

    /// Decompose the first vertex whose routes form a spanning tree over
    /// its edges and whose tree balances.
    pub fn resolve_hyper_tree(&mut self) -> Result<bool> {
        let mut found: Option<(VertexId, TreeAdjacency)> = None;
        for i in self.internal_vertices() {
            if !self.is_ambiguous(i) {
                continue;
            }
            let routes = self.hs.get_routes(i, &self.graph);
            let Classification::Tree(adjacency) = classify(i, &self.graph, &routes)? else {
                continue;
            };
            if !balance_tree(&mut self.graph, &adjacency, self.config.min_route_weight)? {
                continue;
            }
            found = Some((i, adjacency));
            break;
        }

        let Some((root, adjacency)) = found else { return Ok(false) };
        tracing::info!(
            vertex = root,
            din = self.graph.in_degree(root),
            dout = self.graph.out_degree(root),
            "decompose hyper tree"
        );
        self.decompose_tree(&adjacency)?;
        ensure!(self.graph.degree(root) == 0, "vertex {} still has edges after tree decomposition", root);
        Ok(true)
    }

    /// Decompose the vertex with a single edge on one side whose sides are
    /// closest to balanced.
    pub fn resolve_trivial_vertex(&mut self) -> Result<bool> {
        let mut best: Option<(VertexId, Equation)> = None;
        for i in self.internal_vertices() {
            if self.graph.degree(i) == 0 || self.is_ambiguous(i) {
                continue;
            }
            let Classification::Trivial(eqn) = classify(i, &self.graph, &[])? else { continue };
            if best.as_ref().is_some_and(|b| b.1.ratio < eqn.ratio) {
                continue;
            }
            best = Some((i, eqn));
        }

        let Some((root, eqn)) = best else { return Ok(false) };
        tracing::info!(
            vertex = root,
            ratio = eqn.ratio,
            din = self.graph.in_degree(root),
            dout = self.graph.out_degree(root),
            "decompose trivial vertex"
        );
        self.decompose_trivial_vertex(root)?;
        ensure!(self.graph.degree(root) == 0, "vertex {} still has edges after decomposition", root);
        Ok(true)
    }

    /// Balance `x`, then pair every in-edge with every out-edge.
    pub fn decompose_trivial_vertex(&mut self, x: VertexId) -> Result<()> {
        let adjacency = TreeAdjacency::complete(self.graph.in_edges(x), self.graph.out_edges(x));
        balance_vertex(&mut self.graph, x)?;
        self.decompose_tree(&adjacency)
    }

    /// Without route evidence, either split the best-balanced ambiguous
    /// vertex or drop its smallest edge, whichever is cheaper.
    pub fn resolve_normal_vertex(&mut self) -> Result<bool> {
        let mut best: Option<(VertexId, f64, Equation)> = None;
        for i in self.internal_vertices() {
            if !self.is_ambiguous(i) {
                continue;
            }
            let routes = self.hs.get_routes(i, &self.graph);
            if !routes.is_empty() {
                continue;
            }
            let Classification::Split { equations, ratio } = classify(i, &self.graph, &routes)? else {
                continue;
            };
            if best.as_ref().is_some_and(|b| b.1 < ratio) {
                continue;
            }
            let [first, _] = equations;
            best = Some((i, ratio, first));
        }

        let Some((root, ratio1, eqn)) = best else { return Ok(false) };

        let (se, ratio2) = self
            .smallest_edge(root)?
            .ok_or_else(|| anyhow!("vertex {} has no smallest edge", root))?;
        let sw = self.graph.edge_weight(se)?;
        let ratio = ratio1.min(ratio2);
        if ratio > self.config.max_split_error_ratio {
            return Ok(false);
        }

        let (din, dout) = (self.graph.in_degree(root), self.graph.out_degree(root));
        if ratio1 < ratio2 || sw > self.config.max_ignorable_edge_weight {
            tracing::info!(vertex = root, ratio, din, dout, s = ?eqn.s, t = ?eqn.t, "split normal vertex");
            self.split_vertex(root, &eqn.s, &eqn.t)?;
        } else {
            tracing::info!(edge = se, vertex = root, weight = sw, ratio, din, dout, "remove small edge");
            self.remove_edge(se)?;
        }
        Ok(true)
    }

    /// The edge of `x` carrying the smallest share of its side's flow,
    /// looking only at sides with two or more edges.
    pub fn smallest_edge(&self, x: VertexId) -> Result<Option<(EdgeId, f64)>> {
        let mut best: Option<(EdgeId, f64)> = None;
        for edges in [self.graph.in_edges(x), self.graph.out_edges(x)] {
            if edges.len() < 2 {
                continue;
            }
            let sum = self.graph.sum_weights(edges);
            ensure!(sum >= SMIN, "vertex {} has a side with no flow ({})", x, sum);
            for &e in edges {
                let r = self.graph.edge_weight(e)? / sum;
                if best.is_none_or(|(_, b)| r < b) {
                    best = Some((e, r));
                }
            }
        }
        Ok(best)
    }
}
