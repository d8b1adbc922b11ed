//! Flow reconciliation: make in-flow and out-flow agree at a vertex, or
//! across a tree of edge adjacencies.

use crate::graph::SpliceGraph;
use crate::router::TreeAdjacency;
use crate::types::{SMIN, VertexId};
use anyhow::{ensure, Result};
use thiserror::Error;

const MAX_SWEEPS: usize = 100_000;
const TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("invalid least-squares input: {0}")]
    InvalidInput(String),
    #[error("least-squares solve did not converge after {0} sweeps")]
    NotConverged(usize),
}

/// Minimize `Σ_i ((A r)_i - targets_i)^2` subject to `r_j >= lower_bound`,
/// where column `j` of the 0/1 matrix `A` is given as the rows it touches.
///
/// Projected coordinate descent: every coordinate step is the exact
/// minimizer along that axis, clipped to the bound. The problem is convex,
/// so sweeps converge; systems here have a handful of variables.
pub fn solve_least_squares(
    columns: &[Vec<usize>],
    targets: &[f64],
    lower_bound: f64,
) -> Result<Vec<f64>, SolveError> {
    if !lower_bound.is_finite() || lower_bound < 0.0 {
        return Err(SolveError::InvalidInput(format!("lower bound {lower_bound}")));
    }
    if let Some(t) = targets.iter().find(|t| !t.is_finite()) {
        return Err(SolveError::InvalidInput(format!("target {t}")));
    }
    for (j, col) in columns.iter().enumerate() {
        if col.is_empty() {
            return Err(SolveError::InvalidInput(format!("column {j} is empty")));
        }
        if let Some(i) = col.iter().find(|&&i| i >= targets.len()) {
            return Err(SolveError::InvalidInput(format!("column {j} touches missing row {i}")));
        }
    }

    let mut r = vec![lower_bound; columns.len()];
    let mut residual: Vec<f64> = targets.iter().map(|t| -t).collect();
    for col in columns {
        for &i in col {
            residual[i] += lower_bound;
        }
    }

    let scale = 1.0 + targets.iter().fold(0.0_f64, |m, t| m.max(t.abs()));
    for _ in 0..MAX_SWEEPS {
        let mut delta_max = 0.0_f64;
        for (j, col) in columns.iter().enumerate() {
            let g: f64 = col.iter().map(|&i| residual[i]).sum();
            let next = (r[j] - g / col.len() as f64).max(lower_bound);
            let delta = next - r[j];
            if delta != 0.0 {
                for &i in col {
                    residual[i] += delta;
                }
                r[j] = next;
                delta_max = delta_max.max(delta.abs());
            }
        }
        if delta_max <= TOLERANCE * scale {
            return Ok(r);
        }
    }
    Err(SolveError::NotConverged(MAX_SWEEPS))
}

/// Rescale the lighter side of `v` so both sides carry the heavier sum.
pub fn balance_vertex(graph: &mut SpliceGraph, v: VertexId) -> Result<()> {
    let w1 = graph.in_weight(v);
    let w2 = graph.out_weight(v);
    ensure!(w1 >= SMIN, "vertex {} has no inflow to balance ({})", v, w1);
    ensure!(w2 >= SMIN, "vertex {} has no outflow to balance ({})", v, w2);

    let r1 = if w1 > w2 { 1.0 } else { w2 / w1 };
    let r2 = if w1 < w2 { 1.0 } else { w1 / w2 };

    for e in graph.in_edges(v).to_vec() {
        let w = graph.edge_weight(e)?;
        graph.set_edge_weight(e, w * r1)?;
    }
    for e in graph.out_edges(v).to_vec() {
        let w = graph.edge_weight(e)?;
        graph.set_edge_weight(e, w * r2)?;
    }
    Ok(())
}

/// Fit the edges of `adjacency` to route weights: every adjacency carries a
/// route weight of at least `min_route_weight`, every edge becomes the sum of
/// its routes, and the squared change of edge weights is minimal.
///
/// Returns `Ok(false)` and leaves the graph untouched when no solution is found.
pub fn balance_tree(
    graph: &mut SpliceGraph,
    adjacency: &TreeAdjacency,
    min_route_weight: f64,
) -> Result<bool> {
    let observed = adjacency
        .u2e
        .iter()
        .map(|&e| graph.edge_weight(e))
        .collect::<Result<Vec<f64>>>()?;
    let columns: Vec<Vec<usize>> = adjacency.edges.iter().map(|&(a, b)| vec![a, b]).collect();

    let r = match solve_least_squares(&columns, &observed, min_route_weight) {
        Ok(r) => r,
        Err(err) => {
            tracing::debug!(error = %err, edges = adjacency.u2e.len(), "tree balance failed");
            return Ok(false);
        }
    };

    let mut adjusted = vec![0.0_f64; adjacency.num_nodes()];
    for (&(a, b), w) in adjacency.edges.iter().zip(&r) {
        adjusted[a] += w;
        adjusted[b] += w;
    }
    for (&e, w) in adjacency.u2e.iter().zip(adjusted) {
        graph.set_edge_weight(e, w)?;
    }
    Ok(true)
}
