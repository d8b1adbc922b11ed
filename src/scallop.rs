use crate::config::AssemblyConfig;
use crate::graph::SpliceGraph;
use crate::hyper_set::HyperSet;
use crate::router::RouterStats;
use crate::types::VertexId;
use anyhow::Result;

/// One extracted transcript: original vertex ids from source to sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub vertices: Vec<VertexId>,
    pub abundance: f64,
}

/// Whether the graph admits exactly as many source-to-sink paths as its
/// edges require, in which case the decomposition is forced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Trivial,
    Normal,
}

/// Result of [`Scallop::assemble`].
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Paths in extraction order.
    pub paths: Vec<Path>,
    /// Vertex classification counts before any resolution.
    pub stats: RouterStats,
    pub kind: GraphKind,
}

/// Decomposition engine for a single splice graph.
///
/// Owns the graph, its route evidence and the vertex map exclusively; every
/// edit goes through the methods in `editor.rs` so the three stay consistent.
#[derive(Debug, Clone)]
pub struct Scallop {
    pub(crate) name: String,
    pub(crate) config: AssemblyConfig,
    pub(crate) graph: SpliceGraph,
    pub(crate) hs: HyperSet,
    /// Current vertex -> vertex of the input graph it was derived from.
    pub(crate) v2v: Vec<VertexId>,
    pub(crate) paths: Vec<Path>,
    pub(crate) round: usize,
}

impl Scallop {
    pub fn new(
        name: impl Into<String>,
        mut graph: SpliceGraph,
        mut hs: HyperSet,
        config: AssemblyConfig,
    ) -> Result<Self> {
        graph.validate()?;
        graph.reset_provenance();
        if config.add_pseudo_routes {
            hs.add_pseudo_routes(&graph, config.pseudo_route_min_weight);
        }
        hs.build(&graph);
        let v2v = (0..graph.num_vertices()).collect();
        Ok(Self {
            name: name.into(),
            config,
            graph,
            hs,
            v2v,
            paths: Vec::new(),
            round: 0,
        })
    }

    /// Resolve vertices until nothing applies, then extract paths.
    pub fn assemble(&mut self) -> Result<Assembly> {
        let kind = self.graph_kind()?;
        let stats = RouterStats::collect(&self.graph, &self.hs)?;
        tracing::info!(
            name = %self.name,
            vertices = self.graph.num_vertices(),
            edges = self.graph.num_edges(),
            routes = self.hs.num_routes(),
            kind = ?kind,
            "assembling splice graph"
        );
        tracing::debug!(?stats, "initial vertex classification");

        let actions = self.resolve()?;
        self.collect_existing_st_paths()?;
        self.greedy_decompose()?;

        tracing::info!(
            name = %self.name,
            actions,
            paths = self.paths.len(),
            "assembly complete"
        );
        Ok(Assembly {
            paths: std::mem::take(&mut self.paths),
            stats,
            kind,
        })
    }

    pub fn graph_kind(&self) -> Result<GraphKind> {
        if self.graph.num_vertices() == 2 {
            return Ok(GraphKind::Trivial);
        }
        let p0 = self.graph.count_paths()?;
        let p1 = self.graph.required_paths();
        tracing::debug!(paths = p0, required = p1, "graph path counts");
        if p1 >= 0 && p0 == p1 as u64 {
            Ok(GraphKind::Trivial)
        } else {
            Ok(GraphKind::Normal)
        }
    }

    pub(crate) fn log_round(&mut self) -> Result<()> {
        tracing::debug!(
            round = self.round,
            edges = self.graph.num_edges(),
            vertices = self.graph.num_active_vertices(),
            paths = self.graph.count_paths()?,
            required = self.graph.required_paths(),
            "finish round"
        );
        self.round += 1;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn graph(&self) -> &SpliceGraph {
        &self.graph
    }

    pub fn hyper_set(&self) -> &HyperSet {
        &self.hs
    }

    pub fn vertex_map(&self) -> &[VertexId] {
        &self.v2v
    }

    /// Paths collected so far and not yet handed out by [`Scallop::assemble`].
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }
}
