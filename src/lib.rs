//! scallop-rs: decompose a splice graph into weighted transcript paths.
//!
//! # Library usage
//!
//! ```no_run
//! use scallop_rs::{AssemblyConfig, EdgeInfo, HyperSet, Scallop, SpliceGraph, VertexInfo};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut graph = SpliceGraph::new();
//! for _ in 0..4 {
//!     graph.add_vertex(10.0, VertexInfo::default());
//! }
//! graph.add_edge(0, 1, 10.0, EdgeInfo::default())?;
//! graph.add_edge(1, 2, 10.0, EdgeInfo::default())?;
//! graph.add_edge(2, 3, 10.0, EdgeInfo::default())?;
//!
//! let mut scallop = Scallop::new("chain", graph, HyperSet::new(), AssemblyConfig::default())?;
//! let assembly = scallop.assemble()?;
//! assert_eq!(assembly.paths[0].vertices, vec![0, 1, 2, 3]);
//! # Ok(())
//! # }
//! ```

// Internal modules (engine methods on `Scallop`, id aliases).
pub(crate) mod editor;
pub(crate) mod greedy;
pub(crate) mod resolve;
pub(crate) mod types;

// Public modules.
pub mod balance;
pub mod config;
pub mod graph;
pub mod graph_input;
pub mod hyper_set;
pub mod router;
pub mod scallop;

// Flat re-exports for the most commonly used public types.
pub use config::AssemblyConfig;
pub use graph::{Edge, EdgeInfo, SpliceGraph, VertexInfo};
pub use hyper_set::HyperSet;
pub use router::{Classification, Equation, RouterStats};
pub use scallop::{Assembly, GraphKind, Path, Scallop};
pub use types::{EdgeId, SMIN, VertexId};
