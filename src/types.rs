/// Vertex index in the current splice graph.
pub type VertexId = usize;
/// Stable edge index; never reused after the edge is removed.
pub type EdgeId = usize;

/// Tolerance for weight equality and the smallest flow sum treated as positive.
pub const SMIN: f64 = 1e-6;

// Fast hash maps / sets using AHash instead of the default SipHash.
// Import these throughout the codebase with `use crate::types::{HashMap, HashSet}`.
// Also import `HashMapExt` / `HashSetExt` when you need `::new()` or `::with_capacity()`.
pub(crate) type HashMap<K, V> = ahash::HashMap<K, V>;
pub(crate) type HashSet<K> = ahash::HashSet<K>;
pub(crate) use ahash::HashMapExt;
pub(crate) use ahash::HashSetExt;
