/// Thresholds that steer vertex resolution and path extraction.
///
/// One value is threaded through [`crate::Scallop`]; nothing is read from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct AssemblyConfig {
    /// Largest error ratio at which an equation-based vertex split is accepted.
    pub max_split_error_ratio: f64,
    /// Edges at or below this weight may be dropped as noise.
    pub max_ignorable_edge_weight: f64,
    /// Greedy extraction stops once the heaviest path is at or below this abundance.
    pub transcript_min_expression: f64,
    /// Lower bound for every route-weight variable in a tree balance.
    pub min_route_weight: f64,
    /// Add a supporting route through the heaviest in/out edges of each vertex.
    pub add_pseudo_routes: bool,
    /// Both heaviest edges must exceed this weight before a pseudo route is added.
    pub pseudo_route_min_weight: f64,
    /// Upper bound on greedily extracted paths (`None` means unbounded).
    pub max_paths: Option<usize>,
}

impl AssemblyConfig {
    pub fn new() -> Self {
        Self {
            max_split_error_ratio: 0.15,
            max_ignorable_edge_weight: 1.5,
            transcript_min_expression: 1.0,
            min_route_weight: 1.0,
            add_pseudo_routes: true,
            pseudo_route_min_weight: 10.0,
            max_paths: None,
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self::new()
    }
}
