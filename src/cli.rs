use clap::Parser;
use scallop_rs::AssemblyConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "scallop-rs",
    about = "Decompose a splice graph into weighted transcript paths",
    version
)]
pub struct Args {
    /// Splice graph with routes (v/e/r text records)
    pub input: PathBuf,

    /// Write paths here instead of stdout
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Name reported for this graph (defaults to the input file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Largest error ratio at which a vertex split is accepted
    #[arg(long, default_value_t = AssemblyConfig::new().max_split_error_ratio)]
    pub max_split_error_ratio: f64,

    /// Edges at or below this weight may be removed as noise
    #[arg(long, default_value_t = AssemblyConfig::new().max_ignorable_edge_weight)]
    pub max_ignorable_edge_weight: f64,

    /// Stop extracting paths at or below this abundance
    #[arg(long = "min-expression", default_value_t = AssemblyConfig::new().transcript_min_expression)]
    pub transcript_min_expression: f64,

    /// Lower bound on route weights when balancing route trees
    #[arg(long, default_value_t = AssemblyConfig::new().min_route_weight)]
    pub min_route_weight: f64,

    /// Do not add routes through the heaviest edges of each vertex
    #[arg(long)]
    pub no_pseudo_routes: bool,

    /// Minimum weight of both edges before a pseudo route is added
    #[arg(long, default_value_t = AssemblyConfig::new().pseudo_route_min_weight)]
    pub pseudo_route_min_weight: f64,

    /// Extract at most this many paths greedily
    #[arg(long)]
    pub max_paths: Option<usize>,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Args {
    pub fn config(&self) -> AssemblyConfig {
        AssemblyConfig {
            max_split_error_ratio: self.max_split_error_ratio,
            max_ignorable_edge_weight: self.max_ignorable_edge_weight,
            transcript_min_expression: self.transcript_min_expression,
            min_route_weight: self.min_route_weight,
            add_pseudo_routes: !self.no_pseudo_routes,
            pseudo_route_min_weight: self.pseudo_route_min_weight,
            max_paths: self.max_paths,
        }
    }
}
