mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use mimalloc::MiMalloc;
use scallop_rs::Scallop;
use scallop_rs::graph_input::load_graph;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            if args.quiet {
                EnvFilter::new("warn")
            } else {
                EnvFilter::new("info")
            }
        });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let name = args.name.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "graph".to_string())
    });

    let input = load_graph(&args.input)?;
    let mut scallop = Scallop::new(&name, input.graph, input.hyper_set, args.config())?;
    let assembly = scallop.assemble()?;

    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    for (i, path) in assembly.paths.iter().enumerate() {
        let vertices: Vec<String> = path.vertices.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}\t{}\t{:.2}\t{}", name, i, path.abundance, vertices.join(","))?;
    }
    out.flush()?;

    tracing::info!(
        paths = assembly.paths.len(),
        trivial = assembly.stats.trivial,
        tree = assembly.stats.tree,
        split = assembly.stats.split,
        unresolved = assembly.stats.unresolved,
        "scallop-rs: processing complete"
    );
    Ok(())
}
