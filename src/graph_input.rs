//! Line-oriented text description of one splice graph and its routes.
//!
//! ```text
//! # comment
//! v <weight> [length]                   vertices, in id order
//! e <source> <target> <weight> [length]
//! r <count> <v1> <v2> ... <vk>          route through k >= 3 vertices
//! ```

use crate::graph::{EdgeInfo, SpliceGraph, VertexInfo};
use crate::hyper_set::HyperSet;
use crate::types::VertexId;
use anyhow::{anyhow, bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Default)]
pub struct GraphInput {
    pub graph: SpliceGraph,
    pub hyper_set: HyperSet,
}

pub fn load_graph(path: &Path) -> Result<GraphInput> {
    let file = File::open(path).with_context(|| format!("failed to open graph {}", path.display()))?;
    parse_graph(BufReader::new(file)).with_context(|| format!("failed to parse graph {}", path.display()))
}

pub fn parse_graph<R: BufRead>(reader: R) -> Result<GraphInput> {
    let mut input = GraphInput::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let tag = fields.next().unwrap_or_default();
        let fields: Vec<&str> = fields.collect();

        match tag {
            "v" => {
                let weight: f64 = field(&fields, 0, "weight", lineno)?;
                let length: u32 = optional_field(&fields, 1, "length", lineno)?.unwrap_or(0);
                input.graph.add_vertex(weight, VertexInfo { length, ..Default::default() });
            }
            "e" => {
                let source: VertexId = field(&fields, 0, "source", lineno)?;
                let target: VertexId = field(&fields, 1, "target", lineno)?;
                let weight: f64 = field(&fields, 2, "weight", lineno)?;
                let length: u32 = optional_field(&fields, 3, "length", lineno)?.unwrap_or(0);
                input
                    .graph
                    .add_edge(source, target, weight, EdgeInfo { length, inferred: false })
                    .with_context(|| format!("line {}", lineno))?;
            }
            "r" => {
                let count: u32 = field(&fields, 0, "count", lineno)?;
                let vertices = fields[1..]
                    .iter()
                    .map(|s| s.parse::<VertexId>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| anyhow!("line {}: invalid route vertex: {}", lineno, e))?;
                if vertices.len() < 3 {
                    bail!("line {}: a route needs at least three vertices", lineno);
                }
                input.hyper_set.add_node_list(vertices, count);
            }
            other => bail!("line {}: unknown record type '{}'", lineno, other),
        }
    }

    Ok(input)
}

fn field<T>(fields: &[&str], idx: usize, name: &str, lineno: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_field(fields, idx, name, lineno)?
        .ok_or_else(|| anyhow!("line {}: missing {}", lineno, name))
}

fn optional_field<T>(fields: &[&str], idx: usize, name: &str, lineno: usize) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fields
        .get(idx)
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| anyhow!("line {}: invalid {} '{}': {}", lineno, name, s, e))
        })
        .transpose()
}
