//! Per-vertex classification.
//!
//! [`classify`] looks at one internal vertex, its in- and out-edges and the
//! route adjacencies crossing it, and decides how the vertex can be resolved.
//! It never touches the graph.

use crate::graph::SpliceGraph;
use crate::hyper_set::{HyperSet, RoutePair};
use crate::types::{EdgeId, HashMap, HashMapExt, HashSet, HashSetExt, SMIN, VertexId};
use anyhow::{ensure, Result};
use petgraph::unionfind::UnionFind;

/// Up to this many components every split is enumerated; beyond it the
/// split is found greedily.
pub const MAX_SPLIT_COMPONENTS: usize = 16;

const MAX_REFINE_MOVES: usize = 4096;

/// A proposed pairing: the in-edges `s` carry the same flow as the out-edges `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub s: Vec<EdgeId>,
    pub t: Vec<EdgeId>,
    pub ratio: f64,
}

/// Undirected adjacency between a vertex's edges. Node `u` stands for edge
/// `u2e[u]`; in-edges come first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeAdjacency {
    pub u2e: Vec<EdgeId>,
    pub edges: Vec<(usize, usize)>,
}

impl TreeAdjacency {
    /// Every in-edge adjacent to every out-edge.
    pub fn complete(in_edges: &[EdgeId], out_edges: &[EdgeId]) -> Self {
        let mut u2e = in_edges.to_vec();
        u2e.extend_from_slice(out_edges);
        let n = in_edges.len();
        let edges = (0..n)
            .flat_map(|i| (0..out_edges.len()).map(move |j| (i, n + j)))
            .collect();
        Self { u2e, edges }
    }

    pub fn num_nodes(&self) -> usize {
        self.u2e.len()
    }

    pub fn degree(&self, u: usize) -> usize {
        self.edges.iter().filter(|&&(a, b)| a == u || b == u).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// One side has a single edge: all in-edges pair with all out-edges.
    Trivial(Equation),
    /// Route evidence connects every edge in a single tree.
    Tree(TreeAdjacency),
    /// The edges fall into independent groups; the best two-way split.
    Split { equations: [Equation; 2], ratio: f64 },
    Unresolved,
}

impl Classification {
    /// Error ratio of the classification, if it has one.
    pub fn ratio(&self) -> Option<f64> {
        match self {
            Classification::Trivial(eqn) => Some(eqn.ratio),
            Classification::Split { ratio, .. } => Some(*ratio),
            _ => None,
        }
    }
}

/// Relative mismatch between two flow sums.
pub fn error_ratio(a: f64, b: f64) -> f64 {
    let m = a.max(b);
    if m < SMIN { 0.0 } else { (a - b).abs() / m }
}

pub fn classify(v: VertexId, graph: &SpliceGraph, routes: &[RoutePair]) -> Result<Classification> {
    ensure!(
        v > graph.source() && v < graph.sink(),
        "vertex {} is not an internal vertex",
        v
    );
    let in_edges = graph.in_edges(v);
    let out_edges = graph.out_edges(v);

    if in_edges.is_empty() || out_edges.is_empty() {
        return Ok(Classification::Unresolved);
    }

    if in_edges.len() <= 1 || out_edges.len() <= 1 {
        let ratio = error_ratio(graph.in_weight(v), graph.out_weight(v));
        return Ok(Classification::Trivial(Equation {
            s: in_edges.to_vec(),
            t: out_edges.to_vec(),
            ratio,
        }));
    }

    let adjacency = build_adjacency(in_edges, out_edges, routes);
    let n = adjacency.num_nodes();
    let components = components(&adjacency);

    if components.len() == 1 {
        if adjacency.edges.len() + 1 == n {
            return Ok(Classification::Tree(adjacency));
        }
        return Ok(Classification::Unresolved);
    }

    let groups: Vec<Group> = components
        .iter()
        .map(|nodes| Group::from_nodes(nodes, &adjacency, in_edges.len(), graph))
        .collect();

    Ok(best_split(&groups).unwrap_or(Classification::Unresolved))
}

fn build_adjacency(in_edges: &[EdgeId], out_edges: &[EdgeId], routes: &[RoutePair]) -> TreeAdjacency {
    let mut u2e = in_edges.to_vec();
    u2e.extend_from_slice(out_edges);
    let e2u: HashMap<EdgeId, usize> = u2e.iter().enumerate().map(|(u, &e)| (e, u)).collect();

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut edges = Vec::new();
    for p in routes {
        let (Some(&a), Some(&b)) = (e2u.get(&p.in_edge), e2u.get(&p.out_edge)) else { continue };
        if a >= in_edges.len() || b < in_edges.len() {
            continue;
        }
        if seen.insert((a, b)) {
            edges.push((a, b));
        }
    }
    TreeAdjacency { u2e, edges }
}

/// Connected components as sorted node lists, ordered by their smallest node.
fn components(adjacency: &TreeAdjacency) -> Vec<Vec<usize>> {
    let n = adjacency.num_nodes();
    let mut sets: UnionFind<usize> = UnionFind::new(n);
    for &(a, b) in &adjacency.edges {
        sets.union(a, b);
    }
    let labels = sets.into_labeling();

    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut out: Vec<Vec<usize>> = Vec::new();
    for (u, &root) in labels.iter().enumerate() {
        let i = *slot.entry(root).or_insert_with(|| {
            out.push(Vec::new());
            out.len() - 1
        });
        out[i].push(u);
    }
    out
}

struct Group {
    s: Vec<EdgeId>,
    t: Vec<EdgeId>,
    ws: f64,
    wt: f64,
}

impl Group {
    fn from_nodes(nodes: &[usize], adjacency: &TreeAdjacency, num_in: usize, graph: &SpliceGraph) -> Self {
        let mut s = Vec::new();
        let mut t = Vec::new();
        for &u in nodes {
            if u < num_in {
                s.push(adjacency.u2e[u]);
            } else {
                t.push(adjacency.u2e[u]);
            }
        }
        let ws = graph.sum_weights(&s);
        let wt = graph.sum_weights(&t);
        Self { s, t, ws, wt }
    }

    fn imbalance(&self) -> f64 {
        self.ws - self.wt
    }
}

/// Choose a two-way split of the groups where both sides keep at least one
/// in- and one out-edge, then turn it into two equations.
fn best_split(groups: &[Group]) -> Option<Classification> {
    let first = if groups.len() <= MAX_SPLIT_COMPONENTS {
        exhaustive_split(groups)?
    } else {
        greedy_split(groups)?
    };

    let sides = side_totals(groups, &first);
    let mut eqns = [
        Equation { s: Vec::new(), t: Vec::new(), ratio: 0.0 },
        Equation { s: Vec::new(), t: Vec::new(), ratio: 0.0 },
    ];
    for (g, &f) in groups.iter().zip(&first) {
        let eqn = &mut eqns[if f { 0 } else { 1 }];
        eqn.s.extend_from_slice(&g.s);
        eqn.t.extend_from_slice(&g.t);
    }
    for (eqn, side) in eqns.iter_mut().zip(sides) {
        eqn.s.sort_unstable();
        eqn.t.sort_unstable();
        eqn.ratio = error_ratio(side.2, side.3);
    }
    let score = eqns[0].ratio.max(eqns[1].ratio);
    if eqns[1].ratio < eqns[0].ratio {
        eqns.swap(0, 1);
    }
    Some(Classification::Split { equations: eqns, ratio: score })
}

/// Per side: in-edge count, out-edge count, in weight, out weight.
fn side_totals(groups: &[Group], first: &[bool]) -> [(usize, usize, f64, f64); 2] {
    let mut sides = [(0usize, 0usize, 0.0_f64, 0.0_f64); 2];
    for (g, &f) in groups.iter().zip(first) {
        let side = &mut sides[if f { 0 } else { 1 }];
        side.0 += g.s.len();
        side.1 += g.t.len();
        side.2 += g.ws;
        side.3 += g.wt;
    }
    sides
}

/// Number of sides lacking in- or out-edges, then the larger error ratio.
fn split_score(groups: &[Group], first: &[bool]) -> (usize, f64) {
    let sides = side_totals(groups, first);
    let missing = sides
        .iter()
        .map(|s| usize::from(s.0 == 0) + usize::from(s.1 == 0))
        .sum();
    let ratio = error_ratio(sides[0].2, sides[0].3).max(error_ratio(sides[1].2, sides[1].3));
    (missing, ratio)
}

/// Every split, group 0 pinned to the first side. The first lowest score wins.
fn exhaustive_split(groups: &[Group]) -> Option<Vec<bool>> {
    let k = groups.len();
    let mut best: Option<(f64, Vec<bool>)> = None;
    for mask in 0..(1_u64 << (k - 1)) {
        let first: Vec<bool> = (0..k).map(|i| i == 0 || (mask >> (i - 1)) & 1 == 1).collect();
        let (missing, score) = split_score(groups, &first);
        if missing > 0 {
            continue;
        }
        if best.as_ref().is_none_or(|(b, _)| score < *b) {
            best = Some((score, first));
        }
    }
    best.map(|(_, first)| first)
}

/// Too many groups to enumerate: place groups by decreasing imbalance on the
/// side whose net flow stays closer to zero, then move single groups across
/// while that lowers the score.
fn greedy_split(groups: &[Group]) -> Option<Vec<bool>> {
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| groups[b].imbalance().abs().total_cmp(&groups[a].imbalance().abs()));

    let mut first = vec![false; groups.len()];
    let mut net = [0.0_f64; 2];
    let mut count = [0usize; 2];
    for &i in &order {
        let d = groups[i].imbalance();
        let (a, b) = ((net[0] + d).abs(), (net[1] + d).abs());
        let side = if a < b || (a == b && count[0] <= count[1]) { 0 } else { 1 };
        first[i] = side == 0;
        net[side] += d;
        count[side] += 1;
    }

    let mut score = split_score(groups, &first);
    for _ in 0..MAX_REFINE_MOVES {
        let mut moved = false;
        for i in 0..groups.len() {
            first[i] = !first[i];
            let next = split_score(groups, &first);
            if next.0 < score.0 || (next.0 == score.0 && next.1 < score.1) {
                score = next;
                moved = true;
                break;
            }
            first[i] = !first[i];
        }
        if !moved {
            break;
        }
    }
    (score.0 == 0).then_some(first)
}

/// How many internal vertices fall into each case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub trivial: usize,
    pub tree: usize,
    pub split: usize,
    pub unresolved: usize,
    pub with_routes: usize,
    pub without_routes: usize,
}

impl RouterStats {
    pub fn collect(graph: &SpliceGraph, hs: &HyperSet) -> Result<Self> {
        let mut stats = Self::default();
        for v in 1..graph.num_vertices().saturating_sub(1) {
            if graph.degree(v) == 0 {
                continue;
            }
            let routes = hs.get_routes(v, graph);
            if routes.is_empty() {
                stats.without_routes += 1;
            } else {
                stats.with_routes += 1;
            }
            match classify(v, graph, &routes)? {
                Classification::Trivial(_) => stats.trivial += 1,
                Classification::Tree(_) => stats.tree += 1,
                Classification::Split { .. } => stats.split += 1,
                Classification::Unresolved => stats.unresolved += 1,
            }
        }
        Ok(stats)
    }
}
