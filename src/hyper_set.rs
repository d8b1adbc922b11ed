use crate::graph::SpliceGraph;
use crate::types::{EdgeId, HashMap, HashMapExt, VertexId};
use std::collections::BTreeSet;

/// One observed adjacency across a vertex: some route enters through
/// `in_edge` and leaves through `out_edge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePair {
    pub in_edge: EdgeId,
    pub out_edge: EdgeId,
    pub count: u32,
}

#[derive(Debug, Clone)]
struct Route {
    // `None` marks a position whose edge has been removed; the route is
    // broken there.
    edges: Vec<Option<EdgeId>>,
    count: u32,
}

impl Route {
    fn contains(&self, e: EdgeId) -> bool {
        self.edges.contains(&Some(e))
    }
}

/// Phased read evidence ("hyper edges").
///
/// Routes are collected as vertex lists, then [`HyperSet::build`] turns them
/// into chains of edge indices. From then on every graph edit that merges or
/// removes edges must rewrite the chains through `replace_pair`, `replace`
/// and `remove`.
#[derive(Debug, Clone, Default)]
pub struct HyperSet {
    node_lists: Vec<(Vec<VertexId>, u32)>,
    node_index: HashMap<Vec<VertexId>, usize>,
    routes: Vec<Route>,
    index: HashMap<EdgeId, BTreeSet<usize>>,
}

impl HyperSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed vertex sequence. Identical sequences accumulate
    /// their counts.
    pub fn add_node_list(&mut self, vertices: Vec<VertexId>, count: u32) {
        if let Some(&i) = self.node_index.get(&vertices) {
            self.node_lists[i].1 = self.node_lists[i].1.saturating_add(count);
            return;
        }
        self.node_index.insert(vertices.clone(), self.node_lists.len());
        self.node_lists.push((vertices, count));
    }

    pub fn num_node_lists(&self) -> usize {
        self.node_lists.len()
    }

    /// Add `[s, k, t]` for every internal vertex `k` whose heaviest in-edge
    /// (from `s`) and heaviest out-edge (to `t`) both exceed `min_weight`.
    /// Routes touching the source or the sink are skipped.
    pub fn add_pseudo_routes(&mut self, graph: &SpliceGraph, min_weight: f64) {
        let n = graph.num_vertices();
        for k in 1..n.saturating_sub(1) {
            let heaviest = |edges: &[EdgeId], pick_source: bool| {
                let mut best: Option<(f64, VertexId)> = None;
                for edge in edges.iter().filter_map(|&e| graph.get(e)) {
                    if edge.weight <= best.map_or(0.0, |b| b.0) {
                        continue;
                    }
                    let v = if pick_source { edge.source } else { edge.target };
                    best = Some((edge.weight, v));
                }
                best
            };
            let Some((w1, s)) = heaviest(graph.in_edges(k), true) else { continue };
            let Some((w2, t)) = heaviest(graph.out_edges(k), false) else { continue };
            if w1 <= min_weight || w2 <= min_weight {
                continue;
            }
            if s == graph.source() || t == graph.sink() {
                continue;
            }
            self.add_node_list(vec![s, k, t], 1);
        }
    }

    /// Translate the vertex lists into edge chains over `graph`. A step with
    /// no matching edge breaks the chain at that point.
    pub fn build(&mut self, graph: &SpliceGraph) {
        self.routes.clear();
        self.index.clear();
        for (vertices, count) in &self.node_lists {
            let edges: Vec<Option<EdgeId>> = vertices
                .windows(2)
                .map(|w| {
                    if w[0] >= graph.num_vertices() {
                        return None;
                    }
                    graph
                        .out_edges(w[0])
                        .iter()
                        .copied()
                        .find(|&e| graph.get(e).is_some_and(|edge| edge.target == w[1]))
                })
                .collect();
            if edges.iter().flatten().count() < 2 {
                continue;
            }
            let r = self.routes.len();
            for e in edges.iter().flatten() {
                self.index.entry(*e).or_default().insert(r);
            }
            self.routes.push(Route { edges, count: *count });
        }
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Adjacencies attested across vertex `v`, in order of first appearance,
    /// with summed support.
    pub fn get_routes(&self, v: VertexId, graph: &SpliceGraph) -> Vec<RoutePair> {
        let mut pairs: Vec<RoutePair> = Vec::new();
        let mut seen: HashMap<(EdgeId, EdgeId), usize> = HashMap::new();
        for &e1 in graph.in_edges(v) {
            let Some(rs) = self.index.get(&e1) else { continue };
            for &r in rs {
                let route = &self.routes[r];
                for w in route.edges.windows(2) {
                    let (Some(x), Some(y)) = (w[0], w[1]) else { continue };
                    if x != e1 {
                        continue;
                    }
                    if !graph.get(y).is_some_and(|edge| edge.source == v) {
                        continue;
                    }
                    match seen.get(&(x, y)) {
                        Some(&i) => pairs[i].count = pairs[i].count.saturating_add(route.count),
                        None => {
                            seen.insert((x, y), pairs.len());
                            pairs.push(RoutePair { in_edge: x, out_edge: y, count: route.count });
                        }
                    }
                }
            }
        }
        pairs
    }

    /// Does some route continue from `e` into its predecessor edge?
    pub fn left_extend(&self, e: EdgeId) -> bool {
        self.extends(e, |edges, i| i > 0 && edges[i - 1].is_some())
    }

    /// Does some route continue from `e` into its successor edge?
    pub fn right_extend(&self, e: EdgeId) -> bool {
        self.extends(e, |edges, i| i + 1 < edges.len() && edges[i + 1].is_some())
    }

    fn extends(&self, e: EdgeId, check: impl Fn(&[Option<EdgeId>], usize) -> bool) -> bool {
        let Some(rs) = self.index.get(&e) else { return false };
        rs.iter().any(|&r| {
            let edges = &self.routes[r].edges;
            edges
                .iter()
                .enumerate()
                .any(|(i, x)| *x == Some(e) && check(edges, i))
        })
    }

    /// Collapse every consecutive `x, y` into the single merged edge `e`.
    pub fn replace_pair(&mut self, x: EdgeId, y: EdgeId, e: EdgeId) {
        let (Some(rx), Some(ry)) = (self.index.get(&x), self.index.get(&y)) else { return };
        let shared: Vec<usize> = rx.intersection(ry).copied().collect();
        for r in shared {
            let edges = &mut self.routes[r].edges;
            let mut i = 0;
            while i + 1 < edges.len() {
                if edges[i] == Some(x) && edges[i + 1] == Some(y) {
                    edges[i] = Some(e);
                    edges.remove(i + 1);
                }
                i += 1;
            }
            self.sync(r, &[x, y, e]);
        }
    }

    /// Rename every occurrence of `x` to `e`.
    pub fn replace(&mut self, x: EdgeId, e: EdgeId) {
        if x == e {
            return;
        }
        let Some(rs) = self.index.remove(&x) else { return };
        for r in rs {
            for slot in self.routes[r].edges.iter_mut() {
                if *slot == Some(x) {
                    *slot = Some(e);
                }
            }
            self.index.entry(e).or_default().insert(r);
        }
    }

    /// Break every route at `e`.
    pub fn remove(&mut self, e: EdgeId) {
        let Some(rs) = self.index.remove(&e) else { return };
        for r in rs {
            for slot in self.routes[r].edges.iter_mut() {
                if *slot == Some(e) {
                    *slot = None;
                }
            }
        }
    }

    fn sync(&mut self, r: usize, ids: &[EdgeId]) {
        for &id in ids {
            if self.routes[r].contains(id) {
                self.index.entry(id).or_default().insert(r);
            } else if let Some(rs) = self.index.get_mut(&id) {
                rs.remove(&r);
                if rs.is_empty() {
                    self.index.remove(&id);
                }
            }
        }
    }

    /// Edge chains of all routes, `None` where a route is broken.
    pub fn chains(&self) -> impl Iterator<Item = (&[Option<EdgeId>], u32)> {
        self.routes.iter().map(|r| (r.edges.as_slice(), r.count))
    }
}
