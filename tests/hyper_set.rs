use scallop_rs::hyper_set::RoutePair;
use scallop_rs::{EdgeId, EdgeInfo, HyperSet, SpliceGraph, VertexInfo};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Straight chain `0 -> 1 -> ... -> n-1`; edge `i` runs `i -> i + 1`.
fn chain(n: usize, weight: f64) -> SpliceGraph {
    let mut g = SpliceGraph::new();
    for _ in 0..n {
        g.add_vertex(weight, VertexInfo::default());
    }
    for i in 0..n - 1 {
        g.add_edge(i, i + 1, weight, EdgeInfo::default()).unwrap();
    }
    g
}

fn chains(hs: &HyperSet) -> Vec<(Vec<Option<EdgeId>>, u32)> {
    hs.chains().map(|(edges, count)| (edges.to_vec(), count)).collect()
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[test]
fn identical_node_lists_accumulate() {
    let g = chain(5, 5.0);
    let mut hs = HyperSet::new();
    hs.add_node_list(vec![1, 2, 3], 2);
    hs.add_node_list(vec![1, 2, 3], 1);
    assert_eq!(hs.num_node_lists(), 1);

    hs.build(&g);
    assert_eq!(hs.num_routes(), 1);
    assert_eq!(chains(&hs), vec![(vec![Some(1), Some(2)], 3)]);
    assert_eq!(
        hs.get_routes(2, &g),
        vec![RoutePair { in_edge: 1, out_edge: 2, count: 3 }]
    );
    assert!(hs.get_routes(1, &g).is_empty());
}

#[test]
fn extends_look_at_neighbouring_positions() {
    let g = chain(5, 5.0);
    let mut hs = HyperSet::new();
    hs.add_node_list(vec![1, 2, 3], 1);
    hs.build(&g);

    assert!(hs.right_extend(1));
    assert!(hs.left_extend(2));
    assert!(!hs.left_extend(1));
    assert!(!hs.right_extend(2));
    assert!(!hs.right_extend(0));
}

#[test]
fn remove_breaks_route() {
    let g = chain(5, 5.0);
    let mut hs = HyperSet::new();
    hs.add_node_list(vec![1, 2, 3], 1);
    hs.build(&g);

    hs.remove(2);
    assert_eq!(chains(&hs), vec![(vec![Some(1), None], 1)]);
    assert!(hs.get_routes(2, &g).is_empty());
    assert!(!hs.right_extend(1));
}

#[test]
fn replace_rewrites_chains() {
    let g = chain(5, 5.0);
    let mut hs = HyperSet::new();
    hs.add_node_list(vec![1, 2, 3, 4], 1);
    hs.build(&g);
    assert_eq!(chains(&hs), vec![(vec![Some(1), Some(2), Some(3)], 1)]);

    hs.replace_pair(1, 2, 9);
    assert_eq!(chains(&hs), vec![(vec![Some(9), Some(3)], 1)]);
    assert!(hs.right_extend(9));

    hs.replace(3, 10);
    assert_eq!(chains(&hs), vec![(vec![Some(9), Some(10)], 1)]);
    assert!(hs.left_extend(10));
    assert!(!hs.left_extend(3));
}

#[test]
fn missing_edges_break_or_drop_routes() {
    let g = chain(5, 5.0);
    let mut hs = HyperSet::new();
    // 1 -> 3 is not an edge: a single live edge remains, so the route is dropped.
    hs.add_node_list(vec![1, 3, 4], 1);
    // The gap sits in the middle; two live edges survive.
    hs.add_node_list(vec![0, 1, 3, 4], 1);
    hs.build(&g);

    assert_eq!(hs.num_routes(), 1);
    assert_eq!(chains(&hs), vec![(vec![Some(0), None, Some(3)], 1)]);
}

#[test]
fn build_skips_vertices_outside_graph() {
    let g = chain(3, 5.0);
    let mut hs = HyperSet::new();
    hs.add_node_list(vec![7, 8, 9], 1);
    hs.build(&g);
    assert_eq!(hs.num_routes(), 0);
}

#[test]
fn pseudo_routes_follow_heaviest_edges() {
    let g = chain(5, 20.0);
    let mut hs = HyperSet::new();
    hs.add_pseudo_routes(&g, 10.0);
    assert_eq!(hs.num_node_lists(), 1);
    hs.build(&g);
    assert_eq!(chains(&hs), vec![(vec![Some(1), Some(2)], 1)]);

    let mut light = HyperSet::new();
    light.add_pseudo_routes(&g, 25.0);
    assert_eq!(light.num_node_lists(), 0);
}

#[test]
fn support_counts_saturate() {
    let g = chain(5, 5.0);
    let mut hs = HyperSet::new();
    hs.add_node_list(vec![1, 2, 3], u32::MAX);
    hs.add_node_list(vec![1, 2, 3], 5);
    hs.add_node_list(vec![1, 2, 3, 4], 1);
    assert_eq!(hs.num_node_lists(), 2);

    hs.build(&g);
    assert_eq!(chains(&hs)[0].1, u32::MAX);
    assert_eq!(
        hs.get_routes(2, &g),
        vec![RoutePair { in_edge: 1, out_edge: 2, count: u32::MAX }]
    );
}
