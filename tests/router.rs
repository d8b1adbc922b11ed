use scallop_rs::hyper_set::RoutePair;
use scallop_rs::router::{classify, error_ratio, TreeAdjacency, MAX_SPLIT_COMPONENTS};
use scallop_rs::{Classification, EdgeInfo, HyperSet, RouterStats, SpliceGraph, VertexInfo};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Vertex 3 has in-edges a (e2, from 1) and b (e3, from 2) and out-edges
/// c (e4, to 4) and d (e5, to 5). Sink is 6.
fn crossing(a: f64, b: f64, c: f64, d: f64) -> SpliceGraph {
    let mut g = SpliceGraph::new();
    for _ in 0..7 {
        g.add_vertex(0.0, VertexInfo::default());
    }
    for (s, t, w) in [
        (0, 1, a),
        (0, 2, b),
        (1, 3, a),
        (2, 3, b),
        (3, 4, c),
        (3, 5, d),
        (4, 6, c),
        (5, 6, d),
    ] {
        g.add_edge(s, t, w, EdgeInfo::default()).unwrap();
    }
    g
}

fn pair(in_edge: usize, out_edge: usize) -> RoutePair {
    RoutePair { in_edge, out_edge, count: 1 }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[test]
fn single_edge_side_is_trivial() {
    let g = crossing(3.0, 7.0, 5.0, 5.0);
    match classify(1, &g, &[]).unwrap() {
        Classification::Trivial(eqn) => {
            assert_eq!(eqn.s, vec![0]);
            assert_eq!(eqn.t, vec![2]);
            assert_eq!(eqn.ratio, 0.0);
        }
        other => panic!("expected trivial, got {other:?}"),
    }
}

#[test]
fn no_routes_gives_best_two_way_split() {
    let g = crossing(6.0, 4.0, 5.0, 5.0);
    match classify(3, &g, &[]).unwrap() {
        Classification::Split { equations, ratio } => {
            assert!((ratio - 0.2).abs() < 1e-9, "ratio {ratio}");
            assert_eq!(equations[0].s, vec![2]);
            assert_eq!(equations[0].t, vec![4]);
            assert!((equations[0].ratio - 1.0 / 6.0).abs() < 1e-9);
            assert_eq!(equations[1].s, vec![3]);
            assert_eq!(equations[1].t, vec![5]);
            assert!((equations[1].ratio - 0.2).abs() < 1e-9);
        }
        other => panic!("expected split, got {other:?}"),
    }
}

#[test]
fn spanning_routes_form_tree() {
    let g = crossing(3.0, 7.0, 5.0, 5.0);
    let routes = [pair(2, 4), pair(3, 4), pair(3, 5), pair(3, 5)];
    match classify(3, &g, &routes).unwrap() {
        Classification::Tree(adjacency) => {
            assert_eq!(adjacency.u2e, vec![2, 3, 4, 5]);
            assert_eq!(adjacency.edges, vec![(0, 2), (1, 2), (1, 3)]);
            assert_eq!(adjacency.degree(1), 2);
            assert_eq!(adjacency.degree(3), 1);
        }
        other => panic!("expected tree, got {other:?}"),
    }
}

#[test]
fn partial_routes_keep_components_together() {
    let g = crossing(3.0, 7.0, 3.0, 7.0);
    let routes = [pair(2, 4), pair(3, 5)];
    match classify(3, &g, &routes).unwrap() {
        Classification::Split { equations, ratio } => {
            assert_eq!(ratio, 0.0);
            assert_eq!((equations[0].s.clone(), equations[0].t.clone()), (vec![2], vec![4]));
            assert_eq!((equations[1].s.clone(), equations[1].t.clone()), (vec![3], vec![5]));
        }
        other => panic!("expected split, got {other:?}"),
    }
}

#[test]
fn connected_cycle_is_unresolved() {
    let g = crossing(3.0, 7.0, 5.0, 5.0);
    let routes = [pair(2, 4), pair(2, 5), pair(3, 4), pair(3, 5)];
    assert_eq!(classify(3, &g, &routes).unwrap(), Classification::Unresolved);
}

#[test]
fn vertex_without_outflow_is_unresolved() {
    let mut g = crossing(3.0, 7.0, 5.0, 5.0);
    g.remove_edge(4).unwrap();
    g.remove_edge(5).unwrap();
    assert_eq!(classify(3, &g, &[]).unwrap(), Classification::Unresolved);
}

#[test]
fn source_and_sink_are_rejected() {
    let g = crossing(3.0, 7.0, 5.0, 5.0);
    assert!(classify(0, &g, &[]).is_err());
    assert!(classify(6, &g, &[]).is_err());
}

#[test]
fn error_ratio_is_relative_to_larger_side() {
    assert_eq!(error_ratio(5.0, 5.0), 0.0);
    assert!((error_ratio(6.0, 4.0) - 1.0 / 3.0).abs() < 1e-12);
    assert!((error_ratio(4.0, 6.0) - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(error_ratio(0.0, 0.0), 0.0);
}

#[test]
fn complete_adjacency_pairs_every_edge() {
    let adjacency = TreeAdjacency::complete(&[7], &[8, 9]);
    assert_eq!(adjacency.u2e, vec![7, 8, 9]);
    assert_eq!(adjacency.edges, vec![(0, 1), (0, 2)]);
}

#[test]
fn stats_count_each_case() {
    let g = crossing(6.0, 4.0, 5.0, 5.0);
    let mut hs = HyperSet::new();
    hs.build(&g);
    let stats = RouterStats::collect(&g, &hs).unwrap();
    assert_eq!(stats.trivial, 4);
    assert_eq!(stats.split, 1);
    assert_eq!(stats.tree, 0);
    assert_eq!(stats.unresolved, 0);
    assert_eq!(stats.without_routes, 5);
    assert_eq!(stats.with_routes, 0);
}

#[test]
fn many_singleton_edges_still_split() {
    // Hub 1: nine in-edges of 10, out-edges seven of 10 and one of 20.
    let mut g = SpliceGraph::new();
    for _ in 0..3 {
        g.add_vertex(0.0, VertexInfo::default());
    }
    for _ in 0..9 {
        g.add_edge(0, 1, 10.0, EdgeInfo::default()).unwrap();
    }
    for _ in 0..7 {
        g.add_edge(1, 2, 10.0, EdgeInfo::default()).unwrap();
    }
    g.add_edge(1, 2, 20.0, EdgeInfo::default()).unwrap();
    assert!(g.degree(1) > MAX_SPLIT_COMPONENTS);

    match classify(1, &g, &[]).unwrap() {
        Classification::Split { equations, ratio } => {
            assert!(ratio < 1e-9, "ratio {ratio}");
            for eqn in &equations {
                assert!(!eqn.s.is_empty() && !eqn.t.is_empty(), "{eqn:?}");
                assert!(eqn.ratio < 1e-9, "{eqn:?}");
            }
            let mut s: Vec<usize> = equations.iter().flat_map(|e| e.s.clone()).collect();
            let mut t: Vec<usize> = equations.iter().flat_map(|e| e.t.clone()).collect();
            s.sort_unstable();
            t.sort_unstable();
            assert_eq!(s, (0..9).collect::<Vec<_>>());
            assert_eq!(t, (9..17).collect::<Vec<_>>());
        }
        other => panic!("expected split, got {other:?}"),
    }
}
