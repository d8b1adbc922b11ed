use scallop_rs::router::classify;
use scallop_rs::{
    AssemblyConfig, Classification, EdgeInfo, HyperSet, Scallop, SpliceGraph, VertexInfo,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn config() -> AssemblyConfig {
    AssemblyConfig { add_pseudo_routes: false, ..AssemblyConfig::default() }
}

fn graph_with(weights: &[f64], edges: &[(usize, usize, f64)]) -> SpliceGraph {
    let mut g = SpliceGraph::new();
    for &w in weights {
        g.add_vertex(w, VertexInfo { length: 5, ..Default::default() });
    }
    for &(s, t, w) in edges {
        g.add_edge(s, t, w, EdgeInfo { length: 1, inferred: false }).unwrap();
    }
    g
}

/// Vertex 3 has in-edges 2 (from 1) and 3 (from 2) and out-edges 4 (to 4)
/// and 5 (to 5). Sink is 6.
fn crossing(a: f64, b: f64, c: f64, d: f64) -> SpliceGraph {
    graph_with(
        &[0.0; 7],
        &[
            (0, 1, a),
            (0, 2, b),
            (1, 3, a),
            (2, 3, b),
            (3, 4, c),
            (3, 5, d),
            (4, 6, c),
            (5, 6, d),
        ],
    )
}

fn engine(graph: SpliceGraph, routes: &[&[usize]]) -> Scallop {
    let mut hs = HyperSet::new();
    for r in routes {
        hs.add_node_list(r.to_vec(), 1);
    }
    Scallop::new("test", graph, hs, config()).unwrap()
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[test]
fn split_edge_carves_parallel_piece() {
    let mut sc = engine(graph_with(&[10.0; 3], &[(0, 1, 10.0), (1, 2, 10.0)]), &[]);
    let e = sc.split_edge(0, 4.0).unwrap();
    assert_eq!(e, 2);
    let g = sc.graph();
    assert_eq!(g.edge_weight(0).unwrap(), 6.0);
    assert_eq!(g.edge_weight(2).unwrap(), 4.0);
    assert_eq!((g.edge(2).unwrap().source, g.edge(2).unwrap().target), (0, 1));
    assert_eq!(g.edge(2).unwrap().provenance, vec![0]);
}

#[test]
fn split_edge_whole_weight_is_noop() {
    let mut sc = engine(graph_with(&[10.0; 3], &[(0, 1, 10.0), (1, 2, 10.0)]), &[]);
    assert_eq!(sc.split_edge(0, 10.0).unwrap(), 0);
    assert_eq!(sc.graph().num_edges(), 2);
}

#[test]
fn split_edge_rejects_excess_weight() {
    let mut sc = engine(graph_with(&[10.0; 3], &[(0, 1, 10.0), (1, 2, 10.0)]), &[]);
    assert!(sc.split_edge(0, 12.0).is_err());
}

#[test]
fn merge_equal_edges_joins_provenance() {
    let mut sc = engine(graph_with(&[10.0; 3], &[(0, 1, 10.0), (1, 2, 10.0)]), &[]);
    let e = sc.merge_adjacent_equal_edges(1, 0).unwrap().unwrap();
    let g = sc.graph();
    let edge = g.edge(e).unwrap();
    assert_eq!((edge.source, edge.target), (0, 2));
    assert_eq!(edge.provenance, vec![0, 1]);
    assert_eq!(edge.info.length, 1 + 1 + 5);
    assert_eq!(g.vertex_weight(1), 0.0);
    assert!(g.get(0).is_none() && g.get(1).is_none());
    assert_eq!(g.num_edges(), 1);
}

#[test]
fn merge_equal_edges_rejects_different_weights() {
    let mut sc = engine(graph_with(&[10.0; 3], &[(0, 1, 10.0), (1, 2, 6.0)]), &[]);
    assert!(sc.merge_adjacent_equal_edges(0, 1).is_err());
}

#[test]
fn merge_non_adjacent_edges_is_none() {
    let mut sc = engine(
        graph_with(&[1.0; 4], &[(0, 1, 5.0), (0, 2, 5.0), (1, 3, 5.0), (2, 3, 5.0)]),
        &[],
    );
    assert_eq!(sc.merge_adjacent_equal_edges(0, 1).unwrap(), None);
    assert_eq!(sc.merge_adjacent_edges(0, 3).unwrap(), None);
    assert_eq!(sc.graph().num_edges(), 4);
}

#[test]
fn merge_adjacent_edges_leaves_remainder() {
    let mut sc = engine(graph_with(&[10.0; 3], &[(0, 1, 10.0), (1, 2, 6.0)]), &[]);
    let e = sc.merge_adjacent_edges(0, 1).unwrap().unwrap();
    let g = sc.graph();
    assert_eq!(g.edge_weight(e).unwrap(), 6.0);
    assert_eq!(g.edge_weight(0).unwrap(), 4.0);
    assert!(g.get(1).is_none());
    assert_eq!(g.out_weight(0), 10.0);
}

#[test]
fn split_vertex_moves_sink_to_last_slot() {
    let mut sc = engine(crossing(3.0, 7.0, 3.0, 7.0), &[]);
    let copy = sc.split_vertex(3, &[2], &[4]).unwrap();
    assert_eq!(copy, 6);

    let g = sc.graph();
    assert_eq!(g.num_vertices(), 8);
    assert_eq!(g.sink(), 7);
    assert_eq!(sc.vertex_map(), &[0, 1, 2, 3, 4, 5, 3, 6]);
    assert_eq!(g.edge(2).unwrap().target, 6);
    assert_eq!(g.edge(4).unwrap().source, 6);
    assert_eq!(g.edge(6).unwrap().target, 7);
    assert_eq!(g.edge(7).unwrap().target, 7);
    assert_eq!((g.in_degree(3), g.out_degree(3)), (1, 1));
    assert_eq!(g.in_edges(3), &[3]);
    assert_eq!(g.out_edges(3), &[5]);
    assert!(g.validate().is_ok());
}

#[test]
fn split_vertex_rejects_bad_requests() {
    let mut sc = engine(crossing(3.0, 7.0, 3.0, 7.0), &[]);
    assert!(sc.split_vertex(0, &[0], &[1]).is_err());
    assert!(sc.split_vertex(6, &[6], &[7]).is_err());
    assert!(sc.split_vertex(3, &[], &[4]).is_err());
    assert!(sc.split_vertex(3, &[4], &[5]).is_err());
    assert_eq!(sc.graph().num_vertices(), 7);
}

#[test]
fn remove_edge_breaks_routes() {
    let mut sc = engine(crossing(3.0, 7.0, 3.0, 7.0), &[&[1, 3, 4]]);
    assert!(sc.hyper_set().right_extend(2));

    sc.remove_edge(4).unwrap();
    assert!(sc.graph().get(4).is_none());
    assert!(!sc.hyper_set().right_extend(2));
    let chains: Vec<_> = sc.hyper_set().chains().map(|(c, _)| c.to_vec()).collect();
    assert_eq!(chains, vec![vec![Some(2), None]]);
}

#[test]
fn decompose_tree_clears_vertex_and_rewrites_routes() {
    let mut sc = engine(
        crossing(3.0, 7.0, 5.0, 5.0),
        &[&[1, 3, 4], &[2, 3, 4], &[2, 3, 5]],
    );
    let routes = sc.hyper_set().get_routes(3, sc.graph());
    let Classification::Tree(adjacency) = classify(3, sc.graph(), &routes).unwrap() else {
        panic!("expected a tree at vertex 3");
    };
    sc.decompose_tree(&adjacency).unwrap();

    let g = sc.graph();
    assert_eq!(g.degree(3), 0);
    assert_eq!(g.out_weight(1), 3.0);
    assert_eq!(g.out_weight(2), 7.0);
    assert_eq!(g.in_weight(4), 5.0);
    assert_eq!(g.in_weight(5), 5.0);
    for (chain, _) in sc.hyper_set().chains() {
        for e in chain.iter().flatten() {
            assert!(g.get(*e).is_some(), "route refers to removed edge {e}");
        }
    }
}

#[test]
fn decompose_trivial_vertex_pairs_every_edge() {
    let mut sc = engine(
        graph_with(&[0.0; 5], &[(0, 1, 4.0), (0, 1, 6.0), (1, 2, 5.0), (2, 3, 12.0), (3, 4, 12.0)]),
        &[],
    );
    sc.decompose_trivial_vertex(1).unwrap();
    let g = sc.graph();
    assert_eq!(g.degree(1), 0);
    assert_eq!(g.out_degree(0), 2);
    assert!((g.out_weight(0) - 10.0).abs() < 1e-9);
    assert!((g.in_weight(2) - 10.0).abs() < 1e-9);
}
