//! End-to-end tests for the evidence graph and the random walk over it.

use seal_rank::model::{inverse_label, CONTAIN, EXTRACT};
use seal_rank::{
    transition_matrix, AppliedWrapper, Document, DocumentSet, EntityList, Graph, GraphRanker,
    NodeType, Ranker, WalkPhase,
};

// ============================================================================
// Helper: three documents, one wrapper each, five distinct candidates.
// d0/w0 {a,b,c}, d1/w1 {b,c,d}, d2/w2 {c,d,e}
// ============================================================================

fn overlap_corpus() -> DocumentSet {
    [
        ("d0", "w0", ["a", "b", "c"]),
        ("d1", "w1", ["b", "c", "d"]),
        ("d2", "w2", ["c", "d", "e"]),
    ]
    .into_iter()
    .map(|(url, wrapper, literals)| {
        Document::new(url).with_wrapper(AppliedWrapper::new(wrapper).with_literals(literals))
    })
    .collect()
}

// ============================================================================
// 1. Graph shape
// ============================================================================

#[test]
fn test_graph_shape() {
    let graph = Graph::from_corpus(&overlap_corpus()).unwrap();

    assert_eq!(graph.num_nodes(), 11);
    assert_eq!(graph.nodes_of(NodeType::Document).count(), 3);
    assert_eq!(graph.nodes_of(NodeType::Wrapper).count(), 3);
    assert_eq!(graph.nodes_of(NodeType::Content).count(), 5);

    // Per document: doc-wrapper, 3 wrapper-content, 3 doc-content; both directions.
    assert_eq!(graph.num_edges(), 3 * 7 * 2);

    let mut extracted: Vec<&str> =
        graph.follow_edge("w1", EXTRACT).into_iter().map(|n| n.id.as_str()).collect();
    extracted.sort_unstable();
    assert_eq!(extracted, ["b", "c", "d"]);

    let mut sources: Vec<&str> = graph
        .follow_edge("c", &inverse_label(CONTAIN))
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    sources.sort_unstable();
    assert_eq!(sources, ["d0", "d1", "d2"]);
}

// ============================================================================
// 2. Every edge has its inverse
// ============================================================================

#[test]
fn test_every_edge_has_inverse() {
    let graph = Graph::from_corpus(&overlap_corpus()).unwrap();
    let mut count = 0;
    for edge in graph.edges() {
        let back = edge.inverse();
        let targets = graph.targets(back.src, &back.label).unwrap();
        assert!(targets.contains(&back.dst), "missing inverse of {}", edge.label);
        count += 1;
    }
    assert_eq!(count, graph.num_edges());
}

// ============================================================================
// 3. Transition rows carry unit mass
// ============================================================================

#[test]
fn test_transition_rows_sum_to_one() {
    let graph = Graph::from_corpus(&overlap_corpus()).unwrap();
    for relation_aware in [false, true] {
        let matrix = transition_matrix(&graph, relation_aware);
        assert_eq!(matrix.num_rows(), graph.num_nodes());
        for (row, sum) in matrix.row_sums().iter() {
            assert!((sum - 1.0).abs() < 1e-9, "row {row} sums to {sum}");
        }
    }
}

// ============================================================================
// 4. PageRank converges to a distribution
// ============================================================================

#[test]
fn test_page_rank_converges() {
    let mut ranker = GraphRanker::page_rank();
    let mut entities: EntityList = ["a", "b", "c", "d", "e"].into_iter().collect();
    ranker.load(&mut entities, &overlap_corpus()).unwrap();

    assert_eq!(ranker.phase(), WalkPhase::WeightsProjected);
    let outcome = ranker.outcome().unwrap();
    assert!(outcome.converged);
    assert!(outcome.iterations < 50);
    assert!(outcome.distance < ranker.config().threshold);

    assert!((ranker.state().sum() - 1.0).abs() < 1e-9);
    assert!((ranker.weights().total() - 1.0).abs() < 1e-9);

    // The candidate extracted on every page outranks the ones seen once.
    let c = entities.get("c").unwrap().weight("PR");
    assert!(c > entities.get("a").unwrap().weight("PR"));
    assert!(c > entities.get("e").unwrap().weight("PR"));
}

// ============================================================================
// 5. Restart keeps mass near the seed
// ============================================================================

#[test]
fn test_graph_walk_favors_seed_neighbourhood() {
    let mut ranker = GraphRanker::graph_walk();
    ranker.add_seed("A".into(), 1.0);
    let mut entities: EntityList = ["a", "b", "c", "d", "e"].into_iter().collect();
    ranker.load(&mut entities, &overlap_corpus()).unwrap();

    let weight = |name: &str| entities.get(name).unwrap().weight("GW");
    // b shares a wrapper with the seed, d does not.
    assert!(weight("b") > weight("d"));
    assert!(weight("d") > weight("e"));
}

// ============================================================================
// 6. Dump after a pass
// ============================================================================

#[test]
fn test_dump_lists_every_node() {
    let mut ranker = GraphRanker::page_rank();
    assert!(ranker.dump().is_err());

    let mut entities = EntityList::new();
    ranker.load(&mut entities, &overlap_corpus()).unwrap();

    let dump = ranker.dump().unwrap();
    assert_eq!(dump.lines().count(), 11);
    assert!(dump.contains("content:c"));
    assert!(dump.lines().all(|line| line.contains('\t')));
}

// ============================================================================
// 7. Seeds outside the graph
// ============================================================================

#[test]
fn test_walk_ignores_seeds_outside_graph() {
    let mut ranker = GraphRanker::graph_walk();
    ranker.add_seed("A".into(), 1.0);
    ranker.add_seed("missing".into(), 5.0);
    let mut entities: EntityList = ["a", "b", "c", "d", "e"].into_iter().collect();
    ranker.load(&mut entities, &overlap_corpus()).unwrap();

    assert!(ranker.outcome().unwrap().converged);
    assert!((ranker.weights().total() - 1.0).abs() < 1e-9);
    assert!(!ranker.state().contains("missing"));

    let weight = |name: &str| entities.get(name).unwrap().weight("GW");
    assert!(weight("b") > weight("d"));

    // Only unknown seeds: uniform teleportation over the whole graph.
    let mut ranker = GraphRanker::graph_walk();
    ranker.add_seed("missing".into(), 1.0);
    ranker.load(&mut entities, &overlap_corpus()).unwrap();
    assert_eq!(ranker.phase(), WalkPhase::WeightsProjected);
    assert!(ranker.outcome().unwrap().converged);
    assert!((ranker.weights().total() - 1.0).abs() < 1e-9);
    assert!(entities.iter().all(|e| e.weight("GW").is_finite() && e.weight("GW") > 0.0));
}
