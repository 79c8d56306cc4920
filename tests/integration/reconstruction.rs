//! Snapshot reconstruction against hand-built and exported graphs

use research_replay::graph::{now_epoch_ms, EntityId, SessionExport, SessionGraph};
use research_replay::replay::{
    reconstruct, reconstruct_at, PlaybackClock, PlaybackStatus, TimelineIndex,
};

use super::common::fixtures::{
    edge, edge_pairs, ids, paper, scenario_a, RecordingScheduler, CLOSED_SESSION,
};

fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn scenario_a_before_second_entity() {
    let graph = scenario_a();
    let snapshot = reconstruct(&graph, Some(5.0));
    assert_eq!(ids(&snapshot.nodes), vec!["A"]);
    assert!(snapshot.edges.is_empty());
}

#[test]
fn scenario_a_inclusive_at_creation_instant() {
    let graph = scenario_a();
    let snapshot = reconstruct(&graph, Some(10.0));
    assert_eq!(ids(&snapshot.nodes), vec!["A", "B"]);
    assert_eq!(edge_pairs(&snapshot.edges), pairs(&[("A", "B")]));
}

#[test]
fn scenario_a_at_end() {
    let graph = scenario_a();
    let snapshot = reconstruct(&graph, Some(20.0));
    assert_eq!(ids(&snapshot.nodes), vec!["A", "B", "C"]);
    assert_eq!(edge_pairs(&snapshot.edges), pairs(&[("A", "B"), ("B", "C")]));
    assert_eq!(snapshot.stats.papers, 3);
}

#[test]
fn scenario_a_via_index_matches_linear_scan() {
    let graph = scenario_a();
    let index = TimelineIndex::new(&graph);
    for t in [-1.0, 0.0, 5.0, 10.0, 15.0, 20.0, 99.0] {
        let linear = reconstruct(&graph, Some(t));
        let indexed = index.reconstruct(Some(t));
        assert_eq!(ids(&linear.nodes), ids(&indexed.nodes), "at {t}");
        assert_eq!(edge_pairs(&linear.edges), edge_pairs(&indexed.edges), "at {t}");
    }
}

#[test]
fn scenario_c_empty_graph_is_a_zero_length_timeline() {
    let graph = SessionGraph::default();
    let now = now_epoch_ms();
    let bounds = graph.bounds(now);
    assert_eq!(bounds.start, now);
    assert_eq!(bounds.end, now);
    assert_eq!(bounds.duration(), 0.0);

    let mut clock = PlaybackClock::new(bounds, Default::default(), RecordingScheduler::new());
    assert_eq!(clock.status(), PlaybackStatus::Ended);
    assert_eq!(clock.progress(), 0.0);
    // The visible graph at the only instant is the full (empty) graph
    let snapshot = reconstruct(&graph, Some(clock.current_time()));
    assert!(snapshot.nodes.is_empty());
    assert!(snapshot.edges.is_empty());

    clock.play();
    assert!(!clock.is_playing());
    assert_eq!(clock.status(), PlaybackStatus::Ended);
    assert_eq!(clock.scheduler().scheduled_count(), 0);
}

#[test]
fn relationships_to_unknown_entities_are_dropped() {
    let entities = vec![paper("A", Some(0.0))];
    let relationships = vec![edge("A", "ghost"), edge("ghost", "A")];
    let snapshot = reconstruct_at(&entities, &relationships, None);
    assert_eq!(ids(&snapshot.nodes), vec!["A"]);
    assert!(snapshot.edges.is_empty());
}

#[test]
fn exported_session_reconstructs_at_midpoint() {
    let export = SessionExport::from_json(CLOSED_SESSION).unwrap();
    let graph = export.into_graph();
    let bounds = graph.bounds(0.0);
    assert_eq!(bounds.start, 1_700_000_000_000.0);
    assert_eq!(bounds.end, 1_700_000_120_000.0);

    let snapshot = reconstruct(&graph, Some(1_700_000_060_000.0));
    assert_eq!(ids(&snapshot.nodes), vec!["deep", "p1", "p3", "root"]);
    assert_eq!(
        edge_pairs(&snapshot.edges),
        pairs(&[("deep", "p3"), ("root", "deep"), ("root", "p1")])
    );
    assert_eq!(snapshot.newest().map(|e| e.id.clone()), Some(EntityId::new("deep")));
}

#[test]
fn exported_session_live_view_drops_dangling_support() {
    let graph = SessionExport::from_json(CLOSED_SESSION).unwrap().into_graph();
    let snapshot = reconstruct(&graph, None);
    assert_eq!(snapshot.nodes.len(), 6);
    assert_eq!(graph.relationships.len(), 7);
    // h1 -> ghost has no entity behind it
    assert_eq!(snapshot.edge_count(), 6);
    assert_eq!(snapshot.stats.branches, 2);
    assert_eq!(snapshot.stats.papers, 3);
    assert_eq!(snapshot.stats.hypotheses, 1);
}
