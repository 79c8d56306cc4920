//! Property-based tests for visibility and clock invariants

use std::collections::HashSet;

use proptest::prelude::*;
use research_replay::graph::{
    Bounds, Entity, EntityId, Relationship, RelationshipKind, SessionGraph,
};
use research_replay::replay::{
    reconstruct, ClockState, PlaybackClock, PlaybackStatus, SpeedRange, TickOutcome,
    TimelineIndex,
};

use super::common::fixtures::{paper, pump, RecordingScheduler};

// ============================================================================
// Strategies
// ============================================================================

/// Creation times on a coarse grid so that ties and exact hits are common
fn created_at_strategy() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        6 => (0u32..50).prop_map(|t| Some(f64::from(t) * 10.0)),
    ]
}

/// Up to 12 entities `e0..eN` and edges between them, some pointing at unknown ids
fn graph_strategy() -> impl Strategy<Value = SessionGraph> {
    prop::collection::vec(created_at_strategy(), 0..12).prop_flat_map(|times| {
        let n = times.len();
        let edges = prop::collection::vec((0..n + 2, 0..n + 2), 0..20);
        (Just(times), edges).prop_map(|(times, edges)| {
            let entities: Vec<Entity> = times
                .iter()
                .enumerate()
                .map(|(i, at)| paper(&format!("e{i}"), *at))
                .collect();
            let relationships = edges
                .into_iter()
                .map(|(s, t)| {
                    Relationship::new(
                        format!("e{s}"),
                        format!("e{t}"),
                        RelationshipKind::Membership,
                    )
                })
                .collect();
            SessionGraph::new(entities, relationships)
        })
    })
}

fn instant_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1i32..52).prop_map(|t| f64::from(t) * 10.0),
        -10.0f64..520.0,
    ]
}

fn visible_ids(graph: &SessionGraph, at: f64) -> HashSet<EntityId> {
    reconstruct(graph, Some(at))
        .nodes
        .iter()
        .map(|e| e.id.clone())
        .collect()
}

fn visible_edges(graph: &SessionGraph, at: f64) -> HashSet<Relationship> {
    reconstruct(graph, Some(at))
        .edges
        .iter()
        .map(|r| (*r).clone())
        .collect()
}

// ============================================================================
// Reconstruction
// ============================================================================

proptest! {
    #[test]
    fn visibility_matches_definition(graph in graph_strategy(), at in instant_strategy()) {
        let expected: HashSet<EntityId> = graph
            .entities
            .iter()
            .filter(|e| e.created_at.map_or(true, |c| c <= at))
            .map(|e| e.id.clone())
            .collect();
        prop_assert_eq!(visible_ids(&graph, at), expected);
    }

    #[test]
    fn edges_visible_iff_both_endpoints_visible(
        graph in graph_strategy(),
        at in instant_strategy(),
    ) {
        let nodes = visible_ids(&graph, at);
        let edges = visible_edges(&graph, at);
        for relationship in &graph.relationships {
            let both = nodes.contains(&relationship.source_id)
                && nodes.contains(&relationship.target_id);
            prop_assert_eq!(edges.contains(relationship), both);
        }
    }

    #[test]
    fn later_instants_only_add(
        graph in graph_strategy(),
        a in instant_strategy(),
        b in instant_strategy(),
    ) {
        let (t1, t2) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(visible_ids(&graph, t1).is_subset(&visible_ids(&graph, t2)));
        prop_assert!(visible_edges(&graph, t1).is_subset(&visible_edges(&graph, t2)));
    }

    #[test]
    fn reconstruction_is_referentially_transparent(
        graph in graph_strategy(),
        at in instant_strategy(),
    ) {
        let first = reconstruct(&graph, Some(at));
        let _unrelated = reconstruct(&graph, Some(at + 1_000.0));
        let second = reconstruct(&graph, Some(at));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn index_agrees_with_linear_scan(graph in graph_strategy(), at in instant_strategy()) {
        let index = TimelineIndex::new(&graph);
        let indexed: HashSet<EntityId> = index
            .reconstruct(Some(at))
            .nodes
            .iter()
            .map(|e| e.id.clone())
            .collect();
        prop_assert_eq!(indexed, visible_ids(&graph, at));
        prop_assert_eq!(
            index.reconstruct(Some(at)).stats,
            reconstruct(&graph, Some(at)).stats
        );
    }
}

// ============================================================================
// Clock
// ============================================================================

fn bounds_strategy() -> impl Strategy<Value = Bounds> {
    (0.0f64..1e6, 0.0f64..1e6).prop_map(|(a, b)| Bounds::new(a, b))
}

proptest! {
    #[test]
    fn seek_to_progress_reads_back(bounds in bounds_strategy(), p in -0.5f64..1.5) {
        prop_assume!(bounds.duration() > 1.0);
        let state = ClockState::new(bounds, SpeedRange::default()).seek_to_progress(p);
        let expected = p.clamp(0.0, 1.0);
        prop_assert!((state.progress() - expected).abs() < 1e-9);
    }

    #[test]
    fn reset_restores_start_and_default_speed(
        bounds in bounds_strategy(),
        speed in 0.0f64..1_000.0,
        p in 0.0f64..=1.0,
        playing in any::<bool>(),
    ) {
        let mut state = ClockState::new(bounds, SpeedRange::default())
            .with_speed(speed)
            .seek_to_progress(p);
        if playing {
            state = state.play();
        }
        let state = state.reset();
        prop_assert!(!state.is_playing());
        prop_assert_eq!(state.speed, 1.0);
        if bounds.duration() > 0.0 {
            prop_assert_eq!(state.current_time, bounds.start);
            prop_assert_eq!(state.status, PlaybackStatus::Stopped);
        } else {
            prop_assert_eq!(state.current_time, bounds.end);
            prop_assert_eq!(state.status, PlaybackStatus::Ended);
        }
    }

    #[test]
    fn tick_advances_by_delta_times_speed(
        speed in 0.25f64..=256.0,
        start_p in 0.0f64..1.0,
        delta in 0.0f64..5_000.0,
    ) {
        let bounds = Bounds::new(0.0, 100_000.0);
        let mut clock =
            PlaybackClock::new(bounds, SpeedRange::default(), RecordingScheduler::new());
        clock.set_speed(speed);
        clock.seek_to_progress(start_p);
        clock.play();
        pump(&mut clock, 1_000.0);
        let before = clock.current_time();

        let wall = 1_000.0 + delta;
        let outcome = pump(&mut clock, wall);
        let unclamped = before + (wall - 1_000.0) * speed;
        let expected = unclamped.min(bounds.end);
        prop_assert!((clock.current_time() - expected).abs() < 1e-6);

        if unclamped >= bounds.end {
            prop_assert_eq!(outcome, Some(TickOutcome::Ended(bounds.end)));
            prop_assert!(clock.scheduler().pending().is_none());
        } else {
            prop_assert!(clock.is_playing());
            prop_assert!(clock.scheduler().pending().is_some());
        }
    }

    #[test]
    fn play_at_end_rewinds(bounds in bounds_strategy()) {
        prop_assume!(bounds.duration() > 0.0);
        let state = ClockState::new(bounds, SpeedRange::default())
            .seek_to(bounds.end)
            .play();
        prop_assert_eq!(state.current_time, bounds.start);
        prop_assert_eq!(state.status, PlaybackStatus::Playing);
    }
}
