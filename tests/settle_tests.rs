//! Settle pipeline: batching, gravity, refill and notifications

use tile_blast::core::{layout, GridState, PopOutcome, Rules};
use tile_blast::types::{GridEvent, Position, TierThresholds, TileId};

fn state_from(rows: &[&str], kind_count: u8) -> GridState {
    let rules = Rules {
        kind_count,
        tiers: TierThresholds::new(3, 5, 7),
        ..Rules::default()
    };
    let mut state = GridState::new(rules).unwrap();
    state
        .initialize_layout(&layout::parse_rows(rows).unwrap())
        .unwrap();
    state.drain_events();
    state
}

fn refills(events: &[GridEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GridEvent::RefillTriggered { .. }))
        .count()
}

fn id_at(state: &GridState, x: u16, y: u16) -> TileId {
    state.board().get(Position::new(x, y)).unwrap().id
}

#[test]
fn test_gravity_stops_at_immune_obstacle() {
    // bottom to top: M, M, Box, M, M; removing the M at y=3 gives
    // [M, Empty, Box, Empty, M] before settling.
    let mut state = state_from(&["1", "2", "#", ".", "0"], 3);
    let bottom = id_at(&state, 0, 0);
    let boxed = id_at(&state, 0, 2);
    let top = id_at(&state, 0, 4);

    state.remove_tile(Position::new(0, 3)).unwrap();

    let board = state.board();
    assert!(board.cells().iter().all(Option::is_some));
    assert_eq!(id_at(&state, 0, 0), bottom);
    assert_eq!(id_at(&state, 0, 2), boxed);
    assert!(board.get(Position::new(0, 2)).unwrap().is_obstacle());
    assert_eq!(id_at(&state, 0, 3), top);
    assert!(board.get(Position::new(0, 1)).unwrap().is_matchable());
    assert!(board.get(Position::new(0, 4)).unwrap().is_matchable());

    let events = state.drain_events();
    assert!(events.contains(&GridEvent::RefillTriggered { columns: vec![0] }));
    let moves: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GridEvent::TileMoved { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(moves, vec![(Position::new(0, 4), Position::new(0, 3))]);
}

#[test]
fn test_n_removals_one_refill() {
    for n in 1..=8u16 {
        let mut state = state_from(&["01201201", "12012012", "20120120"], 3);
        {
            let mut batch = state.open_batch();
            for x in 0..n {
                batch.remove_tile(Position::new(x, 1)).unwrap();
            }
        }
        let events = state.drain_events();
        assert_eq!(refills(&events), 1, "{} removals", n);
        assert!(state.board().cells().iter().all(Option::is_some));
    }
}

#[test]
fn test_pop_is_one_settle() {
    let mut state = state_from(&["0000", "1212", "2121"], 3);
    assert_eq!(
        state.pop_group(Position::new(0, 2)).unwrap(),
        PopOutcome::Popped { kind: 0, size: 4 }
    );
    let events = state.drain_events();
    assert_eq!(refills(&events), 1);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GridEvent::TileRemoved { .. }))
            .count(),
        4
    );
}

#[test]
fn test_notification_order() {
    let mut state = state_from(&["00", "12"], 3);
    state.pop_group(Position::new(0, 1)).unwrap();
    let events = state.drain_events();

    let first_refill = events
        .iter()
        .position(|e| matches!(e, GridEvent::RefillTriggered { .. }))
        .unwrap();
    let last_removed = events
        .iter()
        .rposition(|e| matches!(e, GridEvent::TileRemoved { .. }))
        .unwrap();
    let first_created = events
        .iter()
        .position(|e| matches!(e, GridEvent::TileCreated { .. }))
        .unwrap();
    assert!(last_removed < first_refill);
    assert!(first_refill < first_created);
}

#[test]
fn test_empty_batch_does_not_settle() {
    let mut state = state_from(&["01", "10"], 2);
    state.begin_batch();
    state.end_batch().unwrap();
    assert_eq!(refills(&state.drain_events()), 0);
}

#[test]
fn test_settle_frontier_covers_changes() {
    let mut state = state_from(&["012", "120", "201"], 3);
    state.remove_tile(Position::new(1, 0)).unwrap();
    let frontier = state.last_settle_frontier();
    for y in 0..3 {
        assert!(frontier.contains(&Position::new(1, y)));
    }
    assert!(frontier.iter().all(|p| p.x == 1));
}

#[test]
fn test_refill_kinds_stay_in_range() {
    let mut state = state_from(&["0000", "0000"], 4);
    for _ in 0..5 {
        state.remove_tile(Position::new(0, 0)).unwrap();
        state.remove_tile(Position::new(3, 1)).unwrap();
    }
    assert!(state
        .board()
        .tiles()
        .all(|t| t.kind().map_or(false, |k| k < 4)));
}
