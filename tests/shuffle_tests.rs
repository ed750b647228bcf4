//! Deadlock reshuffle scenarios

use tile_blast::core::{analyze_full, layout, plan_reshuffle, Board, GridState, Rules, Scratch, SimpleRng};
use tile_blast::types::{GridEvent, TierThresholds, TileBody};

const TIERS: TierThresholds = TierThresholds::new(3, 5, 7);

fn apply(board: &mut Board, plan: &tile_blast::core::ShufflePlan) {
    for a in &plan.assignments {
        if let Some(tile) = board.get_mut(a.position) {
            tile.set_kind(a.kind);
        }
    }
}

#[test]
fn test_checkerboard_scenario() {
    let mut board = Board::from_rows(&["0101", "1010", "0101", "1010"]).unwrap();
    let mut scratch = Scratch::new();
    let before = analyze_full(&board, TIERS, &mut scratch);
    assert!(!before.has_pair);

    let mut rng = SimpleRng::new(2024);
    let plan = plan_reshuffle(
        &board,
        &before.matchable_cells,
        &before.kind_counts,
        &mut rng,
        &mut scratch,
    )
    .unwrap();
    assert_eq!(plan.kind_counts(), before.kind_counts);

    apply(&mut board, &plan);
    let after = analyze_full(&board, TIERS, &mut scratch);
    assert!(after.has_pair);
    assert_eq!(after.kind_counts, before.kind_counts);
}

#[test]
fn test_reshuffle_keeps_obstacles_and_specials() {
    let mut board = Board::from_rows(&["0#1*", "1*0#", "0#1*"]).unwrap();
    let mut scratch = Scratch::new();
    let before = analyze_full(&board, TIERS, &mut scratch);
    let plan = plan_reshuffle(
        &board,
        &before.matchable_cells,
        &before.kind_counts,
        &mut SimpleRng::new(1),
        &mut scratch,
    )
    .unwrap();
    for a in &plan.assignments {
        assert!(board.get(a.position).unwrap().is_matchable());
    }
    let obstacles_before = board.tiles().filter(|t| t.is_obstacle()).count();
    apply(&mut board, &plan);
    assert_eq!(board.tiles().filter(|t| t.is_obstacle()).count(), obstacles_before);
}

#[test]
fn test_state_reshuffles_in_place() {
    let rules = Rules {
        kind_count: 3,
        tiers: TIERS,
        seed: 77,
        ..Rules::default()
    };
    let mut state = GridState::new(rules).unwrap();
    state
        .initialize_layout(&layout::parse_rows(&["012", "120", "201"]).unwrap())
        .unwrap();

    let ids_before: Vec<_> = {
        let mut ids: Vec<_> = state.board().tiles().map(|t| t.id).collect();
        ids.sort();
        ids
    };

    let events = state.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, GridEvent::Reshuffled { resolved: true, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, GridEvent::KindChanged { .. })));
    assert!(state.has_moves());

    let mut ids_after: Vec<_> = state.board().tiles().map(|t| t.id).collect();
    ids_after.sort();
    assert_eq!(ids_before, ids_after);

    // tiers were refreshed for the new groups
    for (pos, tier) in &state.last_analysis().tier_assignments {
        let tile = state.board().get(*pos).unwrap();
        assert!(matches!(tile.body, TileBody::Matchable { tier: t, .. } if t == *tier));
    }
}

#[test]
fn test_two_isolated_cells_conserve_without_pair() {
    let board = Board::from_rows(&["0#0"]).unwrap();
    let mut scratch = Scratch::new();
    let before = analyze_full(&board, TIERS, &mut scratch);
    let plan = plan_reshuffle(
        &board,
        &before.matchable_cells,
        &before.kind_counts,
        &mut SimpleRng::new(5),
        &mut scratch,
    )
    .unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.pairs, 0);
    assert_eq!(plan.kind_counts(), before.kind_counts);
}
