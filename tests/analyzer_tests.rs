//! Group analysis through the public API

use std::collections::BTreeMap;

use tile_blast::core::{analyze, analyze_full, Board, GridState, Rules, Scratch};
use tile_blast::types::{Position, Tier, TierThresholds};

const TIERS: TierThresholds = TierThresholds::new(3, 5, 7);

/// A single group of `size` zeros laid out in one row, padded with kind 1/2 alternation
fn row_with_group(size: usize, width: usize) -> String {
    (0..width)
        .map(|x| {
            if x < size {
                '0'
            } else if x % 2 == 0 {
                '1'
            } else {
                '2'
            }
        })
        .collect()
}

#[test]
fn test_tier_boundaries() {
    let cases = [
        (2, Tier::Default),
        (3, Tier::A),
        (4, Tier::A),
        (5, Tier::B),
        (6, Tier::B),
        (7, Tier::C),
        (9, Tier::C),
    ];
    for (size, expected) in cases {
        let row = row_with_group(size, 12);
        let board = Board::from_rows(&[row.as_str()]).unwrap();
        let result = analyze_full(&board, TIERS, &mut Scratch::new());
        assert_eq!(
            result.tier_at(Position::new(0, 0)),
            Some(expected),
            "group of {}",
            size
        );
    }
}

#[test]
fn test_result_fields_agree() {
    let board = Board::from_rows(&["0011", "0#12", "2*22"]).unwrap();
    let result = analyze_full(&board, TIERS, &mut Scratch::new());

    let total: usize = result.kind_counts.values().sum();
    assert_eq!(total, result.matchable_cells.len());
    assert_eq!(total, result.tier_assignments.len());
    assert_eq!(total, board.count_matchable());
    assert_eq!(
        result.groups.iter().map(|g| g.size).sum::<usize>(),
        total
    );

    let largest = result.largest_group().unwrap();
    assert_eq!(largest.size, 3);
    assert!(result.playable_groups().all(|g| g.size >= 2));
}

#[test]
fn test_incremental_matches_full_on_touched_components() {
    let board = Board::from_rows(&["0011", "0122", "2210"]).unwrap();
    let mut scratch = Scratch::new();
    let full = analyze_full(&board, TIERS, &mut scratch);
    let dirty = [Position::new(3, 0), Position::new(0, 2)];
    let partial = analyze(&board, &dirty, TIERS, false, &mut scratch);

    for (pos, tier) in &partial.tier_assignments {
        assert_eq!(full.tier_at(*pos), Some(*tier));
    }
    for cell in &dirty {
        assert!(partial.matchable_cells.contains(cell));
    }

    // Only the components through the dirty cells and their neighbours are reported,
    // each one complete: {(3,0)}, {(2,0)}, {(2,1),(3,1)} and {(0,2),(1,2),(0,1)}.
    let mut reported = partial.matchable_cells.clone();
    reported.sort();
    let mut expected = vec![
        Position::new(3, 0),
        Position::new(2, 0),
        Position::new(2, 1),
        Position::new(3, 1),
        Position::new(0, 2),
        Position::new(1, 2),
        Position::new(0, 1),
    ];
    expected.sort();
    assert_eq!(reported, expected);
    assert_eq!(full.matchable_cells.len(), 12);
    assert_eq!(partial.kind_counts, BTreeMap::from([(0, 4), (1, 1), (2, 2)]));
}

#[test]
fn test_find_connected_group_via_state() {
    let mut state = GridState::new(Rules {
        kind_count: 3,
        tiers: TIERS,
        ..Rules::default()
    })
    .unwrap();
    let level = tile_blast::core::layout::parse_rows(&["001", "122"]).unwrap();
    state.initialize_layout(&level).unwrap();

    let mut group = state.find_connected_group(Position::new(2, 0)).unwrap();
    group.sort();
    assert_eq!(group, vec![Position::new(1, 0), Position::new(2, 0)]);

    assert!(state.find_connected_group(Position::new(3, 3)).is_err());
}
