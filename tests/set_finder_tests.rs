//! Set finder tests - flood fill, bomb sweeps, partitioning

use std::collections::HashSet;

use zwap::core::{find_sets, Block, Board, GameSettings};
use zwap::types::{BlockId, BlockKind, Position};

/// Board from digit rows, top row first. Blocks are circles except where
/// `kinds` says otherwise; ids count up column by column from 1.
fn grid(rows: &[&str], kinds: &[((i16, i16), BlockKind)]) -> Board {
    let height = rows.len();
    let width = rows[0].len();
    let settings = GameSettings::normal()
        .with_board_size(width as u8, height as u8)
        .without_specials();
    let mut id = 0;
    let columns = (0..width)
        .map(|c| {
            (0..height)
                .map(|r| {
                    id += 1;
                    let color = rows[height - 1 - r].as_bytes()[c] - b'0';
                    let kind = kinds
                        .iter()
                        .find(|(p, _)| *p == (c as i16, r as i16))
                        .map(|(_, k)| *k)
                        .unwrap_or(BlockKind::Circle);
                    Block::new(BlockId(id), color, kind)
                })
                .collect()
        })
        .collect();
    Board::from_columns(&settings, columns).unwrap()
}

#[test]
fn test_snake_component_is_one_set() {
    let board = grid(
        &[
            "11230", //
            "21345", //
            "21134", //
            "32114", //
        ],
        &[],
    );
    let sets = find_sets(&board, None);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 7);
    assert!(sets[0].blocks.iter().all(|b| b.color() == 1));
}

#[test]
fn test_sets_are_sorted_and_disjoint() {
    let board = grid(
        &[
            "0011", //
            "0011", //
            "2233", //
            "2233", //
        ],
        &[],
    );
    let sets = find_sets(&board, None);
    assert_eq!(sets.len(), 4);
    // column-major discovery: bottom-left group first
    assert_eq!(sets[0].blocks[0].color(), 2);
    assert_eq!(sets[0].positions[0], Position::new(0, 0));

    let mut seen = HashSet::new();
    for set in &sets {
        assert!(set.has_minimum_length());
        for id in set.ids() {
            assert!(seen.insert(id), "{} in two sets", id);
        }
    }
    assert_eq!(seen.len(), 16);
}

#[test]
fn test_detection_is_idempotent() {
    let board = grid(&["1112", "3415", "3415", "3412"], &[]);
    let first: Vec<Vec<BlockId>> = find_sets(&board, None).iter().map(|s| s.ids()).collect();
    let second: Vec<Vec<BlockId>> = find_sets(&board, None).iter().map(|s| s.ids()).collect();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_bomb_sweeps_neighbors_once() {
    // bottom row: four 0s, the second one a bomb; above the bomb a lone 5
    let board = grid(
        &[
            "3434", //
            "4343", //
            "3534", //
            "0000", //
        ],
        &[((1, 0), BlockKind::Bomb)],
    );
    let sets = find_sets(&board, None);
    assert_eq!(sets.len(), 1);
    let set = &sets[0];
    assert_eq!(set.bombs().len(), 1);
    assert_eq!(set.extra_blocks.len(), 1);
    assert_eq!(set.extra_blocks[0].color(), 5);
    assert_eq!(set.all_blocks().count(), 5);
    assert_eq!(set.ids().len(), 5);
}

#[test]
fn test_swept_block_belongs_to_one_set_only() {
    // two sets touching one lone 9 from both sides, each through a bomb
    let board = grid(
        &[
            "12121", //
            "21212", //
            "00900", //
            "00300", //
        ],
        &[((1, 1), BlockKind::Bomb), ((3, 1), BlockKind::Bomb)],
    );
    let sets = find_sets(&board, None);
    assert_eq!(sets.len(), 2);
    let owners = sets
        .iter()
        .filter(|s| s.extra_blocks.iter().any(|b| b.color() == 9))
        .count();
    assert_eq!(owners, 1);

    let all: Vec<BlockId> = sets.iter().flat_map(|s| s.ids()).collect();
    let unique: HashSet<BlockId> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len());
}

#[test]
fn test_purity_treats_keys_and_bombs_as_any_shape() {
    let kinds = [
        ((0, 0), BlockKind::Star),
        ((1, 0), BlockKind::Key),
        ((2, 0), BlockKind::Star),
        ((3, 0), BlockKind::Bomb),
    ];
    let board = grid(&["1212", "2121", "1212", "0000"], &kinds);
    let sets = find_sets(&board, None);
    assert_eq!(sets.len(), 1);
    assert!(sets[0].is_pure_type());
    assert!(sets[0].contains_key());
    assert!(!sets[0].contains_lock());

    let mixed = [((0, 0), BlockKind::Star), ((2, 0), BlockKind::Heart)];
    let board2 = grid(&["1212", "2121", "1212", "0000"], &mixed);
    assert!(!find_sets(&board2, None)[0].is_pure_type());
}

#[test]
fn test_center_is_mean_position() {
    let board = grid(&["1212", "2121", "1212", "0000"], &[]);
    let set = &find_sets(&board, None)[0];
    assert_eq!(set.center.x, 1.5);
    assert_eq!(set.center.y, 0.0);
}
