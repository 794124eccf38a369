//! Scoring module - set, reaction and unlock scores
//!
//! Rules, applied per set in this order:
//! - Base score is the sum of the per-kind block values.
//! - A pure set is multiplied by `pure_set_multiplier`, then gains `pure_set_bonus`.
//! - Two or more bombs multiply by `bomb_multiplier * bombs`.
//! - Every set is then multiplied by `combo_multiplier`.
//!
//! A reaction scores the product of its set scores when several sets resolve
//! at once (plus `combo_bonus`), or the single set's score otherwise.
//! All arithmetic saturates.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::sets::BlockSet;
use crate::settings::ScoringTable;

/// Score breakdown of one chain reaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionScores {
    /// Final score of each set, in set order
    pub per_set: Vec<u64>,
    /// Gain of `total` over the plain sum of `per_set`
    pub combo: u64,
    pub total: u64,
}

/// Sum of block values before any multiplier
pub fn base_score(set: &BlockSet, table: &ScoringTable) -> u64 {
    set.blocks
        .iter()
        .map(|b| table.value_for(b.kind()))
        .fold(0u64, u64::saturating_add)
}

/// Final score of one set, combo multiplier included
pub fn calculate_set_score(set: &BlockSet, table: &ScoringTable) -> u64 {
    let mut score = base_score(set, table);
    if set.is_pure_type() {
        score = score
            .saturating_mul(table.pure_set_multiplier)
            .saturating_add(table.pure_set_bonus);
    }
    let bombs = set.bombs().len() as u64;
    if bombs >= 2 {
        score = score.saturating_mul(table.bomb_multiplier.saturating_mul(bombs));
    }
    score.saturating_mul(table.combo_multiplier)
}

/// Score every set (writing `BlockSet::score`) and total the reaction
pub fn score_reaction(sets: &mut [BlockSet], table: &ScoringTable) -> ReactionScores {
    let per_set: Vec<u64> = sets
        .iter_mut()
        .map(|set| {
            set.score = calculate_set_score(set, table);
            set.score
        })
        .collect();

    let sum = per_set.iter().fold(0u64, |acc, &s| acc.saturating_add(s));
    let total = match per_set.len() {
        0 => 0,
        1 => per_set[0],
        _ => per_set
            .iter()
            .fold(1u64, |acc, &s| acc.saturating_mul(s))
            .saturating_add(table.combo_bonus),
    };

    ReactionScores {
        combo: total.saturating_sub(sum),
        per_set,
        total,
    }
}

/// Points for matching a key onto a lock
pub fn calculate_unlock_score(lock: &Block, key: &Block, table: &ScoringTable) -> u64 {
    table
        .value_for(lock.kind())
        .saturating_add(table.value_for(key.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::sets::find_sets;
    use crate::settings::GameSettings;
    use zwap_types::{BlockId, BlockKind};

    /// A 4x4 board whose bottom row holds one 4-set of color 0 with the given
    /// kinds. Everything above is a checkerboard that forms no sets.
    fn row_set(kinds: [BlockKind; 4]) -> BlockSet {
        let settings = GameSettings::normal().with_board_size(4, 4).without_specials();
        let mut id = 0;
        let columns = (0..4)
            .map(|c| {
                (0..4)
                    .map(|r| {
                        id += 1;
                        if r == 0 {
                            Block::new(BlockId(id), 0, kinds[c])
                        } else {
                            Block::new(BlockId(id), 1 + ((c + r) % 2) as u8, BlockKind::Circle)
                        }
                    })
                    .collect()
            })
            .collect();
        let board = Board::from_columns(&settings, columns).unwrap();
        let mut sets = find_sets(&board, None);
        assert_eq!(sets.len(), 1);
        sets.remove(0)
    }

    fn table() -> ScoringTable {
        ScoringTable::flat(1)
    }

    #[test]
    fn test_flat_four_set_scores_four() {
        let set = row_set([
            BlockKind::Circle,
            BlockKind::Square,
            BlockKind::Circle,
            BlockKind::Square,
        ]);
        assert_eq!(calculate_set_score(&set, &table()), 4);
        let mut sets = vec![set];
        let scores = score_reaction(&mut sets, &table());
        assert_eq!(scores.total, 4);
        assert_eq!(scores.combo, 0);
        assert_eq!(sets[0].score, 4);
    }

    #[test]
    fn test_pure_set_multiplier_and_bonus() {
        let set = row_set([BlockKind::Star; 4]);
        let mut t = table();
        t.pure_set_multiplier = 5;
        assert_eq!(calculate_set_score(&set, &t), 20);
        t.pure_set_bonus = 3;
        assert_eq!(calculate_set_score(&set, &t), 23);
        t.combo_multiplier = 2;
        assert_eq!(calculate_set_score(&set, &t), 46);
    }

    #[test]
    fn test_bomb_multiplier_needs_two_bombs() {
        let mut t = table().with_value(BlockKind::Bomb, 3);
        t.bomb_multiplier = 2;
        let one = row_set([
            BlockKind::Bomb,
            BlockKind::Circle,
            BlockKind::Square,
            BlockKind::Circle,
        ]);
        assert_eq!(calculate_set_score(&one, &t), 6);

        let two = row_set([
            BlockKind::Bomb,
            BlockKind::Circle,
            BlockKind::Bomb,
            BlockKind::Square,
        ]);
        // (3 + 1 + 3 + 1) * (2 * 2)
        assert_eq!(calculate_set_score(&two, &t), 32);
    }

    #[test]
    fn test_simultaneous_sets_multiply() {
        let a = row_set([BlockKind::Circle, BlockKind::Square, BlockKind::Circle, BlockKind::Square]);
        let b = row_set([BlockKind::Circle, BlockKind::Square, BlockKind::Heart, BlockKind::Square]);
        let mut t = table();
        t.combo_bonus = 10;
        let mut sets = vec![a, b];
        let scores = score_reaction(&mut sets, &t);
        assert_eq!(scores.per_set, vec![4, 4]);
        assert_eq!(scores.total, 26);
        assert_eq!(scores.combo, 18);
    }

    #[test]
    fn test_empty_reaction_scores_zero() {
        assert_eq!(score_reaction(&mut [], &table()), ReactionScores::default());
    }

    #[test]
    fn test_scores_saturate() {
        let set = row_set([BlockKind::Star; 4]);
        let mut t = ScoringTable::flat(u64::MAX / 2);
        t.pure_set_multiplier = 5;
        assert_eq!(calculate_set_score(&set, &t), u64::MAX);
    }

    #[test]
    fn test_unlock_scores_both_blocks() {
        let t = ScoringTable::default();
        let lock = Block::new(BlockId(1), 0, BlockKind::Lock);
        let key = Block::new(BlockId(2), 0, BlockKind::WirelessKey);
        assert_eq!(calculate_unlock_score(&lock, &key, &t), 10);
    }
}
