//! Engine tests - selection, settling and pointer input through the facade

use zwap::adapter::{MemoryStore, PersistingCollaborator};
use zwap::core::{Block, Game, GameProgress, GameSettings, GameSnapshot, Turn};
use zwap::engine::{
    Collaborator, FlowState, InputOutcome, NoopCollaborator, PointerEvent, PointerKind,
    ResolveStep, Settle, TurnEngine,
};
use zwap::types::{BlockId, BlockKind, MatchKind, Position};

/// 8x12 board without sets; swapping the top-row squares at columns 3 and 4
/// lines up four blocks of color 1.
fn fixture_game() -> Game {
    const TOP_ROW: [u8; 8] = [1, 1, 1, 2, 1, 3, 4, 5];
    let mut id = 0;
    let columns = (0..8usize)
        .map(|c| {
            (0..12usize)
                .map(|r| {
                    id += 1;
                    let color = if r == 11 { TOP_ROW[c] } else { ((c + 2 * r) % 6) as u8 };
                    let kind = if r == 11 && (c == 3 || c == 4) {
                        BlockKind::Square
                    } else {
                        BlockKind::normal(((c + r) % 6) as u8)
                    };
                    Block::new(BlockId(id), color, kind)
                })
                .collect()
        })
        .collect();
    let settings = GameSettings::normal().without_specials();
    let snapshot = GameSnapshot::new(1, settings, GameProgress::new(), columns);
    Game::from_snapshot(snapshot, 3).unwrap()
}

/// 5x6 board where the first set's removal drops 2s into a second set
fn cascade_game() -> Game {
    const COLORS: [[u8; 6]; 5] = [
        [1, 5, 4, 3, 0, 0],
        [1, 5, 4, 0, 4, 4],
        [1, 0, 2, 0, 5, 4],
        [3, 4, 2, 5, 5, 0],
        [2, 2, 0, 3, 4, 1],
    ];
    let mut id = 0;
    let columns = COLORS
        .iter()
        .enumerate()
        .map(|(c, colors)| {
            colors
                .iter()
                .enumerate()
                .map(|(r, &color)| {
                    id += 1;
                    let kind = if (c, r) == (3, 0) || (c, r) == (4, 5) {
                        BlockKind::Square
                    } else {
                        BlockKind::Circle
                    };
                    Block::new(BlockId(id), color, kind)
                })
                .collect()
        })
        .collect();
    let settings = GameSettings::normal()
        .with_board_size(5, 6)
        .without_specials()
        .with_progress_needed(1000);
    let snapshot = GameSnapshot::new(1, settings, GameProgress::new(), columns);
    Game::from_snapshot(snapshot, 11).unwrap()
}

fn id_at(engine: &TurnEngine<impl Collaborator>, col: i16, row: i16) -> BlockId {
    engine.game().board().get(col, row).map(|b| b.id()).unwrap()
}

#[derive(Default)]
struct Manual {
    settles: usize,
    finished: Vec<Turn>,
}

impl Collaborator for Manual {
    fn on_settle_requested(&mut self, _blocks: &[BlockId]) -> Settle {
        self.settles += 1;
        Settle::Pending
    }

    fn on_turn_finished(&mut self, turn: &Turn) {
        self.finished.push(turn.clone());
    }
}

#[test]
fn test_select_and_deselect() {
    let mut engine = TurnEngine::new(fixture_game(), NoopCollaborator);
    let a = id_at(&engine, 3, 11);
    let b = id_at(&engine, 4, 11);

    assert_eq!(engine.select(a), InputOutcome::Selected(a));
    assert_eq!(engine.selected(), Some(a));
    assert!(engine.matchable().contains(&b));
    assert!(engine.game().board().block(a).unwrap().is_selected());
    assert!(engine.game().board().block(b).unwrap().is_matchable());

    assert_eq!(engine.select(a), InputOutcome::Deselected);
    assert_eq!(engine.state(), &FlowState::Idle);
    assert!(!engine.game().board().block(a).unwrap().is_selected());
    assert!(!engine.game().board().block(b).unwrap().is_matchable());
}

#[test]
fn test_non_matchable_second_pick_deselects() {
    let mut engine = TurnEngine::new(fixture_game(), NoopCollaborator);
    let square = id_at(&engine, 3, 11);
    let other_shape = id_at(&engine, 0, 0);
    engine.select(square);
    assert_eq!(engine.select(other_shape), InputOutcome::Deselected);
    assert_eq!(engine.select(BlockId(4040)), InputOutcome::Ignored);
    assert!(engine.game().progress().turns.is_empty());
}

#[test]
fn test_pending_settle_blocks_input_until_acknowledged() {
    let mut engine = TurnEngine::new(fixture_game(), Manual::default());
    let a = id_at(&engine, 3, 11);
    let b = id_at(&engine, 4, 11);

    engine.select(a);
    assert_eq!(engine.select(b), InputOutcome::Matched(MatchKind::Swap));
    assert_eq!(
        engine.state(),
        &FlowState::Resolving { step: ResolveStep::Matched }
    );
    assert!(engine.interaction_disabled());
    assert_eq!(engine.select(a), InputOutcome::Ignored);
    assert_eq!(engine.game().progress().score, 0);

    // the first round collects the set, then waits again
    assert_eq!(engine.acknowledge_settle(), InputOutcome::Resumed);
    assert_eq!(
        engine.state(),
        &FlowState::Resolving { step: ResolveStep::Round(0) }
    );
    assert_eq!(engine.game().progress().score, 4);
    assert!(engine.collaborator().finished.is_empty());

    assert_eq!(engine.acknowledge_settle(), InputOutcome::Resumed);
    assert_eq!(engine.state(), &FlowState::Idle);
    assert_eq!(engine.collaborator().settles, 2);
    assert_eq!(engine.collaborator().finished.len(), 1);
    assert_eq!(engine.collaborator().finished[0].chain_reactions.len(), 1);

    assert_eq!(engine.acknowledge_settle(), InputOutcome::Ignored);
    assert!(!engine.interaction_disabled());
}

#[test]
fn test_pending_settle_walks_every_chain_round() {
    let mut engine = TurnEngine::new(cascade_game(), Manual::default());
    let a = id_at(&engine, 3, 0);
    let b = id_at(&engine, 4, 5);

    engine.select(a);
    assert_eq!(engine.select(b), InputOutcome::Matched(MatchKind::Swap));
    assert_eq!(
        engine.state(),
        &FlowState::Resolving { step: ResolveStep::Matched }
    );

    let mut steps = Vec::new();
    for _ in 0..50 {
        assert_eq!(engine.acknowledge_settle(), InputOutcome::Resumed);
        match engine.state() {
            FlowState::Resolving { step } => steps.push(*step),
            _ => break,
        }
    }
    assert_eq!(engine.state(), &FlowState::Idle);
    assert_eq!(&steps[..2], &[ResolveStep::Round(0), ResolveStep::Round(1)]);
    for (nr, step) in steps.iter().enumerate() {
        assert_eq!(step, &ResolveStep::Round(nr));
    }

    let finished = &engine.collaborator().finished;
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].chain_reactions.len(), steps.len());
    assert_eq!(engine.collaborator().settles, steps.len() + 1);
    assert_eq!(engine.game().progress().score, finished[0].total_score());
}

#[test]
fn test_pointer_gesture_plays_a_turn() {
    let mut engine = TurnEngine::new(fixture_game(), NoopCollaborator);
    let a = id_at(&engine, 3, 11);
    let b = id_at(&engine, 4, 11);

    let down = PointerEvent::new(PointerKind::Down, 3, 11);
    let hover = PointerEvent::new(PointerKind::Move, 4, 11);
    let up = PointerEvent::new(PointerKind::Up, 4, 11);

    assert_eq!(engine.handle_pointer(down), InputOutcome::Selected(a));
    assert_eq!(engine.handle_pointer(hover), InputOutcome::SecondOption(b));
    assert_eq!(engine.handle_pointer(hover), InputOutcome::Ignored);
    assert_eq!(engine.handle_pointer(up), InputOutcome::Matched(MatchKind::Swap));
    assert_eq!(engine.state(), &FlowState::Idle);
    assert_eq!(engine.game().progress().score, 4);
}

#[test]
fn test_pointer_release_elsewhere_deselects() {
    let mut engine = TurnEngine::new(fixture_game(), NoopCollaborator);
    assert!(matches!(
        engine.pointer_down(Position::new(3, 11)),
        InputOutcome::Selected(_)
    ));
    // releasing on the selected block keeps the selection
    assert_eq!(engine.pointer_up(Position::new(3, 11)), InputOutcome::Ignored);
    assert!(engine.selected().is_some());
    // a circle is no partner for a square
    assert_eq!(engine.pointer_up(Position::new(0, 0)), InputOutcome::Deselected);
    assert_eq!(engine.pointer_down(Position::new(20, 20)), InputOutcome::Ignored);
}

#[test]
fn test_turn_saved_after_manual_settles() {
    let collaborator = PersistingCollaborator::new(MemoryStore::new()).with_manual_settle(true);
    let mut engine = TurnEngine::new(fixture_game(), collaborator);
    let a = id_at(&engine, 3, 11);
    let b = id_at(&engine, 4, 11);

    engine.select(a);
    engine.select(b);
    assert_eq!(engine.collaborator().saved(), 0);
    for _ in 0..8 {
        if engine.acknowledge_settle() == InputOutcome::Ignored {
            break;
        }
    }
    assert_eq!(engine.state(), &FlowState::Idle);
    assert_eq!(engine.collaborator().saved(), 1);
    let stored = engine.collaborator().store().snapshot().unwrap();
    assert_eq!(stored.progress.score, 4);
    assert_eq!(stored, &engine.game().snapshot());
}

#[test]
fn test_replace_game_drops_the_selection() {
    let mut engine = TurnEngine::new(fixture_game(), NoopCollaborator);
    engine.select(id_at(&engine, 3, 11));
    let old = engine.replace_game(Game::new(GameSettings::normal(), 8).unwrap());
    assert_eq!(old.id(), 1);
    assert_eq!(engine.state(), &FlowState::Idle);
    assert_eq!(engine.game().id(), 8);
}
