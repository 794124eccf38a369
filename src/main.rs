//! Headless session runner (default binary).
//!
//! Loads the saved game or starts a new one, then serves the remote control
//! adapter. With the adapter disabled it autoplays random legal moves instead.

use anyhow::Result;
use log::{info, warn};
use rand::seq::IndexedRandom;

use zwap::adapter::{apply_inbound, Adapter, JsonFileStore, PersistingCollaborator, SnapshotStore};
use zwap::config::SessionConfig;
use zwap::core::Game;
use zwap::engine::{Collaborator, TurnEngine};
use zwap::logging::init_log;
use zwap::types::BlockId;

fn main() -> Result<()> {
    let config = SessionConfig::from_env();
    init_log(config.log_level, &config.log_path)?;

    let mut store = JsonFileStore::new(&config.save_path);
    let game = load_or_create(&config, &mut store)?;
    info!(
        "game {} ready: {} blocks, score {}, level {}",
        game.id(),
        game.board().count(),
        game.progress().score,
        game.progress().level
    );

    let engine = match Adapter::start_from_env()? {
        Some(adapter) => {
            let collaborator =
                PersistingCollaborator::new(store).with_manual_settle(adapter.manual_settle());
            let mut engine = TurnEngine::new(game, collaborator);
            serve(&mut engine, adapter);
            engine
        }
        None => {
            let mut engine = TurnEngine::new(game, PersistingCollaborator::new(store));
            autoplay(&mut engine, config.autoplay_turns);
            engine
        }
    };

    let progress = engine.game().progress();
    println!(
        "score {} level {} turns {}{}",
        progress.score,
        progress.level,
        progress.statistics.turns_played,
        if progress.is_over() { " (game over)" } else { "" }
    );
    Ok(())
}

/// Resume the saved game unless it is missing, unreadable or finished
fn load_or_create(config: &SessionConfig, store: &mut JsonFileStore) -> Result<Game> {
    let seed = config.seed_or_random();
    match store.load() {
        Ok(Some(snapshot)) if !snapshot.progress.is_over() => {
            match Game::from_snapshot(snapshot, seed) {
                Ok(game) => {
                    info!("resumed game {} from {}", game.id(), store.path().display());
                    return Ok(game);
                }
                Err(e) => warn!("ignoring saved game: {}", e),
            }
        }
        Ok(_) => {}
        Err(e) => warn!("could not read {}: {}", store.path().display(), e),
    }

    let settings = config.load_settings()?;
    let game = Game::new(settings, seed)?;
    info!("new game {} with seed {}", game.id(), seed);
    Ok(game)
}

fn serve<C: Collaborator>(engine: &mut TurnEngine<C>, mut adapter: Adapter) {
    info!("serving remote control on {}", adapter.local_addr());
    let mut obs_seq = 0u64;
    while let Some(inbound) = adapter.blocking_recv() {
        for msg in apply_inbound(engine, inbound, &mut obs_seq) {
            adapter.send(msg);
        }
    }
}

fn autoplay<C: Collaborator>(engine: &mut TurnEngine<C>, turns: usize) {
    let mut rng = rand::rng();
    for n in 1..=turns {
        if engine.game().progress().is_over() {
            info!("game over after {} turns", n - 1);
            break;
        }

        let game = engine.game();
        let moves: Vec<(BlockId, BlockId)> = game
            .board()
            .ids()
            .into_iter()
            .flat_map(|id| game.matchable_for(id).into_iter().map(move |m| (id, m)))
            .collect();
        let Some(&(a, b)) = moves.choose(&mut rng) else {
            info!("no legal move left");
            break;
        };

        engine.select(a);
        engine.select(b);
        if let Some(turn) = engine.game().progress().turn() {
            info!(
                "turn {}: {} {} -> {}, {} reactions, +{}",
                n,
                turn.match_info.kind.as_str(),
                a,
                b,
                turn.chain_reactions.len(),
                turn.total_score()
            );
        }
    }
}
