//! Runs automated turns outside the session lock.

use std::time::Duration;

use checkers_core::{AutomatedTurn, TurnOutcome};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::AppState;

/// Wait out the turn delay, ask the oracle, and resolve the reply.
///
/// The session lock is only taken to resolve, so clicks and resets are
/// served while the oracle is thinking. A reset in the meantime turns the
/// reply stale.
pub async fn run_turn(state: AppState, turn: AutomatedTurn) -> TurnOutcome {
    if turn.delay > Duration::ZERO {
        tokio::time::sleep(turn.delay).await;
    }
    let reply = state.oracle.suggest_move(&turn.prompt).await;
    let outcome = state.game().resolve(turn.generation, reply);
    debug!(generation = turn.generation, ?outcome, "automated turn resolved");
    outcome
}

/// Spawn the pending automated turn, if any.
pub fn dispatch_pending(state: &AppState) -> Option<JoinHandle<TurnOutcome>> {
    let turn = state.game().take_pending_turn()?;
    Some(tokio::spawn(run_turn(state.clone(), turn)))
}
