//! Turn sequencing between the manual side and the oracle-driven side.
//!
//! The coordinator never talks to the oracle itself. When the automated
//! side is to move it parks in [`Phase::AutomatedTurn`] and hands out a
//! single [`AutomatedTurn`] ticket. The caller waits `ticket.delay`, asks the
//! oracle with `ticket.prompt`, and feeds the reply back through
//! [`Coordinator::resolve`]. Tickets carry the generation they were issued
//! for; replies for an older generation (e.g. after a reset) are discarded.
//!
//! Any failure on the automated side forfeits that turn. The board is left
//! as it was and control returns to the manual side.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Forfeit, OracleError};
use crate::notation::{parse_move, prompt_for};
use crate::{Board, Move, Piece, Side, Square, BOARD_SIZE};

/// How far an oracle-proposed move is trusted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleMovePolicy {
    /// Apply any on-board move from an occupied square, legal or not.
    #[default]
    Lenient,
    /// Also require an own piece and a destination from `legal_destinations`.
    Strict,
}

#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Side whose moves come from the oracle.
    pub automated: Side,
    /// Pause before each oracle request.
    pub delay: Duration,
    pub oracle_moves: OracleMovePolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            automated: Side::Second,
            delay: Duration::from_millis(1000),
            oracle_moves: OracleMovePolicy::Lenient,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Manual side to move, nothing selected.
    AwaitingSelection,
    /// A manual-side piece is selected.
    AwaitingDestination {
        from: Square,
        destinations: Vec<Square>,
    },
    /// Waiting on the oracle reply for this generation.
    AutomatedTurn { generation: u64 },
    /// Reply received, being applied.
    Applying,
}

/// One oracle request, issued at most once per automated turn.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AutomatedTurn {
    pub generation: u64,
    pub side: Side,
    pub prompt: String,
    pub delay: Duration,
}

/// Result of a square click.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Click {
    Ignored,
    Selected(Square),
    Deselected,
    Moved(Move),
}

/// Result of resolving an automated turn.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TurnOutcome {
    Applied(Move),
    Forfeited(Forfeit),
    /// Reply was for a turn that no longer exists.
    Stale,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveOrigin {
    Manual,
    Oracle,
}

/// A move as it was played.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct HistoryEntry {
    pub side: Side,
    #[serde(rename = "move")]
    pub mv: Move,
    /// Square emptied by a jump, if it held a piece.
    pub captured: Option<Square>,
    /// Piece was crowned by this move.
    pub crowned: bool,
    pub origin: MoveOrigin,
}

/// Read-only view for presentation layers.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// Row-major 8x8 cells.
    pub cells: Vec<Vec<Option<Piece>>>,
    pub turn: Side,
    pub automated: Side,
    pub selection: Option<Square>,
    pub destinations: Vec<Square>,
    pub thinking: bool,
    pub generation: u64,
    pub moves_played: usize,
}

/// Advisory hooks for logging and diagnostics.
///
/// Never consulted for control flow.
pub trait Observer: Send {
    fn manual_move(&mut self, _entry: &HistoryEntry) {}

    fn oracle_request(&mut self, _turn: &AutomatedTurn) {}

    fn oracle_reply(
        &mut self,
        _generation: u64,
        _reply: &Result<String, OracleError>,
        _outcome: &TurnOutcome,
    ) {
    }
}

/// Reports every event through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn manual_move(&mut self, entry: &HistoryEntry) {
        info!(side = ?entry.side, mv = %entry.mv, captured = ?entry.captured, "manual move");
    }

    fn oracle_request(&mut self, turn: &AutomatedTurn) {
        info!(generation = turn.generation, side = ?turn.side, "oracle request");
        debug!(prompt = %turn.prompt, "oracle prompt");
    }

    fn oracle_reply(
        &mut self,
        generation: u64,
        reply: &Result<String, OracleError>,
        outcome: &TurnOutcome,
    ) {
        match reply {
            Ok(text) => info!(generation, reply = %text, ?outcome, "oracle reply"),
            Err(err) => warn!(generation, error = %err, ?outcome, "oracle error"),
        }
    }
}

pub struct Coordinator {
    config: CoordinatorConfig,
    board: Board,
    turn: Side,
    phase: Phase,
    generation: u64,
    pending: Option<AutomatedTurn>,
    history: Vec<HistoryEntry>,
    observer: Box<dyn Observer>,
}

impl Coordinator {
    /// Start a game from the opening position, FIRST to move.
    pub fn new(config: CoordinatorConfig) -> Self {
        let mut coordinator = Self {
            config,
            board: Board::initial(),
            turn: Side::First,
            phase: Phase::AwaitingSelection,
            generation: 0,
            pending: None,
            history: Vec::new(),
            observer: Box::new(LogObserver),
        };
        coordinator.begin_turn();
        coordinator
    }

    /// Replace the observer.
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    #[inline]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[inline]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[inline]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The side driven by clicks.
    #[inline]
    pub fn manual_side(&self) -> Side {
        self.config.automated.opponent()
    }

    pub fn selection(&self) -> Option<Square> {
        match &self.phase {
            Phase::AwaitingDestination { from, .. } => Some(*from),
            _ => None,
        }
    }

    pub fn destinations(&self) -> &[Square] {
        match &self.phase {
            Phase::AwaitingDestination { destinations, .. } => destinations,
            _ => &[],
        }
    }

    /// True while the automated side is moving; clicks are ignored.
    pub fn is_thinking(&self) -> bool {
        matches!(self.phase, Phase::AutomatedTurn { .. } | Phase::Applying)
    }

    /// Back to the opening position. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        info!(generation = self.generation, "game reset");
        self.board = Board::initial();
        self.turn = Side::First;
        self.history.clear();
        self.begin_turn();
    }

    /// Route a click on `square` through the selection state machine.
    pub fn click(&mut self, square: Square) -> Click {
        if self.turn != self.manual_side() {
            return Click::Ignored;
        }

        match &self.phase {
            Phase::AwaitingSelection => match self.board.at(square) {
                Some(piece) if piece.side == self.turn => {
                    let destinations = self.board.legal_destinations(square);
                    debug!(%square, ?destinations, "selected");
                    self.phase = Phase::AwaitingDestination {
                        from: square,
                        destinations,
                    };
                    Click::Selected(square)
                }
                _ => Click::Ignored,
            },
            Phase::AwaitingDestination { from, destinations } => {
                let from = *from;
                if destinations.contains(&square) {
                    let mv = Move::new(from, square);
                    let entry = self.play(mv, MoveOrigin::Manual);
                    self.observer.manual_move(&entry);
                    self.end_turn();
                    Click::Moved(mv)
                } else {
                    self.phase = Phase::AwaitingSelection;
                    Click::Deselected
                }
            }
            Phase::AutomatedTurn { .. } | Phase::Applying => Click::Ignored,
        }
    }

    /// Hand out the oracle request for the current automated turn.
    ///
    /// Returns `None` if it is not the automated side's turn or the request
    /// was already taken.
    pub fn take_pending_turn(&mut self) -> Option<AutomatedTurn> {
        let turn = self.pending.take()?;
        self.observer.oracle_request(&turn);
        Some(turn)
    }

    /// Feed back the oracle reply for the ticket issued at `generation`.
    pub fn resolve(&mut self, generation: u64, reply: Result<String, OracleError>) -> TurnOutcome {
        if self.phase != (Phase::AutomatedTurn { generation }) {
            debug!(
                generation,
                current = self.generation,
                "discarding reply for stale turn"
            );
            let outcome = TurnOutcome::Stale;
            self.observer.oracle_reply(generation, &reply, &outcome);
            return outcome;
        }

        self.phase = Phase::Applying;
        let outcome = match self.accept_oracle_move(&reply) {
            Ok(mv) => {
                self.play(mv, MoveOrigin::Oracle);
                TurnOutcome::Applied(mv)
            }
            Err(forfeit) => {
                warn!(side = ?self.turn, %forfeit, "automated side forfeits turn");
                TurnOutcome::Forfeited(forfeit)
            }
        };
        self.observer.oracle_reply(generation, &reply, &outcome);
        self.end_turn();
        outcome
    }

    /// Take the pending request, answer it with `oracle` and resolve it.
    ///
    /// Ignores the configured delay.
    pub fn run_automated_turn<F>(&mut self, oracle: F) -> Option<TurnOutcome>
    where
        F: FnOnce(&str) -> Result<String, OracleError>,
    {
        let turn = self.take_pending_turn()?;
        let reply = oracle(&turn.prompt);
        Some(self.resolve(turn.generation, reply))
    }

    pub fn snapshot(&self) -> Snapshot {
        let cells = (0..BOARD_SIZE)
            .map(|row| {
                (0..BOARD_SIZE)
                    .map(|col| Square::new(row, col).and_then(|sq| self.board.at(sq)))
                    .collect()
            })
            .collect();

        Snapshot {
            cells,
            turn: self.turn,
            automated: self.config.automated,
            selection: self.selection(),
            destinations: self.destinations().to_vec(),
            thinking: self.is_thinking(),
            generation: self.generation,
            moves_played: self.history.len(),
        }
    }

    // ========== Internals ==========

    /// Trust boundary for oracle moves.
    ///
    /// Lenient mode only rejects what cannot be applied at all.
    fn accept_oracle_move(&self, reply: &Result<String, OracleError>) -> Result<Move, Forfeit> {
        let text = reply.as_ref().map_err(|err| Forfeit::from(err.clone()))?;
        let raw = parse_move(text)?;
        let mv = raw
            .on_board()
            .ok_or_else(|| Forfeit::OffBoard(raw.to_string()))?;
        let piece = self
            .board
            .at(mv.from)
            .ok_or_else(|| Forfeit::EmptySource(mv.from.to_string()))?;

        if self.config.oracle_moves == OracleMovePolicy::Strict
            && (piece.side != self.turn || !self.board.is_legal(mv))
        {
            return Err(Forfeit::IllegalMove(mv.to_string()));
        }
        Ok(mv)
    }

    /// Apply `mv` for the side to move and record it.
    fn play(&mut self, mv: Move, origin: MoveOrigin) -> HistoryEntry {
        let before = self.board;
        let after = before.apply(mv);
        let was_crowned = before.at(mv.from).is_some_and(|p| p.crowned);
        let entry = HistoryEntry {
            side: self.turn,
            mv,
            captured: mv.midpoint().filter(|sq| before.at(*sq).is_some()),
            crowned: !was_crowned && after.at(mv.to).is_some_and(|p| p.crowned),
            origin,
        };
        self.board = after;
        self.history.push(entry);
        entry
    }

    fn end_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        self.generation += 1;
        if self.turn == self.config.automated {
            self.phase = Phase::AutomatedTurn {
                generation: self.generation,
            };
            self.pending = Some(AutomatedTurn {
                generation: self.generation,
                side: self.turn,
                prompt: prompt_for(&self.board, self.turn),
                delay: self.config.delay,
            });
        } else {
            self.phase = Phase::AwaitingSelection;
            self.pending = None;
        }
    }
}
