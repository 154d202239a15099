//! Text formats exchanged with the oracle.
//!
//! # Board text
//!
//! ```text
//! Current board state (R=red player, B=black AI, K=king, .=empty):
//!   0 1 2 3 4 5 6 7
//! 0 . B . B . B . B
//! ...
//! 7 R . R . R . R
//! ```
//!
//! Each cell is two characters: `. ` empty, `R `/`B ` a piece, `RK`/`BK` a
//! crowned piece.
//!
//! # Replies
//!
//! The first `R,C to R,C` (single digits) in the reply is the move. Digits
//! are not range-checked here.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::ParseError;
use crate::{Board, Move, Side, Square, BOARD_SIZE};

/// Name given to the hosted agent.
pub const AGENT_NAME: &str = "Checkers AI";

/// Instructions sent once when the conversation is created.
pub const CONVERSATION_INSTRUCTIONS: &str = "You are a checkers AI opponent. When given a board \
state, analyze it and return your move in the format 'from_row,from_col to to_row,to_col'. Make \
strategic moves to capture opponent pieces when possible, otherwise make good positional moves. \
Keep responses brief and only return the move.";

lazy_static! {
    static ref MOVE_RE: Regex = Regex::new(r"([0-9]),([0-9]) to ([0-9]),([0-9])").unwrap();
}

/// A move as written in a reply, before any bounds check.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct RawMove {
    pub from: (u8, u8),
    pub to: (u8, u8),
}

impl RawMove {
    /// Convert to a board move if all four coordinates are on the board.
    pub fn on_board(&self) -> Option<Move> {
        let from = Square::new(self.from.0, self.from.1)?;
        let to = Square::new(self.to.0, self.to.1)?;
        Some(Move::new(from, to))
    }
}

impl std::fmt::Display for RawMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{} to {},{}",
            self.from.0, self.from.1, self.to.0, self.to.1
        )
    }
}

/// Extract the first `R,C to R,C` from free-form text.
pub fn parse_move(text: &str) -> Result<RawMove, ParseError> {
    let caps = MOVE_RE.captures(text).ok_or(ParseError::NoMoveFound)?;
    let digit = |i: usize| -> Result<u8, ParseError> {
        caps[i].parse().map_err(|_| ParseError::NoMoveFound)
    };
    Ok(RawMove {
        from: (digit(1)?, digit(2)?),
        to: (digit(3)?, digit(4)?),
    })
}

/// Render the board as the fixed-width grid the oracle reads.
pub fn render_board(board: &Board) -> String {
    let mut out = String::from("Current board state (R=red player, B=black AI, K=king, .=empty):\n");
    out.push_str("  0 1 2 3 4 5 6 7\n");
    for row in 0..BOARD_SIZE {
        out.push_str(&row.to_string());
        out.push(' ');
        for col in 0..BOARD_SIZE {
            let Some(square) = Square::new(row, col) else {
                continue;
            };
            match board.at(square) {
                None => out.push_str(". "),
                Some(piece) => {
                    out.push(piece.side.marker());
                    out.push(if piece.crowned { 'K' } else { ' ' });
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Full prompt for one automated turn.
pub fn prompt_for(board: &Board, side: Side) -> String {
    format!(
        "{}\nMake your move as {} pieces. Return only the move in format: \
         from_row,from_col to to_row,to_col",
        render_board(board),
        side.name()
    )
}
