//! Checkers engine with bit-based board representation.
//!
//! # Board Encoding (3 × 64-bit)
//!
//! ```text
//! first:   bit i set if a FIRST-side piece occupies square i
//! second:  bit i set if a SECOND-side piece occupies square i
//! crowned: bit i set if the piece on square i is crowned
//!
//! Square indices (row-major order, row 0 at the top):
//!   (0,0)=0   (0,1)=1  ...  (0,7)=7
//!   (1,0)=8   (1,1)=9  ...  (1,7)=15
//!   ...
//!   (7,0)=56  (7,1)=57 ...  (7,7)=63
//! ```
//!
//! Pieces only ever stand on squares where `row + col` is odd. The opening
//! position and every legal move keep it that way; the encoding itself does
//! not forbid light squares.
//!
//! # Sides
//!
//! ```text
//! FIRST  starts on rows 5-7, moves toward row 0, crowned on row 0
//! SECOND starts on rows 0-2, moves toward row 7, crowned on row 7
//! ```

pub mod coordinator;
pub mod error;
pub mod notation;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};

pub use coordinator::{
    AutomatedTurn, Click, Coordinator, CoordinatorConfig, HistoryEntry, LogObserver, MoveOrigin,
    Observer, OracleMovePolicy, Phase, Snapshot, TurnOutcome,
};
pub use error::{Forfeit, OracleError, ParseError};
pub use notation::{parse_move, prompt_for, render_board, RawMove};

/// Board width and height.
pub const BOARD_SIZE: u8 = 8;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Get the opponent side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Row delta of an uncrowned piece's forward step.
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Side::First => -1,
            Side::Second => 1,
        }
    }

    /// Row on which a piece of this side is crowned.
    #[inline]
    pub fn far_rank(self) -> u8 {
        match self {
            Side::First => 0,
            Side::Second => BOARD_SIZE - 1,
        }
    }

    /// Single-character marker used in board text.
    #[inline]
    pub fn marker(self) -> char {
        match self {
            Side::First => 'R',
            Side::Second => 'B',
        }
    }

    /// Colour name used when talking to the oracle.
    pub fn name(self) -> &'static str {
        match self {
            Side::First => "red",
            Side::Second => "black",
        }
    }
}

/// A piece on the board. Identity is value equality only.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub side: Side,
    pub crowned: bool,
}

impl Piece {
    /// An uncrowned piece of the given side.
    #[inline]
    pub fn man(side: Side) -> Piece {
        Piece { side, crowned: false }
    }

    /// A crowned piece of the given side.
    #[inline]
    pub fn king(side: Side) -> Piece {
        Piece { side, crowned: true }
    }

    /// Diagonal directions this piece may move in, as (row delta, col delta).
    pub fn directions(self) -> &'static [(i8, i8)] {
        const ALL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
        if self.crowned {
            &ALL
        } else {
            match self.side {
                Side::First => &ALL[..2],
                Side::Second => &ALL[2..],
            }
        }
    }
}

/// Position on the 8x8 board.
///
/// Only constructible for coordinates in `[0, 7]`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Create a square, or None if either coordinate is off the board.
    #[inline]
    pub fn new(row: u8, col: u8) -> Option<Square> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Square { row, col })
        } else {
            None
        }
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Bit index (0-63).
    #[inline]
    pub fn index(self) -> u32 {
        (self.row * BOARD_SIZE + self.col) as u32
    }

    /// True for the playable (dark) squares.
    #[inline]
    pub fn is_playable(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// The square `(dr, dc)` away, if it is on the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row < 0 || col < 0 {
            return None;
        }
        Square::new(row as u8, col as u8)
    }

    /// Iterate over all 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Square { row, col }))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// A single step or single jump.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    #[inline]
    pub fn new(from: Square, to: Square) -> Move {
        Move { from, to }
    }

    /// Row delta magnitude of 2.
    #[inline]
    pub fn is_jump(&self) -> bool {
        self.from.row.abs_diff(self.to.row) == 2
    }

    /// The square halfway between `from` and `to` on a jump.
    ///
    /// None when the column sum is odd, since no square sits there.
    pub fn midpoint(&self) -> Option<Square> {
        if self.is_jump() && (self.from.col + self.to.col) % 2 == 0 {
            Square::new(
                (self.from.row + self.to.row) / 2,
                (self.from.col + self.to.col) / 2,
            )
        } else {
            None
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

/// Compact board state, three bitboards.
///
/// Boards are values: every operation returns a new board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Board {
    first: u64,
    second: u64,
    crowned: u64,
}

impl Board {
    /// Rows holding SECOND-side pieces at the start.
    const SECOND_HOME: std::ops::Range<u8> = 0..3;
    /// Rows holding FIRST-side pieces at the start.
    const FIRST_HOME: std::ops::Range<u8> = 5..8;

    /// A board with no pieces.
    #[inline]
    pub fn empty() -> Board {
        Board::default()
    }

    /// Standard opening position: 12 pieces per side on the dark squares.
    pub fn initial() -> Board {
        let mut board = Board::empty();
        for sq in Square::all().filter(|sq| sq.is_playable()) {
            if Self::SECOND_HOME.contains(&sq.row()) {
                board = board.with_piece(sq, Some(Piece::man(Side::Second)));
            } else if Self::FIRST_HOME.contains(&sq.row()) {
                board = board.with_piece(sq, Some(Piece::man(Side::First)));
            }
        }
        board
    }

    /// Get the piece on a square.
    #[inline]
    pub fn at(&self, sq: Square) -> Option<Piece> {
        let bit = 1u64 << sq.index();
        let crowned = self.crowned & bit != 0;
        if self.first & bit != 0 {
            Some(Piece { side: Side::First, crowned })
        } else if self.second & bit != 0 {
            Some(Piece { side: Side::Second, crowned })
        } else {
            None
        }
    }

    /// Check if a square is empty.
    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        (self.first | self.second) & (1u64 << sq.index()) == 0
    }

    /// Return a copy of this board with the given square set.
    #[inline]
    pub fn with_piece(mut self, sq: Square, piece: Option<Piece>) -> Board {
        let bit = 1u64 << sq.index();
        self.first &= !bit;
        self.second &= !bit;
        self.crowned &= !bit;
        if let Some(piece) = piece {
            match piece.side {
                Side::First => self.first |= bit,
                Side::Second => self.second |= bit,
            }
            if piece.crowned {
                self.crowned |= bit;
            }
        }
        self
    }

    /// Number of pieces a side has on the board.
    #[inline]
    pub fn count(&self, side: Side) -> u32 {
        match side {
            Side::First => self.first.count_ones(),
            Side::Second => self.second.count_ones(),
        }
    }

    /// Iterate over occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.at(sq).map(|piece| (sq, piece)))
    }

    // ========== Rules ==========

    /// Destinations reachable from `from` by a single step or single jump.
    ///
    /// Empty if the square holds no piece. A step needs the adjacent diagonal
    /// square empty; a jump needs it held by the opponent and the square
    /// beyond it empty. Steps and jumps are not distinguished here; callers
    /// recover that from the row delta.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self.at(from) else {
            return Vec::new();
        };

        let mut destinations = Vec::with_capacity(4);
        for &(dr, dc) in piece.directions() {
            let Some(next) = from.offset(dr, dc) else {
                continue;
            };
            match self.at(next) {
                None => destinations.push(next),
                Some(other) if other.side != piece.side => {
                    if let Some(landing) = next.offset(dr, dc) {
                        if self.is_empty(landing) {
                            destinations.push(landing);
                        }
                    }
                }
                Some(_) => {}
            }
        }
        destinations
    }

    /// Check a move against `legal_destinations`.
    #[inline]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_destinations(mv.from).contains(&mv.to)
    }

    /// Apply a move, returning the new board.
    ///
    /// Does NOT validate - caller must check legality first. Relocates the
    /// piece, clears the midpoint of any jump, and crowns the
    /// piece if it lands on its far rank. A move from an empty square leaves
    /// the board unchanged.
    pub fn apply(&self, mv: Move) -> Board {
        let Some(mut piece) = self.at(mv.from) else {
            return *self;
        };

        let mut next = self.with_piece(mv.from, None);
        if let Some(captured) = mv.midpoint() {
            next = next.with_piece(captured, None);
        }
        if mv.to.row() == piece.side.far_rank() {
            piece.crowned = true;
        }
        next.with_piece(mv.to, Some(piece))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: u8, col: u8) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::Second.opponent(), Side::First);
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert_eq!(sq(0, 0).offset(-1, 1), None);
        assert_eq!(sq(3, 3).offset(-1, 1), Some(sq(2, 4)));
    }

    #[test]
    fn test_square_index() {
        assert_eq!(sq(0, 0).index(), 0);
        assert_eq!(sq(1, 0).index(), 8);
        assert_eq!(sq(7, 7).index(), 63);
        assert_eq!(Square::all().count(), 64);
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();
        assert_eq!(board.count(Side::First), 12);
        assert_eq!(board.count(Side::Second), 12);

        for (square, piece) in board.pieces() {
            assert!(square.is_playable(), "piece on light square {square}");
            assert!(!piece.crowned);
            match piece.side {
                Side::Second => assert!(square.row() < 3),
                Side::First => assert!(square.row() > 4),
            }
        }
        assert_eq!(board.at(sq(0, 1)), Some(Piece::man(Side::Second)));
        assert_eq!(board.at(sq(5, 0)), Some(Piece::man(Side::First)));
        assert_eq!(board.at(sq(3, 3)), None);
    }

    #[test]
    fn test_with_piece_is_a_copy() {
        let board = Board::empty();
        let placed = board.with_piece(sq(3, 4), Some(Piece::king(Side::First)));
        assert_eq!(board.at(sq(3, 4)), None);
        assert_eq!(placed.at(sq(3, 4)), Some(Piece::king(Side::First)));

        let cleared = placed.with_piece(sq(3, 4), None);
        assert_eq!(cleared, Board::empty());
    }

    #[test]
    fn test_directions() {
        assert_eq!(Piece::man(Side::First).directions(), &[(-1, -1), (-1, 1)]);
        assert_eq!(Piece::man(Side::Second).directions(), &[(1, -1), (1, 1)]);
        assert_eq!(Piece::king(Side::Second).directions().len(), 4);
    }

    #[test]
    fn test_legal_destinations_empty_square() {
        assert!(Board::initial().legal_destinations(sq(4, 3)).is_empty());
    }

    #[test]
    fn test_opening_moves() {
        let board = Board::initial();
        assert_eq!(board.legal_destinations(sq(5, 2)), vec![sq(4, 1), sq(4, 3)]);
        assert_eq!(board.legal_destinations(sq(5, 0)), vec![sq(4, 1)]);
        // Blocked by own pieces
        assert!(board.legal_destinations(sq(6, 1)).is_empty());
        assert_eq!(board.legal_destinations(sq(2, 1)), vec![sq(3, 0), sq(3, 2)]);
    }

    #[test]
    fn test_jump_and_step() {
        let board = Board::empty()
            .with_piece(sq(3, 3), Some(Piece::man(Side::First)))
            .with_piece(sq(2, 2), Some(Piece::man(Side::Second)));
        assert_eq!(board.legal_destinations(sq(3, 3)), vec![sq(1, 1), sq(2, 4)]);
    }

    #[test]
    fn test_jump_blocked_by_landing() {
        let board = Board::empty()
            .with_piece(sq(3, 3), Some(Piece::man(Side::First)))
            .with_piece(sq(2, 2), Some(Piece::man(Side::Second)))
            .with_piece(sq(1, 1), Some(Piece::man(Side::Second)));
        assert_eq!(board.legal_destinations(sq(3, 3)), vec![sq(2, 4)]);
    }

    #[test]
    fn test_jump_off_board() {
        let board = Board::empty()
            .with_piece(sq(1, 1), Some(Piece::man(Side::First)))
            .with_piece(sq(0, 0), Some(Piece::man(Side::Second)));
        assert_eq!(board.legal_destinations(sq(1, 1)), vec![sq(0, 2)]);
    }

    #[test]
    fn test_king_moves_backwards() {
        let board = Board::empty().with_piece(sq(4, 3), Some(Piece::king(Side::First)));
        assert_eq!(
            board.legal_destinations(sq(4, 3)),
            vec![sq(3, 2), sq(3, 4), sq(5, 2), sq(5, 4)]
        );
    }

    #[test]
    fn test_apply_step() {
        let board = Board::initial();
        let next = board.apply(Move::new(sq(5, 2), sq(4, 3)));
        assert_eq!(next.at(sq(5, 2)), None);
        assert_eq!(next.at(sq(4, 3)), Some(Piece::man(Side::First)));
        assert_eq!(next.count(Side::First), 12);
        // Original untouched
        assert_eq!(board.at(sq(5, 2)), Some(Piece::man(Side::First)));
    }

    #[test]
    fn test_apply_jump_captures() {
        let board = Board::empty()
            .with_piece(sq(3, 3), Some(Piece::man(Side::First)))
            .with_piece(sq(2, 2), Some(Piece::man(Side::Second)));
        let next = board.apply(Move::new(sq(3, 3), sq(1, 1)));
        assert_eq!(next.at(sq(3, 3)), None);
        assert_eq!(next.at(sq(2, 2)), None);
        assert_eq!(next.at(sq(1, 1)), Some(Piece::man(Side::First)));
        assert_eq!(next.count(Side::Second), 0);
    }

    #[test]
    fn test_apply_irregular_jump_clears_midpoint() {
        let board = Board::empty()
            .with_piece(sq(2, 1), Some(Piece::man(Side::Second)))
            .with_piece(sq(3, 1), Some(Piece::man(Side::First)))
            .with_piece(sq(3, 3), Some(Piece::man(Side::First)));

        let next = board.apply(Move::new(sq(2, 1), sq(4, 1)));
        assert_eq!(next.at(sq(3, 1)), None);
        assert_eq!(next.at(sq(4, 1)), Some(Piece::man(Side::Second)));

        let next = board.apply(Move::new(sq(2, 1), sq(4, 5)));
        assert_eq!(next.at(sq(3, 3)), None);
        assert_eq!(next.at(sq(3, 1)), Some(Piece::man(Side::First)));

        // Odd column sum: nothing to clear
        let next = board.apply(Move::new(sq(2, 1), sq(4, 2)));
        assert_eq!(next.count(Side::First), 2);
    }

    #[test]
    fn test_apply_promotes() {
        let board = Board::empty()
            .with_piece(sq(1, 2), Some(Piece::man(Side::First)))
            .with_piece(sq(6, 5), Some(Piece::man(Side::Second)));
        let next = board.apply(Move::new(sq(1, 2), sq(0, 3)));
        assert_eq!(next.at(sq(0, 3)), Some(Piece::king(Side::First)));
        let next = next.apply(Move::new(sq(6, 5), sq(7, 4)));
        assert_eq!(next.at(sq(7, 4)), Some(Piece::king(Side::Second)));
    }

    #[test]
    fn test_no_promotion_on_own_back_rank() {
        let board = Board::empty().with_piece(sq(6, 1), Some(Piece::king(Side::Second)));
        let next = board.apply(Move::new(sq(6, 1), sq(7, 0)));
        assert_eq!(next.at(sq(7, 0)), Some(Piece::king(Side::Second)));

        let board = Board::empty().with_piece(sq(1, 2), Some(Piece::man(Side::Second)));
        let next = board.apply(Move::new(sq(1, 2), sq(0, 1)));
        assert_eq!(next.at(sq(0, 1)), Some(Piece::man(Side::Second)));
    }

    #[test]
    fn test_apply_from_empty_square() {
        let board = Board::initial();
        assert_eq!(board.apply(Move::new(sq(4, 3), sq(3, 4))), board);
    }

    #[test]
    fn test_midpoint() {
        assert_eq!(Move::new(sq(3, 3), sq(1, 1)).midpoint(), Some(sq(2, 2)));
        assert_eq!(Move::new(sq(3, 3), sq(1, 5)).midpoint(), Some(sq(2, 4)));
        assert_eq!(Move::new(sq(3, 3), sq(2, 4)).midpoint(), None);
        // Straight and wide jumps still have a midpoint
        assert_eq!(Move::new(sq(3, 3), sq(1, 3)).midpoint(), Some(sq(2, 3)));
        assert_eq!(Move::new(sq(2, 1), sq(4, 5)).midpoint(), Some(sq(3, 3)));
        // Odd column sum has no midpoint
        assert_eq!(Move::new(sq(3, 3), sq(1, 4)).midpoint(), None);
        assert!(Move::new(sq(3, 3), sq(1, 4)).is_jump());
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(sq(2, 1), sq(3, 2)).to_string(), "2,1 to 3,2");
    }
}
