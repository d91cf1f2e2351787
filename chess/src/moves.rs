//! Moves and their square-pair text form

use crate::board::Board;
use crate::geometry;
use crate::types::{Cell, Coord, CoordParseError, Piece};

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use thiserror::Error;

/// Deserialization error for the "e2e4" move form.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid string length")]
    BadLength,
    #[error("cannot parse source square: {0}")]
    BadSrc(#[source] CoordParseError),
    #[error("cannot parse destination square: {0}")]
    BadDst(#[source] CoordParseError),
}

/// Kind of a move, used for dispatch when applying and undoing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Anything without special bookkeeping, including ordinary captures and
    /// double pawn pushes
    Simple = 0,
    /// En passant capture; the captured pawn is not on the destination square
    Enpassant = 1,
    /// King moves two files towards a rook; the rook is relocated as well
    Castling = 2,
    /// Pawn reaches the last rank and always becomes a queen
    Promotion = 3,
}

/// One ply, frozen at construction time.
///
/// A move remembers the squares it connects plus the cells needed to undo
/// it. Identity is deliberately coarse: two moves are equal iff they share
/// source and destination squares, the kind and the cells are ignored. Under
/// standard rules no two distinct legal moves of one position collide this
/// way, but the key would have to be widened if promotion choice were ever
/// added.
#[derive(Debug, Copy, Clone)]
pub struct Move {
    kind: MoveKind,
    src: Coord,
    dst: Coord,
    moved: Cell,
    captured: Cell,
}

impl Move {
    /// Creates an ordinary move of the piece standing on `src`.
    ///
    /// The moved and captured cells are read from `board` at construction
    /// time. A pawn arriving at its promotion rank is marked as a promotion.
    pub fn new(src: Coord, dst: Coord, board: &Board) -> Move {
        let moved = board.get(src);
        let kind = match moved.color() {
            Some(c)
                if moved.piece() == Some(Piece::Pawn)
                    && dst.rank() == geometry::promote_rank(c) =>
            {
                MoveKind::Promotion
            }
            _ => MoveKind::Simple,
        };
        Move {
            kind,
            src,
            dst,
            moved,
            captured: board.get(dst),
        }
    }

    /// Creates an en passant capture.
    ///
    /// The destination square is empty, so the captured pawn is derived from
    /// the moving side instead of being read from the board.
    pub fn new_enpassant(src: Coord, dst: Coord, board: &Board) -> Move {
        let moved = board.get(src);
        let captured = match moved.color() {
            Some(c) => Cell::from_parts(c.inv(), Piece::Pawn),
            None => Cell::EMPTY,
        };
        Move {
            kind: MoveKind::Enpassant,
            src,
            dst,
            moved,
            captured,
        }
    }

    /// Creates a castling move given the king's source and destination.
    pub fn new_castling(src: Coord, dst: Coord, board: &Board) -> Move {
        Move {
            kind: MoveKind::Castling,
            src,
            dst,
            moved: board.get(src),
            captured: Cell::EMPTY,
        }
    }

    /// Parses a move in the "e2e4" square-pair form, reading the piece cells
    /// from `board`.
    ///
    /// En passant and castling cannot be told apart from ordinary moves by
    /// text alone, so the result must be matched against the legal move list
    /// (where move equality only compares squares) instead of being applied
    /// directly.
    pub fn from_text(s: &str, board: &Board) -> Result<Move, MoveParseError> {
        if s.len() != 4 {
            return Err(MoveParseError::BadLength);
        }
        let src = s[0..2].parse().map_err(MoveParseError::BadSrc)?;
        let dst = s[2..4].parse().map_err(MoveParseError::BadDst)?;
        Ok(Move::new(src, dst, board))
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    /// The cell that stood on the source square before the move.
    #[inline]
    pub const fn moved(&self) -> Cell {
        self.moved
    }

    /// The captured cell, if any. For en passant this is the pawn beside the
    /// destination square.
    #[inline]
    pub const fn captured(&self) -> Cell {
        self.captured
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_occupied()
    }

    #[inline]
    pub const fn is_enpassant(&self) -> bool {
        matches!(self.kind, MoveKind::Enpassant)
    }

    #[inline]
    pub const fn is_castling(&self) -> bool {
        matches!(self.kind, MoveKind::Castling)
    }

    #[inline]
    pub const fn is_promotion(&self) -> bool {
        matches!(self.kind, MoveKind::Promotion)
    }

    /// Packed (source, destination) identity key.
    #[inline]
    const fn key(&self) -> u16 {
        ((self.src.index() as u16) << 6) | self.dst.index() as u16
    }
}

impl PartialEq for Move {
    #[inline]
    fn eq(&self, other: &Move) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, File, Rank};
    use std::mem;
    use std::str::FromStr;

    fn coord(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_size() {
        assert_eq!(mem::size_of::<Move>(), 5);
    }

    #[test]
    fn test_new() {
        let b = Board::initial();
        let mv = Move::new(coord("e2"), coord("e4"), &b);
        assert_eq!(mv.kind(), MoveKind::Simple);
        assert_eq!(mv.moved(), Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(mv.captured(), Cell::EMPTY);
        assert!(!mv.is_capture());
        assert_eq!(mv.to_string(), "e2e4");

        let mv = Move::new(coord("b8"), coord("c6"), &b);
        assert_eq!(mv.moved(), Cell::from_parts(Color::Black, Piece::Knight));
        assert_eq!(mv.to_string(), "b8c6");
    }

    #[test]
    fn test_promotion_kind() {
        let mut b = Board::empty();
        b.put2(File::A, Rank::R7, Cell::from_parts(Color::White, Piece::Pawn));
        b.put2(File::B, Rank::R8, Cell::from_parts(Color::Black, Piece::Rook));
        let push = Move::new(coord("a7"), coord("a8"), &b);
        assert_eq!(push.kind(), MoveKind::Promotion);
        let take = Move::new(coord("a7"), coord("b8"), &b);
        assert_eq!(take.kind(), MoveKind::Promotion);
        assert!(take.is_capture());

        let mut b = Board::empty();
        b.put2(File::A, Rank::R2, Cell::from_parts(Color::Black, Piece::Pawn));
        let push = Move::new(coord("a2"), coord("a1"), &b);
        assert_eq!(push.kind(), MoveKind::Promotion);
    }

    #[test]
    fn test_enpassant_captured() {
        let mut b = Board::empty();
        b.put2(File::E, Rank::R5, Cell::from_parts(Color::White, Piece::Pawn));
        b.put2(File::D, Rank::R5, Cell::from_parts(Color::Black, Piece::Pawn));
        let mv = Move::new_enpassant(coord("e5"), coord("d6"), &b);
        assert_eq!(mv.moved(), Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(mv.captured(), Cell::from_parts(Color::Black, Piece::Pawn));
        assert!(mv.is_capture());
        assert!(mv.is_enpassant());
    }

    #[test]
    fn test_identity() {
        let b = Board::initial();
        let plain = Move::new(coord("e2"), coord("e4"), &b);
        let flagged = Move::new_enpassant(coord("e2"), coord("e4"), &b);
        assert_eq!(plain, flagged);
        assert_ne!(plain, Move::new(coord("e2"), coord("e3"), &b));
    }

    #[test]
    fn test_from_text() {
        let b = Board::initial();
        assert_eq!(
            Move::from_text("g1f3", &b),
            Ok(Move::new(coord("g1"), coord("f3"), &b))
        );
        assert_eq!(Move::from_text("e2e4e", &b), Err(MoveParseError::BadLength));
        assert!(matches!(
            Move::from_text("z2e4", &b),
            Err(MoveParseError::BadSrc(_))
        ));
        assert!(matches!(
            Move::from_text("e2e9", &b),
            Err(MoveParseError::BadDst(_))
        ));
    }
}
