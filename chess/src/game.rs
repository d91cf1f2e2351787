use crate::attack;
use crate::board::{Board, Pretty, PrettyStyle};
use crate::geometry;
use crate::movegen::{self, MoveList};
use crate::moves::{Move, MoveKind};
use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, File, Piece, Rank};

use thiserror::Error;

/// Position validation error
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum SetupError {
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// Opponent's king is under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Per-ply record of the state a move application cannot reconstruct on its
/// own.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Snapshot {
    castling: CastlingRights,
    ep_target: Option<Coord>,
}

fn rook_origin_side(color: Color, coord: Coord) -> Option<CastlingSide> {
    let rank = geometry::castling_rank(color);
    if coord == Coord::from_parts(File::A, rank) {
        Some(CastlingSide::Queen)
    } else if coord == Coord::from_parts(File::H, rank) {
        Some(CastlingSide::King)
    } else {
        None
    }
}

/// A game of chess: the board plus everything needed to apply and take back
/// moves, namely the side to move, tracked king squares, the move log, and
/// one [`Snapshot`] of castling rights and en passant target per ply.
///
/// Moves pushed into the game are not validated. The caller is expected to
/// pick them from [`Game::legal_moves`] (comparing candidates with `==`,
/// which matches moves by their squares), as pushing an arbitrary move can
/// corrupt the position.
///
/// # Example
///
/// ```
/// # use ravenchess::{Game, Move};
/// let mut game = Game::new();
/// let moves = game.legal_moves();
/// assert_eq!(moves.len(), 20);
/// let mv = Move::from_text("e2e4", game.board()).unwrap();
/// let mv = *moves.iter().find(|m| **m == mv).unwrap();
/// game.push(mv);
/// assert_eq!(game.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    side: Color,
    kings: [Coord; 2],
    snapshots: Vec<Snapshot>,
    log: Vec<Move>,
    in_check: bool,
    checkmate: bool,
    stalemate: bool,
}

impl Game {
    /// Creates a game in the standard starting position, white to move.
    pub fn new() -> Game {
        Game {
            board: Board::initial(),
            side: Color::White,
            kings: [
                Coord::from_parts(File::E, Rank::R1),
                Coord::from_parts(File::E, Rank::R8),
            ],
            snapshots: vec![Snapshot {
                castling: CastlingRights::FULL,
                ep_target: None,
            }],
            log: Vec::new(),
            in_check: false,
            checkmate: false,
            stalemate: false,
        }
    }

    /// Creates a game from an arbitrary piece arrangement with `side` to
    /// move.
    ///
    /// The position must have at most sixteen pieces of each color with
    /// exactly one king per side, no pawns on the first or eighth rank, and
    /// the king of the side not to move must not be attacked. Castling
    /// rights are derived from the placement: a side keeps a right only
    /// with its king and the matching rook on their original squares. The
    /// en passant target starts out unset.
    pub fn from_setup(board: Board, side: Color) -> Result<Game, SetupError> {
        let mut kings = [None; 2];
        let mut counts = [0_usize; 2];
        for coord in Coord::iter() {
            let cell = board.get(coord);
            let color = match cell.color() {
                Some(color) => color,
                None => continue,
            };
            let count = &mut counts[color.index()];
            *count += 1;
            if *count > 16 {
                return Err(SetupError::TooManyPieces(color));
            }
            match cell.piece() {
                Some(Piece::King) => {
                    let slot = &mut kings[color.index()];
                    if slot.is_some() {
                        return Err(SetupError::TooManyKings(color));
                    }
                    *slot = Some(coord);
                }
                Some(Piece::Pawn) => {
                    if matches!(coord.rank(), Rank::R1 | Rank::R8) {
                        return Err(SetupError::InvalidPawn(coord));
                    }
                }
                _ => {}
            }
        }
        let kings = [
            kings[0].ok_or(SetupError::NoKing(Color::White))?,
            kings[1].ok_or(SetupError::NoKing(Color::Black))?,
        ];
        if attack::is_attacked(&board, kings[side.inv().index()], side) {
            return Err(SetupError::OpponentKingAttacked);
        }

        let mut castling = CastlingRights::EMPTY;
        for color in [Color::White, Color::Black] {
            let rank = geometry::castling_rank(color);
            let king = Coord::from_parts(File::E, rank);
            if board.get(king) != Cell::from_parts(color, Piece::King) {
                continue;
            }
            let rook = Cell::from_parts(color, Piece::Rook);
            if board.get(Coord::from_parts(File::H, rank)) == rook {
                castling.set(color, CastlingSide::King);
            }
            if board.get(Coord::from_parts(File::A, rank)) == rook {
                castling.set(color, CastlingSide::Queen);
            }
        }

        Ok(Game {
            board,
            side,
            kings,
            snapshots: vec![Snapshot {
                castling,
                ep_target: None,
            }],
            log: Vec::new(),
            in_check: false,
            checkmate: false,
            stalemate: false,
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    /// Square of the given side's king.
    #[inline]
    pub fn king(&self, color: Color) -> Coord {
        self.kings[color.index()]
    }

    #[inline]
    fn snapshot(&self) -> &Snapshot {
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Current castling availability flags.
    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.snapshot().castling
    }

    /// Square a pawn may capture onto en passant, if the last move was a
    /// double pawn push.
    #[inline]
    pub fn en_passant_target(&self) -> Option<Coord> {
        self.snapshot().ep_target
    }

    /// `true` if the side to move is in check.
    ///
    /// Valid only after a [`Game::legal_moves`] call, like
    /// [`Game::is_checkmate`] and [`Game::is_stalemate`].
    #[inline]
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    #[inline]
    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    /// Number of plies played so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Returns the `idx`th move of the game.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Move> {
        self.log.get(idx).copied()
    }

    /// Iterates over the played moves, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.log.iter().copied()
    }

    fn check_arena(&self) {
        assert_eq!(
            self.snapshots.len(),
            self.log.len() + 1,
            "one snapshot per played ply plus the initial one"
        );
    }

    /// Computes all legal moves for the side to move and refreshes the
    /// check, checkmate and stalemate flags.
    pub fn legal_moves(&mut self) -> MoveList {
        let mut moves = MoveList::new();
        let in_check = movegen::legal_into(self, &mut moves);
        self.in_check = in_check;
        self.checkmate = in_check && moves.is_empty();
        self.stalemate = !in_check && moves.is_empty();
        moves
    }

    fn updated_rights(&self, mv: Move) -> CastlingRights {
        let mut rights = self.castling_rights();
        match (mv.moved().color(), mv.moved().piece()) {
            (Some(color), Some(Piece::King)) => rights.unset_color(color),
            (Some(color), Some(Piece::Rook)) => {
                if let Some(side) = rook_origin_side(color, mv.src()) {
                    rights.unset(color, side);
                }
            }
            _ => {}
        }
        if let (Some(color), Some(Piece::Rook)) = (mv.captured().color(), mv.captured().piece()) {
            if let Some(side) = rook_origin_side(color, mv.dst()) {
                rights.unset(color, side);
            }
        }
        rights
    }

    /// Applies `mv` to the position.
    ///
    /// The move is trusted to come from [`Game::legal_moves`] for the
    /// current position.
    pub fn push(&mut self, mv: Move) {
        self.check_arena();
        let side = self.side;
        let castling = self.updated_rights(mv);

        self.board.put(mv.src(), Cell::EMPTY);
        self.board.put(mv.dst(), mv.moved());
        self.log.push(mv);
        self.side = side.inv();
        if mv.moved().piece() == Some(Piece::King) {
            self.kings[side.index()] = mv.dst();
        }

        let src_rank = mv.src().rank().index();
        let dst_rank = mv.dst().rank().index();
        let ep_target = if mv.moved().piece() == Some(Piece::Pawn)
            && (src_rank as i8 - dst_rank as i8).abs() == 2
        {
            Some(Coord::from_parts(
                mv.src().file(),
                Rank::from_index((src_rank + dst_rank) / 2),
            ))
        } else {
            None
        };

        match mv.kind() {
            MoveKind::Simple => {}
            MoveKind::Enpassant => {
                // The captured pawn is beside the destination, not on it.
                self.board
                    .put(Coord::from_parts(mv.dst().file(), mv.src().rank()), Cell::EMPTY);
            }
            MoveKind::Promotion => {
                self.board
                    .put(mv.dst(), Cell::from_parts(side, Piece::Queen));
            }
            MoveKind::Castling => {
                let rank = mv.src().rank();
                let (rook_src, rook_dst) = if mv.dst().file() == File::G {
                    (Coord::from_parts(File::H, rank), Coord::from_parts(File::F, rank))
                } else {
                    (Coord::from_parts(File::A, rank), Coord::from_parts(File::D, rank))
                };
                let rook = self.board.get(rook_src);
                self.board.put(rook_src, Cell::EMPTY);
                self.board.put(rook_dst, rook);
            }
        }

        self.snapshots.push(Snapshot {
            castling,
            ep_target,
        });
    }

    /// Takes back the last played move and returns it, or `None` if no
    /// moves were played. Castling rights and the en passant target revert
    /// to their pre-move values.
    pub fn pop(&mut self) -> Option<Move> {
        self.check_arena();
        let mv = self.log.pop()?;
        self.snapshots.pop();
        let side = self.side.inv();
        self.side = side;

        self.board.put(mv.src(), mv.moved());
        self.board.put(mv.dst(), mv.captured());
        if mv.moved().piece() == Some(Piece::King) {
            self.kings[side.index()] = mv.src();
        }

        match mv.kind() {
            MoveKind::Simple | MoveKind::Promotion => {}
            MoveKind::Enpassant => {
                self.board.put(mv.dst(), Cell::EMPTY);
                self.board
                    .put(Coord::from_parts(mv.dst().file(), mv.src().rank()), mv.captured());
            }
            MoveKind::Castling => {
                let rank = mv.src().rank();
                let (rook_src, rook_dst) = if mv.dst().file() == File::G {
                    (Coord::from_parts(File::H, rank), Coord::from_parts(File::F, rank))
                } else {
                    (Coord::from_parts(File::A, rank), Coord::from_parts(File::D, rank))
                };
                let rook = self.board.get(rook_dst);
                self.board.put(rook_dst, Cell::EMPTY);
                self.board.put(rook_src, rook);
            }
        }

        // Mate flags are stale now; the next legal move query recomputes
        // them.
        self.checkmate = false;
        self.stalemate = false;
        Some(mv)
    }

    /// Wraps the game into an object which implements `Display` and prints
    /// the board from white's perspective with a side-to-move marker.
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty {
            board: &self.board,
            side: Some(self.side),
            style,
        }
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}
