//! Chess rules: board representation and legal move generation.
//!
//! The crate tracks a full game. [`Game`] owns the board, the side to move,
//! castling rights and the en passant target, applies and takes back moves
//! at any depth, and generates every legal move for the side to move,
//! flagging checkmate and stalemate when no move is left.
//!
//! # Example
//!
//! ```
//! use ravenchess::{Board, Game, Move};
//!
//! let mut game = Game::new();
//! let moves = game.legal_moves();
//! assert_eq!(moves.len(), 20);
//!
//! // A parsed move carries no castling or en passant marks, so look it
//! // up in the legal list and play the one found there.
//! let mv = Move::from_text("e2e4", game.board()).unwrap();
//! let mv = *moves.iter().find(|m| **m == mv).unwrap();
//! game.push(mv);
//! game.pop();
//! assert_eq!(game.board(), &Board::initial());
//! ```

pub mod attack;
pub mod board;
pub mod game;
pub mod geometry;
pub mod movegen;
pub mod moves;
pub mod types;

pub use board::{Board, PrettyStyle};
pub use game::{Game, SetupError};
pub use movegen::{MoveList, MovePush};
pub use moves::{Move, MoveKind};
pub use types::{CastlingRights, CastlingSide, Cell, Color, Coord, Delta, File, Piece, Rank};
