//! # Board vocabulary for ravenchess
//!
//! This is an auxiliary crate for `ravenchess`. It holds the board vocabulary
//! (squares, pieces, castling flags) and the offset tables the engine walks, split
//! from the main crate so that frontends can speak these types without pulling in
//! the engine itself.
//!
//! Normally you don't want to use this crate directly. Use `ravenchess` instead.

pub mod geometry;
pub mod types;
