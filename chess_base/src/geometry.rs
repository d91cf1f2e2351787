use crate::types::{Color, Delta, Rank};

/// Rook directions in scan order: towards rank 8, towards file a, towards
/// rank 1, towards file h. The scan order is fixed, generated moves and
/// detected pins come out in it.
pub const ROOK_DELTAS: [Delta; 4] = [
    Delta::new(0, -1),
    Delta::new(-1, 0),
    Delta::new(0, 1),
    Delta::new(1, 0),
];

/// Bishop directions in scan order.
pub const BISHOP_DELTAS: [Delta; 4] = [
    Delta::new(-1, -1),
    Delta::new(1, -1),
    Delta::new(-1, 1),
    Delta::new(1, 1),
];

/// All eight ray directions, rook rays first.
pub const RAY_DELTAS: [Delta; 8] = [
    Delta::new(0, -1),
    Delta::new(-1, 0),
    Delta::new(0, 1),
    Delta::new(1, 0),
    Delta::new(-1, -1),
    Delta::new(1, -1),
    Delta::new(-1, 1),
    Delta::new(1, 1),
];

pub const KNIGHT_DELTAS: [Delta; 8] = [
    Delta::new(-1, -2),
    Delta::new(1, -2),
    Delta::new(-2, -1),
    Delta::new(2, -1),
    Delta::new(-2, 1),
    Delta::new(2, 1),
    Delta::new(-1, 2),
    Delta::new(1, 2),
];

pub const KING_DELTAS: [Delta; 8] = [
    Delta::new(-1, -1),
    Delta::new(0, -1),
    Delta::new(1, -1),
    Delta::new(-1, 0),
    Delta::new(1, 0),
    Delta::new(-1, 1),
    Delta::new(0, 1),
    Delta::new(1, 1),
];

pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

pub const fn pawn_home_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

/// One-square pawn advance for the given side.
pub const fn pawn_forward(c: Color) -> Delta {
    match c {
        Color::White => Delta::new(0, -1),
        Color::Black => Delta::new(0, 1),
    }
}

/// Pawn capture directions for the given side, lower file first.
pub const fn pawn_capture_deltas(c: Color) -> [Delta; 2] {
    match c {
        Color::White => [Delta::new(-1, -1), Delta::new(1, -1)],
        Color::Black => [Delta::new(-1, 1), Delta::new(1, 1)],
    }
}
