use crate::attack::{self, Threats};
use crate::board::Board;
use crate::game::Game;
use crate::geometry;
use crate::moves::{Move, MoveKind};
use crate::types::{CastlingRights, CastlingSide, Color, Coord, Delta, File, Piece};

use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

/// List of moves generated for a position.
///
/// The list is backed by a fixed-size array. With at most sixteen pieces per
/// side, which [`Game::from_setup`] enforces, the number of legal moves in
/// any position is known to stay below its capacity.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = arrayvec::IntoIter<Move, 256>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut MoveList {
    type Item = &'a mut Move;
    type IntoIter = slice::IterMut<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Sink for generated moves.
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl<const N: usize> MovePush for ArrayVec<Move, N> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

#[inline]
fn pin_allows(pin: Option<Delta>, d: Delta) -> bool {
    // A pinned piece may still slide along the pin line, toward the pinning
    // piece or toward its own king.
    match pin {
        Some(p) => p == d || p == -d,
        None => true,
    }
}

struct MoveGenImpl<'a, P> {
    board: &'a Board,
    side: Color,
    king: Coord,
    castling: CastlingRights,
    ep: Option<Coord>,
    threats: &'a Threats,
    dst: &'a mut P,
}

impl<'a, P: MovePush> MoveGenImpl<'a, P> {
    fn new(game: &'a Game, threats: &'a Threats, dst: &'a mut P) -> Self {
        let side = game.side_to_move();
        MoveGenImpl {
            board: game.board(),
            side,
            king: game.king(side),
            castling: game.castling_rights(),
            ep: game.en_passant_target(),
            threats,
            dst,
        }
    }

    fn gen_pawn(&mut self, src: Coord) {
        let pin = self.threats.pin_dir(src);
        let forward = geometry::pawn_forward(self.side);
        if let Some(one) = src.shift(forward) {
            if self.board.get(one).is_empty() && pin_allows(pin, forward) {
                self.dst.push(Move::new(src, one, self.board));
                if src.rank() == geometry::pawn_home_rank(self.side) {
                    if let Some(two) = one.shift(forward) {
                        if self.board.get(two).is_empty() {
                            self.dst.push(Move::new(src, two, self.board));
                        }
                    }
                }
            }
        }
        for d in geometry::pawn_capture_deltas(self.side) {
            if !pin_allows(pin, d) {
                continue;
            }
            let dst = match src.shift(d) {
                Some(dst) => dst,
                None => continue,
            };
            if self.board.get(dst).color() == Some(self.side.inv()) {
                self.dst.push(Move::new(src, dst, self.board));
            } else if self.ep == Some(dst) && !self.enpassant_exposed(src, dst) {
                self.dst.push(Move::new_enpassant(src, dst, self.board));
            }
        }
    }

    /// An en passant capture clears two squares of the capturer's rank at
    /// once, which no pin ray can see. If the king also stands on that rank,
    /// scan it for a rook or queen hiding behind the pawn pair.
    fn enpassant_exposed(&self, src: Coord, dst: Coord) -> bool {
        if self.king.rank() != src.rank() {
            return false;
        }
        let captured = Coord::from_parts(dst.file(), src.rank());
        let step = if self.king.file().index() < src.file().index() {
            Delta::new(1, 0)
        } else {
            Delta::new(-1, 0)
        };
        let mut next = self.king.shift(step);
        while let Some(sq) = next {
            // Both pawns leave the rank, so the first occupied square
            // besides them decides.
            let cell = self.board.get(sq);
            if sq != src && sq != captured && cell.is_occupied() {
                return cell.color() == Some(self.side.inv())
                    && matches!(cell.piece(), Some(Piece::Rook | Piece::Queen));
            }
            next = sq.shift(step);
        }
        false
    }

    fn gen_rays(&mut self, src: Coord, dirs: &[Delta]) {
        let pin = self.threats.pin_dir(src);
        for &d in dirs {
            if !pin_allows(pin, d) {
                continue;
            }
            let mut next = src.shift(d);
            while let Some(dst) = next {
                let cell = self.board.get(dst);
                if cell.is_empty() {
                    self.dst.push(Move::new(src, dst, self.board));
                } else {
                    if cell.color() == Some(self.side.inv()) {
                        self.dst.push(Move::new(src, dst, self.board));
                    }
                    break;
                }
                next = dst.shift(d);
            }
        }
    }

    fn gen_knight(&mut self, src: Coord) {
        // No knight move stays on a pin line.
        if self.threats.pin_dir(src).is_some() {
            return;
        }
        for &d in &geometry::KNIGHT_DELTAS {
            if let Some(dst) = src.shift(d) {
                if self.board.get(dst).color() != Some(self.side) {
                    self.dst.push(Move::new(src, dst, self.board));
                }
            }
        }
    }

    fn gen_king(&mut self, src: Coord) {
        for &d in &geometry::KING_DELTAS {
            if let Some(dst) = src.shift(d) {
                if self.board.get(dst).color() == Some(self.side) {
                    continue;
                }
                // The scan skips the ally king, so sliders keep attacking
                // through the square being vacated.
                if !attack::pins_and_checks(self.board, self.side, dst).in_check() {
                    self.dst.push(Move::new(src, dst, self.board));
                }
            }
        }
    }

    fn gen_castling(&mut self) {
        if self.threats.in_check() {
            return;
        }
        let rank = geometry::castling_rank(self.side);
        let src = Coord::from_parts(File::E, rank);
        if self.castling.has(self.side, CastlingSide::King) {
            let tmp = Coord::from_parts(File::F, rank);
            let dst = Coord::from_parts(File::G, rank);
            if self.board.get(tmp).is_empty()
                && self.board.get(dst).is_empty()
                && !attack::is_attacked(self.board, tmp, self.side.inv())
                && !attack::is_attacked(self.board, dst, self.side.inv())
            {
                self.dst.push(Move::new_castling(src, dst, self.board));
            }
        }
        if self.castling.has(self.side, CastlingSide::Queen) {
            let tmp = Coord::from_parts(File::D, rank);
            let dst = Coord::from_parts(File::C, rank);
            let pass = Coord::from_parts(File::B, rank);
            // The king never crosses the b-file square, so it only needs to
            // be empty.
            if self.board.get(tmp).is_empty()
                && self.board.get(dst).is_empty()
                && self.board.get(pass).is_empty()
                && !attack::is_attacked(self.board, tmp, self.side.inv())
                && !attack::is_attacked(self.board, dst, self.side.inv())
            {
                self.dst.push(Move::new_castling(src, dst, self.board));
            }
        }
    }

    fn gen_piece(&mut self, src: Coord, piece: Piece) {
        match piece {
            Piece::Pawn => self.gen_pawn(src),
            Piece::Knight => self.gen_knight(src),
            Piece::Bishop => self.gen_rays(src, &geometry::BISHOP_DELTAS),
            Piece::Rook => self.gen_rays(src, &geometry::ROOK_DELTAS),
            Piece::Queen => self.gen_rays(src, &geometry::RAY_DELTAS),
            Piece::King => self.gen_king(src),
        }
    }

    fn gen_pieces(&mut self) {
        for src in Coord::iter() {
            let cell = self.board.get(src);
            if cell.color() == Some(self.side) {
                if let Some(piece) = cell.piece() {
                    self.gen_piece(src, piece);
                }
            }
        }
    }
}

/// Squares a non-king move may target to resolve a single check: every
/// square between the king and the checker plus the checker itself. A knight
/// check cannot be blocked, only captured.
fn resolution_squares(board: &Board, king: Coord, pos: Coord, dir: Delta) -> ArrayVec<Coord, 8> {
    let mut res = ArrayVec::new();
    if board.get(pos).piece() == Some(Piece::Knight) {
        res.push(pos);
        return res;
    }
    let mut next = king.shift(dir);
    while let Some(sq) = next {
        res.push(sq);
        if sq == pos {
            break;
        }
        next = sq.shift(dir);
    }
    res
}

/// Generates all legal moves for the side to move, pushing them into `dst`.
/// Returns `true` if that side is currently in check.
///
/// With no check present, the result is every pseudo-legal move (pin
/// filtering happens inside the per-piece generators) plus castlings. Under
/// a single check, non-king moves survive only if they capture the checker
/// or block its ray. Under a double check, only king moves are generated.
pub fn legal_into<P: MovePush>(game: &Game, dst: &mut P) -> bool {
    let board = game.board();
    let side = game.side_to_move();
    let king = game.king(side);
    let threats = attack::pins_and_checks(board, side, king);

    match threats.checks.as_slice() {
        [] => {
            let mut g = MoveGenImpl::new(game, &threats, dst);
            g.gen_pieces();
            g.gen_castling();
        }
        [check] => {
            let mut pseudo = MoveList::new();
            MoveGenImpl::new(game, &threats, &mut pseudo).gen_pieces();
            let resolution = resolution_squares(board, king, check.pos, check.dir);
            for &mv in &pseudo {
                if mv.moved().piece() == Some(Piece::King) {
                    dst.push(mv);
                    continue;
                }
                // En passant is the one capture whose destination differs
                // from the checker's square, so test the captured pawn.
                let target = match mv.kind() {
                    MoveKind::Enpassant => Coord::from_parts(mv.dst().file(), mv.src().rank()),
                    _ => mv.dst(),
                };
                if resolution.contains(&target) {
                    dst.push(mv);
                }
            }
        }
        _ => {
            MoveGenImpl::new(game, &threats, dst).gen_king(king);
        }
    }
    threats.in_check()
}

/// Generates all legal moves for the side to move.
pub fn legal(game: &Game) -> MoveList {
    let mut res = MoveList::new();
    legal_into(game, &mut res);
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::types::{Cell, Rank};

    fn setup(rows: [&str; 8], side: Color) -> Game {
        let mut b = Board::empty();
        for (r, row) in rows.iter().enumerate() {
            for (f, ch) in row.chars().enumerate() {
                let coord = Coord::from_parts(File::from_index(f), Rank::from_index(r));
                b.put(coord, Cell::from_char(ch).unwrap());
            }
        }
        Game::from_setup(b, side).unwrap()
    }

    fn moves_from(moves: &MoveList, src: &str) -> Vec<String> {
        let src: Coord = src.parse().unwrap();
        moves
            .iter()
            .filter(|m| m.src() == src)
            .map(|m| m.to_string())
            .collect()
    }

    fn texts(moves: &MoveList) -> String {
        let texts: Vec<_> = moves.iter().map(|m| m.to_string()).collect();
        texts.join(" ")
    }

    #[test]
    fn test_initial_position() {
        let game = Game::new();
        let mut moves = MoveList::new();
        let in_check = legal_into(&game, &mut moves);
        assert!(!in_check);
        assert_eq!(moves.len(), 20);
        assert_eq!(
            texts(&moves),
            "a2a3 a2a4 b2b3 b2b4 c2c3 c2c4 d2d3 d2d4 e2e3 e2e4 \
             f2f3 f2f4 g2g3 g2g4 h2h3 h2h4 b1a3 b1c3 g1f3 g1h3"
        );
    }

    #[test]
    fn test_pinned_rook_moves_along_pin() {
        let game = setup(
            [
                "....q..k", "........", "........", "........", "....R...", "........", "........",
                "....K...",
            ],
            Color::White,
        );
        let moves = legal(&game);
        assert_eq!(
            moves_from(&moves, "e4"),
            ["e4e5", "e4e6", "e4e7", "e4e8", "e4e3", "e4e2"]
        );
    }

    #[test]
    fn test_pinned_knight_stays_put() {
        let game = setup(
            [
                ".......k", "........", "........", "b.......", "........", "..N.....", "........",
                "....K...",
            ],
            Color::White,
        );
        let moves = legal(&game);
        assert!(moves_from(&moves, "c3").is_empty());
    }

    #[test]
    fn test_pinned_pawn_pushes_along_file() {
        // The pin ray points from the king down towards the rook; pushing
        // the pawn up the same file keeps the shield intact.
        let game = setup(
            [
                ".......k", "........", "........", "....K...", "........", "....P...", "........",
                "....r...",
            ],
            Color::White,
        );
        let moves = legal(&game);
        assert_eq!(moves_from(&moves, "e3"), ["e3e4"]);
    }

    #[test]
    fn test_single_check_must_be_resolved() {
        let game = setup(
            [
                "....r..k", "........", "........", "........", "Q.......", "..N.....", "........",
                "....K...",
            ],
            Color::White,
        );
        let mut moves = MoveList::new();
        let in_check = legal_into(&game, &mut moves);
        assert!(in_check);
        assert_eq!(
            texts(&moves),
            "a4e4 a4e8 c3e4 c3e2 e1d2 e1f2 e1d1 e1f1"
        );
    }

    #[test]
    fn test_double_check_leaves_only_king_moves() {
        let game = setup(
            [
                "....r...", ".......k", "........", "b.......", "........", "........", "........",
                "Q...K...",
            ],
            Color::White,
        );
        let mut moves = MoveList::new();
        let in_check = legal_into(&game, &mut moves);
        assert!(in_check);
        assert!(moves.iter().all(|m| m.moved().piece() == Some(Piece::King)));
        assert_eq!(texts(&moves), "e1f2 e1d1 e1f1");
    }

    #[test]
    fn test_castling_generation() {
        let game = setup(
            [
                "....k...", "........", "........", "........", "........", "........", "........",
                "R...K..R",
            ],
            Color::White,
        );
        let moves = legal(&game);
        let castles: Vec<_> = moves
            .iter()
            .filter(|m| m.is_castling())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(castles, ["e1g1", "e1c1"]);
        // Castlings always come last.
        let len = moves.len();
        assert_eq!(moves[len - 2].to_string(), "e1g1");
        assert_eq!(moves[len - 1].to_string(), "e1c1");
    }

    #[test]
    fn test_castling_attack_gates() {
        // The f1 transit square is attacked, which forbids only kingside.
        let game = setup(
            [
                "....kr..", "........", "........", "........", "........", "........", "........",
                "R...K..R",
            ],
            Color::White,
        );
        let moves = legal(&game);
        let castles: Vec<_> = moves
            .iter()
            .filter(|m| m.is_castling())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(castles, ["e1c1"]);

        // An attack on b1 does not matter, the square must only be empty.
        let game = setup(
            [
                ".r..k...", "........", "........", "........", "........", "........", "........",
                "R...K..R",
            ],
            Color::White,
        );
        let moves = legal(&game);
        assert_eq!(moves.iter().filter(|m| m.is_castling()).count(), 2);
    }

    #[test]
    fn test_enpassant_discovered_exposure() {
        // Capturing en passant would clear both e5 and d5, unmasking the
        // rook on a5 against the king on h5.
        let mut game = setup(
            [
                ".......k", "...p....", "........", "r...P..K", "........", "........", "........",
                "........",
            ],
            Color::Black,
        );
        game.push(Move::from_text("d7d5", game.board()).unwrap());
        let moves = legal(&game);
        assert_eq!(moves_from(&moves, "e5"), ["e5e6"]);

        // With a blocker of its own on the rank the capture is fine.
        let mut game = setup(
            [
                ".......k", "...p....", "........", "r.N.P..K", "........", "........", "........",
                "........",
            ],
            Color::Black,
        );
        game.push(Move::from_text("d7d5", game.board()).unwrap());
        let moves = legal(&game);
        assert_eq!(moves_from(&moves, "e5"), ["e5e6", "e5d6"]);
    }

    #[test]
    fn test_enpassant_capture_of_checking_pawn() {
        // The double push gives check; the en passant reply captures the
        // checker even though its destination is not the checker's square.
        let mut game = setup(
            [
                "....k...", "...p....", "........", "....P...", "....K...", "........", "........",
                "........",
            ],
            Color::Black,
        );
        game.push(Move::from_text("d7d5", game.board()).unwrap());
        let moves = legal(&game);
        let ep: Vec<_> = moves
            .iter()
            .filter(|m| m.is_enpassant())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(ep, ["e5d6"]);
    }

    #[test]
    fn test_promotion_moves() {
        let game = setup(
            [
                ".r..k...", "P.......", "........", "........", "........", "........", "........",
                "....K...",
            ],
            Color::White,
        );
        let moves = legal(&game);
        let pawn = moves_from(&moves, "a7");
        assert_eq!(pawn, ["a7a8", "a7b8"]);
        assert!(moves
            .iter()
            .filter(|m| m.src() == "a7".parse().unwrap())
            .all(|m| m.is_promotion()));
    }
}
