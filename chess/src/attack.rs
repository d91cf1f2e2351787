//! Square attack, pin and check detection

use crate::board::Board;
use crate::geometry;
use crate::types::{Cell, Color, Coord, Delta, Piece};

use arrayvec::ArrayVec;

/// A piece shielding its king from an enemy slider, together with the ray
/// direction pointing from the king towards it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pin {
    pub pos: Coord,
    pub dir: Delta,
}

/// A piece giving check, together with the direction pointing from the king
/// towards it. For knights the direction is the knight offset itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Check {
    pub pos: Coord,
    pub dir: Delta,
}

/// Everything the legal move filter needs to know about the king's safety.
///
/// Eight rays bound the number of pins, eight rays plus eight knight offsets
/// bound the number of checks, so both lists live on the stack.
#[derive(Debug, Clone, Default)]
pub struct Threats {
    pub pins: ArrayVec<Pin, 8>,
    pub checks: ArrayVec<Check, 16>,
}

impl Threats {
    #[inline]
    pub fn in_check(&self) -> bool {
        !self.checks.is_empty()
    }

    /// Pin direction of the piece on `pos`, if that piece is pinned.
    pub fn pin_dir(&self, pos: Coord) -> Option<Delta> {
        self.pins.iter().find(|p| p.pos == pos).map(|p| p.dir)
    }
}

// `d` points from the attacked square towards the piece, `dist` steps away.
fn ray_attacks(cell: Cell, d: Delta, dist: usize, by: Color) -> bool {
    match cell.piece() {
        Some(Piece::Rook) => !d.is_diagonal(),
        Some(Piece::Bishop) => d.is_diagonal(),
        Some(Piece::Queen) => true,
        Some(Piece::King) => dist == 1,
        Some(Piece::Pawn) => {
            dist == 1 && d.is_diagonal() && d.rank == -geometry::pawn_forward(by).rank
        }
        _ => false,
    }
}

/// Returns `true` if the square `target` is attacked by any piece of color
/// `by`.
///
/// Each of the eight rays out of `target` is walked until its first occupied
/// square, which alone decides the outcome for that ray; knight offsets are
/// checked separately. Occupied squares can be attacked like empty ones.
pub fn is_attacked(b: &Board, target: Coord, by: Color) -> bool {
    for d in geometry::RAY_DELTAS {
        let mut cur = target;
        let mut dist = 0_usize;
        while let Some(next) = cur.shift(d) {
            cur = next;
            dist += 1;
            let cell = b.get(cur);
            if cell.is_empty() {
                continue;
            }
            if cell.color() == Some(by) && ray_attacks(cell, d, dist, by) {
                return true;
            }
            break;
        }
    }
    let knight = Cell::from_parts(by, Piece::Knight);
    geometry::KNIGHT_DELTAS
        .iter()
        .filter_map(|&d| target.shift(d))
        .any(|c| b.get(c) == knight)
}

/// Computes pins and checks against a king of color `color` standing on
/// `king`.
///
/// The king square is an explicit parameter and may differ from where the
/// king of that color actually stands: king move legality is decided by
/// querying candidate squares through this function, without touching the
/// board. To keep such queries exact, squares holding the ally king are
/// transparent to the scan, neither blocking a ray nor counting as a pin
/// candidate.
pub fn pins_and_checks(b: &Board, color: Color, king: Coord) -> Threats {
    let mut res = Threats::default();
    let enemy = color.inv();
    for d in geometry::RAY_DELTAS {
        let mut candidate: Option<Coord> = None;
        let mut cur = king;
        let mut dist = 0_usize;
        while let Some(next) = cur.shift(d) {
            cur = next;
            dist += 1;
            let cell = b.get(cur);
            if cell.is_empty() {
                continue;
            }
            if cell.color() == Some(color) {
                if cell.piece() == Some(Piece::King) {
                    continue;
                }
                if candidate.is_none() {
                    candidate = Some(cur);
                } else {
                    // Two shields on one ray, neither is pinned.
                    break;
                }
            } else {
                if ray_attacks(cell, d, dist, enemy) {
                    match candidate {
                        None => res.checks.push(Check { pos: cur, dir: d }),
                        Some(pos) => res.pins.push(Pin { pos, dir: d }),
                    }
                }
                break;
            }
        }
    }
    let knight = Cell::from_parts(enemy, Piece::Knight);
    for d in geometry::KNIGHT_DELTAS {
        if let Some(pos) = king.shift(d) {
            if b.get(pos) == knight {
                res.checks.push(Check { pos, dir: d });
            }
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};
    use std::str::FromStr;

    fn board(rows: [&str; 8]) -> Board {
        let mut b = Board::empty();
        for (rank, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), 8);
            for (file, ch) in row.chars().enumerate() {
                b.put(
                    Coord::from_parts(File::from_index(file), Rank::from_index(rank)),
                    Cell::from_char(ch).unwrap(),
                );
            }
        }
        b
    }

    fn coord(s: &str) -> Coord {
        Coord::from_str(s).unwrap()
    }

    #[test]
    fn test_slider_attacks() {
        let b = board([
            "........",
            "........",
            "........",
            "...r....",
            "........",
            "...P....",
            "........",
            "........",
        ]);
        assert!(is_attacked(&b, coord("d8"), Color::Black));
        assert!(is_attacked(&b, coord("a5"), Color::Black));
        assert!(is_attacked(&b, coord("h5"), Color::Black));
        assert!(is_attacked(&b, coord("d4"), Color::Black));
        assert!(is_attacked(&b, coord("d3"), Color::Black));
        // The pawn on d3 blocks the ray below it.
        assert!(!is_attacked(&b, coord("d2"), Color::Black));
        assert!(!is_attacked(&b, coord("d1"), Color::Black));
        assert!(!is_attacked(&b, coord("e4"), Color::Black));
        assert!(!is_attacked(&b, coord("d5"), Color::White));

        let b = board([
            "........",
            "........",
            "........",
            "....B...",
            "........",
            "......q.",
            "........",
            "........",
        ]);
        assert!(is_attacked(&b, coord("h8"), Color::White));
        assert!(is_attacked(&b, coord("b2"), Color::White));
        assert!(!is_attacked(&b, coord("e4"), Color::White));
        assert!(is_attacked(&b, coord("g8"), Color::Black));
        assert!(is_attacked(&b, coord("a3"), Color::Black));
        assert!(is_attacked(&b, coord("e5"), Color::Black));
        // The bishop blocks the diagonal behind itself.
        assert!(!is_attacked(&b, coord("d6"), Color::Black));
    }

    #[test]
    fn test_short_range_attacks() {
        let b = board([
            "........",
            "........",
            "........",
            "........",
            "....P...",
            "........",
            "....p...",
            ".....K..",
        ]);
        assert!(is_attacked(&b, coord("d5"), Color::White));
        assert!(is_attacked(&b, coord("f5"), Color::White));
        assert!(!is_attacked(&b, coord("e5"), Color::White));
        assert!(!is_attacked(&b, coord("d3"), Color::White));
        assert!(is_attacked(&b, coord("d1"), Color::Black));
        assert!(!is_attacked(&b, coord("d3"), Color::Black));
        assert!(is_attacked(&b, coord("e2"), Color::White));
        assert!(is_attacked(&b, coord("g2"), Color::White));
        assert!(!is_attacked(&b, coord("f3"), Color::Black));

        let b = board([
            "........",
            "........",
            "........",
            "........",
            "..n.....",
            "........",
            "........",
            "........",
        ]);
        for dst in ["a3", "a5", "b2", "b6", "d2", "d6", "e3", "e5"] {
            assert!(is_attacked(&b, coord(dst), Color::Black), "{}", dst);
        }
        assert!(!is_attacked(&b, coord("c5"), Color::Black));
        assert!(!is_attacked(&b, coord("d4"), Color::Black));
    }

    #[test]
    fn test_pin_detection() {
        let b = board([
            "....r...",
            "........",
            "........",
            "........",
            "....B...",
            "........",
            "........",
            "....K...",
        ]);
        let threats = pins_and_checks(&b, Color::White, coord("e1"));
        assert!(!threats.in_check());
        assert_eq!(threats.checks.as_slice(), &[]);
        assert_eq!(
            threats.pins.as_slice(),
            &[Pin {
                pos: coord("e4"),
                dir: Delta::new(0, -1),
            }]
        );
        assert_eq!(threats.pin_dir(coord("e4")), Some(Delta::new(0, -1)));
        assert_eq!(threats.pin_dir(coord("e1")), None);

        // Two shields on the ray, no pin.
        let b = board([
            "....r...",
            "........",
            "....N...",
            "........",
            "....B...",
            "........",
            "........",
            "....K...",
        ]);
        let threats = pins_and_checks(&b, Color::White, coord("e1"));
        assert!(threats.pins.is_empty());
        assert!(!threats.in_check());
    }

    #[test]
    fn test_check_detection() {
        let b = board([
            "....r...",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "....K...",
        ]);
        let threats = pins_and_checks(&b, Color::White, coord("e1"));
        assert_eq!(
            threats.checks.as_slice(),
            &[Check {
                pos: coord("e8"),
                dir: Delta::new(0, -1),
            }]
        );
        assert!(threats.in_check());

        // Knight checks carry the knight offset as direction.
        let b = board([
            "........",
            "........",
            "........",
            "........",
            "........",
            "...n....",
            "........",
            "....K...",
        ]);
        let threats = pins_and_checks(&b, Color::White, coord("e1"));
        assert_eq!(
            threats.checks.as_slice(),
            &[Check {
                pos: coord("d3"),
                dir: Delta::new(-1, -2),
            }]
        );

        // Pawn checks only from the two forward diagonals.
        let b = board([
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "...p....",
            "....K...",
        ]);
        assert!(pins_and_checks(&b, Color::White, coord("e1")).in_check());
        assert!(pins_and_checks(&b, Color::White, coord("c1")).in_check());
        // The square right ahead of the pawn is pushed to, not attacked.
        assert!(!pins_and_checks(&b, Color::White, coord("d1")).in_check());
        let b = board([
            "....k...",
            "...P....",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
        ]);
        assert!(pins_and_checks(&b, Color::Black, coord("e8")).in_check());
        assert!(!pins_and_checks(&b, Color::Black, coord("d8")).in_check());
    }

    #[test]
    fn test_double_check() {
        let b = board([
            "....r...",
            "........",
            "........",
            "b.......",
            "........",
            "........",
            "........",
            "....K...",
        ]);
        let threats = pins_and_checks(&b, Color::White, coord("e1"));
        assert_eq!(threats.checks.len(), 2);
        assert!(threats.in_check());
    }

    #[test]
    fn test_scan_sees_through_own_king() {
        let b = board([
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "r...K...",
        ]);
        // The king cannot step away along the checking ray: the scan runs
        // through the square the king still occupies.
        assert!(pins_and_checks(&b, Color::White, coord("f1")).in_check());
        assert!(pins_and_checks(&b, Color::White, coord("d1")).in_check());
        assert!(!pins_and_checks(&b, Color::White, coord("e2")).in_check());
        assert!(!pins_and_checks(&b, Color::White, coord("f2")).in_check());
    }
}
