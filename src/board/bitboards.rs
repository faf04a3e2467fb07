//! Precomputed attack and mask bitboards.
//!
//! Everything here is built once on first use and read-only afterwards.
//! The tables cover leaper attacks, empty-board slider attacks, the pawn
//! structure masks, the king-safety neighborhoods and the ray/line tables
//! used for pin detection.

use once_cell::sync::Lazy;

use super::magics;
use super::types::bitboard::{
    bit, shift_up, Bitboard, BB_FILE_A, BB_FILE_B, BB_FILE_C, BB_FILE_D, BB_FILE_E, BB_FILE_F,
    BB_FILE_G, BB_FILE_H, BB_RANK_1, BB_RANK_2, BB_RANK_3, BB_RANK_6, BB_RANK_7, BB_RANK_8,
};
use super::types::piece::Color;
use super::types::square::{file, rank, relative_rank, square_from_name, Square};

/// Files adjacent to a file, indexed by file (H = 0).
pub const ADJ_FILES: [Bitboard; 8] = [
    BB_FILE_G,
    BB_FILE_F | BB_FILE_H,
    BB_FILE_E | BB_FILE_G,
    BB_FILE_D | BB_FILE_F,
    BB_FILE_C | BB_FILE_E,
    BB_FILE_B | BB_FILE_D,
    BB_FILE_A | BB_FILE_C,
    BB_FILE_B,
];

/// The flank a king on the given file fights on, indexed by file (H = 0).
pub const KING_FLANK: [Bitboard; 8] = [
    BB_FILE_F | BB_FILE_G | BB_FILE_H,
    BB_FILE_E | BB_FILE_F | BB_FILE_G | BB_FILE_H,
    BB_FILE_E | BB_FILE_F | BB_FILE_G | BB_FILE_H,
    BB_FILE_C | BB_FILE_D | BB_FILE_E | BB_FILE_F,
    BB_FILE_C | BB_FILE_D | BB_FILE_E | BB_FILE_F,
    BB_FILE_A | BB_FILE_B | BB_FILE_C | BB_FILE_D,
    BB_FILE_A | BB_FILE_B | BB_FILE_C | BB_FILE_D,
    BB_FILE_A | BB_FILE_B | BB_FILE_C,
];

pub const CENTRAL_FILES: Bitboard = BB_FILE_D | BB_FILE_E;

/// The first three ranks from each color's side.
pub const COLOR_BASE_RANKS: [Bitboard; 2] = [
    BB_RANK_1 | BB_RANK_2 | BB_RANK_3,
    BB_RANK_8 | BB_RANK_7 | BB_RANK_6,
];

pub const PAWN_STARTRANK: [Bitboard; 2] = [BB_RANK_2, BB_RANK_7];
pub const PAWN_FIRST_PUSH_RANK: [Bitboard; 2] = [BB_RANK_3, BB_RANK_6];
pub const PAWN_FINALRANK: [Bitboard; 2] = [BB_RANK_8, BB_RANK_1];

/// The four central squares d4, d5, e4, e5.
pub static CENTRAL_SQUARES: Lazy<Bitboard> = Lazy::new(|| {
    bit(square_from_name("d4").unwrap())
        | bit(square_from_name("d5").unwrap())
        | bit(square_from_name("e4").unwrap())
        | bit(square_from_name("e5").unwrap())
});

static PAWN_ATTACKS: Lazy<[[Bitboard; 64]; 2]> = Lazy::new(|| {
    let mut attacks = [[0u64; 64]; 2];
    for sq in 0..64 {
        let b = bit(sq);
        attacks[0][sq] = ((b & !BB_FILE_A) << 9) | ((b & !BB_FILE_H) << 7);
        attacks[1][sq] = ((b & !BB_FILE_A) >> 7) | ((b & !BB_FILE_H) >> 9);
    }
    attacks
});

static KNIGHT_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut attacks = [0u64; 64];
    for sq in 0..64 {
        let b = bit(sq);
        attacks[sq] = ((b & !(BB_FILE_A | BB_RANK_8 | BB_RANK_7)) << 17)
            | ((b & !(BB_FILE_H | BB_RANK_8 | BB_RANK_7)) << 15)
            | ((b & !(BB_FILE_A | BB_FILE_B | BB_RANK_8)) << 10)
            | ((b & !(BB_FILE_H | BB_FILE_G | BB_RANK_8)) << 6)
            | ((b & !(BB_FILE_A | BB_FILE_B | BB_RANK_1)) >> 6)
            | ((b & !(BB_FILE_H | BB_FILE_G | BB_RANK_1)) >> 10)
            | ((b & !(BB_FILE_A | BB_RANK_1 | BB_RANK_2)) >> 15)
            | ((b & !(BB_FILE_H | BB_RANK_1 | BB_RANK_2)) >> 17);
    }
    attacks
});

static KING_ATTACKS: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut attacks = [0u64; 64];
    for sq in 0..64 {
        let b = bit(sq);
        attacks[sq] = ((b & !(BB_FILE_A | BB_RANK_8)) << 9)
            | ((b & !BB_RANK_8) << 8)
            | ((b & !(BB_FILE_H | BB_RANK_8)) << 7)
            | ((b & !BB_FILE_A) << 1)
            | ((b & !BB_FILE_H) >> 1)
            | ((b & !(BB_FILE_A | BB_RANK_1)) >> 7)
            | ((b & !BB_RANK_1) >> 8)
            | ((b & !(BB_FILE_H | BB_RANK_1)) >> 9);
    }
    attacks
});

/// Empty-board pseudo attacks for the sliders, used by check info,
/// the ray/line construction and the material-signature helpers.
static BISHOP_PSEUDO: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut attacks = [0u64; 64];
    for sq in 0..64 {
        attacks[sq] = magics::bishop_attacks(sq, 0);
    }
    attacks
});

static ROOK_PSEUDO: Lazy<[Bitboard; 64]> = Lazy::new(|| {
    let mut attacks = [0u64; 64];
    for sq in 0..64 {
        attacks[sq] = magics::rook_attacks(sq, 0);
    }
    attacks
});

struct PawnMasks {
    attack_span: [[Bitboard; 64]; 2],
    shelter_span: [[Bitboard; 64]; 2],
    king_ring: [[Bitboard; 64]; 2],
    front_file: [[Bitboard; 64]; 2],
    passed: [[Bitboard; 64]; 2],
    backward: [[Bitboard; 64]; 2],
}

static PAWN_MASKS: Lazy<PawnMasks> = Lazy::new(|| {
    let mut m = PawnMasks {
        attack_span: [[0; 64]; 2],
        shelter_span: [[0; 64]; 2],
        king_ring: [[0; 64]; 2],
        front_file: [[0; 64]; 2],
        passed: [[0; 64]; 2],
        backward: [[0; 64]; 2],
    };

    for sq in 0..64 {
        let mut front_w = 0u64;
        let mut front_b = 0u64;
        for i in 1..6 {
            front_w |= bit(sq) << (i * 8);
            front_b |= bit(sq) >> (i * 8);
        }

        m.attack_span[0][sq] = ((front_w & !BB_FILE_A) << 1) | ((front_w & !BB_FILE_H) >> 1);
        m.attack_span[1][sq] = ((front_b & !BB_FILE_A) << 1) | ((front_b & !BB_FILE_H) >> 1);
        m.shelter_span[0][sq] = m.attack_span[0][sq] | front_w;
        m.shelter_span[1][sq] = m.attack_span[1][sq] | front_b;

        for color in [Color::White, Color::Black] {
            let mut ring = KING_ATTACKS[sq];
            if relative_rank(color, sq) == 0 {
                ring |= shift_up(ring, color);
            }
            // Widen on the board edge so the ring always spans three files.
            if file(sq) == 0 {
                ring |= ring << 1;
            }
            if file(sq) == 7 {
                ring |= ring >> 1;
            }
            m.king_ring[color.index()][sq] = ring;
        }

        for i in 1..8 {
            let up = bit(sq) << (8 * i);
            m.front_file[0][sq] |= up;
            if up & BB_RANK_8 != 0 {
                break;
            }
        }
        for i in 1..8 {
            let down = bit(sq) >> (8 * i);
            m.front_file[1][sq] |= down;
            if down & BB_RANK_1 != 0 {
                break;
            }
        }
    }

    for sq in 0..64 {
        let f = file(sq);
        let r = rank(sq);

        m.passed[0][sq] = m.front_file[0][sq]
            | if f != 0 { m.front_file[0][sq - 1] } else { 0 }
            | if f != 7 { m.front_file[0][sq + 1] } else { 0 };
        m.passed[1][sq] = m.front_file[1][sq]
            | if f != 0 { m.front_file[1][sq - 1] } else { 0 }
            | if f != 7 { m.front_file[1][sq + 1] } else { 0 };

        m.backward[0][sq] = if r != 0 {
            (if f != 0 { m.front_file[1][sq - 9] } else { 0 })
                | (if f != 7 { m.front_file[1][sq - 7] } else { 0 })
        } else {
            0
        };
        m.backward[1][sq] = if r != 7 {
            (if f != 0 { m.front_file[0][sq + 7] } else { 0 })
                | (if f != 7 { m.front_file[0][sq + 9] } else { 0 })
        } else {
            0
        };
    }

    m
});

struct LineTables {
    ray: Vec<[Bitboard; 64]>,
    line: Vec<[Bitboard; 64]>,
}

static LINES: Lazy<LineTables> = Lazy::new(|| {
    let mut t = LineTables {
        ray: vec![[0u64; 64]; 64],
        line: vec![[0u64; 64]; 64],
    };

    for sq1 in 0..64 {
        for sq2 in 0..64 {
            if BISHOP_PSEUDO[sq1] & bit(sq2) != 0 {
                t.ray[sq1][sq2] = (magics::bishop_attacks(sq1, bit(sq2))
                    & magics::bishop_attacks(sq2, bit(sq1)))
                    | bit(sq2);
                t.line[sq1][sq2] =
                    (BISHOP_PSEUDO[sq1] & BISHOP_PSEUDO[sq2]) | bit(sq1) | bit(sq2);
            } else if ROOK_PSEUDO[sq1] & bit(sq2) != 0 {
                t.ray[sq1][sq2] = (magics::rook_attacks(sq1, bit(sq2))
                    & magics::rook_attacks(sq2, bit(sq1)))
                    | bit(sq2);
                t.line[sq1][sq2] = (ROOK_PSEUDO[sq1] & ROOK_PSEUDO[sq2]) | bit(sq1) | bit(sq2);
            }
        }
    }

    t
});

static KING_DISTANCE: Lazy<Vec<[u8; 64]>> = Lazy::new(|| {
    let mut dist = vec![[0u8; 64]; 64];
    for a in 0..64 {
        for b in 0..64 {
            let df = (file(a) as i32 - file(b) as i32).abs();
            let dr = (rank(a) as i32 - rank(b) as i32).abs();
            dist[a][b] = df.max(dr) as u8;
        }
    }
    dist
});

#[inline]
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq]
}

#[inline]
#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq]
}

#[inline]
#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq]
}

/// Empty-board bishop attacks.
#[inline]
#[must_use]
pub fn bishop_pseudo(sq: Square) -> Bitboard {
    BISHOP_PSEUDO[sq]
}

/// Empty-board rook attacks.
#[inline]
#[must_use]
pub fn rook_pseudo(sq: Square) -> Bitboard {
    ROOK_PSEUDO[sq]
}

/// Every square a pawn on `sq` could ever attack on its way up the board.
#[inline]
#[must_use]
pub fn pawn_attack_span(color: Color, sq: Square) -> Bitboard {
    PAWN_MASKS.attack_span[color.index()][sq]
}

/// The three (two on the edge) files ahead of a king on `sq`.
#[inline]
#[must_use]
pub fn king_shelter_span(color: Color, sq: Square) -> Bitboard {
    PAWN_MASKS.shelter_span[color.index()][sq]
}

/// The king neighborhood, widened on board edges.
#[inline]
#[must_use]
pub fn king_ring(color: Color, sq: Square) -> Bitboard {
    PAWN_MASKS.king_ring[color.index()][sq]
}

/// Squares strictly ahead of `sq` on its file.
#[inline]
#[must_use]
pub fn front_file(color: Color, sq: Square) -> Bitboard {
    PAWN_MASKS.front_file[color.index()][sq]
}

/// Squares an enemy pawn must occupy to stop a pawn on `sq` from passing.
#[inline]
#[must_use]
pub fn passed_pawn_mask(color: Color, sq: Square) -> Bitboard {
    PAWN_MASKS.passed[color.index()][sq]
}

#[inline]
#[must_use]
pub fn backward_pawn_mask(color: Color, sq: Square) -> Bitboard {
    PAWN_MASKS.backward[color.index()][sq]
}

/// The ray from `a` through `b`: exclusive of `a`, inclusive of `b`.
/// Empty if the squares do not share a rook or bishop line.
#[inline]
#[must_use]
pub fn ray(a: Square, b: Square) -> Bitboard {
    LINES.ray[a][b]
}

/// The full line containing both squares, or empty if not colinear.
#[inline]
#[must_use]
pub fn line(a: Square, b: Square) -> Bitboard {
    LINES.line[a][b]
}

/// Chebyshev distance between two squares.
#[inline]
#[must_use]
pub fn king_distance(a: Square, b: Square) -> i32 {
    i32::from(KING_DISTANCE[a][b])
}

/// Attacks of every pawn on `pawns` at once.
#[inline]
#[must_use]
pub fn pawns_attacks(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => ((pawns & !BB_FILE_A) << 9) | ((pawns & !BB_FILE_H) << 7),
        Color::Black => ((pawns & !BB_FILE_A) >> 7) | ((pawns & !BB_FILE_H) >> 9),
    }
}

/// Force every table. Called once at startup so the first search does not
/// pay initialization cost.
pub fn init() {
    magics::init();
    Lazy::force(&PAWN_ATTACKS);
    Lazy::force(&KNIGHT_ATTACKS);
    Lazy::force(&KING_ATTACKS);
    Lazy::force(&BISHOP_PSEUDO);
    Lazy::force(&ROOK_PSEUDO);
    Lazy::force(&PAWN_MASKS);
    Lazy::force(&LINES);
    Lazy::force(&KING_DISTANCE);
    Lazy::force(&CENTRAL_SQUARES);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::square::square_from_name;

    fn sq(name: &str) -> Square {
        square_from_name(name).unwrap()
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(
            pawn_attacks(Color::White, sq("e4")),
            bit(sq("d5")) | bit(sq("f5"))
        );
        assert_eq!(
            pawn_attacks(Color::Black, sq("e4")),
            bit(sq("d3")) | bit(sq("f3"))
        );
        // Edge files only attack inward.
        assert_eq!(pawn_attacks(Color::White, sq("a2")), bit(sq("b3")));
        assert_eq!(pawn_attacks(Color::White, sq("h2")), bit(sq("g3")));
    }

    #[test]
    fn test_knight_attacks_center_and_corner() {
        assert_eq!(knight_attacks(sq("e4")).count_ones(), 8);
        assert_eq!(knight_attacks(sq("a1")).count_ones(), 2);
        assert!(knight_attacks(sq("a1")) & bit(sq("b3")) != 0);
        assert!(knight_attacks(sq("a1")) & bit(sq("c2")) != 0);
    }

    #[test]
    fn test_king_ring_widened_on_edges() {
        // In the middle of the board the ring is the plain neighborhood.
        assert_eq!(king_ring(Color::White, sq("e4")), king_attacks(sq("e4")));
        // On the back rank it is pushed one rank up.
        let ring = king_ring(Color::White, sq("g1"));
        assert!(ring & bit(sq("g3")) != 0);
        // In the corner it also spans a third file.
        let corner = king_ring(Color::White, sq("h1"));
        assert!(corner & bit(sq("f1")) != 0);
        assert!(corner & bit(sq("f3")) != 0);
    }

    #[test]
    fn test_front_file_and_passed_mask() {
        assert_eq!(
            front_file(Color::White, sq("e2")),
            bit(sq("e3")) | bit(sq("e4")) | bit(sq("e5")) | bit(sq("e6")) | bit(sq("e7")) | bit(sq("e8"))
        );
        let mask = passed_pawn_mask(Color::White, sq("e5"));
        for name in ["d6", "e6", "f6", "d7", "e7", "f7"] {
            assert!(mask & bit(sq(name)) != 0, "{name} missing");
        }
        assert_eq!(mask & bit(sq("e5")), 0);
        assert_eq!(mask & bit(sq("d5")), 0);
    }

    #[test]
    fn test_ray_and_line() {
        // Ray is exclusive of the start, inclusive of the end.
        let r = ray(sq("a1"), sq("d4"));
        assert_eq!(r, bit(sq("b2")) | bit(sq("c3")) | bit(sq("d4")));
        assert_eq!(ray(sq("a1"), sq("b3")), 0);

        let l = line(sq("a1"), sq("c3"));
        assert!(l & bit(sq("a1")) != 0);
        assert!(l & bit(sq("h8")) != 0);
    }

    #[test]
    fn test_king_distance() {
        assert_eq!(king_distance(sq("a1"), sq("h8")), 7);
        assert_eq!(king_distance(sq("e4"), sq("e4")), 0);
        assert_eq!(king_distance(sq("e4"), sq("f6")), 2);
    }

    #[test]
    fn test_pawns_attacks_bulk() {
        let pawns = bit(sq("a2")) | bit(sq("e4"));
        let attacks = pawns_attacks(pawns, Color::White);
        assert_eq!(attacks, bit(sq("b3")) | bit(sq("d5")) | bit(sq("f5")));
    }
}
