//! Zobrist hash keys.
//!
//! All keys come from a deterministic xorshift64* stream with a fixed
//! seed, so every run of the engine (and every test) sees the same keys.
//! Three key families are maintained incrementally by the board: the full
//! position key, a pawns-only key and a material-count key.

use once_cell::sync::Lazy;

use super::types::piece::{Color, Piece};
use super::types::square::Square;

/// Piece counts are clamped to 0..=10 for material signatures.
pub const MATERIAL_COUNT_MAX: usize = 10;

struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const fn new() -> Self {
        Xorshift64 {
            state: 88_172_645_463_325_252,
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(2_685_821_657_736_338_717)
    }
}

pub struct Keys {
    piece: [[[u64; 64]; 6]; 2],
    pawn: [[u64; 64]; 2],
    material: [[[u64; MATERIAL_COUNT_MAX + 1]; 6]; 2],
    castling: [u64; 16],
    en_passant: [u64; 8],
    turn: [u64; 2],
}

static KEYS: Lazy<Keys> = Lazy::new(|| {
    let mut rng = Xorshift64::new();
    let mut keys = Keys {
        piece: [[[0; 64]; 6]; 2],
        pawn: [[0; 64]; 2],
        material: [[[0; MATERIAL_COUNT_MAX + 1]; 6]; 2],
        castling: [0; 16],
        en_passant: [0; 8],
        turn: [0; 2],
    };

    for color in 0..2 {
        for pt in 0..6 {
            for sq in 0..64 {
                keys.piece[color][pt][sq] = rng.next();
            }
        }
        for sq in 0..64 {
            keys.pawn[color][sq] = rng.next();
        }
        for pt in 0..6 {
            for count in 0..=MATERIAL_COUNT_MAX {
                keys.material[color][pt][count] = rng.next();
            }
        }
    }
    for i in 0..16 {
        keys.castling[i] = rng.next();
    }
    for i in 0..8 {
        keys.en_passant[i] = rng.next();
    }
    keys.turn[0] = rng.next();
    keys.turn[1] = rng.next();

    keys
});

#[inline]
#[must_use]
pub fn piece_key(color: Color, pt: Piece, sq: Square) -> u64 {
    KEYS.piece[color.index()][pt.index()][sq]
}

#[inline]
#[must_use]
pub fn pawn_key(color: Color, sq: Square) -> u64 {
    KEYS.pawn[color.index()][sq]
}

/// Key for `color` owning exactly `count` pieces of type `pt`.
#[inline]
#[must_use]
pub fn material_key(color: Color, pt: Piece, count: usize) -> u64 {
    KEYS.material[color.index()][pt.index()][count.min(MATERIAL_COUNT_MAX)]
}

#[inline]
#[must_use]
pub fn castling_key(rights: u8) -> u64 {
    KEYS.castling[rights as usize & 0xF]
}

#[inline]
#[must_use]
pub fn en_passant_key(file: usize) -> u64 {
    KEYS.en_passant[file]
}

#[inline]
#[must_use]
pub fn turn_key(color: Color) -> u64 {
    KEYS.turn[color.index()]
}

pub fn init() {
    Lazy::force(&KEYS);
}
