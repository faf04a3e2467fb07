//! Square indices and coordinate helpers.
//!
//! Squares are numbered H1=0, G1=1, ..., A1=7, H2=8, ..., A8=63, so the
//! rank of a square is `sq >> 3` and the file is `sq & 7` with file H = 0.

use super::Color;

/// A square index in 0..64. `SQUARE_NONE` marks the absence of a square.
pub type Square = usize;

/// Sentinel square outside the board.
pub const SQUARE_NONE: Square = 64;

pub const SQUARE_COUNT: usize = 64;

// A few squares the castling machinery refers to by name.
pub const SQ_H1: Square = 0;
pub const SQ_G1: Square = 1;
pub const SQ_F1: Square = 2;
pub const SQ_E1: Square = 3;
pub const SQ_D1: Square = 4;
pub const SQ_C1: Square = 5;
pub const SQ_B1: Square = 6;
pub const SQ_A1: Square = 7;
pub const SQ_H8: Square = 56;
pub const SQ_G8: Square = 57;
pub const SQ_F8: Square = 58;
pub const SQ_E8: Square = 59;
pub const SQ_D8: Square = 60;
pub const SQ_C8: Square = 61;
pub const SQ_B8: Square = 62;
pub const SQ_A8: Square = 63;

/// Rank index (0-7, rank 1 = 0) of a square.
#[inline]
#[must_use]
pub const fn rank(sq: Square) -> usize {
    sq >> 3
}

/// File index (0-7, file H = 0) of a square.
#[inline]
#[must_use]
pub const fn file(sq: Square) -> usize {
    sq & 7
}

/// Build a square from file and rank indices.
#[inline]
#[must_use]
pub const fn square(file: usize, rank: usize) -> Square {
    file + rank * 8
}

/// Rank of `sq` seen from `color`'s side of the board.
#[inline]
#[must_use]
pub fn relative_rank(color: Color, sq: Square) -> usize {
    match color {
        Color::White => rank(sq),
        Color::Black => 7 - rank(sq),
    }
}

/// The square mirrored vertically for Black.
#[inline]
#[must_use]
pub fn relative_square(color: Color, sq: Square) -> Square {
    match color {
        Color::White => sq,
        Color::Black => 63 - sq,
    }
}

/// True if `sq` (possibly produced by signed arithmetic) is on the board.
#[inline]
#[must_use]
pub const fn sq_valid(sq: i32) -> bool {
    sq >= 0 && sq < 64
}

/// One step towards the opponent for the given color (+8 for White).
#[inline]
#[must_use]
pub const fn up(color: Color) -> i32 {
    match color {
        Color::White => 8,
        Color::Black => -8,
    }
}

/// One step towards the own back rank for the given color.
#[inline]
#[must_use]
pub const fn down(color: Color) -> i32 {
    match color {
        Color::White => -8,
        Color::Black => 8,
    }
}

/// Algebraic name ("a1".."h8") of a square.
#[must_use]
pub fn square_name(sq: Square) -> String {
    debug_assert!(sq < 64);
    let f = (b'h' - file(sq) as u8) as char;
    let r = (b'1' + rank(sq) as u8) as char;
    format!("{f}{r}")
}

/// Parse an algebraic square name. Returns `None` on anything that is not
/// a lowercase file letter followed by a rank digit.
#[must_use]
pub fn square_from_name(name: &str) -> Option<Square> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let f = bytes[0];
    let r = bytes[1];
    if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
        return None;
    }
    Some(square(7 - (f - b'a') as usize, (r - b'1') as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_layout() {
        assert_eq!(rank(SQ_H1), 0);
        assert_eq!(file(SQ_H1), 0);
        assert_eq!(rank(SQ_A8), 7);
        assert_eq!(file(SQ_A8), 7);
        assert_eq!(square(7, 0), SQ_A1);
        assert_eq!(square(3, 0), SQ_E1);
    }

    #[test]
    fn test_relative_rank() {
        assert_eq!(relative_rank(Color::White, SQ_E1), 0);
        assert_eq!(relative_rank(Color::Black, SQ_E1), 7);
        assert_eq!(relative_rank(Color::Black, SQ_E8), 0);
    }

    #[test]
    fn test_square_names() {
        assert_eq!(square_name(SQ_E1), "e1");
        assert_eq!(square_name(SQ_A8), "a8");
        assert_eq!(square_name(SQ_H1), "h1");
        assert_eq!(square_from_name("e1"), Some(SQ_E1));
        assert_eq!(square_from_name("a8"), Some(SQ_A8));
        assert_eq!(square_from_name("j9"), None);
        assert_eq!(square_from_name("e"), None);
    }

    #[test]
    fn test_name_round_trip() {
        for sq in 0..64 {
            assert_eq!(square_from_name(&square_name(sq)), Some(sq));
        }
    }
}
