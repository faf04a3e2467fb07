//! FEN parsing and emission, and long-algebraic move parsing.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::{Board, BLACK_LONG, BLACK_SHORT, WHITE_LONG, WHITE_SHORT};
use super::types::bitboard::bit;
use super::types::moves::Move;
use super::types::piece::{Color, Piece};
use super::types::square::{square, square_from_name, square_name, SQUARE_NONE};

impl Board {
    /// Set the position from a FEN string. On error the board is left in
    /// an unspecified state; callers that need atomicity parse into a
    /// scratch board first.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        self.clear();

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // Piece placement, rank 8 first, files from 'a'.
        for (row, row_str) in parts[0].split('/').enumerate() {
            if row >= 8 {
                return Err(FenError::TooManyRanks);
            }
            let mut f = 0usize;
            for c in row_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    f += skip as usize;
                } else {
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let pt = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if f >= 8 {
                        return Err(FenError::TooManyFiles { rank: row });
                    }
                    let sq = 63 - square(f, row);
                    self.place_piece(color, pt, sq);
                    f += 1;
                }
            }
            if f > 8 {
                return Err(FenError::TooManyFiles { rank: row });
            }
        }

        if self.colored(Color::White, Piece::King).count_ones() != 1
            || self.colored(Color::Black, Piece::King).count_ones() != 1
        {
            return Err(FenError::BadKingCount);
        }

        self.stm = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for c in parts[2].chars() {
            match c {
                'K' => self.state.castling |= WHITE_SHORT,
                'Q' => self.state.castling |= WHITE_LONG,
                'k' => self.state.castling |= BLACK_SHORT,
                'q' => self.state.castling |= BLACK_LONG,
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }

        self.state.en_passant = if parts[3] == "-" {
            SQUARE_NONE
        } else {
            square_from_name(parts[3]).ok_or_else(|| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?
        };

        self.state.fifty_moves = parts.get(4).and_then(|p| p.parse().ok()).unwrap_or(0);
        let fullmove: usize = parts.get(5).and_then(|p| p.parse().ok()).unwrap_or(1);
        self.ply = fullmove.saturating_sub(1) * 2 + usize::from(self.stm == Color::Black);

        self.update_check_info();
        self.calc_keys();

        Ok(())
    }

    /// Parse a FEN into a fresh board.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        board.set_fen(fen)?;
        Ok(board)
    }

    /// Emit the position as a FEN string.
    #[must_use]
    pub fn get_fen(&self) -> String {
        let mut fen = String::new();

        for r in (0..8).rev() {
            let mut empty = 0;
            for f in (0..8).rev() {
                let sq = square(f, r);
                match self.piece_on(sq) {
                    None => empty += 1,
                    Some(pt) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(pt.to_fen_char(self.owner(sq)));
                    }
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if r > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.stm == Color::White { 'w' } else { 'b' });
        fen.push(' ');

        if self.state.castling == 0 {
            fen.push('-');
        } else {
            if self.can_castle(WHITE_SHORT) {
                fen.push('K');
            }
            if self.can_castle(WHITE_LONG) {
                fen.push('Q');
            }
            if self.can_castle(BLACK_SHORT) {
                fen.push('k');
            }
            if self.can_castle(BLACK_LONG) {
                fen.push('q');
            }
        }

        fen.push(' ');
        if self.state.en_passant != SQUARE_NONE {
            fen.push_str(&square_name(self.state.en_passant));
        } else {
            fen.push('-');
        }

        fen.push_str(&format!(" {} {}", self.state.fifty_moves, self.ply / 2 + 1));
        fen
    }

    /// Parse a move in UCI long algebraic notation ("e2e4", "e7e8q") and
    /// resolve it against the legal moves of the current position.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        if text.len() < 4 || text.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: text.len() });
        }

        let from = square_from_name(&text[0..2]).ok_or_else(|| MoveParseError::InvalidSquare {
            notation: text.to_string(),
        })?;
        let to = square_from_name(&text[2..4]).ok_or_else(|| MoveParseError::InvalidSquare {
            notation: text.to_string(),
        })?;

        let promotion = if text.len() == 5 {
            let c = text.as_bytes()[4] as char;
            let pt = Piece::from_char(c).ok_or(MoveParseError::InvalidPromotion { char: c })?;
            if matches!(pt, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: c });
            }
            Some(pt)
        } else {
            None
        };

        for &mv in self.generate_legal().iter() {
            let promo = if mv.is_promotion() {
                Some(mv.promotion_piece())
            } else {
                None
            };
            if mv.from_sq() == from && mv.to_sq() == to && promo == promotion {
                return Ok(mv);
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: text.to_string(),
        })
    }

    /// Raw placement used by FEN loading; keys are computed afterwards.
    fn place_piece(&mut self, color: Color, pt: Piece, sq: usize) {
        use crate::eval::pst::{material_value, psqt};

        self.bb_colors[color.index()] |= bit(sq);
        self.bb_colors[2] |= bit(sq);
        self.bb_pieces[pt.index()] |= bit(sq);
        self.piece_on[sq] = Some(pt);
        self.piece_counts[color.index()][pt.index()] += 1;
        self.state.material[color.index()] += material_value(pt);
        self.state.pst[color.index()] += psqt(color, pt, sq);
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}
