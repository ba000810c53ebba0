/*
  Castor, a chess engine library.
  Copyright (C) 2024 The Castor Authors.

  Castor is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Castor is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! Pieces, which contain no information about their color or current square.

use std::fmt::{Display, Formatter, Result};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
/// The type of a piece.
/// This contains no information about the location of a piece, or of its
/// color.
///
/// The ordering of the variants is intentional: the discriminant of each
/// piece is the index of its bitboard in the board representation, and also
/// its index into the Zobrist key and evaluation tables.
pub enum Piece {
    /// A pawn, which can only move forward and capture diagonally.
    Pawn = 0,
    /// A knight, which can move in an L-shape (two squares out, then one
    /// square sideways).
    Knight,
    /// A bishop, which can move arbitrarily far diagonally.
    Bishop,
    /// A rook, which can move arbitrarily far horizontally or vertically.
    Rook,
    /// A queen, which can move like both a rook and a bishop.
    Queen,
    /// A king, which can move one square in any direction.
    King,
}

impl Piece {
    /// Total number of piece types.
    pub const NUM: usize = 6;

    /// Array containing all piece types.
    pub const ALL: [Piece; Piece::NUM] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// The types of pieces that a pawn can be promoted to, in the order that
    /// promotion moves are generated.
    pub const PROMOTING: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    #[must_use]
    /// Get the FEN code of this piece as an uppercase character.
    pub const fn code(self) -> char {
        match self {
            Piece::Pawn => 'P',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
            Piece::King => 'K',
        }
    }

    #[must_use]
    /// Given a FEN character, convert it to a piece type. Must be uppercase.
    pub const fn from_code(c: char) -> Option<Piece> {
        match c {
            'P' => Some(Piece::Pawn),
            'N' => Some(Piece::Knight),
            'B' => Some(Piece::Bishop),
            'R' => Some(Piece::Rook),
            'Q' => Some(Piece::Queen),
            'K' => Some(Piece::King),
            _ => None,
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for pt in Piece::ALL {
            assert_eq!(Piece::from_code(pt.code()), Some(pt));
        }
        assert_eq!(Piece::from_code('x'), None);
    }
}
