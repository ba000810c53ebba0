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

//! Board representation and legal move generation.

// Many module elements are re-exported to make names more ergonomic to access.

pub mod attacks;

mod baseboard;
pub use baseboard::BaseBoard;

mod bitboard;
pub use bitboard::Bitboard;

mod board;
pub use board::{Board, Outcome};

mod color;
pub use color::Color;

mod direction;
pub use direction::Direction;

mod moves;
pub use moves::Move;

pub mod perft;

mod piece;
pub use piece::Piece;

mod square;
pub use square::Square;

pub mod zobrist;
