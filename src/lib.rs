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

#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

//! Castor is a self-contained chess engine library: a bitboard board
//! representation, a fully legal move generator, and a fixed-depth
//! alpha-beta search with a tapered evaluation.
//!
//! The crate is split in two: [`base`] holds everything about the rules of
//! chess (boards, moves, legality, hashing), while [`engine`] holds
//! everything about playing it well (evaluation, search).
//!
//! # Examples
//!
//! Play the engine's choice of move from the starting position:
//!
//! ```
//! use castor::{
//!     base::{zobrist::ZOBRIST, Board},
//!     engine::search::search_root,
//! };
//!
//! let mut board = Board::new();
//! let (score, best) = search_root(&mut board, 3, &ZOBRIST);
//! let m = best.expect("the starting position has legal moves");
//! board.push(m);
//! println!("played {m} (score {score})");
//! ```

pub mod base;
pub mod engine;
