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

//! Precomputed attack tables.
//!
//! Step attacks (knight, king, pawn) are compile-time constant arrays.
//! Sliding attacks (bishop, rook, queen rays) are looked up by masked
//! occupancy: for each square and ray family, the relevant occupancy bits are
//! extracted with a mask, and the masked value indexes a per-square table
//! filled at startup by enumerating every subset of the mask with the
//! carry-rippler trick.

use nohash_hasher::IntMap;
use once_cell::sync::Lazy;

use super::{Bitboard, Direction, Square};

use std::convert::TryFrom;

/// A lookup table for the squares a knight can attack from a given square.
///
/// # Examples
///
/// ```
/// use castor::base::{attacks::KNIGHT_ATTACKS, Bitboard, Square};
///
/// let knight_attacks_a1 = Bitboard::EMPTY
///     .with_square(Square::C2)
///     .with_square(Square::B3);
///
/// assert_eq!(KNIGHT_ATTACKS[Square::A1 as usize], knight_attacks_a1);
/// ```
pub const KNIGHT_ATTACKS: [Bitboard; 64] = create_step_attacks(&Direction::KNIGHT_STEPS, 2);

/// A lookup table for the squares a king can attack from a given square.
pub const KING_ATTACKS: [Bitboard; 64] = create_step_attacks(&Direction::KING_STEPS, 1);

/// Lookup tables for the squares a pawn can attack from a given square,
/// indexed by the pawn's color.
///
/// This table does not include squares that pawns can move to by pushing
/// forward.
///
/// # Examples
///
/// ```
/// use castor::base::{attacks::PAWN_ATTACKS, Bitboard, Color, Square};
///
/// let attacked = Bitboard::EMPTY
///     .with_square(Square::A4)
///     .with_square(Square::C4);
///
/// // A white pawn on B3 attacks A4 and C4.
/// assert_eq!(PAWN_ATTACKS[Color::White as usize][Square::B3 as usize], attacked);
/// // A black pawn on B5 attacks A4 and C4.
/// assert_eq!(PAWN_ATTACKS[Color::Black as usize][Square::B5 as usize], attacked);
/// ```
pub const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    create_step_attacks(&[Direction::SOUTHEAST, Direction::SOUTHWEST], 1),
    create_step_attacks(&[Direction::NORTHEAST, Direction::NORTHWEST], 1),
];

/// Compute the absolute difference of two small signed integers.
const fn abs_diff(a: i8, b: i8) -> u8 {
    let d = a - b;
    if d < 0 {
        (-d) as u8
    } else {
        d as u8
    }
}

/// Get the step attacks that could be made by moving in `dirs` from each
/// square on the board.
///
/// Steps are rejected if they leave the board or travel a Chebyshev distance
/// greater than `max_dist` (this prevents wraparound around the edges of the
/// board).
const fn create_step_attacks(dirs: &[Direction], max_dist: u8) -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut i = 0usize;
    while i < 64 {
        let mut j = 0;
        while j < dirs.len() {
            let target = i as i8 + dirs[j].0;
            if 0 <= target && target < 64 {
                let rankdiff = abs_diff(target >> 3, (i as i8) >> 3);
                let filediff = abs_diff(target & 7, (i as i8) & 7);
                let dist = if rankdiff > filediff { rankdiff } else { filediff };
                if dist <= max_dist {
                    attacks[i] = Bitboard::new(attacks[i].as_u64() | 1 << target as u8);
                }
            }
            j += 1;
        }
        i += 1;
    }

    attacks
}

#[must_use]
/// Construct the squares attacked by a piece at `sq` moving along the
/// directions in `deltas` when the board is occupied by the pieces in
/// `occupied`. A blocking piece's square is included in the attack set.
///
/// This walks the rays step by step and is only used to build the lookup
/// tables; move generation goes through the tables.
pub fn sliding_attacks(sq: Square, occupied: Bitboard, deltas: &[Direction]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &delta in deltas {
        let mut prev = sq;
        loop {
            let next_int = i16::from(prev as u8) + i16::from(delta.0);
            if !(0..64).contains(&next_int) {
                break;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            // will not fail since the range was checked above
            let next = Square::try_from(next_int as u8).unwrap();
            if next.chebyshev_to(prev) > 2 {
                // the step wrapped around an edge of the board
                break;
            }
            attacks.insert(next);
            if occupied.contains(next) {
                break;
            }
            prev = next;
        }
    }

    attacks
}

/// Get the edge squares of the board relative to `sq`: the outer ranks and
/// files, excluding the rank and file that `sq` itself is on.
fn edges(sq: Square) -> Bitboard {
    #[allow(clippy::cast_possible_truncation)]
    let rank = Bitboard::RANK_1 << (8 * sq.rank() as u8);
    #[allow(clippy::cast_possible_truncation)]
    let file = Bitboard::FILE_A << sq.file() as u8;

    ((Bitboard::RANK_1 | Bitboard::RANK_8) & !rank) | ((Bitboard::FILE_A | Bitboard::FILE_H) & !file)
}

/// A family of sliding attacks along one kind of ray: diagonals, ranks, or
/// files. Attack sets are found by masking the occupancy down to the relevant
/// bits and looking the masked value up in a per-square map.
pub struct SlidingFamily {
    /// For each square, the blocker mask: the ray squares whose occupancy can
    /// affect attacks from that square (board edges excluded).
    masks: [Bitboard; 64],
    /// For each square, a map from masked occupancy to the attack set on that
    /// occupancy. The keys are raw `u64`s, hashed by identity.
    attacks: [IntMap<u64, Bitboard>; 64],
}

impl SlidingFamily {
    /// Build the family for the rays given by `deltas`, enumerating every
    /// subset of each square's blocker mask with the carry-rippler trick.
    fn new(deltas: &[Direction]) -> SlidingFamily {
        let mut masks = [Bitboard::EMPTY; 64];
        let mut attacks: [IntMap<u64, Bitboard>; 64] = std::array::from_fn(|_| IntMap::default());

        for (i, (mask_slot, attack_map)) in masks.iter_mut().zip(attacks.iter_mut()).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            // will not fail since i is in 0..64
            let sq = Square::try_from(i as u8).unwrap();
            let mask = sliding_attacks(sq, Bitboard::EMPTY, deltas) & !edges(sq);

            let mut subset = Bitboard::EMPTY;
            loop {
                attack_map.insert(subset.as_u64(), sliding_attacks(sq, subset, deltas));
                subset =
                    Bitboard::new(subset.as_u64().wrapping_sub(mask.as_u64()) & mask.as_u64());
                if subset.is_empty() {
                    break;
                }
            }

            *mask_slot = mask;
        }

        SlidingFamily { masks, attacks }
    }

    #[inline(always)]
    #[must_use]
    /// Get the blocker mask for attacks from `sq`.
    pub fn mask(&self, sq: Square) -> Bitboard {
        self.masks[sq as usize]
    }

    #[inline(always)]
    #[must_use]
    /// Look up the attacks from `sq` on the given occupancy.
    pub fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let key = (occupied & self.masks[sq as usize]).as_u64();
        // every subset of the mask was inserted at construction, so the key
        // is always present
        self.attacks[sq as usize][&key]
    }
}

/// The complete set of runtime-built attack tables: one sliding family per
/// ray kind, plus the line-through-two-squares table.
pub struct AttackTables {
    /// Diagonal and anti-diagonal rays (bishop motion).
    pub diag: SlidingFamily,
    /// File rays (vertical rook motion).
    pub file: SlidingFamily,
    /// Rank rays (horizontal rook motion).
    pub rank: SlidingFamily,
    /// For each ordered pair of collinear squares, the full line through
    /// both; empty for non-collinear pairs.
    rays: Vec<[Bitboard; 64]>,
}

impl AttackTables {
    fn new() -> AttackTables {
        let diag = SlidingFamily::new(&Direction::BISHOP_DIRECTIONS);
        let file = SlidingFamily::new(&Direction::FILE_DIRECTIONS);
        let rank = SlidingFamily::new(&Direction::RANK_DIRECTIONS);

        let mut rays = vec![[Bitboard::EMPTY; 64]; 64];
        for a in Bitboard::ALL {
            let bb_a = Bitboard::from(a);
            let diag_a = diag.attacks(a, Bitboard::EMPTY);
            let rank_a = rank.attacks(a, Bitboard::EMPTY);
            let file_a = file.attacks(a, Bitboard::EMPTY);
            for b in Bitboard::ALL {
                let bb_b = Bitboard::from(b);
                rays[a as usize][b as usize] = if diag_a.contains(b) {
                    (diag_a & diag.attacks(b, Bitboard::EMPTY)) | bb_a | bb_b
                } else if rank_a.contains(b) {
                    rank_a | bb_a
                } else if file_a.contains(b) {
                    file_a | bb_a
                } else {
                    Bitboard::EMPTY
                };
            }
        }

        AttackTables {
            diag,
            file,
            rank,
            rays,
        }
    }

    #[inline(always)]
    #[must_use]
    /// Get the full line through `a` and `b` (including both endpoints and
    /// extending to the board edges), or the empty set if the squares are not
    /// on a shared rank, file, or diagonal.
    pub fn ray(&self, a: Square, b: Square) -> Bitboard {
        self.rays[a as usize][b as usize]
    }

    #[inline(always)]
    #[must_use]
    /// Get the squares strictly between `a` and `b`, along the moves of a
    /// rook or bishop. Empty if the squares are not collinear.
    ///
    /// # Examples
    ///
    /// ```
    /// use castor::base::{attacks::ATTACKS, Bitboard, Square};
    ///
    /// assert_eq!(
    ///     ATTACKS.between(Square::A1, Square::A3),
    ///     Bitboard::from(Square::A2),
    /// );
    /// ```
    pub fn between(&self, a: Square, b: Square) -> Bitboard {
        let bb = self.ray(a, b) & ((Bitboard::ALL << a as u8) ^ (Bitboard::ALL << b as u8));
        // clear the lowest bit to make the interval strictly open
        Bitboard::new(bb.as_u64() & bb.as_u64().wrapping_sub(1))
    }
}

/// The process-wide attack tables. Built on first access and read-only
/// afterwards; `BaseBoard` construction forces the initialization.
pub static ATTACKS: Lazy<AttackTables> = Lazy::new(AttackTables::new);
