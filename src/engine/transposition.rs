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

//! Transposition tables.
//!
//! A transposition table is a map from Zobrist hashes of positions to the
//! result of searching them, so that a position reached through different
//! move orders is only searched once. Each table is owned by a single search
//! invocation and never evicts; since the keys are already high-quality
//! 64-bit hashes, the map hashes them by identity.

use nohash_hasher::IntMap;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// How the stored value of an entry bounds the true value of its position.
pub enum Bound {
    /// The stored value is a lower bound (the search failed high).
    Lower,
    /// The stored value is exact.
    Exact,
    /// The stored value is an upper bound (the search failed low).
    Upper,
}

#[derive(Clone, Copy, Debug)]
/// One stored search result.
pub struct TableEntry {
    /// The value of the position, bounded as described by `bound`.
    pub value: i32,
    /// The kind of bound that `value` places on the position.
    pub bound: Bound,
    /// The remaining depth the position was searched to.
    pub depth: u8,
}

#[derive(Default)]
/// A table which stores search results, keyed by position hash.
pub struct TranspositionTable {
    entries: IntMap<u64, TableEntry>,
}

impl TranspositionTable {
    #[must_use]
    /// Construct a new, empty `TranspositionTable`.
    pub fn new() -> TranspositionTable {
        TranspositionTable {
            entries: IntMap::default(),
        }
    }

    #[inline(always)]
    #[must_use]
    /// Get the stored entry for a position hash, if there is one.
    pub fn get(&self, hash: u64) -> Option<&TableEntry> {
        self.entries.get(&hash)
    }

    /// Store an entry for a position hash, replacing any previous one.
    pub fn insert(&mut self, hash: u64, entry: TableEntry) {
        self.entries.insert(hash, entry);
    }

    #[must_use]
    /// Get the number of positions stored in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    /// Determine whether this table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
