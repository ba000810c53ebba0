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

//! Fixed-depth negamax search with alpha-beta pruning and a transposition
//! table.
//!
//! Every node evaluates the position from the perspective of the side to
//! move, negating the child's value; alpha and beta bound the window of
//! values worth distinguishing, and a child whose value proves the position
//! too good to be allowed by the opponent is cut off. The transposition
//! table stores the result (with its bound kind) of every searched node so
//! that transposed move orders are not re-searched.

use crate::base::{zobrist, zobrist::ZobristTable, Board, Move};

use super::evaluate::evaluation;
use super::transposition::{Bound, TableEntry, TranspositionTable};

/// The base score for delivering checkmate. Mates found higher in the tree
/// score slightly above this, so that shorter mates are preferred.
pub const MATE_VALUE: i32 = 30_000;

/// The largest representable score, used as the initial search window.
const INFINITY: i32 = i32::MAX - 1;

/// Search the game tree below `board` to the given remaining `depth`.
/// Returns the value of the position for the side to move. `hash` must be
/// the Zobrist hash of `board` under `table`.
///
/// The board is mutated during the search but always restored before the
/// call returns.
fn negamax(
    board: &mut Board,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    tt: &mut TranspositionTable,
    table: &ZobristTable,
    hash: u64,
) -> i32 {
    let alpha_orig = alpha;

    // a stored result from an equal or deeper search can narrow the window
    // or resolve the node outright
    if let Some(entry) = tt.get(hash) {
        if entry.depth >= depth {
            match entry.bound {
                Bound::Exact => return entry.value,
                Bound::Lower => alpha = alpha.max(entry.value),
                Bound::Upper => beta = beta.min(entry.value),
            }
            if alpha >= beta {
                return entry.value;
            }
        }
    }

    if board.is_insufficient_material() || board.is_fifty_moves() {
        return 0;
    }

    if depth == 0 {
        return evaluation(board);
    }

    let moves = board.legal_moves();
    if moves.is_empty() {
        if board.is_check() {
            // the side to move has been mated; mates further from the root
            // score closer to zero
            return -(MATE_VALUE + i32::from(depth));
        }
        // stalemate
        return 0;
    }

    let mut value = -INFINITY;
    for m in moves {
        let child_hash = zobrist::update(hash, board, m, table);
        board.push(m);
        value = value.max(-negamax(board, depth - 1, -beta, -alpha, tt, table, child_hash));
        board.pop();

        alpha = alpha.max(value);
        if alpha >= beta {
            break;
        }
    }

    let bound = if value <= alpha_orig {
        Bound::Upper
    } else if value >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    tt.insert(
        hash,
        TableEntry {
            value,
            bound,
            depth,
        },
    );

    value
}

#[must_use]
/// Search for the best move in `board`, looking `depth` plies ahead.
/// Returns the score of the position (in centipawns for the side to move,
/// or a mate score) together with the best move found.
///
/// Returns `(0, None)` if the side to move has no legal moves, whether by
/// checkmate or stalemate.
///
/// # Examples
///
/// ```
/// use castor::{base::{Board, zobrist::ZOBRIST}, engine::search::search_root};
///
/// let mut board = Board::new();
/// let (_, best) = search_root(&mut board, 3, &ZOBRIST);
/// assert!(best.is_some());
/// // the board comes back unchanged
/// assert_eq!(board, Board::new());
/// ```
pub fn search_root(board: &mut Board, depth: u8, table: &ZobristTable) -> (i32, Option<Move>) {
    let moves = board.legal_moves();
    if moves.is_empty() {
        return (0, None);
    }

    let mut alpha = -INFINITY;
    let beta = INFINITY;

    // the transposition table lives for exactly one search
    let mut tt = TranspositionTable::new();
    let root_hash = zobrist::hash(board, table);
    let child_depth = depth.saturating_sub(1);

    let mut best_move = moves[0];
    for m in moves {
        let child_hash = zobrist::update(root_hash, board, m, table);
        board.push(m);
        let score = -negamax(board, child_depth, -beta, -alpha, &mut tt, table, child_hash);
        board.pop();

        if score >= beta {
            // cannot happen with a full window, but mirrors the inner loop
            return (beta, Some(m));
        }
        if score > alpha {
            alpha = score;
            best_move = m;
        }
    }

    (alpha, Some(best_move))
}
