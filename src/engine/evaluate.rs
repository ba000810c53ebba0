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

//! Static evaluation of positions.
//!
//! The evaluation is "tapered": a middlegame and an endgame score are
//! computed side by side from material and piece-square tables, then blended
//! by how much material remains on the board. Scores are in centipawns from
//! the perspective of the side to move, so a positive score always favors
//! the mover.

use crate::base::{Board, Piece};

use super::pst::{
    EG_PIECE_VALUES, ENDGAME_TABLES, MG_PIECE_VALUES, MIDGAME_TABLES, PHASE_WEIGHTS, TOTAL_PHASE,
};

#[must_use]
/// Statically evaluate a position, in centipawns, from the perspective of
/// the player to move.
///
/// The mover's pieces index the white-oriented piece-square tables through
/// the mirrored square (`63 - sq`); the opponent's pieces index directly.
/// The mirror flips files as well as ranks, so pieces standing off the
/// central axis (notably the kings and queens at home) contribute a small
/// positional asymmetry even in the starting position.
///
/// # Examples
///
/// ```
/// use castor::{base::Board, engine::evaluate::evaluation};
///
/// // material is even at the start; only small positional terms remain
/// assert!(evaluation(&Board::new()).abs() < 100);
/// ```
pub fn evaluation(board: &Board) -> i32 {
    let us = board.turn;
    let them = !us;

    let mut mg_value = 0;
    let mut eg_value = 0;
    let mut game_phase = 0;

    for piece in Piece::ALL {
        let pt = piece as usize;
        let ours = board.pieces_mask(piece, us);
        let theirs = board.pieces_mask(piece, them);

        // material
        let balance = i32::from(ours.len()) - i32::from(theirs.len());
        mg_value += MG_PIECE_VALUES[pt] * balance;
        eg_value += EG_PIECE_VALUES[pt] * balance;

        game_phase += PHASE_WEIGHTS[pt] * i32::from(board.piece_bb(piece).len());

        // piece-square bonuses
        for sq in ours {
            mg_value += MIDGAME_TABLES[pt][sq.mirrored() as usize];
            eg_value += ENDGAME_TABLES[pt][sq.mirrored() as usize];
        }
        for sq in theirs {
            mg_value -= MIDGAME_TABLES[pt][sq as usize];
            eg_value -= ENDGAME_TABLES[pt][sq as usize];
        }
    }

    // blend by remaining material; early promotions can push the raw phase
    // above the cap
    let mg_phase = game_phase.min(TOTAL_PHASE);
    let eg_phase = TOTAL_PHASE - mg_phase;

    (mg_value * mg_phase + eg_value * eg_phase) / TOTAL_PHASE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// The starting material is even, so only small piece-square terms
    /// remain.
    fn startpos_is_nearly_balanced() {
        assert!(evaluation(&Board::new()).abs() < 100);
    }

    #[test]
    /// When every piece faces its mirror image across the board's center,
    /// the mover's mirrored lookups cancel the opponent's direct lookups
    /// exactly.
    fn mirror_symmetric_kings_score_zero() {
        // the mirror of D1 is E8
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3K4 w - - 0 1").unwrap();
        assert_eq!(evaluation(&board), 0);
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3K4 b - - 0 1").unwrap();
        assert_eq!(evaluation(&board), 0);
    }

    #[test]
    fn extra_queen_scores_high() {
        // White has an extra queen and is to move
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert!(evaluation(&board) > 800);
    }

    #[test]
    /// The score is always from the mover's perspective: a queen-down player
    /// to move sees a deeply negative score.
    fn perspective_flips_with_turn() {
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert!(evaluation(&board) < -800);
    }

    #[test]
    /// Pushing and popping a move leaves the evaluation untouched.
    fn evaluation_is_stateless() {
        let mut board =
            Board::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 4 3")
                .unwrap();
        let before = evaluation(&board);
        board.push_uci("f3e5").unwrap();
        board.pop();
        assert_eq!(evaluation(&board), before);
    }

    #[test]
    /// An endgame with one bare extra pawn is judged with the endgame
    /// values.
    fn lone_pawn_endgame_uses_endgame_weights() {
        let board = Board::from_fen("8/8/4k3/8/8/4P3/4K3/8 w - - 0 1").unwrap();
        let score = evaluation(&board);
        // a pawn up, give or take king placement
        assert!(score > 0, "score was {score}");
    }
}
