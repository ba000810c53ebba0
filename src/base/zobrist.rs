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

//! Zobrist hash keys for boards.
//!
//! Every position feature (a piece on a square, a castling right, an en
//! passant file, the side to move) gets a random 64-bit key, and a position's
//! hash is the xor of the keys of its features. Because xor is its own
//! inverse, the hash can be updated incrementally when a move is played.

use once_cell::sync::Lazy;

use super::{Bitboard, Board, Color, Move, Piece, Square};

/// The random keys for every board feature.
pub struct ZobristTable {
    /// Keys for a piece of a color on a square, indexed
    /// `[square][piece][color]`.
    pieces: [[[u64; 2]; Piece::NUM]; 64],
    /// Keys for the castling rights, one per rook home corner in the order
    /// A1, A8, H1, H8.
    castling: [u64; 4],
    /// Keys for the en passant square, one per file.
    ep_files: [u64; 8],
    /// The key toggled in whenever Black is to move.
    black_to_move: u64,
}

impl ZobristTable {
    #[must_use]
    /// Create a table of fresh random keys. The generator is seeded from
    /// system entropy, so every table drawn in a process is distinct; use the
    /// shared `ZOBRIST` instance when hashes must agree.
    pub fn new() -> ZobristTable {
        let mut pieces = [[[0u64; 2]; Piece::NUM]; 64];
        for square_keys in &mut pieces {
            for piece_keys in square_keys.iter_mut() {
                for key in piece_keys.iter_mut() {
                    *key = fastrand::u64(..);
                }
            }
        }

        let mut castling = [0u64; 4];
        for key in &mut castling {
            *key = fastrand::u64(..);
        }

        let mut ep_files = [0u64; 8];
        for key in &mut ep_files {
            *key = fastrand::u64(..);
        }

        ZobristTable {
            pieces,
            castling,
            ep_files,
            black_to_move: fastrand::u64(..),
        }
    }

    #[inline(always)]
    fn piece_key(&self, sq: Square, piece: Piece, color: Color) -> u64 {
        self.pieces[sq as usize][piece as usize][color as usize]
    }

    #[inline(always)]
    fn castling_key(&self, corner: Square) -> u64 {
        match corner {
            Square::A1 => self.castling[0],
            Square::A8 => self.castling[1],
            Square::H1 => self.castling[2],
            Square::H8 => self.castling[3],
            // castling rights only ever hold corner squares
            _ => unreachable!(),
        }
    }

    #[inline(always)]
    fn ep_key(&self, sq: Square) -> u64 {
        self.ep_files[sq.file()]
    }
}

impl Default for ZobristTable {
    fn default() -> ZobristTable {
        ZobristTable::new()
    }
}

/// The process-wide Zobrist table, drawn once at first use.
pub static ZOBRIST: Lazy<ZobristTable> = Lazy::new(ZobristTable::new);

#[must_use]
/// Compute the hash of a board from scratch.
pub fn hash(board: &Board, table: &ZobristTable) -> u64 {
    let mut hash = 0;

    for sq in board.occupied {
        // occupied squares always hold a typed, colored piece
        let piece = board.piece_type_at(sq).unwrap();
        let color = board.color_at(sq).unwrap();
        hash ^= table.piece_key(sq, piece, color);
    }

    for corner in board.castling_rights & Bitboard::CORNERS {
        hash ^= table.castling_key(corner);
    }

    if let Some(ep_square) = board.ep_square {
        hash ^= table.ep_key(ep_square);
    }

    if board.turn == Color::Black {
        hash ^= table.black_to_move;
    }

    hash
}

#[must_use]
/// Compute the hash of the position reached by playing `m` on `board`,
/// given the hash of `board` itself. Must be called *before* the move is
/// pushed. Behavior on an illegal move is unspecified.
///
/// The result always equals `hash(&pushed_board, table)`, which makes the
/// update cheap to verify in tests.
pub fn update(hash: u64, board: &Board, m: Move, table: &ZobristTable) -> u64 {
    let mut hash = hash;
    let turn = board.turn;
    let from_piece = board
        .piece_type_at(m.from_square)
        .expect("hash update for a move with an empty origin square");
    let mut capture_piece = board.piece_type_at(m.to_square);
    let mut is_ep_capture = false;

    // toggle out the old en passant file, if any
    if let Some(prev_ep) = board.ep_square {
        hash ^= table.ep_key(prev_ep);
    }

    // the mover leaves its square
    hash ^= table.piece_key(m.from_square, from_piece, turn);

    // rights are lost for every touched rook home corner, and a king move
    // forfeits whatever remains on the mover's back rank
    let touched = Bitboard::from(m.from_square) | Bitboard::from(m.to_square);
    for corner in board.castling_rights & Bitboard::CORNERS & touched {
        hash ^= table.castling_key(corner);
    }
    if from_piece == Piece::King {
        for corner in board.castling_rights & Bitboard::CORNERS & turn.backrank() & !touched {
            hash ^= table.castling_key(corner);
        }
    }

    if from_piece == Piece::Pawn {
        let diff = m.to_square as i8 - m.from_square as i8;
        if diff.abs() == 16 {
            // double push: toggle in the new en passant file
            hash ^= table.ep_key(m.from_square);
        } else if board.ep_square == Some(m.to_square)
            && (diff.abs() == 7 || diff.abs() == 9)
            && capture_piece.is_none()
        {
            // en passant: the captured pawn stands behind the target
            let capture_square = m.to_square + -turn.pawn_direction();
            hash ^= table.piece_key(capture_square, Piece::Pawn, !turn);
            capture_piece = Some(Piece::Pawn);
            is_ep_capture = true;
        }
    }

    // castling relocates the rook from its corner to the king's side
    if from_piece == Piece::King && m.from_square.file_distance(m.to_square) > 1 {
        let a_side = m.to_square.file() < m.from_square.file();
        let rank = m.from_square.rank();
        let (corner_file, rook_file) = if a_side { (0, 3) } else { (7, 5) };
        // these unwraps cannot fail: the file indices are below 8
        hash ^= table.piece_key(Square::new(rank, corner_file).unwrap(), Piece::Rook, turn);
        hash ^= table.piece_key(Square::new(rank, rook_file).unwrap(), Piece::Rook, turn);
    }

    // an ordinary capture disappears from the target square
    if let Some(captured) = capture_piece {
        if !is_ep_capture {
            hash ^= table.piece_key(m.to_square, captured, !turn);
        }
    }

    // the mover (or its promotion) arrives
    hash ^= table.piece_key(m.to_square, m.promotion.unwrap_or(from_piece), turn);

    hash ^ table.black_to_move
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Play out the given UCI moves, checking after each that the
    /// incremental update agrees with hashing from scratch.
    fn update_helper(fen: &str, uci_moves: &[&str]) {
        let table = ZobristTable::new();
        let mut board = Board::from_fen(fen).unwrap();
        let mut incremental = hash(&board, &table);

        for uci in uci_moves {
            let m = Move::from_uci(uci).unwrap();
            assert!(board.is_legal(m), "move {uci} is not legal");
            incremental = update(incremental, &board, m, &table);
            board.push(m);
            assert_eq!(
                incremental,
                hash(&board, &table),
                "hash mismatch after {uci}"
            );
        }
    }

    #[test]
    fn hash_distinguishes_positions() {
        let table = ZobristTable::new();
        let b1 = Board::new();
        let b2 =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert_ne!(hash(&b1, &table), hash(&b2, &table));
    }

    #[test]
    /// The same position reached through different tables hashes differently,
    /// but through the same table identically.
    fn hash_depends_on_table() {
        let b = Board::new();
        assert_eq!(hash(&b, &ZOBRIST), hash(&b, &ZOBRIST));
        let other = ZobristTable::new();
        assert_ne!(hash(&b, &other), hash(&b, &ZOBRIST));
    }

    #[test]
    fn update_through_an_opening() {
        update_helper(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[
                "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6",
            ],
        );
    }

    #[test]
    fn update_through_castling() {
        update_helper(
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1",
            &["e1g1", "e8c8", "f1e1", "d8e8"],
        );
    }

    #[test]
    fn update_through_rook_moves_and_captures() {
        // touching and capturing rooks on their home corners must toggle the
        // right keys; HxH1 clears two corners at once, and the king stepping
        // out of the check forfeits what remains of White's rights
        update_helper(
            "r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1",
            &["g2a8", "h8h1", "e1d2", "h1h8"],
        );
    }

    #[test]
    fn update_through_en_passant() {
        update_helper(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &["e2e4", "g8f6", "e4e5", "d7d5", "e5d6"],
        );
    }

    #[test]
    fn update_through_promotion() {
        update_helper("6r1/5P2/2k5/8/8/8/8/4K3 w - - 0 1", &["f7g8q"]);
        update_helper("6r1/5P2/2k5/8/8/8/8/4K3 w - - 0 1", &["f7f8n"]);
    }

    #[test]
    /// A pseudo-random walk must keep the incremental hash in sync with the
    /// from-scratch hash at every step.
    fn update_through_random_game() {
        fastrand::seed(0x5eed);
        let table = ZobristTable::new();
        let mut board = Board::new();
        let mut incremental = hash(&board, &table);

        for _ in 0..300 {
            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            let m = moves[fastrand::usize(..moves.len())];
            incremental = update(incremental, &board, m, &table);
            board.push(m);
            assert_eq!(incremental, hash(&board, &table), "hash mismatch after {m}");
        }
    }
}
