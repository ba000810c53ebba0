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

//! Full game state on top of a `BaseBoard`: side to move, castling rights,
//! en passant, move clocks, reversible move application, and fully legal
//! move generation.

use super::attacks::{ATTACKS, KING_ATTACKS, PAWN_ATTACKS};
use super::{BaseBoard, Bitboard, Color, Direction, Move, Piece, Square};

use std::{
    convert::TryFrom,
    fmt::{Display, Formatter},
    ops::{Deref, DerefMut},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The result of a game, or the lack of one.
pub enum Outcome {
    /// The game is not over.
    Ongoing,
    /// The game is drawn, whether by stalemate, insufficient material, or
    /// the fifty-move rule.
    Draw,
    /// White delivered checkmate.
    WhiteWin,
    /// Black delivered checkmate.
    BlackWin,
}

#[derive(Copy, Clone, Debug)]
/// A snapshot of every board field, taken before a move is pushed so that
/// `pop` can restore the position in constant time.
struct BoardState {
    base: BaseBoard,
    turn: Color,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
    fullmove_number: u32,
    halfmove_clock: u32,
}

impl BoardState {
    fn snapshot(board: &Board) -> BoardState {
        BoardState {
            base: board.base,
            turn: board.turn,
            castling_rights: board.castling_rights,
            ep_square: board.ep_square,
            fullmove_number: board.fullmove_number,
            halfmove_clock: board.halfmove_clock,
        }
    }

    fn restore(self, board: &mut Board) {
        board.base = self.base;
        board.turn = self.turn;
        board.castling_rights = self.castling_rights;
        board.ep_square = self.ep_square;
        board.fullmove_number = self.fullmove_number;
        board.halfmove_clock = self.halfmove_clock;
    }
}

#[derive(Clone, Debug)]
/// A chess position together with the game-level state needed to play and
/// unplay moves.
///
/// The underlying `BaseBoard` is reachable through `Deref`, so placement
/// queries like `piece_type_at` can be called directly on a `Board`.
pub struct Board {
    /// The piece placement.
    base: BaseBoard,
    /// The color of the player to move.
    pub turn: Color,
    /// The home squares of rooks which are still eligible for castling.
    pub castling_rights: Bitboard,
    /// The square behind a pawn which advanced two squares on the previous
    /// move, i.e. the target square of a legal en passant capture.
    pub ep_square: Option<Square>,
    /// The number of the full move, starting at 1 and incremented after each
    /// move by Black.
    pub fullmove_number: u32,
    /// The number of half-moves since the last capture or pawn move.
    pub halfmove_clock: u32,
    /// The moves applied to reach the current position, most recent last.
    move_stack: Vec<Move>,
    /// Pre-push snapshots matching `move_stack`, used by `pop`.
    state_stack: Vec<BoardState>,
}

impl Board {
    #[must_use]
    /// Construct a `Board` in the standard chess starting position.
    pub fn new() -> Board {
        Board {
            base: BaseBoard::new(),
            turn: Color::White,
            castling_rights: Bitboard::CORNERS,
            ep_square: None,
            fullmove_number: 1,
            halfmove_clock: 0,
            move_stack: Vec::new(),
            state_stack: Vec::new(),
        }
    }

    /// Construct a `Board` from a six-field FEN string.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` describing the problem if the FEN
    /// is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), &'static str> {
    /// use castor::base::Board;
    ///
    /// let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")?;
    /// assert_eq!(board, Board::new());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_fen(fen: &str) -> Result<Board, &'static str> {
        let mut board = Board::new();
        board.set_fen(fen)?;
        Ok(board)
    }

    /// Set this board to the position described by a six-field FEN string.
    /// Clears the move and state stacks.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` if the FEN is malformed. The board
    /// may be partially overwritten in that case.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), &'static str> {
        let mut tokens = fen.split_whitespace();

        self.base
            .set_board_fen(tokens.next().ok_or("FEN is missing the board field")?)?;

        self.turn = match tokens.next() {
            Some("w") => Color::White,
            Some("b") => Color::Black,
            _ => return Err("unrecognized player to move in FEN"),
        };

        let castling = tokens.next().ok_or("FEN is missing the castling field")?;
        self.castling_rights = Bitboard::EMPTY;
        if castling != "-" {
            for flag in castling.chars() {
                self.castling_rights |= match flag {
                    'K' => Bitboard::from(Square::H1),
                    'Q' => Bitboard::from(Square::A1),
                    'k' => Bitboard::from(Square::H8),
                    'q' => Bitboard::from(Square::A8),
                    _ => return Err("unrecognized castling flag in FEN"),
                };
            }
        }

        self.ep_square = match tokens.next().ok_or("FEN is missing the en passant field")? {
            "-" => None,
            s => Some(Square::from_algebraic(s)?),
        };

        self.halfmove_clock = tokens
            .next()
            .ok_or("FEN is missing the halfmove clock")?
            .parse()
            .map_err(|_| "could not parse halfmove clock")?;
        self.fullmove_number = tokens
            .next()
            .ok_or("FEN is missing the fullmove number")?
            .parse()
            .map_err(|_| "could not parse fullmove number")?;

        self.move_stack.clear();
        self.state_stack.clear();

        Ok(())
    }

    #[must_use]
    /// Emit the complete six-field FEN describing this position.
    ///
    /// # Examples
    ///
    /// ```
    /// use castor::base::Board;
    ///
    /// assert_eq!(
    ///     Board::new().fen(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    /// );
    /// ```
    pub fn fen(&self) -> String {
        let mut castling = String::new();
        for (sq, flag) in [
            (Square::H1, 'K'),
            (Square::A1, 'Q'),
            (Square::H8, 'k'),
            (Square::A8, 'q'),
        ] {
            if self.castling_rights.contains(sq) {
                castling.push(flag);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        format!(
            "{} {} {} {} {} {}",
            self.base.board_fen(),
            match self.turn {
                Color::White => 'w',
                Color::Black => 'b',
            },
            castling,
            self.ep_square
                .map_or_else(|| "-".to_string(), |sq| sq.to_string()),
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    #[must_use]
    /// Get the moves applied to reach this position, most recent last.
    pub fn move_stack(&self) -> &[Move] {
        &self.move_stack
    }

    /// Apply a move to the board. The move is assumed to be legal; pushing an
    /// illegal move leaves the board in an unspecified state. Use `push_uci`
    /// or check `is_legal` first when the move comes from outside.
    ///
    /// # Panics
    ///
    /// This function may panic if `m` is not legal. It will never panic on a
    /// legal move.
    pub fn push(&mut self, m: Move) {
        self.state_stack.push(BoardState::snapshot(self));
        self.move_stack.push(m);

        let turn = self.turn;
        let prev_ep_square = self.ep_square.take();

        self.halfmove_clock += 1;
        if turn == Color::Black {
            self.fullmove_number += 1;
        }

        // the zeroing test reads the pre-move occupancy, so it must come
        // before any piece is displaced
        if self.is_zeroing(m) {
            self.halfmove_clock = 0;
        }

        let from_bb = Bitboard::from(m.from_square);
        let to_bb = Bitboard::from(m.to_square);

        let mut piece_type = self
            .base
            .remove_piece_at(m.from_square)
            .expect("push of a move with an empty origin square");
        let capture_piece = self.base.piece_type_at(m.to_square);

        // any touched rook home square loses its castling right, and a king
        // move forfeits both rights on its back rank
        self.castling_rights &= !(from_bb | to_bb);
        if piece_type == Piece::King {
            self.castling_rights &= !turn.backrank();
        }

        if piece_type == Piece::Pawn {
            let diff = m.to_square as i8 - m.from_square as i8;
            if diff == 16 && m.from_square.rank() == 1 {
                self.ep_square = Some(m.from_square + Direction::NORTH);
            } else if diff == -16 && m.from_square.rank() == 6 {
                self.ep_square = Some(m.from_square + Direction::SOUTH);
            } else if prev_ep_square == Some(m.to_square)
                && (diff.abs() == 7 || diff.abs() == 9)
                && capture_piece.is_none()
            {
                // en passant: the captured pawn stands behind the target
                let down = -turn.pawn_direction();
                self.base.remove_piece_at(m.to_square + down);
            }
        }

        if let Some(promotion) = m.promotion {
            piece_type = promotion;
        }

        // a king travelling more than one file is castling
        if piece_type == Piece::King && m.from_square.file_distance(m.to_square) > 1 {
            let a_side = m.to_square.file() < m.from_square.file();
            let rank = m.from_square.rank();

            // clear the landing square (it may hold the rook under the
            // rook-target encoding), then the rook's home corner
            self.base.remove_piece_at(m.to_square);
            let (corner_file, king_file, rook_file) = if a_side { (0, 2, 3) } else { (7, 6, 5) };
            // these unwraps cannot fail: every file index here is below 8
            self.base
                .remove_piece_at(Square::new(rank, corner_file).unwrap());
            self.base
                .set_piece_at(Square::new(rank, king_file).unwrap(), Piece::King, turn);
            self.base
                .set_piece_at(Square::new(rank, rook_file).unwrap(), Piece::Rook, turn);
        } else {
            self.base.set_piece_at(m.to_square, piece_type, turn);
        }

        self.turn = !turn;
    }

    /// Undo the most recent push, restoring every board field to its
    /// pre-push value. Returns the move that was undone.
    ///
    /// # Panics
    ///
    /// This function will panic if no moves have been pushed.
    pub fn pop(&mut self) -> Move {
        let m = self.move_stack.pop().expect("pop from an empty move stack");
        let state = self
            .state_stack
            .pop()
            .expect("pop from an empty state stack");
        state.restore(self);
        m
    }

    /// Parse a UCI move, validate it, and push it.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` if the string is not well-formed
    /// UCI or the move is not legal in this position; the board is unchanged
    /// in that case.
    pub fn push_uci(&mut self, uci: &str) -> Result<Move, &'static str> {
        let m = Move::from_uci(uci)?;
        if !self.is_legal(m) {
            return Err("move is not legal in this position");
        }
        self.push(m);
        Ok(m)
    }

    /* Move generation */

    #[must_use]
    /// Generate the pseudo-legal moves whose origin is in `from_mask` and
    /// whose target is in `to_mask`. Pseudo-legal moves obey piece movement
    /// rules but may leave the mover's own king in check.
    ///
    /// For castling moves, `to_mask` selects the home square of the castling
    /// rook rather than the king's target square.
    pub fn generate_pseudo_legal_moves(&self, from_mask: Bitboard, to_mask: Bitboard) -> Vec<Move> {
        let mut moves = Vec::new();

        let our_pieces = self.occupied_color[self.turn as usize];
        let opponent = !self.turn;

        // moves of every piece but the pawns
        let non_pawns = our_pieces & !self.pawns & from_mask;
        for from_square in non_pawns {
            let targets = self.attacks_mask(from_square) & !our_pieces & to_mask;
            for to_square in targets {
                moves.push(Move::normal(from_square, to_square));
            }
        }

        self.generate_castling_moves(from_mask, to_mask, &mut moves);

        // pawn captures
        let our_pawns = self.pawns & our_pieces & from_mask;
        if our_pawns.is_empty() {
            // no pawns also means no advances and no en passant
            return moves;
        }
        for from_square in our_pawns {
            let targets = PAWN_ATTACKS[self.turn as usize][from_square as usize]
                & self.occupied_color[opponent as usize]
                & to_mask;
            for to_square in targets {
                push_pawn_moves(&mut moves, from_square, to_square);
            }
        }

        // pawn advances
        let (mut single_moves, mut double_moves) = match self.turn {
            Color::White => {
                let single = (our_pawns << 8) & !self.occupied;
                let double =
                    (single << 8) & !self.occupied & (Bitboard::RANK_3 | Bitboard::RANK_4);
                (single, double)
            }
            Color::Black => {
                let single = (our_pawns >> 8) & !self.occupied;
                let double =
                    (single >> 8) & !self.occupied & (Bitboard::RANK_6 | Bitboard::RANK_5);
                (single, double)
            }
        };
        single_moves &= to_mask;
        double_moves &= to_mask;

        let back = -self.turn.pawn_direction();
        for to_square in single_moves {
            push_pawn_moves(&mut moves, to_square + back, to_square);
        }
        for to_square in double_moves {
            moves.push(Move::normal(to_square + back + back, to_square));
        }

        moves.extend(self.generate_pseudo_legal_ep(from_mask, to_mask));

        moves
    }

    #[must_use]
    /// Generate all pseudo-legal moves in this position.
    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        self.generate_pseudo_legal_moves(Bitboard::ALL, Bitboard::ALL)
    }

    /// Generate the pseudo-legal en passant captures within the given masks.
    fn generate_pseudo_legal_ep(&self, from_mask: Bitboard, to_mask: Bitboard) -> Vec<Move> {
        let mut moves = Vec::new();
        let Some(ep_square) = self.ep_square else {
            return moves;
        };
        if !to_mask.contains(ep_square) || self.occupied.contains(ep_square) {
            return moves;
        }

        let capturers = self.pawns
            & self.occupied_color[self.turn as usize]
            & from_mask
            & PAWN_ATTACKS[!self.turn as usize][ep_square as usize]
            & self.turn.ep_capture_rank();
        for from_square in capturers {
            moves.push(Move::normal(from_square, ep_square));
        }

        moves
    }

    /// Generate the castling moves available within the given masks and push
    /// them onto `moves`. `to_mask` selects by the castling rook's home
    /// square. Only standard chess castling is supported: the king must be
    /// on E1 or E8.
    fn generate_castling_moves(&self, from_mask: Bitboard, to_mask: Bitboard, moves: &mut Vec<Move>) {
        let backrank = self.turn.backrank();
        let king_mask = self.occupied_color[self.turn as usize] & self.kings & backrank & from_mask;
        if king_mask.is_empty() {
            return;
        }
        // will not fail since king_mask is nonzero
        let king_sq = Square::try_from(king_mask).unwrap();
        if king_sq != Square::E1 && king_sq != Square::E8 {
            return;
        }

        let rank = king_sq.rank();
        let candidates = self.castling_rights & backrank & to_mask;
        for rook_sq in candidates {
            let rook_mask = Bitboard::from(rook_sq);
            let a_side = rook_sq < king_sq;

            let (king_file, rook_file) = if a_side { (2, 3) } else { (6, 5) };
            // these unwraps cannot fail: the file indices are below 8
            let king_to = Square::new(rank, king_file).unwrap();
            let rook_to = Square::new(rank, rook_file).unwrap();
            let king_to_bb = Bitboard::from(king_to);
            let rook_to_bb = Bitboard::from(rook_to);

            let king_path = ATTACKS.between(king_sq, king_to);
            let rook_path = ATTACKS.between(rook_sq, rook_to);

            // every square the king or rook crosses or lands on must be
            // empty, ignoring the king and rook themselves
            let must_be_empty = king_path | rook_path | king_to_bb | rook_to_bb;
            if !((self.occupied ^ king_mask ^ rook_mask) & must_be_empty).is_empty() {
                continue;
            }
            // the king may not start from, pass through, or arrive at an
            // attacked square
            if self.attacked_for_king(king_path | king_mask, self.occupied ^ king_mask) {
                continue;
            }
            if self.attacked_for_king(
                king_to_bb,
                self.occupied ^ king_mask ^ rook_mask ^ rook_to_bb,
            ) {
                continue;
            }

            moves.push(Move::normal(king_sq, king_to));
        }
    }

    /// Determine whether any square of `path` is attacked by the opponent on
    /// the given occupancy.
    fn attacked_for_king(&self, path: Bitboard, occupied: Bitboard) -> bool {
        let opponent = !self.turn;
        for sq in path {
            if !self
                .attackers_mask_with_occupancy(opponent, sq, occupied)
                .is_empty()
            {
                return true;
            }
        }
        false
    }

    /// Generate the candidate moves which could resolve a check on the king
    /// at `king_sq` by the pieces in `checkers`. The candidates still need a
    /// pin check (`is_safe`) before they are legal.
    fn generate_evasions(
        &self,
        king_sq: Square,
        checkers: Bitboard,
        from_mask: Bitboard,
        to_mask: Bitboard,
    ) -> Vec<Move> {
        let mut moves = Vec::new();

        // a checking slider casts a shadow through the king; the king may
        // not retreat along the checking ray
        let sliders = checkers & (self.bishops | self.rooks | self.queens);
        let mut attacked = Bitboard::EMPTY;
        for checker in sliders {
            attacked |= ATTACKS.ray(king_sq, checker) & !Bitboard::from(checker);
        }

        if from_mask.contains(king_sq) {
            let targets = KING_ATTACKS[king_sq as usize]
                & !self.occupied_color[self.turn as usize]
                & !attacked
                & to_mask;
            for to_square in targets {
                moves.push(Move::normal(king_sq, to_square));
            }
        }

        // blocks and captures are only possible against a single checker
        if checkers.has_single_bit() {
            // will not fail since checkers is nonzero
            let checker = Square::try_from(checkers).unwrap();
            let target = ATTACKS.between(king_sq, checker) | checkers;

            moves.extend(
                self.generate_pseudo_legal_moves(!self.kings & from_mask, target & to_mask),
            );

            // capturing a double-pushed checker en passant lands beside the
            // blocking set, so it is generated separately
            if let Some(ep_square) = self.ep_square {
                if !target.contains(ep_square) {
                    let last_double = ep_square + -self.turn.pawn_direction();
                    if last_double == checker {
                        moves.extend(self.generate_pseudo_legal_ep(from_mask, to_mask));
                    }
                }
            }
        }

        moves
    }

    #[must_use]
    /// Get our pieces which are the sole shield between our king at
    /// `king_sq` and an enemy slider, i.e. our pinned pieces.
    fn slider_blockers(&self, king_sq: Square) -> Bitboard {
        let opponent = !self.turn;
        let rooks_and_queens = self.rooks | self.queens;
        let bishops_and_queens = self.bishops | self.queens;

        let snipers = (ATTACKS.rank.attacks(king_sq, Bitboard::EMPTY) & rooks_and_queens)
            | (ATTACKS.file.attacks(king_sq, Bitboard::EMPTY) & rooks_and_queens)
            | (ATTACKS.diag.attacks(king_sq, Bitboard::EMPTY) & bishops_and_queens);

        let mut blockers = Bitboard::EMPTY;
        for sniper in snipers & self.occupied_color[opponent as usize] {
            let b = ATTACKS.between(king_sq, sniper) & self.occupied;
            if b.has_single_bit() {
                blockers |= b;
            }
        }

        blockers & self.occupied_color[self.turn as usize]
    }

    /// Determine whether a pseudo-legal move avoids leaving our king at
    /// `king_sq` in check, given the pinned pieces in `blockers`.
    fn is_safe(&self, king_sq: Square, blockers: Bitboard, m: Move) -> bool {
        let opponent = !self.turn;

        if m.from_square == king_sq {
            if self.is_castling(m) {
                // castling generation already verified the king's whole path
                return true;
            }
            return !self.is_attacked_by(opponent, m.to_square);
        }

        if self.is_en_passant(m) {
            // the capture must stay inside the pin ray, and removing both
            // pawns at once must not uncover a slider on the king
            return self.pin_mask(self.turn, m.from_square).contains(m.to_square)
                && !self.ep_skewered(king_sq, m.from_square);
        }

        !blockers.contains(m.from_square)
            || ATTACKS.ray(m.from_square, m.to_square).contains(king_sq)
    }

    /// Determine whether an en passant capture by the pawn on `capturer_sq`
    /// would expose our king at `king_sq` to a rank or diagonal slider.
    /// Both the capturing and the captured pawn leave their squares at once,
    /// which no single-piece pin test can see.
    fn ep_skewered(&self, king_sq: Square, capturer_sq: Square) -> bool {
        // only called when an en passant square exists
        let ep_square = self.ep_square.expect("en passant square must be set");
        let opponent = !self.turn;
        let last_double = ep_square + -self.turn.pawn_direction();

        let occupancy = (self.occupied
            & !Bitboard::from(last_double)
            & !Bitboard::from(capturer_sq))
            | Bitboard::from(ep_square);

        let horizontal_attackers =
            self.occupied_color[opponent as usize] & (self.rooks | self.queens);
        if !(ATTACKS.rank.attacks(king_sq, occupancy) & horizontal_attackers).is_empty() {
            return true;
        }

        let diagonal_attackers =
            self.occupied_color[opponent as usize] & (self.bishops | self.queens);
        if !(ATTACKS.diag.attacks(king_sq, occupancy) & diagonal_attackers).is_empty() {
            return true;
        }

        false
    }

    #[must_use]
    /// Generate the legal moves whose origin is in `from_mask` and whose
    /// target is in `to_mask`.
    pub fn generate_legal_moves(&self, from_mask: Bitboard, to_mask: Bitboard) -> Vec<Move> {
        let king_sq = self.king(self.turn);
        let blockers = self.slider_blockers(king_sq);
        let checkers = self.attackers_mask(!self.turn, king_sq);

        let candidates = if checkers.is_empty() {
            self.generate_pseudo_legal_moves(from_mask, to_mask)
        } else {
            self.generate_evasions(king_sq, checkers, from_mask, to_mask)
        };

        candidates
            .into_iter()
            .filter(|&m| self.is_safe(king_sq, blockers, m))
            .collect()
    }

    #[must_use]
    /// Generate all legal moves in this position.
    ///
    /// # Examples
    ///
    /// ```
    /// use castor::base::Board;
    ///
    /// assert_eq!(Board::new().legal_moves().len(), 20);
    /// ```
    pub fn legal_moves(&self) -> Vec<Move> {
        self.generate_legal_moves(Bitboard::ALL, Bitboard::ALL)
    }

    /* Move predicates */

    #[must_use]
    /// Determine whether a move is pseudo-legal in this position.
    pub fn is_pseudo_legal(&self, m: Move) -> bool {
        self.generate_pseudo_legal_moves(Bitboard::from(m.from_square), Bitboard::ALL)
            .contains(&m)
    }

    #[must_use]
    /// Determine whether a pseudo-legal move would leave our own king in
    /// check.
    pub fn is_into_check(&self, m: Move) -> bool {
        let king_sq = self.king(self.turn);
        let checkers = self.attackers_mask(!self.turn, king_sq);

        if !checkers.is_empty() {
            let evasions = self.generate_evasions(
                king_sq,
                checkers,
                Bitboard::from(m.from_square),
                Bitboard::from(m.to_square),
            );
            if evasions.contains(&m) {
                return !self.is_safe(king_sq, self.slider_blockers(king_sq), m);
            }
            return true;
        }

        !self.is_safe(king_sq, self.slider_blockers(king_sq), m)
    }

    #[must_use]
    /// Determine whether a move is fully legal in this position.
    ///
    /// # Examples
    ///
    /// ```
    /// use castor::base::{Board, Move, Square};
    ///
    /// let board = Board::new();
    /// assert!(board.is_legal(Move::normal(Square::E2, Square::E4)));
    /// assert!(!board.is_legal(Move::normal(Square::E2, Square::D3)));
    /// ```
    pub fn is_legal(&self, m: Move) -> bool {
        self.is_pseudo_legal(m) && !self.is_into_check(m)
    }

    #[must_use]
    /// Determine whether a move of the player to move would be a castle.
    pub fn is_castling(&self, m: Move) -> bool {
        if self.kings.contains(m.from_square) {
            return m.from_square.file_distance(m.to_square) > 1
                || !(self.rooks
                    & self.occupied_color[self.turn as usize]
                    & Bitboard::from(m.to_square))
                .is_empty();
        }
        false
    }

    #[must_use]
    /// Determine whether a move of the player to move would capture en
    /// passant.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), &'static str> {
    /// use castor::base::{Board, Move, Square};
    ///
    /// let mut board = Board::new();
    /// board.push_uci("e2e4")?;
    /// assert_eq!(board.ep_square, Some(Square::E3));
    /// assert!(!board.is_en_passant(Move::normal(Square::E4, Square::D5)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn is_en_passant(&self, m: Move) -> bool {
        let diff = (m.to_square as i8 - m.from_square as i8).abs();
        self.ep_square == Some(m.to_square)
            && self.pawns.contains(m.from_square)
            && (diff == 7 || diff == 9)
            && !self.occupied.contains(m.to_square)
    }

    #[must_use]
    /// Determine whether a move of the player to move would capture a piece.
    /// En passant counts as a capture.
    pub fn is_capture(&self, m: Move) -> bool {
        self.occupied_color[!self.turn as usize].contains(m.to_square) || self.is_en_passant(m)
    }

    #[must_use]
    /// Determine whether a move would reset the halfmove clock, i.e. whether
    /// it moves a pawn or captures. Reads the occupancy before the move is
    /// applied.
    pub fn is_zeroing(&self, m: Move) -> bool {
        let touched = Bitboard::from(m.from_square) ^ Bitboard::from(m.to_square);
        !(touched & self.pawns).is_empty()
            || !(touched & self.occupied_color[!self.turn as usize]).is_empty()
    }

    /* Terminal and draw tests */

    #[must_use]
    /// Get the opposing pieces which currently check our king.
    pub fn checkers_mask(&self) -> Bitboard {
        self.attackers_mask(!self.turn, self.king(self.turn))
    }

    #[must_use]
    /// Determine whether the player to move is in check.
    pub fn is_check(&self) -> bool {
        !self.checkers_mask().is_empty()
    }

    #[must_use]
    /// Determine whether the player to move has been checkmated.
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves().is_empty()
    }

    #[must_use]
    /// Determine whether the player to move has been stalemated.
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_moves().is_empty()
    }

    #[must_use]
    /// Determine whether the given color lacks the material to deliver mate
    /// by any sequence of legal moves.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        let ours = self.occupied_color[color as usize];

        if !(ours & (self.pawns | self.rooks | self.queens)).is_empty() {
            return false;
        }

        // a lone knight can mate only with help from the opponent's pieces,
        // and never against a bare king or king and queens
        if !(ours & self.knights).is_empty() {
            return ours.len() <= 2
                && (self.occupied_color[!color as usize] & !self.kings & !self.queens).is_empty();
        }

        // bishops all standing on one square color can never give mate
        if !(ours & self.bishops).is_empty() {
            let same_color = (self.bishops & Bitboard::DARK_SQUARES).is_empty()
                || (self.bishops & Bitboard::LIGHT_SQUARES).is_empty();
            return same_color && self.pawns.is_empty() && self.knights.is_empty();
        }

        true
    }

    #[must_use]
    /// Determine whether neither side has mating material.
    pub fn is_insufficient_material(&self) -> bool {
        self.has_insufficient_material(Color::White) && self.has_insufficient_material(Color::Black)
    }

    #[must_use]
    /// Determine whether the game is drawn by the fifty-move rule: one
    /// hundred halfmoves without a pawn move or capture, with at least one
    /// legal move remaining (a position with none is mate or stalemate
    /// first).
    pub fn is_fifty_moves(&self) -> bool {
        self.halfmove_clock >= 100 && !self.legal_moves().is_empty()
    }

    #[must_use]
    /// Get the outcome of the game in this position.
    ///
    /// # Examples
    ///
    /// ```
    /// use castor::base::{Board, Outcome};
    ///
    /// assert_eq!(Board::new().game_outcome(), Outcome::Ongoing);
    /// ```
    pub fn game_outcome(&self) -> Outcome {
        if self.is_insufficient_material() || self.is_fifty_moves() {
            return Outcome::Draw;
        }

        if self.legal_moves().is_empty() {
            if self.is_check() {
                return match self.turn {
                    Color::White => Outcome::BlackWin,
                    Color::Black => Outcome::WhiteWin,
                };
            }
            return Outcome::Draw;
        }

        Outcome::Ongoing
    }
}

/// Push a pawn move onto `moves`, fanning out into the four promotion moves
/// when the target square is on a back rank.
fn push_pawn_moves(moves: &mut Vec<Move>, from_square: Square, to_square: Square) {
    if to_square.rank() == 0 || to_square.rank() == 7 {
        for pt in Piece::PROMOTING {
            moves.push(Move::promoting(from_square, to_square, pt));
        }
    } else {
        moves.push(Move::normal(from_square, to_square));
    }
}

impl Deref for Board {
    type Target = BaseBoard;

    fn deref(&self) -> &BaseBoard {
        &self.base
    }
}

impl DerefMut for Board {
    fn deref_mut(&mut self) -> &mut BaseBoard {
        &mut self.base
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl PartialEq for Board {
    /// Two boards are equal if they represent the same position; the move
    /// history is not compared.
    fn eq(&self, other: &Board) -> bool {
        self.base == other.base
            && self.turn == other.turn
            && self.castling_rights == other.castling_rights
            && self.ep_square == other.ep_square
            && self.fullmove_number == other.fullmove_number
            && self.halfmove_clock == other.halfmove_clock
    }
}

impl Eq for Board {}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Play every legal move of `fen` and verify that popping restores the
    /// board exactly, including the clocks.
    fn push_pop_helper(fen: &str) {
        let mut board = Board::from_fen(fen).unwrap();
        let before = board.clone();
        for m in board.legal_moves() {
            board.push(m);
            assert_eq!(board.pop(), m);
            assert_eq!(board, before);
            assert_eq!(board.ep_square, before.ep_square);
            assert_eq!(board.halfmove_clock, before.halfmove_clock);
            assert_eq!(board.fullmove_number, before.fullmove_number);
        }
    }

    /// Verify the legal ⊆ pseudo-legal law on `fen`: the legal moves are
    /// exactly the pseudo-legal moves which do not leave the mover's king in
    /// check, confirmed by playing each move out.
    fn legality_law_helper(fen: &str) {
        let mut board = Board::from_fen(fen).unwrap();
        let legal = board.legal_moves();
        let pseudo = board.pseudo_legal_moves();

        for m in &legal {
            assert!(pseudo.contains(m), "{m} is legal but not pseudo-legal");
        }

        let mover = board.turn;
        for m in pseudo {
            board.push(m);
            let in_check = board.is_attacked_by(!mover, board.king(mover));
            board.pop();
            assert_eq!(
                legal.contains(&m),
                !in_check,
                "legality of {m} disagrees with the push/pop test"
            );
        }
    }

    #[test]
    fn twenty_opening_moves() {
        let board = Board::new();
        assert_eq!(board.legal_moves().len(), 20);
        assert_eq!(board.pseudo_legal_moves().len(), 20);
    }

    #[test]
    fn push_pop_restores_state() {
        push_pop_helper("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        push_pop_helper("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        push_pop_helper("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        push_pop_helper("rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    }

    #[test]
    fn legal_moves_are_safe_pseudo_legal_moves() {
        legality_law_helper("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        legality_law_helper("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        legality_law_helper("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        legality_law_helper("rnb2k1r/pp1Pbppp/2p5/q7/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp2ppp/8/3pp3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        ] {
            assert_eq!(Board::from_fen(fen).unwrap().fen(), fen);
        }
    }

    #[test]
    fn double_push_sets_ep_square() {
        let mut board = Board::new();
        board.push_uci("e2e4").unwrap();
        assert_eq!(board.ep_square, Some(Square::E3));
        board.push_uci("g8f6").unwrap();
        assert_eq!(board.ep_square, None);
    }

    #[test]
    /// With a black pawn standing on D5, taking it with E4xD5 is an ordinary
    /// capture even though the FEN carries an en passant square on D6.
    fn normal_capture_is_not_en_passant() {
        let board =
            Board::from_fen("rnbqkbnr/ppp2ppp/8/3pp3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let m = Move::normal(Square::E4, Square::D5);
        assert!(board.is_legal(m));
        assert!(!board.is_en_passant(m));
        assert!(board.is_capture(m));
        // the en passant square itself is occupied by nothing a pawn can
        // reach legally here
        assert!(!board.is_legal(Move::normal(Square::E4, Square::D6)));
    }

    #[test]
    fn en_passant_capture_works() {
        let mut board =
            Board::from_fen("rnbqkb1r/ppppp1pp/7n/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let m = Move::normal(Square::E5, Square::F6);
        assert!(board.is_en_passant(m));
        assert!(board.is_capture(m));
        board.push(m);
        // the captured pawn is gone from F5
        assert_eq!(board.piece_type_at(Square::F5), None);
        assert_eq!(board.piece_type_at(Square::F6), Some(Piece::Pawn));
    }

    #[test]
    fn castling_both_sides_legal() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let legal = board.legal_moves();
        assert!(legal.contains(&Move::normal(Square::E1, Square::G1)));
        assert!(legal.contains(&Move::normal(Square::E1, Square::C1)));
    }

    #[test]
    /// After White castles kingside, White's rights are gone and Black's are
    /// untouched.
    fn castling_updates_rights() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.push_uci("e1g1").unwrap();
        assert_eq!(board.castling_rights & Bitboard::RANK_1, Bitboard::EMPTY);
        assert_eq!(
            board.castling_rights & Bitboard::RANK_8,
            Bitboard::from(Square::A8) | Bitboard::from(Square::H8)
        );
        // the rook ends up on F1
        assert_eq!(board.piece_type_at(Square::F1), Some(Piece::Rook));
        assert_eq!(board.piece_type_at(Square::G1), Some(Piece::King));
    }

    #[test]
    /// The king may not castle through an attacked square.
    fn no_castling_through_check() {
        let board = Board::from_fen("r3k2r/8/5r2/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let legal = board.legal_moves();
        // F1 is covered by the rook on F6, so kingside is out; the queenside
        // path through D1 and C1 is safe
        assert!(!legal.contains(&Move::normal(Square::E1, Square::G1)));
        assert!(legal.contains(&Move::normal(Square::E1, Square::C1)));
    }

    #[test]
    fn moving_rook_forfeits_one_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        board.push_uci("h1h2").unwrap();
        assert!(!board.castling_rights.contains(Square::H1));
        assert!(board.castling_rights.contains(Square::A1));
    }

    #[test]
    fn capturing_rook_forfeits_its_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1").unwrap();
        board.push_uci("g2a8").unwrap();
        assert!(!board.castling_rights.contains(Square::A8));
        assert!(board.castling_rights.contains(Square::H8));
    }

    #[test]
    /// The fool's mate: after White bares the E1 diagonal with the F and G
    /// pawns, the queen check from H4 cannot be answered.
    fn fools_mate_is_checkmate() {
        let mut board =
            Board::from_fen("rnbqkbnr/pppp1ppp/8/4p3/5PP1/8/PPPPP2P/RNBQKBNR b KQkq g3 0 2")
                .unwrap();
        board.push_uci("d8h4").unwrap();
        assert!(board.is_checkmate());
        assert!(!board.is_stalemate());
        assert_eq!(board.game_outcome(), Outcome::BlackWin);
    }

    #[test]
    fn stalemate_is_a_draw() {
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(board.is_stalemate());
        assert!(!board.is_checkmate());
        assert_eq!(board.game_outcome(), Outcome::Draw);
    }

    #[test]
    /// King versus king and knight is dead for both sides.
    fn knight_endgame_is_insufficient() {
        let board = Board::from_fen("8/8/3k4/8/8/2KN4/8/8 w - - 0 1").unwrap();
        assert!(board.has_insufficient_material(Color::White));
        assert!(board.has_insufficient_material(Color::Black));
        assert!(board.is_insufficient_material());
        assert_eq!(board.game_outcome(), Outcome::Draw);
    }

    #[test]
    fn same_color_bishops_are_insufficient() {
        // the bishops on D3 and D5 both stand on light squares
        let board = Board::from_fen("8/8/3k4/3b4/8/2KB4/8/8 w - - 0 1").unwrap();
        assert!(board.is_insufficient_material());
        // opposite-colored bishops (D3 and E5) are not dead
        let board = Board::from_fen("8/8/3k4/4b3/8/2KB4/8/8 w - - 0 1").unwrap();
        assert!(!board.is_insufficient_material());
    }

    #[test]
    fn rook_endgame_is_sufficient() {
        let board = Board::from_fen("8/8/3k4/8/8/2KR4/8/8 w - - 0 1").unwrap();
        assert!(!board.is_insufficient_material());
        assert_eq!(board.game_outcome(), Outcome::Ongoing);
    }

    #[test]
    fn fifty_move_rule() {
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 100 80").unwrap();
        assert!(board.is_fifty_moves());
        assert_eq!(board.game_outcome(), Outcome::Draw);

        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 99 80").unwrap();
        assert!(!board.is_fifty_moves());
    }

    #[test]
    fn halfmove_clock_resets_on_pawn_moves_and_captures() {
        let mut board = Board::from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 4 3",
        )
        .unwrap();
        board.push_uci("f3e5").unwrap();
        assert_eq!(board.halfmove_clock, 0);
        board.push_uci("g8f6").unwrap();
        assert_eq!(board.halfmove_clock, 1);
        board.push_uci("d2d4").unwrap();
        assert_eq!(board.halfmove_clock, 0);
    }

    #[test]
    /// A pinned knight has no legal moves at all.
    fn pinned_knight_cannot_move() {
        let board = Board::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        for m in board.legal_moves() {
            assert_ne!(m.from_square, Square::E2, "pinned knight moved: {m}");
        }
    }

    #[test]
    /// A pinned rook may still slide along the pin ray.
    fn pinned_rook_moves_along_ray() {
        let board = Board::from_fen("4r1k1/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let legal = board.legal_moves();
        assert!(legal.contains(&Move::normal(Square::E2, Square::E5)));
        assert!(legal.contains(&Move::normal(Square::E2, Square::E8)));
        assert!(!legal.contains(&Move::normal(Square::E2, Square::A2)));
    }

    #[test]
    /// An en passant capture which would expose the king along the fifth
    /// rank is illegal.
    fn en_passant_skewer_is_illegal() {
        let board = Board::from_fen("8/8/8/KPpr4/8/8/8/4k3 w - c6 0 2").unwrap();
        assert!(!board.is_legal(Move::normal(Square::B5, Square::C6)));
    }

    #[test]
    /// In double check, the queen on A1 may neither block nor capture; only
    /// the king moves.
    fn double_check_allows_only_king_moves() {
        let board = Board::from_fen("4r2k/8/8/8/3n4/8/4K3/Q7 w - - 0 1").unwrap();
        assert!(board.checkers_mask().more_than_one());
        let legal = board.legal_moves();
        assert!(!legal.is_empty());
        for m in legal {
            assert_eq!(m.from_square, Square::E2);
        }
    }

    #[test]
    /// In single check, every legal move captures the checker, blocks the
    /// ray, or steps the king away.
    fn check_must_be_resolved() {
        let board = Board::from_fen("4r2k/8/8/8/8/8/4K3/Q7 w - - 0 1").unwrap();
        assert!(board.is_check());
        let legal = board.legal_moves();
        // the queen can interpose on E5 along the long diagonal
        assert!(legal.contains(&Move::normal(Square::A1, Square::E5)));
        // retreating the queen does not address the check
        assert!(!legal.contains(&Move::normal(Square::A1, Square::B1)));
        for m in legal {
            let mut b = board.clone();
            b.push(m);
            assert!(!b.is_attacked_by(Color::Black, b.king(Color::White)));
        }
    }

    #[test]
    fn push_uci_rejects_illegal_moves() {
        let mut board = Board::new();
        assert!(board.push_uci("e2e5").is_err());
        assert!(board.push_uci("e7e5").is_err());
        assert!(board.push_uci("banana").is_err());
        assert_eq!(board, Board::new());
    }

    #[test]
    fn promotion_generates_all_four_pieces() {
        let board = Board::from_fen("8/5P2/2k5/8/8/8/8/4K3 w - - 0 1").unwrap();
        let legal = board.legal_moves();
        for pt in Piece::PROMOTING {
            assert!(legal.contains(&Move::promoting(Square::F7, Square::F8, pt)));
        }
        // the bare pawn advance without a promotion type is not legal
        assert!(!legal.contains(&Move::normal(Square::F7, Square::F8)));
    }

    #[test]
    fn promotion_with_capture() {
        let mut board = Board::from_fen("6r1/5P2/2k5/8/8/8/8/4K3 w - - 0 1").unwrap();
        board.push_uci("f7g8q").unwrap();
        assert_eq!(board.piece_type_at(Square::G8), Some(Piece::Queen));
        assert_eq!(board.color_at(Square::G8), Some(Color::White));
    }
}
