//! Immutable board snapshots parsed from FEN.
//!
//! A [`BoardPosition`] is parsed once on construction. Every scoring
//! function borrows it and none of them can change it, so the same value can
//! be shared freely between evaluations.

use shakmaty::{
    attacks, fen::Fen, Bitboard, Board, CastlingMode, Chess, Color, FromSetup, Piece, Position,
    PositionError, Role, Setup, Square,
};

use crate::error::{Error, Result};

/// Standard starting position.
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone)]
pub struct BoardPosition {
    fen: String,
    setup: Setup,
    /// `None` when the placement parses but breaks the rules of chess
    /// (missing kings, both sides in check, ...).
    chess: Option<Chess>,
}

impl BoardPosition {
    /// Parses a FEN string. Only text that is not FEN is rejected.
    ///
    /// Castling rights and en passant squares that do not match the board are
    /// dropped. A placement that is still illegal after that is kept as a bare
    /// board: every factor reads the board directly and piece activity falls
    /// back to pseudo-legal moves.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| Error::InvalidPosition(format!("{}: {}", fen.trim(), e)))?;

        let normalized = parsed.to_string();
        let setup = parsed.as_setup().clone();
        let chess = Chess::from_setup(setup.clone(), CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
            .or_else(PositionError::ignore_too_much_material)
            .or_else(PositionError::ignore_impossible_check);
        let chess = match chess {
            Ok(chess) => Some(chess),
            Err(e) => {
                tracing::debug!(fen = %normalized, error = %e, "illegal position, scoring the bare board");
                None
            }
        };

        Ok(Self {
            fen: normalized,
            setup,
            chess,
        })
    }

    pub fn initial() -> Self {
        Self {
            fen: INITIAL_FEN.to_string(),
            setup: Setup::default(),
            chess: Some(Chess::default()),
        }
    }

    pub fn fen(&self) -> &str {
        &self.fen
    }

    pub fn board(&self) -> &Board {
        &self.setup.board
    }

    /// Whether the placement is a legal chess position.
    pub fn is_legal(&self) -> bool {
        self.chess.is_some()
    }

    pub fn turn(&self) -> Color {
        self.setup.turn
    }

    pub fn is_initial(&self) -> bool {
        self.fen == INITIAL_FEN
    }

    /// Every occupied square with its piece, a1 through h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        let board = self.board();
        board
            .occupied()
            .into_iter()
            .filter_map(move |sq| board.piece_at(sq).map(|piece| (sq, piece)))
    }

    pub fn pieces_of(&self, piece: Piece) -> Bitboard {
        self.board().by_piece(piece)
    }

    pub fn king_of(&self, color: Color) -> Option<Square> {
        self.board().king_of(color)
    }

    /// Moves by knights, bishops, rooks and queens of `color`.
    ///
    /// For the side to move this is the legal move count. For the other side
    /// the count comes from the same placement with only the turn flipped,
    /// which can credit a side with moves from a state it could never be in
    /// (for instance with its own king still attacked). When the flipped
    /// setup is outright unplayable, or the position itself is illegal, the
    /// count degrades to pseudo-legal destinations.
    pub fn piece_move_count(&self, color: Color) -> u32 {
        if color == self.turn() {
            return match &self.chess {
                Some(chess) => count_piece_moves(chess),
                None => self.pseudo_legal_piece_moves(color),
            };
        }

        match self.flipped() {
            Some(flipped) => count_piece_moves(&flipped),
            None => self.pseudo_legal_piece_moves(color),
        }
    }

    /// Same placement with the other side to move. The snapshot itself is
    /// never touched; the flip happens on a copy of its setup.
    fn flipped(&self) -> Option<Chess> {
        let mut setup = self.setup.clone();
        setup.turn = !setup.turn;
        setup.ep_square = None;

        Chess::from_setup(setup, CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_too_much_material)
            .or_else(PositionError::ignore_impossible_check)
            .ok()
    }

    fn pseudo_legal_piece_moves(&self, color: Color) -> u32 {
        let board = self.board();
        let occupied = board.occupied();
        let own = board.by_color(color);

        self.pieces()
            .filter(|(_, piece)| piece.color == color && is_active_role(piece.role))
            .map(|(sq, piece)| (attacks::attacks(sq, piece, occupied) & !own).count() as u32)
            .sum()
    }
}

fn count_piece_moves(position: &Chess) -> u32 {
    position
        .legal_moves()
        .iter()
        .filter(|m| is_active_role(m.role()))
        .count() as u32
}

fn is_active_role(role: Role) -> bool {
    !matches!(role, Role::Pawn | Role::King)
}
