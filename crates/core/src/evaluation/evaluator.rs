//! Heuristic scoring of a position across five independent factors

use shakmaty::{Bitboard, Color, File, Piece, Rank, Role, Square};

use super::types::{FactorScore, PositionEvaluation};
use crate::error::Result;
use crate::position::BoardPosition;

/// Standard piece values. Kings are never captured and score zero.
pub fn piece_value(role: Role) -> u32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 3,
        Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

/// Parses `fen` and evaluates it.
pub fn evaluate_fen(fen: &str) -> Result<PositionEvaluation> {
    let position = BoardPosition::from_fen(fen)?;
    Ok(evaluate(&position))
}

/// Scores an already parsed position. Pure: the same position always
/// produces the same evaluation.
pub fn evaluate(position: &BoardPosition) -> PositionEvaluation {
    PositionEvaluation {
        material_balance: by_color(|c| material(position, c)),
        space_control: by_color(|c| space(position, c)),
        piece_activity: by_color(|c| position.piece_move_count(c)),
        king_safety: by_color(|c| king_shelter(position, c)),
        pawn_structure: by_color(|c| pawn_islands(position, c)),
    }
}

fn by_color(mut score: impl FnMut(Color) -> u32) -> FactorScore {
    FactorScore::new(score(Color::White), score(Color::Black))
}

fn material(position: &BoardPosition, color: Color) -> u32 {
    position
        .pieces()
        .filter(|(_, piece)| piece.color == color)
        .map(|(_, piece)| piece_value(piece.role))
        .sum()
}

/// Ranks each pawn has advanced from its own back rank.
fn space(position: &BoardPosition, color: Color) -> u32 {
    pawns(position, color)
        .into_iter()
        .map(|sq| {
            let rank = sq.rank() as u32;
            match color {
                Color::White => rank,
                Color::Black => 7 - rank,
            }
        })
        .sum()
}

/// Own pawns on the (up to) three squares directly in front of the king.
fn king_shelter(position: &BoardPosition, color: Color) -> u32 {
    let Some(king) = position.king_of(color) else {
        return 0;
    };

    let rank = king.rank() as i32
        + match color {
            Color::White => 1,
            Color::Black => -1,
        };
    if !(0..8).contains(&rank) {
        return 0;
    }

    let own_pawns = pawns(position, color);
    let file = king.file() as i32;

    (file - 1..=file + 1)
        .filter(|f| (0..8).contains(f))
        .map(|f| Square::from_coords(File::new(f as u32), Rank::new(rank as u32)))
        .filter(|sq| own_pawns.contains(*sq))
        .count() as u32
}

/// Maximal runs of adjacent files holding at least one pawn.
fn pawn_islands(position: &BoardPosition, color: Color) -> u32 {
    let own_pawns = pawns(position, color);
    let mut islands = 0;
    let mut in_island = false;

    for file in File::ALL {
        let occupied = !(own_pawns & Bitboard::from_file(file)).is_empty();
        if occupied && !in_island {
            islands += 1;
        }
        in_island = occupied;
    }

    islands
}

fn pawns(position: &BoardPosition, color: Color) -> Bitboard {
    position.pieces_of(Piece {
        role: Role::Pawn,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::INITIAL_FEN;

    #[test]
    fn test_initial_position_is_balanced() {
        let eval = evaluate_fen(INITIAL_FEN).unwrap();

        assert_eq!(eval.material_balance.white, 39);
        assert_eq!(eval.material_balance.black, 39);
        assert_eq!(eval.space_control.white, 8);
        assert_eq!(eval.space_control.black, 8);
        assert_eq!(eval.king_safety.white, 3);
        assert_eq!(eval.king_safety.black, 3);
        assert_eq!(eval.pawn_structure.white, 1);
        assert_eq!(eval.pawn_structure.black, 1);

        for (_, score) in eval.iter() {
            assert_eq!(score.percentage, 0.0);
        }
        assert_eq!(eval.total_advantage(), 0.0);
    }

    #[test]
    fn test_extra_queen_is_material_advantage() {
        // Starting position with an extra white queen on d3.
        let eval =
            evaluate_fen("rnbqkbnr/pppppppp/8/8/8/3Q4/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();

        assert_eq!(eval.material_balance.white, 48);
        assert_eq!(eval.material_balance.black, 39);
        assert!(eval.material_balance.percentage > 5.0);
        assert_eq!(eval.space_control.percentage, 0.0);
        assert_eq!(eval.king_safety.percentage, 0.0);
        assert_eq!(eval.pawn_structure.percentage, 0.0);
    }

    #[test]
    fn test_bare_kings_degrade_to_zero() {
        let eval = evaluate_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        for (_, score) in eval.iter() {
            assert_eq!(score.percentage, 0.0);
        }
        assert_eq!(eval.total_material(), 0);
    }

    #[test]
    fn test_space_counts_pawn_advancement() {
        // White pawn on e5, black pawn on d6.
        let eval = evaluate_fen("4k3/8/3p4/4P3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(eval.space_control.white, 4);
        assert_eq!(eval.space_control.black, 2);
    }

    #[test]
    fn test_king_shelter_clips_at_board_edge() {
        // White king h1 with pawns g2 h2; black king a8 with pawn a7 only.
        let eval = evaluate_fen("k7/p7/8/8/8/8/6PP/7K w - - 0 1").unwrap();
        assert_eq!(eval.king_safety.white, 2);
        assert_eq!(eval.king_safety.black, 1);
    }

    #[test]
    fn test_king_without_room_ahead_has_no_shelter() {
        let eval = evaluate_fen("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(eval.king_safety.white, 0);
        assert_eq!(eval.king_safety.black, 0);

        let eval = evaluate_fen("7K/8/8/8/8/8/8/k7 w - - 0 1").unwrap();
        assert_eq!(eval.king_safety.white, 0);
        assert_eq!(eval.king_safety.black, 0);
    }

    #[test]
    fn test_pawn_islands() {
        // White: a b | d | g h -> 3 islands. Black: c d e f -> 1 island.
        let eval = evaluate_fen("4k3/2pppp2/8/8/8/8/PP1P2PP/4K3 w - - 0 1").unwrap();
        assert_eq!(eval.pawn_structure.white, 3);
        assert_eq!(eval.pawn_structure.black, 1);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
        let position = BoardPosition::from_fen(fen).unwrap();

        let first = evaluate(&position);
        let second = evaluate(&position);

        assert_eq!(first, second);
        assert_eq!(position.fen(), fen);
    }

    #[test]
    fn test_activity_counts_both_sides() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let eval = evaluate_fen(fen).unwrap();
        assert!(eval.piece_activity.white > 0);
        assert!(eval.piece_activity.black > 0);
    }

    #[test]
    fn test_illegal_but_well_formed_positions_evaluate() {
        // Black is in check with white to move.
        let eval = evaluate_fen("4k3/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        assert_eq!(eval.material_balance.white, 5);
        assert_eq!(eval.material_balance.black, 0);
        assert_eq!(eval.piece_activity.white, 13);
        assert_eq!(eval.piece_activity.black, 0);

        let empty = evaluate_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        for (_, score) in empty.iter() {
            assert_eq!((score.white, score.black, score.percentage), (0, 0, 0.0));
        }
    }
}
