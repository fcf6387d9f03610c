//! Per-square attack counts for control heatmaps

use shakmaty::{attacks, Color, Square};

use crate::position::BoardPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareControl {
    pub square: Square,
    pub white_control: u32,
    pub black_control: u32,
    /// `white_control - black_control`
    pub net_control: i32,
}

/// Counts the pieces of each color attacking `square`.
///
/// Pawns attack diagonally forward, sliders stop at the first occupied square
/// (which they still attack), knights and kings use their fixed offsets. The
/// piece standing on `square`, if any, is not counted.
pub fn control_of(position: &BoardPosition, square: Square) -> SquareControl {
    let occupied = position.board().occupied();
    let mut white_control = 0;
    let mut black_control = 0;

    for (from, piece) in position.pieces().filter(|(sq, _)| *sq != square) {
        if attacks::attacks(from, piece, occupied).contains(square) {
            match piece.color {
                Color::White => white_control += 1,
                Color::Black => black_control += 1,
            }
        }
    }

    SquareControl {
        square,
        white_control,
        black_control,
        net_control: white_control as i32 - black_control as i32,
    }
}

/// Control of all 64 squares, a1 through h8. Compute this once per position
/// and reuse it instead of querying squares one by one.
pub fn control_map(position: &BoardPosition) -> Vec<SquareControl> {
    Square::ALL
        .iter()
        .map(|&sq| control_of(position, sq))
        .collect()
}
