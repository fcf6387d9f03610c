//! Evaluation factor types

use serde::{Deserialize, Serialize};
use shakmaty::Color;
use std::fmt;

/// One of the five evaluation factors.
///
/// Declaration order is the canonical priority order used when building
/// situation keys, so `Ord` sorts factors into key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    MaterialBalance,
    SpaceControl,
    PieceActivity,
    KingSafety,
    PawnStructure,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::MaterialBalance,
        Factor::SpaceControl,
        Factor::PieceActivity,
        Factor::KingSafety,
        Factor::PawnStructure,
    ];

    /// Name used inside situation keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::MaterialBalance => "materialBalance",
            Factor::SpaceControl => "spaceControl",
            Factor::PieceActivity => "pieceActivity",
            Factor::KingSafety => "kingSafety",
            Factor::PawnStructure => "pawnStructure",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Factor::MaterialBalance => "material",
            Factor::SpaceControl => "space",
            Factor::PieceActivity => "piece activity",
            Factor::KingSafety => "king safety",
            Factor::PawnStructure => "pawn structure",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A side of the board, with serde support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// Which side, if any, an aggregate evaluation favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvantageColor {
    White,
    Black,
    Neutral,
}

impl AdvantageColor {
    pub fn name(&self) -> &'static str {
        match self {
            AdvantageColor::White => "White",
            AdvantageColor::Black => "Black",
            AdvantageColor::Neutral => "Neither side",
        }
    }
}

/// Raw per-color magnitudes for one factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub white: u32,
    pub black: u32,
    /// `(white - black) / (white + black) * 100`, zero when both are zero.
    pub percentage: f64,
}

impl FactorScore {
    pub fn new(white: u32, black: u32) -> Self {
        let total = white + black;
        let percentage = if total == 0 {
            0.0
        } else {
            (white as f64 - black as f64) / total as f64 * 100.0
        };

        Self {
            white,
            black,
            percentage: percentage.clamp(-100.0, 100.0),
        }
    }
}

/// The five factor scores of one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEvaluation {
    pub material_balance: FactorScore,
    pub space_control: FactorScore,
    pub piece_activity: FactorScore,
    pub king_safety: FactorScore,
    pub pawn_structure: FactorScore,
}

impl PositionEvaluation {
    pub fn get(&self, factor: Factor) -> &FactorScore {
        match factor {
            Factor::MaterialBalance => &self.material_balance,
            Factor::SpaceControl => &self.space_control,
            Factor::PieceActivity => &self.piece_activity,
            Factor::KingSafety => &self.king_safety,
            Factor::PawnStructure => &self.pawn_structure,
        }
    }

    /// Factors paired with their scores in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Factor, &FactorScore)> + '_ {
        Factor::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Sum of all five signed percentages. Positive favors white.
    pub fn total_advantage(&self) -> f64 {
        self.iter().map(|(_, score)| score.percentage).sum()
    }

    /// Combined material of both sides, kings excluded.
    pub fn total_material(&self) -> u32 {
        self.material_balance.white + self.material_balance.black
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_percentage_of_empty_factor_is_zero() {
        let score = FactorScore::new(0, 0);
        assert_eq!(score.percentage, 0.0);
    }

    #[test]
    fn test_percentage_sign_follows_white() {
        assert_eq!(FactorScore::new(3, 1).percentage, 50.0);
        assert_eq!(FactorScore::new(1, 3).percentage, -50.0);
        assert_eq!(FactorScore::new(5, 0).percentage, 100.0);
    }

    #[test]
    fn test_factor_order_is_canonical() {
        let mut shuffled = vec![
            Factor::PawnStructure,
            Factor::MaterialBalance,
            Factor::KingSafety,
            Factor::SpaceControl,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                Factor::MaterialBalance,
                Factor::SpaceControl,
                Factor::KingSafety,
                Factor::PawnStructure,
            ]
        );
    }

    proptest! {
        #[test]
        fn percentage_stays_in_range(white in 0u32..200, black in 0u32..200) {
            let score = FactorScore::new(white, black);
            prop_assert!(score.percentage >= -100.0 && score.percentage <= 100.0);
            if white == black {
                prop_assert_eq!(score.percentage, 0.0);
            }
        }
    }
}
