//! Game analysis types

use serde::{Deserialize, Serialize};

use crate::config::ClassificationThresholds;
use crate::evaluation::{evaluate, AdvantageColor, Factor, PositionEvaluation};
use crate::position::BoardPosition;

/// One half-move's evaluation reduced to a dominant factor, a favored color
/// and a strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInsight {
    pub index: usize,
    pub san: Option<String>,
    pub fen: String,
    pub evaluation: PositionEvaluation,
    /// Sum of the five signed percentages.
    pub total_advantage: f64,
    /// `None` when no factor stands out (a balanced position).
    pub dominant_factor: Option<Factor>,
    pub advantage_color: AdvantageColor,
    /// `0..=100`
    pub strength: f64,
}

impl MoveInsight {
    pub fn from_position(
        index: usize,
        san: Option<String>,
        position: &BoardPosition,
        thresholds: &ClassificationThresholds,
    ) -> Self {
        Self::classify(index, san, position.fen().to_string(), evaluate(position), thresholds)
    }

    pub fn classify(
        index: usize,
        san: Option<String>,
        fen: String,
        evaluation: PositionEvaluation,
        thresholds: &ClassificationThresholds,
    ) -> Self {
        let total_advantage = evaluation.total_advantage();

        let dominant_factor = evaluation
            .iter()
            .map(|(factor, score)| (factor, score.percentage.abs()))
            .fold(None, |best: Option<(Factor, f64)>, (factor, magnitude)| match best {
                Some((_, top)) if top >= magnitude => best,
                _ => Some((factor, magnitude)),
            })
            .filter(|(_, magnitude)| *magnitude > thresholds.dominant_threshold)
            .map(|(factor, _)| factor);

        let advantage_color = if total_advantage > thresholds.advantage_threshold {
            AdvantageColor::White
        } else if total_advantage < -thresholds.advantage_threshold {
            AdvantageColor::Black
        } else {
            AdvantageColor::Neutral
        };

        Self {
            index,
            san,
            fen,
            evaluation,
            total_advantage,
            dominant_factor,
            advantage_color,
            strength: (total_advantage.abs() / 5.0).min(100.0),
        }
    }

    /// Full move number this half-move belongs to, counting from 1.
    pub fn move_number(&self) -> usize {
        self.index / 2 + 1
    }
}

/// A run of half-moves sharing a dominant factor and favored color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicPeriod {
    pub start: usize,
    /// Inclusive.
    pub end: usize,
    pub dominant_factor: Option<Factor>,
    pub advantage_color: AdvantageColor,
    pub average_strength: f64,
    /// Half-moves inside the period that were strong on their own.
    pub key_moves: Vec<usize>,
    pub description: String,
}

impl StrategicPeriod {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalMomentKind {
    Transition,
    CriticalDecision,
    Blunder,
    Brilliant,
    TurningPoint,
}

impl CriticalMomentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalMomentKind::Transition => "transition",
            CriticalMomentKind::CriticalDecision => "critical_decision",
            CriticalMomentKind::Blunder => "blunder",
            CriticalMomentKind::Brilliant => "brilliant",
            CriticalMomentKind::TurningPoint => "turning_point",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CriticalMomentKind::Transition => "Transition",
            CriticalMomentKind::CriticalDecision => "Critical Decision",
            CriticalMomentKind::Blunder => "Blunder",
            CriticalMomentKind::Brilliant => "Brilliant",
            CriticalMomentKind::TurningPoint => "Turning Point",
        }
    }

    pub fn is_tactical(&self) -> bool {
        matches!(self, CriticalMomentKind::Blunder | CriticalMomentKind::Brilliant)
    }
}

/// A half-move where the total evaluation swings sharply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalMoment {
    /// The later half-move of the swinging pair.
    pub index: usize,
    pub san: Option<String>,
    pub kind: CriticalMomentKind,
    pub change: f64,
    /// `1..=5`
    pub significance: u8,
    pub advantage_before: f64,
    pub advantage_after: f64,
    pub description: String,
}

/// Inclusive half-move range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRange {
    pub start: usize,
    pub end: usize,
}

impl PhaseRange {
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Very short games can skip the middlegame or the endgame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePhases {
    pub opening: PhaseRange,
    pub middlegame: Option<PhaseRange>,
    pub endgame: Option<PhaseRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameCharacter {
    Tactical,
    Positional,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub total_moves: usize,
    pub white_strengths: Vec<Factor>,
    pub black_strengths: Vec<Factor>,
    pub turning_points: Vec<CriticalMoment>,
    pub character: GameCharacter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub moves: Vec<MoveInsight>,
    pub periods: Vec<StrategicPeriod>,
    pub critical_moments: Vec<CriticalMoment>,
    /// `None` for a game without positions.
    pub game_phases: Option<GamePhases>,
    pub summary: GameSummary,
}
