//! Cached analysis records

use serde::{Deserialize, Serialize};

use crate::advice::PerspectiveAdvice;
use crate::evaluation::{AdvantageColor, Factor, PositionEvaluation};
use crate::game::{CriticalMoment, GamePhases, GameSummary, StrategicPeriod};

/// Everything the timeline needs about one half-move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedMoveAnalysis {
    pub index: usize,
    pub san: Option<String>,
    pub fen: String,
    pub evaluation: PositionEvaluation,
    pub total_advantage: f64,
    pub dominant_factor: Option<Factor>,
    pub advantage_color: AdvantageColor,
    pub strength: f64,
    pub white_advantages: Vec<Factor>,
    pub black_advantages: Vec<Factor>,
    /// Key from the leading side's point of view.
    pub situation_key: String,
    pub white_advice: PerspectiveAdvice,
    pub black_advice: PerspectiveAdvice,
}

/// A fully analyzed game. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCache {
    pub game_id: String,
    pub pgn_hash: u32,
    /// Unix time in milliseconds.
    pub created_at: i64,
    pub analysis_time_ms: u64,
    pub moves: Vec<CachedMoveAnalysis>,
    pub periods: Vec<StrategicPeriod>,
    pub critical_moments: Vec<CriticalMoment>,
    pub game_phases: Option<GamePhases>,
    pub summary: GameSummary,
}

impl GameCache {
    pub fn move_analysis(&self, index: usize) -> Option<&CachedMoveAnalysis> {
        self.moves.get(index)
    }

    pub fn period_at(&self, index: usize) -> Option<&StrategicPeriod> {
        self.periods.iter().find(|p| p.contains(index))
    }

    pub fn critical_moment_at(&self, index: usize) -> Option<&CriticalMoment> {
        self.critical_moments.iter().find(|m| m.index == index)
    }
}
