//! Tunable thresholds for evaluation, advice and game analysis.
//!
//! Every field defaults to the value the analysis is calibrated for, so a
//! partial JSON document only needs to name what it overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub advice: AdviceThresholds,
    pub classification: ClassificationThresholds,
    pub periods: PeriodSettings,
    pub critical: CriticalSettings,
    pub phases: PhaseSettings,
    pub cache: CacheSettings,
}

/// Minimum `|percentage|` for a factor to count as a significant advantage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceThresholds {
    /// A single pawn is already a large swing, so material is far more sensitive.
    pub material_threshold: f64,
    pub positional_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub dominant_threshold: f64,
    pub advantage_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodSettings {
    pub strength_tolerance: f64,
    pub min_period_len: usize,
    pub key_move_strength: f64,
    pub summary_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalSettings {
    pub swing_threshold: f64,
    pub turning_point: f64,
    pub critical_decision: f64,
    pub blunder_brilliant: f64,
    pub summary_significance: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSettings {
    pub opening_max: usize,
    pub opening_fraction: f64,
    pub endgame_scan_fraction: f64,
    pub endgame_material: u32,
    pub endgame_default_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Positions evaluated between cooperative yields.
    pub batch_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            advice: AdviceThresholds::default(),
            classification: ClassificationThresholds::default(),
            periods: PeriodSettings::default(),
            critical: CriticalSettings::default(),
            phases: PhaseSettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl Default for AdviceThresholds {
    fn default() -> Self {
        Self {
            material_threshold: 5.0,
            positional_threshold: 15.0,
        }
    }
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            dominant_threshold: 20.0,
            advantage_threshold: 15.0,
        }
    }
}

impl Default for PeriodSettings {
    fn default() -> Self {
        Self {
            strength_tolerance: 20.0,
            min_period_len: 3,
            key_move_strength: 40.0,
            summary_strength: 25.0,
        }
    }
}

impl Default for CriticalSettings {
    fn default() -> Self {
        Self {
            swing_threshold: 30.0,
            turning_point: 60.0,
            critical_decision: 45.0,
            blunder_brilliant: 35.0,
            summary_significance: 4,
        }
    }
}

impl Default for PhaseSettings {
    fn default() -> Self {
        Self {
            opening_max: 15,
            opening_fraction: 0.3,
            endgame_scan_fraction: 0.6,
            endgame_material: 20,
            endgame_default_fraction: 0.8,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { batch_size: 10 }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
