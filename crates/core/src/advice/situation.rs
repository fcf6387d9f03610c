//! Significance tests and situation key construction

use crate::config::AdviceThresholds;
use crate::evaluation::{Factor, PositionEvaluation};

use super::types::AdvantageSets;

/// Reserved key for the standard starting position.
pub const INITIAL_POSITION_KEY: &str = "initial_position";

/// Stands in for an empty own-side list in a perspective key.
pub const NO_ADVANTAGE: &str = "none";

pub fn significance_threshold(factor: Factor, thresholds: &AdviceThresholds) -> f64 {
    match factor {
        Factor::MaterialBalance => thresholds.material_threshold,
        _ => thresholds.positional_threshold,
    }
}

impl AdvantageSets {
    pub fn from_evaluation(evaluation: &PositionEvaluation, thresholds: &AdviceThresholds) -> Self {
        let mut sets = AdvantageSets::default();

        for (factor, score) in evaluation.iter() {
            if score.percentage.abs() <= significance_threshold(factor, thresholds) {
                continue;
            }
            if score.percentage > 0.0 {
                sets.white.push(factor);
            } else {
                sets.black.push(factor);
            }
        }

        sets
    }
}

/// Builds the canonical key `mine[_vs_theirs]`.
///
/// Each side's factors are sorted into canonical order first, so the result
/// does not depend on the order they were found in. Both sides empty gives the
/// empty (neutral) key; an empty own side with a non-empty opponent side
/// gives `none_vs_<theirs>`.
pub fn situation_key(mine: &[Factor], theirs: &[Factor]) -> String {
    let mine = join_factors(mine);
    let theirs = join_factors(theirs);

    match (mine.is_empty(), theirs.is_empty()) {
        (true, true) => String::new(),
        (false, true) => mine,
        (true, false) => format!("{}_vs_{}", NO_ADVANTAGE, theirs),
        (false, false) => format!("{}_vs_{}", mine, theirs),
    }
}

fn join_factors(factors: &[Factor]) -> String {
    let mut sorted = factors.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
        .iter()
        .map(Factor::as_str)
        .collect::<Vec<_>>()
        .join("_")
}
