//! Advice lookup

use crate::config::AdviceThresholds;
use crate::evaluation::{PositionEvaluation, Side};
use crate::position::BoardPosition;

use super::situation::{situation_key, INITIAL_POSITION_KEY};
use super::table::AdviceTable;
use super::types::*;

/// Advice from the built-in table with the default thresholds.
pub fn advice_for(evaluation: &PositionEvaluation, position: Option<&BoardPosition>) -> AdviceResult {
    AdviceTable::builtin().advice_for(evaluation, position, &AdviceThresholds::default())
}

impl AdviceTable {
    /// Diagnoses `evaluation` from the point of view of the side holding more
    /// significant advantages.
    ///
    /// A key missing from the table is reported through
    /// [`AdviceStatus::NotFound`] with the key attached, never as an error.
    pub fn advice_for(
        &self,
        evaluation: &PositionEvaluation,
        position: Option<&BoardPosition>,
        thresholds: &AdviceThresholds,
    ) -> AdviceResult {
        let sets = AdvantageSets::from_evaluation(evaluation, thresholds);

        if position.is_some_and(BoardPosition::is_initial) {
            return self.resolve(INITIAL_POSITION_KEY.to_string(), None, sets, true);
        }

        if sets.is_empty() {
            return AdviceResult {
                diagnosis: String::new(),
                prescription: String::new(),
                icon: Icon::Neutral,
                situation_key: String::new(),
                status: AdviceStatus::NoAdvantage,
                perspective: None,
                white_advantages: sets.white,
                black_advantages: sets.black,
            };
        }

        let mine = sets.leading_side();
        let key = situation_key(sets.of(mine), sets.of(mine.opponent()));
        self.resolve(key, Some(mine), sets, false)
    }

    /// Advice addressed to `side`, built from its own advantages against the
    /// opponent's. In the initial position both sides get the same entry.
    pub fn perspective_advice(
        &self,
        sets: &AdvantageSets,
        side: Side,
        is_initial: bool,
    ) -> PerspectiveAdvice {
        let key = if is_initial {
            INITIAL_POSITION_KEY.to_string()
        } else {
            situation_key(sets.of(side), sets.of(side.opponent()))
        };

        if key.is_empty() {
            return PerspectiveAdvice {
                side,
                situation_key: key,
                diagnosis: String::new(),
                prescription: String::new(),
                icon: Icon::Neutral,
                status: AdviceStatus::NoAdvantage,
            };
        }

        match self.lookup(&key) {
            Some(entry) => PerspectiveAdvice {
                side,
                diagnosis: entry.diagnosis.clone(),
                prescription: entry.prescription.clone(),
                icon: entry.direction.into(),
                status: if is_initial {
                    AdviceStatus::InitialPosition
                } else {
                    AdviceStatus::Matched
                },
                situation_key: key,
            },
            None => {
                tracing::warn!(situation_key = %key, side = side.name(), "no advice authored for situation");
                PerspectiveAdvice {
                    side,
                    situation_key: key,
                    diagnosis: String::new(),
                    prescription: String::new(),
                    icon: Icon::NotFound,
                    status: AdviceStatus::NotFound,
                }
            }
        }
    }

    fn resolve(
        &self,
        key: String,
        perspective: Option<Side>,
        sets: AdvantageSets,
        is_initial: bool,
    ) -> AdviceResult {
        let (diagnosis, prescription, icon, status) = match self.lookup(&key) {
            Some(entry) => (
                entry.diagnosis.clone(),
                entry.prescription.clone(),
                Icon::from(entry.direction),
                if is_initial {
                    AdviceStatus::InitialPosition
                } else {
                    AdviceStatus::Matched
                },
            ),
            None => {
                tracing::warn!(situation_key = %key, "no advice authored for situation");
                (String::new(), String::new(), Icon::NotFound, AdviceStatus::NotFound)
            }
        };

        AdviceResult {
            diagnosis,
            prescription,
            icon,
            situation_key: key,
            status,
            perspective,
            white_advantages: sets.white,
            black_advantages: sets.black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{evaluate, evaluate_fen, Factor, FactorScore};
    use crate::position::INITIAL_FEN;

    fn flat(material: (u32, u32), king: (u32, u32)) -> PositionEvaluation {
        PositionEvaluation {
            material_balance: FactorScore::new(material.0, material.1),
            space_control: FactorScore::new(8, 8),
            piece_activity: FactorScore::new(20, 20),
            king_safety: FactorScore::new(king.0, king.1),
            pawn_structure: FactorScore::new(1, 1),
        }
    }

    #[test]
    fn test_initial_position_short_circuits() {
        let position = BoardPosition::from_fen(INITIAL_FEN).unwrap();
        let result = advice_for(&evaluate(&position), Some(&position));

        assert_eq!(result.situation_key, INITIAL_POSITION_KEY);
        assert_eq!(result.status, AdviceStatus::InitialPosition);
        assert!(!result.diagnosis.is_empty());
        assert_eq!(result.perspective, None);
    }

    #[test]
    fn test_no_advantage_is_neutral_not_missing() {
        let result = advice_for(&flat((39, 39), (3, 3)), None);

        assert_eq!(result.status, AdviceStatus::NoAdvantage);
        assert_eq!(result.icon, Icon::Neutral);
        assert!(result.situation_key.is_empty());
        assert!(result.diagnosis.is_empty());
    }

    #[test]
    fn test_leading_side_gets_the_advice() {
        // Black up a rook, white's king better sheltered: one factor each,
        // so white speaks first.
        let result = advice_for(&flat((34, 39), (3, 1)), None);

        assert_eq!(result.perspective, Some(Side::White));
        assert_eq!(result.situation_key, "kingSafety_vs_materialBalance");
        assert_eq!(result.status, AdviceStatus::Matched);
        assert_eq!(result.white_advantages, vec![Factor::KingSafety]);
        assert_eq!(result.black_advantages, vec![Factor::MaterialBalance]);
    }

    #[test]
    fn test_missing_entry_exposes_key() {
        let table = AdviceTable::from_json_str(r#"{ "version": "empty", "entries": {} }"#).unwrap();
        let result = table.advice_for(&flat((48, 39), (3, 3)), None, &AdviceThresholds::default());

        assert_eq!(result.status, AdviceStatus::NotFound);
        assert_eq!(result.icon, Icon::NotFound);
        assert_eq!(result.situation_key, "materialBalance");
        assert!(result.diagnosis.is_empty());
    }

    #[test]
    fn test_perspectives_mirror_each_other() {
        let sets = AdvantageSets {
            white: vec![Factor::MaterialBalance],
            black: vec![],
        };
        let table = AdviceTable::builtin();

        let white = table.perspective_advice(&sets, Side::White, false);
        let black = table.perspective_advice(&sets, Side::Black, false);

        assert_eq!(white.situation_key, "materialBalance");
        assert_eq!(black.situation_key, "none_vs_materialBalance");
        assert_eq!(white.icon, Icon::Attack);
        assert_eq!(black.icon, Icon::Defend);
        assert_ne!(white.text(), black.text());
    }

    #[test]
    fn test_initial_perspectives_are_identical() {
        let eval = evaluate_fen(INITIAL_FEN).unwrap();
        let sets = AdvantageSets::from_evaluation(&eval, &AdviceThresholds::default());
        let table = AdviceTable::builtin();

        let white = table.perspective_advice(&sets, Side::White, true);
        let black = table.perspective_advice(&sets, Side::Black, true);

        assert_eq!(white.situation_key, INITIAL_POSITION_KEY);
        assert_eq!(white.text(), black.text());
        assert_eq!(white.status, AdviceStatus::InitialPosition);
    }
}
