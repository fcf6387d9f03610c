//! Period segmentation, critical moments and phase detection over a game

use crate::config::{AnalysisConfig, CriticalSettings, PeriodSettings, PhaseSettings};
use crate::error::Result;
use crate::evaluation::{AdvantageColor, Factor};
use crate::position::BoardPosition;

use super::types::*;

/// Analyzes a game with the default thresholds.
///
/// `positions[i]` is the FEN after half-move `i`, `san_moves[i]` the move
/// that produced it. A missing SAN entry is tolerated.
pub fn analyze_game(positions: &[String], san_moves: &[String]) -> Result<GameAnalysis> {
    analyze_game_with(positions, san_moves, &AnalysisConfig::default())
}

pub fn analyze_game_with(
    positions: &[String],
    san_moves: &[String],
    config: &AnalysisConfig,
) -> Result<GameAnalysis> {
    let moves = positions
        .iter()
        .enumerate()
        .map(|(index, fen)| {
            let position = BoardPosition::from_fen(fen)?;
            Ok(MoveInsight::from_position(
                index,
                san_moves.get(index).cloned(),
                &position,
                &config.classification,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GameAnalysis::from_moves(moves, config))
}

impl GameAnalysis {
    /// Builds the game-level view from already classified half-moves.
    pub fn from_moves(moves: Vec<MoveInsight>, config: &AnalysisConfig) -> Self {
        let periods = detect_periods(&moves, &config.periods);
        let critical_moments = detect_critical_moments(&moves, &config.critical);
        let game_phases = detect_phases(&moves, &config.phases);
        let summary = summarize(&moves, &periods, &critical_moments, config);

        tracing::debug!(
            moves = moves.len(),
            periods = periods.len(),
            critical_moments = critical_moments.len(),
            "game analysis assembled"
        );

        Self {
            moves,
            periods,
            critical_moments,
            game_phases,
            summary,
        }
    }

    pub fn period_at(&self, index: usize) -> Option<&StrategicPeriod> {
        self.periods.iter().find(|p| p.contains(index))
    }
}

struct OpenPeriod {
    start: usize,
    end: usize,
    dominant_factor: Option<Factor>,
    advantage_color: AdvantageColor,
    strength_sum: f64,
    count: usize,
    key_moves: Vec<usize>,
}

impl OpenPeriod {
    fn new(first: &MoveInsight, settings: &PeriodSettings) -> Self {
        let mut period = Self {
            start: first.index,
            end: first.index,
            dominant_factor: first.dominant_factor,
            advantage_color: first.advantage_color,
            strength_sum: 0.0,
            count: 0,
            key_moves: Vec::new(),
        };
        period.push(first, settings);
        period
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.strength_sum / self.count as f64
        }
    }

    fn len(&self) -> usize {
        self.end - self.start + 1
    }

    fn push(&mut self, insight: &MoveInsight, settings: &PeriodSettings) {
        self.end = insight.index;
        self.strength_sum += insight.strength;
        self.count += 1;
        if insight.strength > settings.key_move_strength {
            self.key_moves.push(insight.index);
        }
    }

    fn breaks_on(&self, insight: &MoveInsight, settings: &PeriodSettings) -> bool {
        insight.dominant_factor != self.dominant_factor
            || insight.advantage_color != self.advantage_color
            || (self.average() - insight.strength).abs() > settings.strength_tolerance
    }

    /// Starts a run with `insight`'s character that keeps this (too short)
    /// run's half-moves at its front.
    fn carry_into(self, insight: &MoveInsight, settings: &PeriodSettings) -> Self {
        let mut next = OpenPeriod::new(insight, settings);
        next.start = self.start;
        next.strength_sum += self.strength_sum;
        next.count += self.count;
        let mut key_moves = self.key_moves;
        key_moves.append(&mut next.key_moves);
        next.key_moves = key_moves;
        next
    }

    /// Appends a trailing run that was too short to stand on its own.
    fn absorb(&mut self, tail: OpenPeriod) {
        self.end = tail.end;
        self.strength_sum += tail.strength_sum;
        self.count += tail.count;
        self.key_moves.extend(tail.key_moves);
    }

    fn close(self) -> StrategicPeriod {
        let average_strength = self.average();
        let description = describe_period(
            self.start,
            self.end,
            self.dominant_factor,
            self.advantage_color,
            average_strength,
        );

        StrategicPeriod {
            start: self.start,
            end: self.end,
            dominant_factor: self.dominant_factor,
            advantage_color: self.advantage_color,
            average_strength,
            key_moves: self.key_moves,
            description,
        }
    }
}

/// Splits the game into strategic periods.
///
/// A run is only closed once it holds `min_period_len` half-moves; a shorter
/// run is carried into the next one, and a short run at the very end joins
/// the last closed period. The result covers every half-move exactly once,
/// unless the whole game is shorter than one period.
pub fn detect_periods(moves: &[MoveInsight], settings: &PeriodSettings) -> Vec<StrategicPeriod> {
    let min_len = settings.min_period_len.max(1);
    let mut closed: Vec<OpenPeriod> = Vec::new();
    let mut current: Option<OpenPeriod> = None;

    for insight in moves {
        current = Some(match current.take() {
            None => OpenPeriod::new(insight, settings),
            Some(mut open) if !open.breaks_on(insight, settings) => {
                open.push(insight, settings);
                open
            }
            Some(open) if open.len() >= min_len => {
                closed.push(open);
                OpenPeriod::new(insight, settings)
            }
            Some(open) => open.carry_into(insight, settings),
        });
    }

    if let Some(open) = current {
        if open.len() >= min_len {
            closed.push(open);
        } else if let Some(last) = closed.last_mut() {
            last.absorb(open);
        }
    }

    closed.into_iter().map(OpenPeriod::close).collect()
}

fn describe_period(
    start: usize,
    end: usize,
    dominant_factor: Option<Factor>,
    advantage_color: AdvantageColor,
    average_strength: f64,
) -> String {
    let span = format!("Moves {}-{}", start / 2 + 1, end / 2 + 1);

    match (advantage_color, dominant_factor) {
        (AdvantageColor::Neutral, Some(factor)) => format!(
            "{}: a balanced stretch, with {} the most contested factor.",
            span,
            factor.display_name()
        ),
        (AdvantageColor::Neutral, None) => {
            format!("{}: a balanced stretch with no lasting advantage.", span)
        }
        (color, Some(factor)) => format!(
            "{}: {} holds a {} edge built on {} (average strength {:.0}).",
            span,
            color.name(),
            intensity(average_strength),
            factor.display_name(),
            average_strength
        ),
        (color, None) => format!(
            "{}: {} keeps a {} overall edge without one standout factor (average strength {:.0}).",
            span,
            color.name(),
            intensity(average_strength),
            average_strength
        ),
    }
}

fn intensity(strength: f64) -> &'static str {
    match strength {
        s if s > 60.0 => "decisive",
        s if s > 40.0 => "clear",
        s if s > 20.0 => "moderate",
        _ => "slight",
    }
}

/// Flags half-moves where the total signed advantage jumps by more than
/// `swing_threshold` from the previous half-move.
pub fn detect_critical_moments(
    moves: &[MoveInsight],
    settings: &CriticalSettings,
) -> Vec<CriticalMoment> {
    moves
        .windows(2)
        .filter_map(|pair| {
            let (before, after) = (&pair[0], &pair[1]);
            let change = (after.total_advantage - before.total_advantage).abs();
            if change <= settings.swing_threshold {
                return None;
            }

            let kind = classify_swing(before, after, change, settings);
            let significance = ((change / 20.0).floor() as u8).saturating_add(1).min(5);

            Some(CriticalMoment {
                index: after.index,
                san: after.san.clone(),
                kind,
                change,
                significance,
                advantage_before: before.total_advantage,
                advantage_after: after.total_advantage,
                description: describe_moment(before, after, kind, change),
            })
        })
        .collect()
}

fn classify_swing(
    before: &MoveInsight,
    after: &MoveInsight,
    change: f64,
    settings: &CriticalSettings,
) -> CriticalMomentKind {
    if change > settings.turning_point {
        CriticalMomentKind::TurningPoint
    } else if change > settings.critical_decision {
        CriticalMomentKind::CriticalDecision
    } else if after.advantage_color != before.advantage_color {
        CriticalMomentKind::Transition
    } else if change > settings.blunder_brilliant && after.strength < before.strength {
        CriticalMomentKind::Blunder
    } else if change > settings.blunder_brilliant && after.strength > before.strength {
        CriticalMomentKind::Brilliant
    } else {
        CriticalMomentKind::CriticalDecision
    }
}

fn describe_moment(
    before: &MoveInsight,
    after: &MoveInsight,
    kind: CriticalMomentKind,
    change: f64,
) -> String {
    let toward = if after.total_advantage > before.total_advantage {
        "White"
    } else {
        "Black"
    };
    let mv = match &after.san {
        Some(san) => format!("Move {} ({})", after.move_number(), san),
        None => format!("Move {}", after.move_number()),
    };

    format!(
        "{}: {}, the evaluation swings {:.0} points toward {}.",
        mv,
        kind.display_name().to_lowercase(),
        change,
        toward
    )
}

/// Opening, middlegame and endgame boundaries. `None` for an empty game.
pub fn detect_phases(moves: &[MoveInsight], settings: &PhaseSettings) -> Option<GamePhases> {
    let total = moves.len();
    let last = total.checked_sub(1)?;

    let opening_end = settings
        .opening_max
        .min(fraction_of(total, settings.opening_fraction))
        .min(last);

    let scan_from = fraction_of(total, settings.endgame_scan_fraction);
    let endgame_start = moves
        .iter()
        .enumerate()
        .skip(scan_from)
        .find(|(_, m)| m.evaluation.total_material() <= settings.endgame_material)
        .map(|(i, _)| i)
        .unwrap_or_else(|| fraction_of(total, settings.endgame_default_fraction))
        .max(opening_end + 1);

    let endgame = (endgame_start <= last).then_some(PhaseRange {
        start: endgame_start,
        end: last,
    });
    let middlegame_end = endgame.map_or(last, |e| e.start - 1);
    let middlegame = (opening_end < middlegame_end).then_some(PhaseRange {
        start: opening_end + 1,
        end: middlegame_end,
    });

    Some(GamePhases {
        opening: PhaseRange {
            start: 0,
            end: opening_end,
        },
        middlegame,
        endgame,
    })
}

fn fraction_of(total: usize, fraction: f64) -> usize {
    (total as f64 * fraction).floor() as usize
}

fn summarize(
    moves: &[MoveInsight],
    periods: &[StrategicPeriod],
    critical_moments: &[CriticalMoment],
    config: &AnalysisConfig,
) -> GameSummary {
    let strengths_of = |color: AdvantageColor| {
        let mut factors: Vec<Factor> = periods
            .iter()
            .filter(|p| {
                p.advantage_color == color && p.average_strength > config.periods.summary_strength
            })
            .filter_map(|p| p.dominant_factor)
            .collect();
        factors.sort();
        factors.dedup();
        factors
    };

    let turning_points = critical_moments
        .iter()
        .filter(|m| m.significance >= config.critical.summary_significance)
        .cloned()
        .collect();

    let tactical = critical_moments
        .iter()
        .filter(|m| m.kind.is_tactical())
        .count();
    let character = if tactical > periods.len() {
        GameCharacter::Tactical
    } else if tactical == 0 {
        GameCharacter::Positional
    } else {
        GameCharacter::Mixed
    };

    GameSummary {
        total_moves: moves.len(),
        white_strengths: strengths_of(AdvantageColor::White),
        black_strengths: strengths_of(AdvantageColor::Black),
        turning_points,
        character,
    }
}
