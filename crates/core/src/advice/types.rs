//! Advice types

use serde::{Deserialize, Serialize};

use crate::evaluation::{Factor, Side};

/// Which way an authored piece of advice pushes the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Offensive,
    Defensive,
    Balanced,
}

/// Icon shown next to the advice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Attack,
    Defend,
    Balance,
    /// No significant advantage on either side.
    Neutral,
    /// A situation key the table has no entry for.
    NotFound,
}

impl From<Direction> for Icon {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Offensive => Icon::Attack,
            Direction::Defensive => Icon::Defend,
            Direction::Balanced => Icon::Balance,
        }
    }
}

/// Authored advice for one situation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceEntry {
    pub diagnosis: String,
    pub prescription: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceStatus {
    InitialPosition,
    Matched,
    NoAdvantage,
    /// The key was computed but the table has no text for it.
    NotFound,
}

/// Factors whose percentage clears its significance threshold, per color,
/// in canonical factor order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvantageSets {
    pub white: Vec<Factor>,
    pub black: Vec<Factor>,
}

impl AdvantageSets {
    pub fn of(&self, side: Side) -> &[Factor] {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.white.is_empty() && self.black.is_empty()
    }

    /// The side with at least as many significant factors. Ties go to white.
    pub fn leading_side(&self) -> Side {
        if self.white.len() >= self.black.len() {
            Side::White
        } else {
            Side::Black
        }
    }
}

/// Advice for a position from the leading side's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResult {
    pub diagnosis: String,
    pub prescription: String,
    pub icon: Icon,
    pub situation_key: String,
    pub status: AdviceStatus,
    /// `None` when neither side holds a significant advantage.
    pub perspective: Option<Side>,
    pub white_advantages: Vec<Factor>,
    pub black_advantages: Vec<Factor>,
}

/// Advice addressed to one specific side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveAdvice {
    pub side: Side,
    pub situation_key: String,
    pub diagnosis: String,
    pub prescription: String,
    pub icon: Icon,
    pub status: AdviceStatus,
}

impl PerspectiveAdvice {
    /// Diagnosis and prescription as one line, empty when there is no text.
    pub fn text(&self) -> String {
        match (self.diagnosis.is_empty(), self.prescription.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.diagnosis.clone(),
            (true, false) => self.prescription.clone(),
            (false, false) => format!("{} {}", self.diagnosis, self.prescription),
        }
    }
}
