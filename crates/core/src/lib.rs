//! Chess Strategist Core Library
//!
//! Scores a position on five heuristic factors (material, space, piece
//! activity, king safety, pawn structure), turns the significant ones into
//! strategic advice, and segments whole games into strategic periods,
//! critical moments and phases.

pub mod advice;
pub mod cache;
pub mod config;
pub mod control;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod parser;
pub mod position;

pub use advice::{advice_for, AdviceResult, AdviceTable, AdvantageSets};
pub use cache::{AnalysisCache, CachedMoveAnalysis, GameCache};
pub use config::AnalysisConfig;
pub use control::{control_map, control_of, SquareControl};
pub use error::{Error, Result};
pub use evaluation::{evaluate, evaluate_fen, Factor, FactorScore, PositionEvaluation};
pub use game::{analyze_game, GameAnalysis};
pub use position::{BoardPosition, INITIAL_FEN};
