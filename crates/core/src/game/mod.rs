//! Whole-game strategic analysis

mod aggregator;
mod types;

pub use aggregator::*;
pub use types::*;
