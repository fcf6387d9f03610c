//! Five-factor static evaluation of a single position

mod evaluator;
mod types;

pub use evaluator::*;
pub use types::*;
