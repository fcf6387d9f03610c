//! Strategic advice from evaluation factors
//!
//! Significant factors are split by color, turned into a canonical situation
//! key and looked up in an authored advice table.

mod engine;
mod situation;
mod table;
mod types;

pub use engine::advice_for;
pub use situation::*;
pub use table::AdviceTable;
pub use types::*;
