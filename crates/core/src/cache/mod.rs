//! Per-game memo of move-by-move analysis

mod store;
mod types;

pub use store::*;
pub use types::*;
