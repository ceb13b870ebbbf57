//! Settlement engine (spec.md §4.3): transforms one qualifying impression
//! into the three independent, randomly-ordered, randomly-delayed
//! settlement transactions that split an escrow 70/25/5.

pub mod engine;
pub mod splits;

pub use engine::{ImpressionOutcome, SettlementEngine};
pub use splits::{compute_splits, Splits};
