pub mod create_escrow;
pub mod initialize;
pub mod refund;
pub mod settle;
pub mod utils;

pub use create_escrow::*;
pub use initialize::*;
pub use refund::*;
pub use settle::*;
