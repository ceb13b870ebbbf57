pub mod escrow;
pub mod program_config;

pub use escrow::*;
pub use program_config::*;
