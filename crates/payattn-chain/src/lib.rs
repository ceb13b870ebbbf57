//! PDA derivation, instruction builders, account-layout decoding, signing
//! capability, and the RPC client wrapper for `payattn_escrow`. This is the
//! only off-chain crate that talks to the chain.

pub mod client;
pub mod errors;
pub mod instructions;
pub mod layout;
pub mod pda;
pub mod signing;

pub use client::ChainClient;
pub use pda::{escrow_pda, program_config_pda};
pub use signing::{FileKeypairAuthority, SigningAuthority};
