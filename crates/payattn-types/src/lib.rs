//! Entities and wire types shared across every off-chain PayAttn crate.
//! No I/O lives here: just data, (de)serialization, and the error taxonomy.

pub mod entities;
pub mod error;
pub mod offer_id;
pub mod wire;

pub use entities::*;
pub use error::{ErrorKind, PayattnError};
pub use offer_id::OfferId;
pub use wire::*;
