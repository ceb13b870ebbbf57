use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PayattnError;

/// Opaque offer identifier, capped at 32 bytes since it doubles as the
/// on-chain PDA seed (spec §6 "On-chain: account layout").
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct OfferId(Vec<u8>);

pub const MAX_OFFER_ID_LEN: usize = 32;

impl OfferId {
    pub fn new(bytes: Vec<u8>) -> Result<Self, PayattnError> {
        if bytes.len() > MAX_OFFER_ID_LEN {
            return Err(PayattnError::OfferIdTooLong {
                len: bytes.len(),
                max: MAX_OFFER_ID_LEN,
            });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl TryFrom<Vec<u8>> for OfferId {
    type Error = PayattnError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        OfferId::new(bytes)
    }
}

impl From<OfferId> for Vec<u8> {
    fn from(id: OfferId) -> Vec<u8> {
        id.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OfferId({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_lengths() {
        assert!(OfferId::new(vec![]).is_ok());
        assert!(OfferId::new(vec![0u8; 1]).is_ok());
        assert!(OfferId::new(vec![0u8; 32]).is_ok());
    }

    #[test]
    fn rejects_over_32_bytes() {
        let err = OfferId::new(vec![0u8; 33]).unwrap_err();
        assert!(matches!(err, PayattnError::OfferIdTooLong { len: 33, max: 32 }));
    }
}
