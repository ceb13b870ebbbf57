pub mod assess;
pub mod impressions;
pub mod offers;

use payattn_types::error::PayattnError;
use payattn_types::OfferId;

/// Offer ids travel over the wire in their `Display` (base58) form; this
/// undoes that encoding for every handler that takes one as a path segment.
pub(crate) fn parse_offer_id(raw: &str) -> Result<OfferId, PayattnError> {
    let bytes = bs58::decode(raw)
        .into_vec()
        .map_err(|_| PayattnError::MalformedInput(format!("'{raw}' is not a valid base58 offer id")))?;
    OfferId::new(bytes)
}
