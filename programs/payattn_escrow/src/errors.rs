use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    #[msg("Amount must be greater than zero")]
    AmountZero,

    #[msg("Offer id exceeds the maximum length")]
    OfferIdTooLong,

    #[msg("Advertiser has insufficient funds to cover amount and rent")]
    InsufficientFunds,

    #[msg("This party has already been settled")]
    AlreadySettled,

    #[msg("User and publisher must be settled before platform")]
    PrerequisiteNotSettled,

    #[msg("Escrow is not eligible for refund")]
    NotRefundable,

    #[msg("Account does not match the party recorded on the escrow")]
    InvalidPartyAddress,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
