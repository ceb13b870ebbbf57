/// Maximum length in bytes of an offer id (also the PDA seed payload).
pub const MAX_OFFER_ID_LEN: usize = 32;

/// Default refund timeout (72 hours), used when a program config is
/// initialized without an explicit override.
pub const DEFAULT_REFUND_TIMEOUT_SECS: i64 = 72 * 3600;

/// User share of the distributable amount, in basis points.
pub const USER_SHARE_BPS: u64 = 7_000;

/// Publisher share of the distributable amount, in basis points.
pub const PUBLISHER_SHARE_BPS: u64 = 2_500;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seeds for PDA derivation.
pub mod seeds {
    /// Escrow account PDA seed.
    pub const ESCROW: &[u8] = b"escrow";

    /// Program config PDA seed.
    pub const PROGRAM_CONFIG: &[u8] = b"program_config";
}
