//! Per-circuit-kind public-signal interpretation (spec.md §4.5 step 3).

use payattn_types::entities::CircuitKind;
use payattn_types::error::PayattnError;
use sha2::{Digest, Sha256};

/// Campaign-side requirement a proof's public signals must satisfy,
/// supplied by the caller (the coordinator, reading an ad creative's
/// `targeting`).
#[derive(Debug, Clone)]
pub enum CircuitRequirements {
    /// Range-kind circuits (`age_range`, `range_check`): signals are
    /// `[valid_flag, min, max]`.
    Range { min: i64, max: i64 },
    /// Set-membership: signals are `[in_flag, hashed_element_1..k]`. The
    /// requirement side is the plaintext expected set; both sides hash
    /// with `canonical_hash_to_field` before comparing.
    SetMembership { expected_set: Vec<String> },
}

/// Canonical hash-to-field used by both the circuit's witness generator and
/// this validator so a requirement's plaintext set and a proof's emitted
/// signals are comparable (spec.md §4.5: "both sides compute the same
/// canonical hash-to-field"). SHA-256 truncated to the low 31 bytes keeps
/// the digest under the BN254 scalar field modulus, then hex-encoded as the
/// canonical signal representation.
pub fn canonical_hash_to_field(element: &str) -> String {
    let digest = Sha256::digest(element.as_bytes());
    hex::encode(&digest[1..]) // drop the top byte to stay below the field modulus
}

/// Interprets `public_signals` according to `circuit_kind` and checks them
/// against `requirements`. Returns `Ok(())` on a match, or a structured
/// `SignalsMismatchRequirements` error naming the disagreement.
pub fn interpret_and_match(
    circuit_kind: CircuitKind,
    public_signals: &[String],
    requirements: &CircuitRequirements,
) -> Result<(), PayattnError> {
    match (circuit_kind, requirements) {
        (CircuitKind::AgeRange, CircuitRequirements::Range { min, max })
        | (CircuitKind::RangeCheck, CircuitRequirements::Range { min, max }) => {
            match_range_signals(public_signals, *min, *max)
        }
        (CircuitKind::SetMembership, CircuitRequirements::SetMembership { expected_set }) => {
            match_set_membership_signals(public_signals, expected_set)
        }
        _ => Err(PayattnError::SignalsMismatchRequirements {
            reason: "circuit kind does not match the supplied requirement shape".to_string(),
        }),
    }
}

fn match_range_signals(signals: &[String], min: i64, max: i64) -> Result<(), PayattnError> {
    if signals.len() != 3 {
        return Err(PayattnError::SignalsMismatchRequirements {
            reason: format!(
                "range circuit expects 3 signals [valid_flag, min, max], got {}",
                signals.len()
            ),
        });
    }

    let valid_flag = &signals[0];
    if valid_flag != "1" {
        return Err(PayattnError::SignalsMismatchRequirements {
            reason: "proof's valid_flag signal is not set".to_string(),
        });
    }

    let signal_min: i64 = signals[1]
        .parse()
        .map_err(|_| PayattnError::SignalsMismatchRequirements {
            reason: "min signal is not an integer".to_string(),
        })?;
    let signal_max: i64 = signals[2]
        .parse()
        .map_err(|_| PayattnError::SignalsMismatchRequirements {
            reason: "max signal is not an integer".to_string(),
        })?;

    if signal_min != min || signal_max != max {
        return Err(PayattnError::SignalsMismatchRequirements {
            reason: format!(
                "proof bounds [{signal_min},{signal_max}] do not match requirement [{min},{max}]"
            ),
        });
    }

    Ok(())
}

fn match_set_membership_signals(
    signals: &[String],
    expected_set: &[String],
) -> Result<(), PayattnError> {
    if signals.is_empty() {
        return Err(PayattnError::SignalsMismatchRequirements {
            reason: "set-membership circuit requires at least an in_flag signal".to_string(),
        });
    }

    let in_flag = &signals[0];
    if in_flag != "1" {
        return Err(PayattnError::SignalsMismatchRequirements {
            reason: "proof's in_flag signal is not set".to_string(),
        });
    }

    let mut expected_hashes: Vec<String> = expected_set
        .iter()
        .map(|e| canonical_hash_to_field(e))
        .collect();
    expected_hashes.sort();

    let mut signal_hashes: Vec<String> = signals[1..].to_vec();
    signal_hashes.sort();

    if signal_hashes != expected_hashes {
        return Err(PayattnError::SignalsMismatchRequirements {
            reason: "hashed element set does not match the campaign's expected set".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // spec.md §8 property 7: the validator is a pure function of its
        // inputs. Exercised here at the signal-interpretation layer (the
        // groth16 verification step itself has no circuit-specific state to
        // vary without a trusted-setup artifact, see registry.rs).
        #[test]
        fn range_match_is_pure(
            flag in "[01]",
            signal_min in -1000i64..1000,
            signal_max in -1000i64..1000,
            req_min in -1000i64..1000,
            req_max in -1000i64..1000,
        ) {
            let signals = vec![flag, signal_min.to_string(), signal_max.to_string()];
            let first = match_range_signals(&signals, req_min, req_max).is_ok();
            let second = match_range_signals(&signals, req_min, req_max).is_ok();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn hash_to_field_is_pure(element in "[a-z]{1,16}") {
            prop_assert_eq!(
                canonical_hash_to_field(&element),
                canonical_hash_to_field(&element)
            );
        }
    }

    #[test]
    fn hash_to_field_is_deterministic() {
        assert_eq!(
            canonical_hash_to_field("gaming"),
            canonical_hash_to_field("gaming")
        );
        assert_ne!(
            canonical_hash_to_field("gaming"),
            canonical_hash_to_field("sports")
        );
    }

    #[test]
    fn range_signals_match_requirement() {
        let signals = vec!["1".to_string(), "25".to_string(), "40".to_string()];
        assert!(match_range_signals(&signals, 25, 40).is_ok());
    }

    #[test]
    fn range_signals_mismatch_is_rejected() {
        let signals = vec!["1".to_string(), "30".to_string(), "50".to_string()];
        assert!(match_range_signals(&signals, 25, 40).is_err());
    }

    #[test]
    fn set_membership_matches_regardless_of_order() {
        let expected = vec!["gaming".to_string(), "sports".to_string()];
        let mut hashes: Vec<String> = expected.iter().map(|e| canonical_hash_to_field(e)).collect();
        hashes.reverse();
        let mut signals = vec!["1".to_string()];
        signals.extend(hashes);
        assert!(match_set_membership_signals(&signals, &expected).is_ok());
    }
}
