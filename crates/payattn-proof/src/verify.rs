//! Groth16 proof verification over BN254 (spec.md §4.5 step 2).

use ark_bn254::{Bn254, Fr};
use ark_ff::PrimeField;
use ark_groth16::{Groth16, Proof};
use ark_serialize::CanonicalDeserialize;
use payattn_types::error::PayattnError;
use std::str::FromStr;

use crate::registry::RegisteredCircuit;

/// Parses a decimal-string public signal into the BN254 scalar field. The
/// circuit's witness calculator emits signals as decimal strings (the
/// standard circom/snarkjs convention); we parse them the same way here so
/// both sides agree on field representation.
fn parse_public_input(signal: &str) -> Result<Fr, PayattnError> {
    Fr::from_str(signal).map_err(|_| PayattnError::MalformedInput(format!(
        "public signal '{signal}' is not a valid field element"
    )))
}

/// Verifies `proof_bytes` against `circuit.prepared_vk` and `public_signals`.
/// Returns `Ok(())` on a valid proof, `InvalidProof` otherwise (including on
/// malformed proof bytes or a signal that doesn't decode to a field
/// element — spec.md §8 property 7: any byte-flip that still decodes must
/// verify false, not panic or error out of the pure-function contract).
pub fn verify_groth16(
    circuit_name: &str,
    circuit: &RegisteredCircuit,
    proof_bytes: &[u8],
    public_signals: &[String],
) -> Result<(), PayattnError> {
    let invalid = || PayattnError::InvalidProof {
        circuit: circuit_name.to_string(),
    };

    let proof = Proof::<Bn254>::deserialize_compressed(proof_bytes).map_err(|_| invalid())?;

    let mut inputs = Vec::with_capacity(public_signals.len());
    for signal in public_signals {
        inputs.push(parse_public_input(signal).map_err(|_| invalid())?);
    }

    let is_valid = Groth16::<Bn254>::verify_proof(&circuit.prepared_vk, &proof, &inputs)
        .unwrap_or(false);

    if is_valid {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Exposed for callers that need the raw scalar (set-membership signal
/// comparison goes through hex-encoded hashes instead, see `circuits.rs`).
pub fn field_element_to_hex(fr: &Fr) -> String {
    hex::encode(fr.into_bigint().to_bytes_be())
}
