//! Proof validation pipeline (spec.md §4.5): a pure function of
//! `(circuit_name, proof, public_signals, requirements)`, no I/O beyond
//! verifying-key lookup.

pub mod circuits;
pub mod registry;
pub mod verify;

use std::collections::HashMap;

pub use circuits::CircuitRequirements;
pub use registry::VerificationKeyRegistry;

use payattn_types::error::PayattnError;

/// Result of validating one proof against one requirement.
#[derive(Debug, Clone)]
pub struct CircuitValidation {
    pub circuit_name: String,
    pub valid: bool,
    pub reason: Option<String>,
}

/// Aggregate result of validating every circuit an offer's campaign
/// requires (spec.md §4.5 step 4: "Return {valid, summary, validCircuits[],
/// invalidCircuits[]}").
#[derive(Debug, Clone)]
pub struct ProofValidationSummary {
    pub valid: bool,
    pub summary: String,
    pub valid_circuits: Vec<String>,
    pub invalid_circuits: Vec<(String, String)>,
}

/// One submitted proof, as stored on an offer's `zk_proofs` map.
pub struct SubmittedProof<'a> {
    pub circuit_name: &'a str,
    pub proof_bytes: &'a [u8],
    pub public_signals: &'a [String],
}

/// Verifies a single proof against the registry and matches its public
/// signals against `requirements` (spec.md §4.5 steps 1-3).
pub fn validate_one(
    registry: &VerificationKeyRegistry,
    proof: &SubmittedProof,
    requirements: &CircuitRequirements,
) -> Result<(), PayattnError> {
    let circuit = registry.get(proof.circuit_name)?;
    verify::verify_groth16(
        proof.circuit_name,
        circuit,
        proof.proof_bytes,
        proof.public_signals,
    )?;
    circuits::interpret_and_match(circuit.kind, proof.public_signals, requirements)
}

/// Validates every circuit a campaign requires against the offer's
/// submitted proofs, producing the aggregate summary the coordinator logs
/// and records on the session (spec.md §4.5 step 4).
pub fn validate_batch(
    registry: &VerificationKeyRegistry,
    submitted: &HashMap<String, SubmittedProof>,
    required: &HashMap<String, CircuitRequirements>,
) -> ProofValidationSummary {
    let mut valid_circuits = Vec::new();
    let mut invalid_circuits = Vec::new();

    for (circuit_name, requirement) in required {
        match submitted.get(circuit_name) {
            Some(proof) => match validate_one(registry, proof, requirement) {
                Ok(()) => valid_circuits.push(circuit_name.clone()),
                Err(err) => invalid_circuits.push((circuit_name.clone(), err.to_string())),
            },
            None => invalid_circuits.push((
                circuit_name.clone(),
                "no proof submitted for this circuit".to_string(),
            )),
        }
    }

    let valid = invalid_circuits.is_empty() && !valid_circuits.is_empty();
    let summary = if valid {
        format!("all {} required circuit(s) verified", valid_circuits.len())
    } else {
        format!(
            "{} of {} required circuit(s) verified",
            valid_circuits.len(),
            valid_circuits.len() + invalid_circuits.len()
        )
    };

    ProofValidationSummary {
        valid,
        summary,
        valid_circuits,
        invalid_circuits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payattn_types::entities::CircuitKind;

    #[test]
    fn unknown_circuit_is_rejected() {
        let registry = VerificationKeyRegistry::new();
        let proof = SubmittedProof {
            circuit_name: "age_range",
            proof_bytes: &[],
            public_signals: &[],
        };
        let requirements = CircuitRequirements::Range { min: 25, max: 40 };
        let err = validate_one(&registry, &proof, &requirements).unwrap_err();
        assert!(matches!(err, PayattnError::UnknownCircuit(_)));
    }

    #[test]
    fn batch_summary_reports_missing_proof() {
        let registry = VerificationKeyRegistry::new();
        let submitted: HashMap<String, SubmittedProof> = HashMap::new();
        let mut required = HashMap::new();
        required.insert(
            "age_range".to_string(),
            CircuitRequirements::Range { min: 25, max: 40 },
        );

        let summary = validate_batch(&registry, &submitted, &required);
        assert!(!summary.valid);
        assert_eq!(summary.invalid_circuits.len(), 1);
        assert_eq!(summary.invalid_circuits[0].0, "age_range");
    }

    #[test]
    fn circuit_kind_enum_has_three_members() {
        let kinds = [
            CircuitKind::AgeRange,
            CircuitKind::RangeCheck,
            CircuitKind::SetMembership,
        ];
        assert_eq!(kinds.len(), 3);
    }
}
