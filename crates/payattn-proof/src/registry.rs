//! Circuit registry: `(circuit_name, verifying_key_bytes, circuit_kind)`
//! entries, loaded once at startup (spec.md §5 "Verification keys are
//! read-only, cacheable in-memory with no invalidation").

use std::collections::HashMap;
use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{prepare_verifying_key, PreparedVerifyingKey, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use payattn_types::entities::CircuitKind;
use payattn_types::error::PayattnError;

/// The three circuit kinds spec.md §4.5 names, paired with the file name
/// their verifying key is expected under inside `VERIFICATION_KEYS_DIR`.
const KNOWN_CIRCUITS: &[(&str, CircuitKind)] = &[
    ("age_range", CircuitKind::AgeRange),
    ("range_check", CircuitKind::RangeCheck),
    ("set_membership", CircuitKind::SetMembership),
];

pub struct RegisteredCircuit {
    pub kind: CircuitKind,
    pub prepared_vk: PreparedVerifyingKey<Bn254>,
}

/// In-memory, read-only registry of known circuits (spec.md §4.5: "Circuits
/// are drawn from a small registry ... the validator only needs the
/// verification key"). Built once at process start and shared behind an
/// `Arc` by callers; no invalidation path exists by design.
#[derive(Default)]
pub struct VerificationKeyRegistry {
    circuits: HashMap<String, RegisteredCircuit>,
}

impl VerificationKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one circuit's verifying key, deserialized from its
    /// canonical `ark-serialize` byte encoding (as produced by the
    /// trusted-setup pipeline; out of scope here, see spec.md §1).
    pub fn register(
        &mut self,
        circuit_name: impl Into<String>,
        kind: CircuitKind,
        vk_bytes: &[u8],
    ) -> Result<(), PayattnError> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(vk_bytes).map_err(|e| {
            PayattnError::InvalidConfig {
                key: "verifying_key",
                reason: format!("failed to deserialize verifying key: {e}"),
            }
        })?;
        let prepared_vk = prepare_verifying_key(&vk);
        self.circuits
            .insert(circuit_name.into(), RegisteredCircuit { kind, prepared_vk });
        Ok(())
    }

    pub fn get(&self, circuit_name: &str) -> Result<&RegisteredCircuit, PayattnError> {
        self.circuits
            .get(circuit_name)
            .ok_or_else(|| PayattnError::UnknownCircuit(circuit_name.to_string()))
    }

    /// Loads every circuit in `KNOWN_CIRCUITS` from `<dir>/<name>.vk.bin`
    /// (the canonical `ark-serialize` byte encoding the out-of-scope
    /// trusted-setup pipeline produces, spec.md §1). A circuit whose file is
    /// absent is simply not registered rather than a hard startup failure:
    /// a deployment may run with a subset of circuits live.
    pub fn load_from_dir(dir: &Path) -> Result<Self, PayattnError> {
        let mut registry = Self::new();
        for (name, kind) in KNOWN_CIRCUITS {
            let path = dir.join(format!("{name}.vk.bin"));
            if !path.exists() {
                continue;
            }
            let bytes = std::fs::read(&path).map_err(|e| PayattnError::InvalidConfig {
                key: "VERIFICATION_KEYS_DIR",
                reason: format!("failed to read {}: {e}", path.display()),
            })?;
            registry.register(*name, *kind, &bytes)?;
        }
        Ok(registry)
    }
}
