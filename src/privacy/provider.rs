// Proof provider module
// Produces and checks the opaque proof body bound to a commitment's public
// inputs. The commitment service and orchestrator are indifferent to which
// provider is wired in
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use base64::{engine::general_purpose::STANDARD_NO_PAD as B64, Engine as _};
use blake2::{Blake2b512, Digest};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// Blake2b-256: first 32 bytes of Blake2b-512.
pub fn blake2b_256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b512::new();
    hasher.update(bytes);
    let hash_result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hash_result[..32]);
    digest
}

/// 0x-prefixed hex of the Blake2b-256 digest.
pub fn digest_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(blake2b_256(bytes)))
}

fn inputs_digest(public_inputs: &[String]) -> [u8; 32] {
    blake2b_256(public_inputs.join("|").as_bytes())
}

/// Capability that builds and checks proof bodies.
pub trait ProofProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn prove(&self, public_inputs: &[String]) -> Result<String, SwapError>;

    /// Provider-specific check of a body against the public inputs. A body the
    /// provider cannot interpret is a mismatch, not an error.
    fn verify_body(&self, public_inputs: &[String], body: &str) -> bool;
}

/// Groth16-shaped body: three hex-encoded curve points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointProof {
    pub a: [String; 2],
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
}

impl PointProof {
    fn from_words(mut next: impl FnMut() -> String) -> Self {
        Self {
            a: [next(), next()],
            b: [[next(), next()], [next(), next()]],
            c: [next(), next()],
        }
    }

    fn encode(&self) -> Result<String, SwapError> {
        serde_json::to_string(self).map_err(|e| SwapError::Privacy(e.to_string()))
    }
}

/// Random-looking body with no relation to the inputs.
#[derive(Debug, Default, Clone)]
pub struct SimulatedProofProvider;

impl ProofProvider for SimulatedProofProvider {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn prove(&self, _public_inputs: &[String]) -> Result<String, SwapError> {
        PointProof::from_words(|| {
            let mut word = [0u8; 32];
            OsRng.fill_bytes(&mut word);
            format!("0x{}", hex::encode(word))
        })
        .encode()
    }

    fn verify_body(&self, _public_inputs: &[String], body: &str) -> bool {
        serde_json::from_str::<PointProof>(body).is_ok()
    }
}

/// Body derived from the inputs by hash chaining, so equal inputs always
/// give equal proofs.
#[derive(Debug, Default, Clone)]
pub struct DeterministicProofProvider;

impl DeterministicProofProvider {
    fn body_for(public_inputs: &[String]) -> PointProof {
        let mut word = inputs_digest(public_inputs);
        PointProof::from_words(|| {
            word = blake2b_256(&word);
            format!("0x{}", hex::encode(word))
        })
    }
}

impl ProofProvider for DeterministicProofProvider {
    fn name(&self) -> &'static str {
        "deterministic"
    }

    fn prove(&self, public_inputs: &[String]) -> Result<String, SwapError> {
        Self::body_for(public_inputs).encode()
    }

    fn verify_body(&self, public_inputs: &[String], body: &str) -> bool {
        serde_json::from_str::<PointProof>(body)
            .map(|proof| proof == Self::body_for(public_inputs))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedBody {
    public_key: String,
    signature: String,
}

/// Ed25519 attestation over the Blake2b-256 digest of the public inputs.
pub struct SignedProofProvider {
    signing_key: SigningKey,
}

impl SignedProofProvider {
    pub fn new(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl ProofProvider for SignedProofProvider {
    fn name(&self) -> &'static str {
        "signed"
    }

    fn prove(&self, public_inputs: &[String]) -> Result<String, SwapError> {
        let sig = self.signing_key.sign(&inputs_digest(public_inputs));
        let body = SignedBody {
            public_key: hex::encode(self.verifying_key().to_bytes()),
            signature: B64.encode(sig.to_bytes()),
        };
        serde_json::to_string(&body).map_err(|e| SwapError::Privacy(e.to_string()))
    }

    fn verify_body(&self, public_inputs: &[String], body: &str) -> bool {
        let Ok(body) = serde_json::from_str::<SignedBody>(body) else {
            return false;
        };
        let vk = self.verifying_key();
        if body.public_key != hex::encode(vk.to_bytes()) {
            return false;
        }
        let Ok(sig_bytes) = B64.decode(&body.signature) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(&sig_bytes) else {
            return false;
        };
        vk.verify(&inputs_digest(public_inputs), &sig).is_ok()
    }
}
