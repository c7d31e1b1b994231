// Privacy commitment service
// Binds a swap's parameters into an immutable commitment and pairs it with a
// proof record whose public inputs mirror the commitment field by field
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::privacy::provider::{digest_hex, ProofProvider};
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const NONCE_RANDOM_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapCommitment {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub user_address: String,
    pub nonce: u64,
    pub timestamp_seconds: i64,
}

impl SwapCommitment {
    /// Public inputs in their fixed order.
    pub fn public_inputs(&self) -> Vec<String> {
        vec![
            self.token_in.clone(),
            self.token_out.clone(),
            self.amount_in.clone(),
            self.amount_out.clone(),
            self.user_address.clone(),
            self.nonce.to_string(),
            self.timestamp_seconds.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub public_inputs: Vec<String>,
    pub proof: String,
    pub hash: String,
}

/// Random component plus wall-clock milliseconds.
fn fresh_nonce() -> u64 {
    let random = OsRng.next_u64() % NONCE_RANDOM_SPAN;
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    millis.wrapping_add(random)
}

pub struct CommitmentService {
    provider: Arc<dyn ProofProvider>,
}

impl CommitmentService {
    pub fn new(provider: Arc<dyn ProofProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn create_commitment(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        amount_out: &str,
        user_address: &str,
    ) -> Result<(SwapCommitment, ProofRecord), SwapError> {
        let commitment = SwapCommitment {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in: amount_in.to_string(),
            amount_out: amount_out.to_string(),
            user_address: user_address.to_string(),
            nonce: fresh_nonce(),
            timestamp_seconds: Utc::now().timestamp(),
        };
        let proof = self.generate_proof(&commitment)?;
        debug!(
            nonce = commitment.nonce,
            provider = self.provider.name(),
            "created swap commitment"
        );
        Ok((commitment, proof))
    }

    pub fn generate_proof(&self, commitment: &SwapCommitment) -> Result<ProofRecord, SwapError> {
        let public_inputs = commitment.public_inputs();
        let proof = self.provider.prove(&public_inputs)?;
        let hash = digest_hex(proof.as_bytes());
        Ok(ProofRecord {
            public_inputs,
            proof,
            hash,
        })
    }

    /// True only when the inputs match the commitment, the hash matches the
    /// body, and the provider accepts the body.
    pub fn verify_proof(&self, proof: &ProofRecord, commitment: &SwapCommitment) -> bool {
        if proof.public_inputs != commitment.public_inputs() {
            debug!("public inputs do not match commitment");
            return false;
        }
        if digest_hex(proof.proof.as_bytes()) != proof.hash {
            debug!("proof hash mismatch");
            return false;
        }
        self.provider.verify_body(&proof.public_inputs, &proof.proof)
    }

    /// Digest of the commitment's canonical JSON, for contract interaction.
    pub fn commitment_hash(&self, commitment: &SwapCommitment) -> Result<String, SwapError> {
        let canonical =
            serde_json::to_vec(commitment).map_err(|e| SwapError::Privacy(e.to_string()))?;
        Ok(digest_hex(&canonical))
    }
}
