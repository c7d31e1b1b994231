// Swap orchestrator - drives a request from quoting through settlement
// State machine: idle -> quoting -> (privacy commit) -> executing -> success | failed
// No retries happen here; every external call either succeeds or short-circuits
// the pipeline with its reported reason
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::metrics::SWAP_OUTCOMES;
use crate::privacy::{CommitmentService, ProofRecord, SwapCommitment};
use crate::router::routes::{RouteCandidate, SwapRequest};
use crate::router::selector::RouteAggregator;
use crate::router::validation::ensure_valid;
use crate::venues::adapter::{AdapterResult, QuoteSource, SwapData};
use async_trait::async_trait;
use rand_core::{OsRng, RngCore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const INTENT_ID_BASE: u64 = 1_000;
const INTENT_ID_SPAN: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    Idle,
    Quoting,
    PrivacyCommit,
    Executing,
    Success,
    Failed,
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapPhase::Idle => "idle",
            SwapPhase::Quoting => "quoting",
            SwapPhase::PrivacyCommit => "privacy-commit",
            SwapPhase::Executing => "executing",
            SwapPhase::Success => "success",
            SwapPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-request phase cursor; only logs, never shared.
struct PhaseTracker {
    phase: SwapPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: SwapPhase::Idle,
        }
    }

    fn advance(&mut self, next: SwapPhase) {
        debug!(from = %self.phase, to = %next, "swap phase transition");
        self.phase = next;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<SwapCommitment>,
}

impl SwapResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    pub transaction_hash: String,
    pub intent_id: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
    pub success: bool,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final settlement step. Implementations own any chain interaction.
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn settle(
        &self,
        req: &SwapRequest,
        swap_data: &SwapData,
        proof: Option<&ProofRecord>,
    ) -> Result<SettlementReceipt, SwapError>;

    async fn verify_completion(
        &self,
        intent_id: u64,
        src_chain_id: u64,
        dst_chain_id: u64,
    ) -> Result<String, SwapError>;
}

/// Waits out a fixed delay and returns random identifiers.
#[derive(Debug, Clone)]
pub struct SimulatedSettlement {
    delay: Duration,
}

impl SimulatedSettlement {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

pub fn random_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

#[async_trait]
impl Settlement for SimulatedSettlement {
    async fn settle(
        &self,
        _req: &SwapRequest,
        _swap_data: &SwapData,
        _proof: Option<&ProofRecord>,
    ) -> Result<SettlementReceipt, SwapError> {
        tokio::time::sleep(self.delay).await;
        Ok(SettlementReceipt {
            transaction_hash: random_tx_hash(),
            intent_id: INTENT_ID_BASE + OsRng.next_u64() % INTENT_ID_SPAN,
        })
    }

    async fn verify_completion(
        &self,
        _intent_id: u64,
        _src_chain_id: u64,
        _dst_chain_id: u64,
    ) -> Result<String, SwapError> {
        tokio::time::sleep(self.delay / 2).await;
        Ok(random_tx_hash())
    }
}

pub struct SwapOrchestrator {
    aggregator: Arc<RouteAggregator>,
    quote_source: Arc<dyn QuoteSource>,
    commitments: Arc<CommitmentService>,
    settlement: Arc<dyn Settlement>,
    slippage_percent: f64,
}

impl SwapOrchestrator {
    pub fn new(
        aggregator: Arc<RouteAggregator>,
        quote_source: Arc<dyn QuoteSource>,
        commitments: Arc<CommitmentService>,
        settlement: Arc<dyn Settlement>,
        slippage_percent: f64,
    ) -> Self {
        Self {
            aggregator,
            quote_source,
            commitments,
            settlement,
            slippage_percent,
        }
    }

    /// Run the whole pipeline. Always returns a well-formed result.
    #[tracing::instrument(skip_all, fields(chain = req.destination_chain_id, privacy = req.wants_privacy))]
    pub async fn submit_swap_request(&self, req: &SwapRequest) -> SwapResult {
        if let Err(err) = ensure_valid(req) {
            warn!(error = %err, "rejected swap request");
            record_outcome("rejected", req.wants_privacy);
            return SwapResult::failed(err.to_string());
        }

        let mut tracker = PhaseTracker::new();
        tracker.advance(SwapPhase::Quoting);
        let routes = self.aggregator.get_ranked_routes(req).await;
        let selected = routes.first();
        if let Some(route) = selected {
            debug!(
                route = %route.id,
                hops = route.hops(),
                output = %route.estimated_output,
                "selected route"
            );
        }

        self.execute(req, selected, tracker).await
    }

    /// Execute against an already chosen route, skipping the quoting phase.
    pub async fn execute_swap(&self, req: &SwapRequest, selected: Option<&RouteCandidate>) -> SwapResult {
        if let Err(err) = ensure_valid(req) {
            record_outcome("rejected", req.wants_privacy);
            return SwapResult::failed(err.to_string());
        }
        self.execute(req, selected, PhaseTracker::new()).await
    }

    async fn execute(
        &self,
        req: &SwapRequest,
        selected: Option<&RouteCandidate>,
        mut tracker: PhaseTracker,
    ) -> SwapResult {
        let result = match self.run(req, selected, &mut tracker).await {
            Ok(result) => {
                tracker.advance(SwapPhase::Success);
                info!(
                    tx_hash = result.transaction_hash.as_deref().unwrap_or_default(),
                    intent_id = result.intent_id.unwrap_or_default(),
                    "swap settled"
                );
                result
            }
            Err(err) => {
                tracker.advance(SwapPhase::Failed);
                warn!(error = %err, "swap failed");
                SwapResult::failed(failure_message(err))
            }
        };
        record_outcome(if result.success { "success" } else { "failed" }, req.wants_privacy);
        result
    }

    async fn run(
        &self,
        req: &SwapRequest,
        selected: Option<&RouteCandidate>,
        tracker: &mut PhaseTracker,
    ) -> Result<SwapResult, SwapError> {
        let (commitment, proof) = if req.wants_privacy {
            tracker.advance(SwapPhase::PrivacyCommit);
            let amount_out = selected
                .map(|r| r.estimated_output.as_str())
                .unwrap_or(req.min_amount_out.as_str());
            let (commitment, proof) = self.commitments.create_commitment(
                &req.token_in,
                &req.token_out,
                &req.amount_in,
                amount_out,
                &req.requester_address,
            )?;
            debug!(proof_hash = %proof.hash, "privacy commitment ready");
            (Some(commitment), Some(proof))
        } else {
            (None, None)
        };

        tracker.advance(SwapPhase::Executing);
        let swap_data = match self
            .quote_source
            .get_swap_data(
                &req.token_in,
                &req.token_out,
                &req.amount_in,
                &req.requester_address,
                self.slippage_percent,
            )
            .await
        {
            AdapterResult::Success { data } => data,
            AdapterResult::Failure { error } => return Err(SwapError::Adapter(error)),
        };

        let receipt = self
            .settlement
            .settle(req, &swap_data, proof.as_ref())
            .await?;

        Ok(SwapResult {
            success: true,
            transaction_hash: Some(receipt.transaction_hash),
            intent_id: Some(receipt.intent_id),
            error: None,
            proof,
            commitment,
        })
    }

    pub async fn verify_swap_completion(
        &self,
        intent_id: u64,
        src_chain_id: u64,
        dst_chain_id: u64,
    ) -> CompletionStatus {
        match self
            .settlement
            .verify_completion(intent_id, src_chain_id, dst_chain_id)
            .await
        {
            Ok(tx_hash) => CompletionStatus {
                success: true,
                completed: true,
                transaction_hash: Some(tx_hash),
                error: None,
            },
            Err(err) => CompletionStatus {
                error: Some(err.to_string()),
                ..CompletionStatus::default()
            },
        }
    }

    pub fn commitments(&self) -> &Arc<CommitmentService> {
        &self.commitments
    }
}

/// Adapter failures surface their own reason verbatim.
fn failure_message(err: SwapError) -> String {
    match err {
        SwapError::Adapter(reason) | SwapError::Settlement(reason) => reason,
        other => other.to_string(),
    }
}

fn record_outcome(outcome: &str, privacy: bool) {
    SWAP_OUTCOMES
        .with_label_values(&[outcome, if privacy { "true" } else { "false" }])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::{DeterministicProofProvider, SimulatedProofProvider};
    use crate::privacy::provider::digest_hex;
    use crate::router::routes::LiveInputs;
    use crate::router::scorer::RouteScorer;
    use crate::router::telemetry::FixedTelemetry;
    use crate::venues::adapter::{DemoQuoteSource, QuoteResult, SwapDataResult};

    struct NoSwapData;

    #[async_trait]
    impl QuoteSource for NoSwapData {
        fn name(&self) -> &'static str {
            "no-swap-data"
        }
        fn is_live(&self) -> bool {
            true
        }
        async fn get_quote(&self, a: &str, b: &str, amount: &str, _: f64) -> QuoteResult {
            DemoQuoteSource.quote(a, b, amount)
        }
        async fn get_swap_data(&self, _: &str, _: &str, _: &str, _: &str, _: f64) -> SwapDataResult {
            AdapterResult::failure("1inch swap endpoint returned 400")
        }
    }

    struct BrokenSettlement;

    #[async_trait]
    impl Settlement for BrokenSettlement {
        async fn settle(
            &self,
            _: &SwapRequest,
            _: &SwapData,
            _: Option<&ProofRecord>,
        ) -> Result<SettlementReceipt, SwapError> {
            Err(SwapError::Settlement("nonce too low".into()))
        }
        async fn verify_completion(&self, _: u64, _: u64, _: u64) -> Result<String, SwapError> {
            Err(SwapError::Settlement("intent not found".into()))
        }
    }

    fn orchestrator(quotes: Arc<dyn QuoteSource>, settlement: Arc<dyn Settlement>) -> SwapOrchestrator {
        let aggregator = RouteAggregator::new(
            quotes.clone(),
            Arc::new(RouteScorer::neutral()),
            Arc::new(FixedTelemetry::new(LiveInputs::default())),
            0.5,
        );
        SwapOrchestrator::new(
            Arc::new(aggregator),
            quotes,
            Arc::new(CommitmentService::new(Arc::new(DeterministicProofProvider))),
            settlement,
            0.5,
        )
    }

    fn simulated() -> Arc<dyn Settlement> {
        Arc::new(SimulatedSettlement::new(Duration::ZERO))
    }

    fn request(privacy: bool) -> SwapRequest {
        SwapRequest {
            token_in: "0x0000000000000000000000000000000000000000".into(),
            token_out: "0xA0b86a33E6441b8C4C8C0E1234567890abcdef12".into(),
            amount_in: "1.0".into(),
            min_amount_out: "0.95".into(),
            destination_chain_id: 1,
            requester_address: "0xuser".into(),
            wants_privacy: privacy,
        }
    }

    #[tokio::test]
    async fn plain_swap_settles_without_proof() {
        let orch = orchestrator(Arc::new(DemoQuoteSource), simulated());
        let result = orch.submit_swap_request(&request(false)).await;
        assert!(result.success, "{:?}", result.error);
        let hash = result.transaction_hash.unwrap();
        assert_eq!(hash.len(), 66);
        assert!((1_000..1_001_000).contains(&result.intent_id.unwrap()));
        assert!(result.proof.is_none() && result.commitment.is_none());
    }

    #[tokio::test]
    async fn private_swap_binds_the_selected_route_output() {
        let orch = orchestrator(Arc::new(DemoQuoteSource), simulated());
        let result = orch.submit_swap_request(&request(true)).await;
        assert!(result.success);

        let proof = result.proof.unwrap();
        let commitment = result.commitment.unwrap();
        assert_eq!(proof.hash, digest_hex(proof.proof.as_bytes()));
        // privacy drops every low route, so the first ranked route is multihop
        assert_eq!(commitment.amount_out, "0.985");
        assert!(orch.commitments().verify_proof(&proof, &commitment));
    }

    #[tokio::test]
    async fn without_a_route_min_amount_out_is_committed() {
        let orch = orchestrator(Arc::new(DemoQuoteSource), simulated());
        let result = orch.execute_swap(&request(true), None).await;
        assert_eq!(result.commitment.unwrap().amount_out, "0.95");
    }

    #[tokio::test]
    async fn swap_data_failure_reports_adapter_reason() {
        let orch = orchestrator(Arc::new(NoSwapData), simulated());
        let result = orch.submit_swap_request(&request(false)).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("1inch swap endpoint returned 400"));
        assert!(result.transaction_hash.is_none());
    }

    #[tokio::test]
    async fn settlement_error_is_captured() {
        let orch = orchestrator(Arc::new(DemoQuoteSource), Arc::new(BrokenSettlement));
        let result = orch.submit_swap_request(&request(true)).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("nonce too low"));

        let status = orch.verify_swap_completion(7, 1, 137).await;
        assert!(!status.success && !status.completed);
    }

    #[tokio::test]
    async fn invalid_request_fails_fast() {
        let orch = orchestrator(Arc::new(NoSwapData), simulated());
        let result = orch
            .submit_swap_request(&SwapRequest { amount_in: "abc".into(), ..request(false) })
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("validation failed"));
    }

    #[tokio::test]
    async fn completion_check_returns_a_hash() {
        let aggregator = RouteAggregator::new(
            Arc::new(DemoQuoteSource),
            Arc::new(RouteScorer::neutral()),
            Arc::new(FixedTelemetry::default()),
            0.5,
        );
        let orch = SwapOrchestrator::new(
            Arc::new(aggregator),
            Arc::new(DemoQuoteSource),
            Arc::new(CommitmentService::new(Arc::new(SimulatedProofProvider))),
            simulated(),
            0.5,
        );
        let status = orch.verify_swap_completion(1234, 1, 8453).await;
        assert!(status.success && status.completed);
        assert!(status.transaction_hash.unwrap().starts_with("0x"));
    }
}
