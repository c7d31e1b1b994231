// Shared service registry
//
// Every service is constructed once at startup and handed out read-only; no
// per-request state lives here
//
// Numan Thabit 2025 Nov

use crate::config::{AppConfig, ProofKind, ScoringKind};
use crate::control::AdmissionControl;
use crate::privacy::{
    CommitmentService, DeterministicProofProvider, ProofProvider, SignedProofProvider,
    SimulatedProofProvider,
};
use crate::router::execution::{Settlement, SimulatedSettlement, SwapOrchestrator};
use crate::router::scorer::{LinearStrategy, NeutralStrategy, RouteScorer, ScoringStrategy};
use crate::router::selector::RouteAggregator;
use crate::router::telemetry::{ChainTelemetry, MarketTelemetry};
use crate::venues::adapter::QuoteSource;
use crate::venues::oneinch::OneInchQuoteSource;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Pluggable pieces; everything else is derived from these.
pub struct ServiceParts {
    pub quote_source: Arc<dyn QuoteSource>,
    pub telemetry: Arc<dyn MarketTelemetry>,
    pub strategy: Arc<dyn ScoringStrategy>,
    pub proof_provider: Arc<dyn ProofProvider>,
    pub settlement: Arc<dyn Settlement>,
}

#[derive(Clone)]
pub struct ServiceRegistry {
    pub config: Arc<AppConfig>,
    pub quote_source: Arc<dyn QuoteSource>,
    pub scorer: Arc<RouteScorer>,
    pub aggregator: Arc<RouteAggregator>,
    pub commitments: Arc<CommitmentService>,
    pub orchestrator: Arc<SwapOrchestrator>,
    pub admission: AdmissionControl,
}

impl ServiceRegistry {
    pub fn new(config: AppConfig, parts: ServiceParts) -> Self {
        let slippage = config.default_slippage_percent;
        let scorer = Arc::new(RouteScorer::new(parts.strategy));
        let aggregator = Arc::new(RouteAggregator::new(
            parts.quote_source.clone(),
            scorer.clone(),
            parts.telemetry,
            slippage,
        ));
        let commitments = Arc::new(CommitmentService::new(parts.proof_provider));
        let orchestrator = Arc::new(SwapOrchestrator::new(
            aggregator.clone(),
            parts.quote_source.clone(),
            commitments.clone(),
            parts.settlement,
            slippage,
        ));
        let admission = AdmissionControl::new(config.max_inflight, config.admission_rate_per_sec);

        Self {
            config: Arc::new(config),
            quote_source: parts.quote_source,
            scorer,
            aggregator,
            commitments,
            orchestrator,
            admission,
        }
    }

    /// Wire the production services described by the configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let quote_source: Arc<dyn QuoteSource> = Arc::new(
            OneInchQuoteSource::from_config(&config.oneinch).context("initialize 1inch quote source")?,
        );

        let strategy: Arc<dyn ScoringStrategy> = match config.scoring_kind()? {
            ScoringKind::Neutral => Arc::new(NeutralStrategy),
            ScoringKind::Linear => Arc::new(LinearStrategy::default()),
        };

        let proof_provider: Arc<dyn ProofProvider> = match config.proof_kind()? {
            ProofKind::Simulated => Arc::new(SimulatedProofProvider),
            ProofKind::Deterministic => Arc::new(DeterministicProofProvider),
            ProofKind::Signed => Arc::new(SignedProofProvider::new(
                config.signing_key_bytes().context("load proof signing key")?,
            )),
        };

        info!(
            quote_source = quote_source.name(),
            live = quote_source.is_live(),
            scoring = strategy.name(),
            proofs = proof_provider.name(),
            "services constructed"
        );

        let settlement = Arc::new(SimulatedSettlement::new(Duration::from_millis(
            config.settlement_delay_ms,
        )));

        Ok(Self::new(
            config,
            ServiceParts {
                quote_source,
                telemetry: Arc::new(ChainTelemetry),
                strategy,
                proof_provider,
                settlement,
            },
        ))
    }
}
