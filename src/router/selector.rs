// Route aggregator - merges generated candidates with the external quote
//  gathers live inputs, generates and scores candidates, adds the aggregator's
// own route for comparison, applies the privacy rule and ranks the result
//
// Numan Thabit 2025 Nov

use crate::amount::{parse_amount, retain};
use crate::errors::SwapError;
use crate::metrics::ROUTE_REQUESTS;
use crate::router::generator::{self, DIRECT_RETENTION, MULTIHOP_RETENTION, PRIVACY_RETENTION};
use crate::router::routes::{
    apply_privacy_filter, rank, PrivacyLevel, RankedRoutes, RouteCandidate, SwapRequest,
};
use crate::router::scorer::{RouteScorer, ScoringContext, NEUTRAL_SCORE};
use crate::router::telemetry::{gather_live_inputs, MarketTelemetry};
use crate::venues::adapter::{QuoteData, QuoteSource};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const EXTERNAL_ROUTE_ID: &str = "1inch-direct";
pub const EXTERNAL_REPUTATION: u8 = 98;
pub const EXTERNAL_CONFIDENCE: f64 = 0.95;
pub const EXTERNAL_AI_SCORE: f64 = 0.9;

/// Best route summary returned by the quote endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub estimated_output: String,
    pub price_impact_percent: f64,
    pub gas_estimate: String,
    pub execution_time_seconds: u64,
    pub routes: Vec<RouteCandidate>,
}

pub struct RouteAggregator {
    quote_source: Arc<dyn QuoteSource>,
    scorer: Arc<RouteScorer>,
    telemetry: Arc<dyn MarketTelemetry>,
    slippage_percent: f64,
}

impl RouteAggregator {
    pub fn new(
        quote_source: Arc<dyn QuoteSource>,
        scorer: Arc<RouteScorer>,
        telemetry: Arc<dyn MarketTelemetry>,
        slippage_percent: f64,
    ) -> Self {
        Self {
            quote_source,
            scorer,
            telemetry,
            slippage_percent,
        }
    }

    /// Ranked routes for a request, best first.
    pub async fn get_ranked_routes(&self, req: &SwapRequest) -> Vec<RouteCandidate> {
        self.rank_routes(req).await.routes
    }

    /// Ranked routes plus whether the scored path produced them. Never fails:
    /// a generation or scoring failure returns the simulated fallback set.
    #[tracing::instrument(skip_all, fields(chain = req.destination_chain_id, privacy = req.wants_privacy))]
    pub async fn rank_routes(&self, req: &SwapRequest) -> RankedRoutes {
        let (generated, quote) = futures::join!(
            self.generate_and_score(req),
            self.quote_source.get_quote(
                &req.token_in,
                &req.token_out,
                &req.amount_in,
                self.slippage_percent
            ),
        );

        let mut routes = match generated {
            Ok(routes) => routes,
            Err(err) => {
                warn!(error = %err, "route optimization failed; using simulated routes");
                ROUTE_REQUESTS.with_label_values(&["fallback"]).inc();
                return RankedRoutes {
                    routes: apply_privacy_filter(fallback_routes(req), req.wants_privacy),
                    ai_optimized: false,
                };
            }
        };

        match quote.ok() {
            Some(quote) => {
                for route in routes.iter_mut().filter(|r| r.protocols.is_empty()) {
                    route.protocols = quote.protocols.clone();
                }
                routes.insert(0, external_candidate(req, &quote, self.quote_source.name()));
            }
            None => debug!(source = self.quote_source.name(), "comparison quote unavailable"),
        }

        rank(&mut routes);
        let routes = apply_privacy_filter(routes, req.wants_privacy);

        ROUTE_REQUESTS.with_label_values(&["ranked"]).inc();
        info!(
            routes = routes.len(),
            best = routes.first().map(|r| r.id.as_str()).unwrap_or("none"),
            "ranked routes"
        );
        RankedRoutes {
            routes,
            ai_optimized: true,
        }
    }

    async fn generate_and_score(&self, req: &SwapRequest) -> Result<Vec<RouteCandidate>, SwapError> {
        let inputs = gather_live_inputs(self.telemetry.as_ref(), req).await;
        let candidates = generator::generate(req, &inputs)?;
        let amount_in =
            parse_amount(&req.amount_in).map_err(|e| SwapError::RouteGeneration(e.to_string()))?;
        let ctx = ScoringContext {
            token_in: &req.token_in,
            token_out: &req.token_out,
            amount_in,
            inputs: &inputs,
        };
        self.scorer.score_all(candidates, &ctx)
    }

    /// Summary of the best available route.
    pub async fn quote_summary(&self, req: &SwapRequest) -> Result<QuoteSummary, SwapError> {
        let routes = self.get_ranked_routes(req).await;
        let best = routes.first().ok_or(SwapError::NoRoutes)?;
        Ok(QuoteSummary {
            estimated_output: best.estimated_output.clone(),
            price_impact_percent: best.price_impact_percent,
            gas_estimate: best.gas_estimate.clone(),
            execution_time_seconds: best.execution_time_seconds,
            routes,
        })
    }
}

/// The external aggregator's own route, tagged so it can be compared with
/// generated candidates.
pub fn external_candidate(req: &SwapRequest, quote: &QuoteData, source: &str) -> RouteCandidate {
    RouteCandidate {
        id: EXTERNAL_ROUTE_ID.to_string(),
        path: vec![req.token_in.clone(), req.token_out.clone()],
        estimated_output: quote.to_token_amount.clone(),
        price_impact_percent: 0.1,
        gas_estimate: quote.estimated_gas.clone(),
        execution_time_seconds: 30,
        privacy_level: PrivacyLevel::Low,
        solver_reputation: EXTERNAL_REPUTATION,
        source: source.to_string(),
        confidence: EXTERNAL_CONFIDENCE,
        ai_score: EXTERNAL_AI_SCORE,
        protocols: quote.protocols.clone(),
    }
}

/// Last-resort simulated routes; only the estimated outputs depend on the request amount.
pub fn fallback_routes(req: &SwapRequest) -> Vec<RouteCandidate> {
    let amount_in = parse_amount(&req.amount_in).unwrap_or(0.0);
    let shapes = [
        ("route-1", 1, DIRECT_RETENTION, 0.5, 50_000u64, 30u64, PrivacyLevel::Low, 95u8),
        ("route-2", 2, MULTIHOP_RETENTION, 0.3, 75_000, 45, PrivacyLevel::Medium, 88),
        ("route-3", 3, PRIVACY_RETENTION, 0.1, 120_000, 60, PrivacyLevel::High, 92),
    ];

    shapes
        .into_iter()
        .map(|(id, hops, retention, impact, gas, time, privacy_level, reputation)| RouteCandidate {
            id: id.to_string(),
            path: generator::path_for(req, hops),
            estimated_output: retain(amount_in, retention),
            price_impact_percent: impact,
            gas_estimate: gas.to_string(),
            execution_time_seconds: time,
            privacy_level,
            solver_reputation: reputation,
            source: "simulated".to_string(),
            confidence: NEUTRAL_SCORE,
            ai_score: NEUTRAL_SCORE,
            protocols: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::LiveInputs;
    use crate::router::scorer::{LinearStrategy, Prediction, RouteFeatures, ScoringStrategy};
    use crate::router::telemetry::FixedTelemetry;
    use crate::venues::adapter::{AdapterResult, DemoQuoteSource, QuoteResult, SwapDataResult};
    use async_trait::async_trait;

    struct DownQuoteSource;

    #[async_trait]
    impl QuoteSource for DownQuoteSource {
        fn name(&self) -> &'static str {
            "down"
        }
        fn is_live(&self) -> bool {
            true
        }
        async fn get_quote(&self, _: &str, _: &str, _: &str, _: f64) -> QuoteResult {
            AdapterResult::failure("upstream unavailable")
        }
        async fn get_swap_data(&self, _: &str, _: &str, _: &str, _: &str, _: f64) -> SwapDataResult {
            AdapterResult::failure("upstream unavailable")
        }
    }

    struct Diverged;

    impl ScoringStrategy for Diverged {
        fn name(&self) -> &'static str {
            "diverged"
        }
        fn is_ready(&self) -> bool {
            true
        }
        fn predict(&self, _features: &RouteFeatures) -> anyhow::Result<Prediction> {
            Ok(Prediction { output: f64::INFINITY, gas: 0.0, time: 0.0 })
        }
    }

    fn aggregator(quotes: Arc<dyn QuoteSource>, strategy: Arc<dyn ScoringStrategy>) -> RouteAggregator {
        RouteAggregator::new(
            quotes,
            Arc::new(RouteScorer::new(strategy)),
            Arc::new(FixedTelemetry::new(LiveInputs::default())),
            0.5,
        )
    }

    fn request(amount: &str, privacy: bool) -> SwapRequest {
        SwapRequest {
            token_in: "0x0000000000000000000000000000000000000000".into(),
            token_out: "0xA0b86a33E6441b8C4C8C0E1234567890abcdef12".into(),
            amount_in: amount.into(),
            min_amount_out: "0.9".into(),
            destination_chain_id: 1,
            requester_address: "0xuser".into(),
            wants_privacy: privacy,
        }
    }

    #[tokio::test]
    async fn external_quote_is_prepended_and_ranked() {
        let agg = aggregator(Arc::new(DemoQuoteSource), Arc::new(crate::router::scorer::NeutralStrategy));
        let ranked = agg.rank_routes(&request("1.0", false)).await;
        assert!(ranked.ai_optimized);

        let ids: Vec<_> = ranked.routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, [EXTERNAL_ROUTE_ID, "direct", "multihop"]);
        assert_eq!(ranked.routes[0].source, "demo");
        assert_eq!(ranked.routes[0].solver_reputation, EXTERNAL_REPUTATION);
        assert_eq!(ranked.routes[1].estimated_output, "0.98");
        assert_eq!(ranked.routes[2].estimated_output, "0.985");
        // generated routes inherit the quote's protocol tags
        assert_eq!(ranked.routes[1].protocols, ranked.routes[0].protocols);
    }

    #[tokio::test]
    async fn privacy_drops_every_low_route() {
        let agg = aggregator(Arc::new(DemoQuoteSource), Arc::new(crate::router::scorer::NeutralStrategy));
        let routes = agg.get_ranked_routes(&request("1.0", true)).await;
        assert!(routes.iter().all(|r| r.privacy_level != PrivacyLevel::Low));
        assert!(routes.iter().all(|r| r.id != EXTERNAL_ROUTE_ID));
        let privacy = routes.iter().find(|r| r.id == "privacy").unwrap();
        assert_eq!(privacy.estimated_output, "0.99");
        assert_eq!(privacy.path.len(), 4);
    }

    #[tokio::test]
    async fn failed_quote_skips_external_route() {
        let agg = aggregator(Arc::new(DownQuoteSource), Arc::new(crate::router::scorer::NeutralStrategy));
        let routes = agg.get_ranked_routes(&request("1.0", false)).await;
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.protocols.is_empty()));
    }

    #[tokio::test]
    async fn ranking_is_total_with_a_model() {
        let agg = aggregator(Arc::new(DemoQuoteSource), Arc::new(LinearStrategy::default()));
        for privacy in [false, true] {
            let routes = agg.get_ranked_routes(&request("3.5", privacy)).await;
            assert!(routes.windows(2).all(|w| w[0].ai_score >= w[1].ai_score));
        }
    }

    #[tokio::test]
    async fn scoring_failure_falls_back_to_simulated_set() {
        let agg = aggregator(Arc::new(DemoQuoteSource), Arc::new(Diverged));

        let ranked = agg.rank_routes(&request("10", false)).await;
        assert!(!ranked.ai_optimized);
        let summary: Vec<_> = ranked
            .routes
            .iter()
            .map(|r| (r.id.as_str(), r.solver_reputation, r.estimated_output.as_str()))
            .collect();
        assert_eq!(
            summary,
            [("route-1", 95, "9.8"), ("route-2", 88, "9.85"), ("route-3", 92, "9.9")]
        );

        let private = agg.get_ranked_routes(&request("10", true)).await;
        let ids: Vec<_> = private.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["route-2", "route-3"]);
    }

    #[tokio::test]
    async fn quote_summary_reports_best_route() {
        let agg = aggregator(Arc::new(DemoQuoteSource), Arc::new(crate::router::scorer::NeutralStrategy));
        let summary = agg.quote_summary(&request("2", false)).await.unwrap();
        assert_eq!(summary.estimated_output, "1.96");
        assert_eq!(summary.routes.len(), 3);
    }
}
