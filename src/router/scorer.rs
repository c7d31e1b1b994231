// Route scorer
// Assigns each candidate a composite quality score from a pluggable scoring
// strategy, blending predicted output, gas efficiency and execution time
//
// Numan Thabit 2025 Nov

use crate::amount::{format_decimal, parse_amount};
use crate::errors::SwapError;
use crate::router::routes::{rank, LiveInputs, RouteCandidate};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Score given to every candidate when no scoring backend is available.
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Upper clamp for each sub-score.
pub const MAX_SUBSCORE: f64 = 1.2;
pub const MIN_EXECUTION_SECONDS: u64 = 10;
const OUTPUT_BOOST: f64 = 0.02;
const TIME_REDUCTION: f64 = 0.1;

/// Model input: `[tokenIn tail, tokenOut tail, amountIn, gasPrice, liquidity, priceImpact]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteFeatures(pub [f64; 6]);

impl RouteFeatures {
    pub fn new(token_in: &str, token_out: &str, amount_in: f64, inputs: &LiveInputs) -> Self {
        Self([
            address_tail(token_in),
            address_tail(token_out),
            amount_in,
            inputs.gas_price,
            inputs.liquidity,
            inputs.price_impact,
        ])
    }
}

/// Last four hex digits of an address scaled into [0, 1].
fn address_tail(address: &str) -> f64 {
    let tail = address
        .get(address.len().saturating_sub(4)..)
        .unwrap_or_default();
    u16::from_str_radix(tail, 16)
        .map(|v| v as f64 / u16::MAX as f64)
        .unwrap_or(0.0)
}

/// Predicted optimal output amount, gas units and execution seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub output: f64,
    pub gas: f64,
    pub time: f64,
}

impl Prediction {
    fn is_finite(&self) -> bool {
        self.output.is_finite() && self.gas.is_finite() && self.time.is_finite()
    }
}

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// False when no backend is loaded; every candidate then gets [`NEUTRAL_SCORE`].
    fn is_ready(&self) -> bool;

    fn predict(&self, features: &RouteFeatures) -> Result<Prediction>;
}

/// Degraded mode: no model, neutral scores.
#[derive(Debug, Default, Clone)]
pub struct NeutralStrategy;

impl ScoringStrategy for NeutralStrategy {
    fn name(&self) -> &'static str {
        "neutral"
    }

    fn is_ready(&self) -> bool {
        false
    }

    fn predict(&self, _features: &RouteFeatures) -> Result<Prediction> {
        bail!("no scoring backend loaded")
    }
}

/// Dense linear model mapping the six features onto `[output, gas, time]`.
#[derive(Debug, Clone)]
pub struct LinearStrategy {
    weights: [[f64; 6]; 3],
    bias: [f64; 3],
}

impl LinearStrategy {
    pub fn new(weights: [[f64; 6]; 3], bias: [f64; 3]) -> Self {
        Self { weights, bias }
    }
}

impl Default for LinearStrategy {
    fn default() -> Self {
        Self::new(
            [
                [0.0, 0.0, 0.985, 0.0, 0.0, -0.002],
                [0.0, 0.0, 0.0, 500.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, -0.000_01, 2.0],
            ],
            [0.0, 40_000.0, 25.0],
        )
    }
}

impl ScoringStrategy for LinearStrategy {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn predict(&self, features: &RouteFeatures) -> Result<Prediction> {
        let mut out = self.bias;
        for (row, acc) in self.weights.iter().zip(out.iter_mut()) {
            *acc += row.iter().zip(features.0.iter()).map(|(w, x)| w * x).sum::<f64>();
        }
        Ok(Prediction {
            output: out[0],
            gas: out[1],
            time: out[2],
        })
    }
}

/// Per-request inputs shared by every candidate being scored.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub token_in: &'a str,
    pub token_out: &'a str,
    pub amount_in: f64,
    pub inputs: &'a LiveInputs,
}

impl ScoringContext<'_> {
    fn features(&self) -> RouteFeatures {
        RouteFeatures::new(self.token_in, self.token_out, self.amount_in, self.inputs)
    }
}

pub struct RouteScorer {
    strategy: Arc<dyn ScoringStrategy>,
}

impl RouteScorer {
    pub fn new(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self { strategy }
    }

    pub fn neutral() -> Self {
        Self::new(Arc::new(NeutralStrategy))
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Score one candidate. Prediction errors degrade the candidate to the
    /// neutral score; a non-finite prediction fails the whole scoring pass.
    pub fn score(
        &self,
        mut candidate: RouteCandidate,
        ctx: &ScoringContext<'_>,
    ) -> Result<RouteCandidate, SwapError> {
        if !self.strategy.is_ready() {
            candidate.ai_score = NEUTRAL_SCORE;
            return Ok(candidate);
        }

        let prediction = match self.strategy.predict(&ctx.features()) {
            Ok(p) => p,
            Err(err) => {
                warn!(route = %candidate.id, error = %err, "prediction failed; using neutral score");
                candidate.ai_score = NEUTRAL_SCORE;
                return Ok(candidate);
            }
        };
        if !prediction.is_finite() {
            return Err(SwapError::RouteGeneration(format!(
                "{} produced a non-finite prediction for route {}",
                self.strategy.name(),
                candidate.id
            )));
        }

        let estimated_output = parse_amount(&candidate.estimated_output)
            .map_err(|e| SwapError::RouteGeneration(e.to_string()))?;
        let estimated_gas = parse_amount(&candidate.gas_estimate)
            .map_err(|e| SwapError::RouteGeneration(e.to_string()))?;

        let score = composite_score(
            &prediction,
            estimated_output,
            estimated_gas,
            candidate.execution_time_seconds as f64,
        );
        let weight = score.min(1.0);

        candidate.ai_score = score;
        candidate.estimated_output = format_decimal(estimated_output * (1.0 + weight * OUTPUT_BOOST));
        candidate.execution_time_seconds = ((candidate.execution_time_seconds as f64
            * (1.0 - weight * TIME_REDUCTION))
            .round() as u64)
            .max(MIN_EXECUTION_SECONDS);

        debug!(
            route = %candidate.id,
            ai_score = score,
            strategy = self.strategy.name(),
            "scored route"
        );
        Ok(candidate)
    }

    /// Score every candidate and return them best-first.
    pub fn score_all(
        &self,
        candidates: Vec<RouteCandidate>,
        ctx: &ScoringContext<'_>,
    ) -> Result<Vec<RouteCandidate>, SwapError> {
        let mut scored = candidates
            .into_iter()
            .map(|c| self.score(c, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        rank(&mut scored);
        Ok(scored)
    }
}

/// Mean of the output-improvement, gas-efficiency and time-efficiency ratios.
pub fn composite_score(prediction: &Prediction, output: f64, gas: f64, time: f64) -> f64 {
    let output_score = clamp_subscore(prediction.output / output);
    let gas_score = clamp_subscore(1.0 - prediction.gas / gas);
    let time_score = clamp_subscore(1.0 - prediction.time / time);
    (output_score + gas_score + time_score) / 3.0
}

fn clamp_subscore(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, MAX_SUBSCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::routes::PrivacyLevel;

    struct Fixed(Prediction);

    impl ScoringStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn is_ready(&self) -> bool {
            true
        }
        fn predict(&self, _features: &RouteFeatures) -> Result<Prediction> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl ScoringStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn is_ready(&self) -> bool {
            true
        }
        fn predict(&self, _features: &RouteFeatures) -> Result<Prediction> {
            bail!("tensor shape mismatch")
        }
    }

    fn candidate(id: &str, output: &str, gas: &str, time: u64) -> RouteCandidate {
        RouteCandidate {
            id: id.into(),
            path: vec!["0xa".into(), "0xb".into()],
            estimated_output: output.into(),
            price_impact_percent: 0.5,
            gas_estimate: gas.into(),
            execution_time_seconds: time,
            privacy_level: PrivacyLevel::Low,
            solver_reputation: 95,
            source: "ai-direct".into(),
            confidence: 0.9,
            ai_score: 0.0,
            protocols: vec![],
        }
    }

    fn ctx(inputs: &LiveInputs) -> ScoringContext<'_> {
        ScoringContext {
            token_in: "0xa",
            token_out: "0xb",
            amount_in: 1.0,
            inputs,
        }
    }

    #[test]
    fn neutral_strategy_leaves_candidates_untouched() {
        let inputs = LiveInputs::default();
        let scorer = RouteScorer::neutral();
        let scored = scorer
            .score_all(
                vec![candidate("a", "0.98", "50000", 30), candidate("b", "0.985", "75000", 45)],
                &ctx(&inputs),
            )
            .unwrap();
        assert!(scored.iter().all(|c| c.ai_score == NEUTRAL_SCORE));
        assert_eq!(scored[0].id, "a");
        assert_eq!(scored[0].estimated_output, "0.98");
        assert_eq!(scored[1].execution_time_seconds, 45);
    }

    #[test]
    fn composite_clamps_each_ratio() {
        let p = Prediction { output: 10.0, gas: 100_000.0, time: 0.0 };
        // output capped at 1.2, gas floored at 0, time at 1.0
        let score = composite_score(&p, 1.0, 50_000.0, 30.0);
        assert!((score - (1.2 + 0.0 + 1.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn model_score_adjusts_output_and_time() {
        let inputs = LiveInputs::default();
        let p = Prediction { output: 1.0, gas: 25_000.0, time: 15.0 };
        let scorer = RouteScorer::new(Arc::new(Fixed(p)));
        let scored = scorer.score(candidate("a", "1", "50000", 30), &ctx(&inputs)).unwrap();

        let expected = (1.0 + 0.5 + 0.5) / 3.0;
        assert!((scored.ai_score - expected).abs() < 1e-12);
        let output: f64 = scored.estimated_output.parse().unwrap();
        assert!((output - (1.0 + expected * 0.02)).abs() < 1e-12);
        assert_eq!(scored.execution_time_seconds, (30.0 * (1.0 - expected * 0.1)).round() as u64);
    }

    #[test]
    fn execution_time_is_floored() {
        let inputs = LiveInputs::default();
        let p = Prediction { output: 2.0, gas: 0.0, time: 0.0 };
        let scorer = RouteScorer::new(Arc::new(Fixed(p)));
        let scored = scorer.score(candidate("a", "1", "50000", 10), &ctx(&inputs)).unwrap();
        assert_eq!(scored.execution_time_seconds, MIN_EXECUTION_SECONDS);
    }

    #[test]
    fn prediction_error_degrades_to_neutral() {
        let inputs = LiveInputs::default();
        let scorer = RouteScorer::new(Arc::new(Failing));
        let scored = scorer.score(candidate("a", "1", "50000", 30), &ctx(&inputs)).unwrap();
        assert_eq!(scored.ai_score, NEUTRAL_SCORE);
        assert_eq!(scored.estimated_output, "1");
    }

    #[test]
    fn non_finite_prediction_fails_the_pass() {
        let inputs = LiveInputs::default();
        let p = Prediction { output: f64::NAN, gas: 1.0, time: 1.0 };
        let scorer = RouteScorer::new(Arc::new(Fixed(p)));
        let err = scorer
            .score_all(vec![candidate("a", "1", "50000", 30)], &ctx(&inputs))
            .unwrap_err();
        assert!(matches!(err, SwapError::RouteGeneration(_)));
    }

    #[test]
    fn linear_strategy_ranks_descending() {
        let inputs = LiveInputs::default();
        let scorer = RouteScorer::new(Arc::new(LinearStrategy::default()));
        let scored = scorer
            .score_all(
                vec![candidate("direct", "0.98", "50000", 30), candidate("multihop", "0.985", "75000", 45)],
                &ctx(&inputs),
            )
            .unwrap();
        assert!(scored.windows(2).all(|w| w[0].ai_score >= w[1].ai_score));
        assert_eq!(scorer.strategy_name(), "linear");
    }

    #[test]
    fn address_tail_feature() {
        assert_eq!(address_tail("0xffff"), 1.0);
        assert_eq!(address_tail("0x0000"), 0.0);
        assert_eq!(address_tail("zz"), 0.0);
    }
}
