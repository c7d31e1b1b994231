// Route types
// This file defines the swap request, the route candidate records that flow
// through generation, scoring and ranking, and the live market inputs
//
// Numan Thabit 2025 Nov

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How much transaction-pattern information a route exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Low,
    Medium,
    High,
}

/// A requested token swap. Missing fields default to empty and are caught by
/// request validation; a field of the wrong JSON type fails to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    #[serde(default)]
    pub token_in: String,
    #[serde(default)]
    pub token_out: String,
    #[serde(default)]
    pub amount_in: String,
    #[serde(default)]
    pub min_amount_out: String,
    #[serde(default, alias = "dstChainId")]
    pub destination_chain_id: u64,
    #[serde(default, alias = "userAddress")]
    pub requester_address: String,
    #[serde(default, alias = "includePrivacy")]
    pub wants_privacy: bool,
}

/// One proposed execution path for a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCandidate {
    pub id: String,
    pub path: Vec<String>,
    pub estimated_output: String,
    pub price_impact_percent: f64,
    pub gas_estimate: String,
    pub execution_time_seconds: u64,
    pub privacy_level: PrivacyLevel,
    pub solver_reputation: u8,
    pub source: String,
    pub confidence: f64,
    pub ai_score: f64,
    #[serde(default)]
    pub protocols: Vec<serde_json::Value>,
}

impl RouteCandidate {
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Descending aiScore; equal scores compare equal so a stable sort keeps
    /// generation order.
    pub fn compare(&self, other: &Self) -> Ordering {
        other
            .ai_score
            .partial_cmp(&self.ai_score)
            .unwrap_or(Ordering::Equal)
    }
}

/// Sort candidates best-first without disturbing the order of ties.
pub fn rank(routes: &mut [RouteCandidate]) {
    routes.sort_by(|a, b| a.compare(b));
}

/// Drop candidates that expose the swap pattern when privacy was requested.
pub fn apply_privacy_filter(routes: Vec<RouteCandidate>, wants_privacy: bool) -> Vec<RouteCandidate> {
    if !wants_privacy {
        return routes;
    }
    routes
        .into_iter()
        .filter(|r| r.privacy_level != PrivacyLevel::Low)
        .collect()
}

/// Market inputs gathered per request before candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveInputs {
    /// gwei
    pub gas_price: f64,
    /// pool depth in quote units
    pub liquidity: f64,
    /// percent
    pub price_impact: f64,
    pub execution_time_seconds: u64,
}

impl Default for LiveInputs {
    fn default() -> Self {
        Self {
            gas_price: 20.0,
            liquidity: 100_000.0,
            price_impact: 0.5,
            execution_time_seconds: 30,
        }
    }
}

/// Ranked routes plus whether they came from the last-resort simulated set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRoutes {
    pub routes: Vec<RouteCandidate>,
    pub ai_optimized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f64, privacy: PrivacyLevel) -> RouteCandidate {
        RouteCandidate {
            id: id.to_string(),
            path: vec!["a".into(), "b".into()],
            estimated_output: "1".into(),
            price_impact_percent: 0.1,
            gas_estimate: "50000".into(),
            execution_time_seconds: 30,
            privacy_level: privacy,
            solver_reputation: 90,
            source: "test".into(),
            confidence: 0.9,
            ai_score: score,
            protocols: vec![],
        }
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let mut routes = vec![
            candidate("first", 0.5, PrivacyLevel::Low),
            candidate("best", 0.9, PrivacyLevel::Low),
            candidate("second", 0.5, PrivacyLevel::Medium),
        ];
        rank(&mut routes);
        let ids: Vec<_> = routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["best", "first", "second"]);
    }

    #[test]
    fn privacy_filter_only_applies_when_requested() {
        let routes = vec![
            candidate("low", 0.5, PrivacyLevel::Low),
            candidate("high", 0.5, PrivacyLevel::High),
        ];
        assert_eq!(apply_privacy_filter(routes.clone(), false).len(), 2);
        let filtered = apply_privacy_filter(routes, true);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "high");
    }

    #[test]
    fn request_accepts_legacy_field_names() {
        let req: SwapRequest = serde_json::from_value(serde_json::json!({
            "tokenIn": "0xa",
            "tokenOut": "0xb",
            "amountIn": "1.0",
            "minAmountOut": "0.9",
            "dstChainId": 137,
            "userAddress": "0xuser",
            "includePrivacy": true
        }))
        .unwrap();
        assert_eq!(req.destination_chain_id, 137);
        assert_eq!(req.requester_address, "0xuser");
        assert!(req.wants_privacy);
    }
}
