// Route candidate generator
// Builds the fixed set of synthetic route shapes (direct, multi-hop and
// privacy-enhanced) from the request and the gathered live inputs
//
// Numan Thabit 2025 Nov

use crate::amount::{parse_amount, retain};
use crate::errors::SwapError;
use crate::registry::{hub_tokens, PLACEHOLDER_HOP};
use crate::router::routes::{LiveInputs, PrivacyLevel, RouteCandidate, SwapRequest};

pub const DIRECT_RETENTION: f64 = 0.98;
pub const MULTIHOP_RETENTION: f64 = 0.985;
pub const PRIVACY_RETENTION: f64 = 0.99;

pub const DIRECT_GAS: u64 = 50_000;

/// One route shape relative to the direct route.
struct Shape {
    id: &'static str,
    source: &'static str,
    hops: usize,
    privacy_level: PrivacyLevel,
    retention: f64,
    impact_factor: f64,
    time_factor: f64,
    gas_factor: f64,
    reputation: u8,
    confidence: f64,
}

const DIRECT: Shape = Shape {
    id: "direct",
    source: "ai-direct",
    hops: 1,
    privacy_level: PrivacyLevel::Low,
    retention: DIRECT_RETENTION,
    impact_factor: 1.0,
    time_factor: 1.0,
    gas_factor: 1.0,
    reputation: 95,
    confidence: 0.9,
};

const MULTIHOP: Shape = Shape {
    id: "multihop",
    source: "ai-multihop",
    hops: 2,
    privacy_level: PrivacyLevel::Medium,
    retention: MULTIHOP_RETENTION,
    impact_factor: 0.7,
    time_factor: 1.5,
    gas_factor: 1.5,
    reputation: 88,
    confidence: 0.8,
};

const PRIVACY: Shape = Shape {
    id: "privacy",
    source: "ai-privacy",
    hops: 3,
    privacy_level: PrivacyLevel::High,
    retention: PRIVACY_RETENTION,
    impact_factor: 0.5,
    time_factor: 2.0,
    gas_factor: 2.4,
    reputation: 92,
    confidence: 0.7,
};

/// Emit candidates in generation order: direct, multi-hop, then privacy when requested.
pub fn generate(req: &SwapRequest, inputs: &LiveInputs) -> Result<Vec<RouteCandidate>, SwapError> {
    let amount_in =
        parse_amount(&req.amount_in).map_err(|e| SwapError::RouteGeneration(e.to_string()))?;

    let mut shapes = vec![&DIRECT, &MULTIHOP];
    if req.wants_privacy {
        shapes.push(&PRIVACY);
    }

    Ok(shapes
        .into_iter()
        .map(|shape| build(shape, req, inputs, amount_in))
        .collect())
}

fn build(shape: &Shape, req: &SwapRequest, inputs: &LiveInputs, amount_in: f64) -> RouteCandidate {
    let execution_time =
        (inputs.execution_time_seconds as f64 * shape.time_factor).round() as u64;
    let gas = (DIRECT_GAS as f64 * shape.gas_factor).round() as u64;

    RouteCandidate {
        id: shape.id.to_string(),
        path: path_for(req, shape.hops),
        estimated_output: retain(amount_in, shape.retention),
        price_impact_percent: inputs.price_impact * shape.impact_factor,
        gas_estimate: gas.to_string(),
        execution_time_seconds: execution_time,
        privacy_level: shape.privacy_level,
        solver_reputation: shape.reputation,
        source: shape.source.to_string(),
        confidence: shape.confidence,
        ai_score: 0.0,
        protocols: Vec::new(),
    }
}

/// tokenIn, intermediate hub tokens, tokenOut; `hops` edges in total.
pub(crate) fn path_for(req: &SwapRequest, hops: usize) -> Vec<String> {
    let mut intermediates: Vec<String> = hub_tokens(req.destination_chain_id)
        .into_iter()
        .filter(|t| !t.eq_ignore_ascii_case(&req.token_in) && !t.eq_ignore_ascii_case(&req.token_out))
        .take(hops.saturating_sub(1))
        .map(str::to_string)
        .collect();
    while intermediates.len() < hops.saturating_sub(1) {
        intermediates.push(PLACEHOLDER_HOP.to_string());
    }

    let mut path = Vec::with_capacity(hops + 1);
    path.push(req.token_in.clone());
    path.extend(intermediates);
    path.push(req.token_out.clone());
    path
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn inputs() -> LiveInputs {
        LiveInputs {
            gas_price: 20.0,
            liquidity: 500_000.0,
            price_impact: 1.0,
            execution_time_seconds: 60,
        }
    }

    #[test]
    fn direct_and_multihop_without_privacy() {
        let routes = generate(&request("1.0", false), &inputs()).unwrap();
        assert_eq!(routes.len(), 2);

        let direct = &routes[0];
        assert_eq!(direct.id, "direct");
        assert_eq!(direct.path.len(), 2);
        assert_eq!(direct.hops(), 1);
        assert_eq!(direct.privacy_level, PrivacyLevel::Low);
        assert_eq!(direct.estimated_output, "0.98");
        assert_eq!(direct.gas_estimate, "50000");
        assert_eq!(direct.execution_time_seconds, 60);

        let multihop = &routes[1];
        assert_eq!(multihop.path.len(), 3);
        assert_eq!(multihop.privacy_level, PrivacyLevel::Medium);
        assert_eq!(multihop.estimated_output, "0.985");
        assert!((multihop.price_impact_percent - 0.7).abs() < 1e-12);
        assert_eq!(multihop.gas_estimate, "75000");
        assert_eq!(multihop.execution_time_seconds, 90);
    }

    #[test]
    fn privacy_shape_when_requested() {
        let routes = generate(&request("1.0", true), &inputs()).unwrap();
        assert_eq!(routes.len(), 3);
        let privacy = &routes[2];
        assert_eq!(privacy.id, "privacy");
        assert_eq!(privacy.path.len(), 4);
        assert_eq!(privacy.hops(), 3);
        assert_eq!(privacy.privacy_level, PrivacyLevel::High);
        assert_eq!(privacy.estimated_output, "0.99");
        assert!((privacy.price_impact_percent - 0.5).abs() < 1e-12);
        assert_eq!(privacy.gas_estimate, "120000");
        assert_eq!(privacy.execution_time_seconds, 120);
    }

    #[test]
    fn intermediate_hops_skip_endpoints() {
        let mut req = request("1", true);
        req.token_out = "0xdAC17F958D2ee523a2206206994597C13D831ec7".into();
        let path = path_for(&req, 3);
        assert_eq!(path.first(), Some(&req.token_in));
        assert_eq!(path.last(), Some(&req.token_out));
        assert!(!path[1..3].contains(&req.token_out));

        req.destination_chain_id = 8453;
        assert_eq!(path_for(&req, 2)[1], PLACEHOLDER_HOP);
    }

    #[test]
    fn unparseable_amount_is_a_generation_failure() {
        let err = generate(&request("lots", false), &inputs()).unwrap_err();
        assert!(matches!(err, SwapError::RouteGeneration(_)));
    }
}
