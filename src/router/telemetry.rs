// Live market inputs for route generation
// Gas price, pool liquidity, price impact and execution time are each fetched
// independently; any one failing degrades to its default without failing the request
//
// Numan Thabit 2025 Nov

use crate::router::routes::{LiveInputs, SwapRequest};
use anyhow::{bail, Result};
use async_trait::async_trait;
use rand_core::{OsRng, RngCore};
use tracing::{debug, warn};

/// Source of the per-request market inputs.
#[async_trait]
pub trait MarketTelemetry: Send + Sync {
    async fn gas_price(&self, chain_id: u64) -> Result<f64>;
    async fn liquidity(&self, token_in: &str, token_out: &str, chain_id: u64) -> Result<f64>;
    async fn price_impact(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        chain_id: u64,
    ) -> Result<f64>;
    async fn execution_time(&self, chain_id: u64) -> Result<u64>;
}

/// Gather all live inputs for a request. Never fails.
pub async fn gather_live_inputs(telemetry: &dyn MarketTelemetry, req: &SwapRequest) -> LiveInputs {
    let chain_id = req.destination_chain_id;
    let defaults = LiveInputs::default();

    let (gas, liquidity, impact, time) = futures::join!(
        telemetry.gas_price(chain_id),
        telemetry.liquidity(&req.token_in, &req.token_out, chain_id),
        telemetry.price_impact(&req.token_in, &req.token_out, &req.amount_in, chain_id),
        telemetry.execution_time(chain_id),
    );

    let inputs = LiveInputs {
        gas_price: or_default(gas, defaults.gas_price, "gas_price"),
        liquidity: or_default(liquidity, defaults.liquidity, "liquidity"),
        price_impact: or_default(impact, defaults.price_impact, "price_impact"),
        execution_time_seconds: or_default(time, defaults.execution_time_seconds, "execution_time"),
    };
    debug!(
        chain_id,
        gas_price = inputs.gas_price,
        liquidity = inputs.liquidity,
        price_impact = inputs.price_impact,
        execution_time = inputs.execution_time_seconds,
        "gathered live inputs"
    );
    inputs
}

fn or_default<T: Copy>(value: Result<T>, default: T, input: &'static str) -> T {
    match value {
        Ok(v) => v,
        Err(err) => {
            warn!(input, error = %err, "live input unavailable; using default");
            default
        }
    }
}

/// Uniform sample in [0, 1).
pub(crate) fn sample_unit() -> f64 {
    (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Per-chain reference tables; liquidity and price impact are sampled until a
/// DEX liquidity feed is wired in.
#[derive(Debug, Default, Clone)]
pub struct ChainTelemetry;

#[async_trait]
impl MarketTelemetry for ChainTelemetry {
    async fn gas_price(&self, chain_id: u64) -> Result<f64> {
        Ok(match chain_id {
            1 => 20.0,
            137 => 30.0,
            8453 | 42161 | 10 => 0.1,
            _ => 20.0,
        })
    }

    async fn liquidity(&self, _token_in: &str, _token_out: &str, _chain_id: u64) -> Result<f64> {
        Ok(sample_unit() * 1_000_000.0 + 100_000.0)
    }

    async fn price_impact(
        &self,
        _token_in: &str,
        _token_out: &str,
        _amount_in: &str,
        _chain_id: u64,
    ) -> Result<f64> {
        Ok(sample_unit() * 2.0 + 0.1)
    }

    async fn execution_time(&self, chain_id: u64) -> Result<u64> {
        Ok(match chain_id {
            1 => 60,
            137 => 30,
            8453 => 20,
            42161 | 10 => 15,
            _ => 30,
        })
    }
}

/// Deterministic inputs; a `None` field reports that input as unavailable.
#[derive(Debug, Clone)]
pub struct FixedTelemetry {
    pub gas_price: Option<f64>,
    pub liquidity: Option<f64>,
    pub price_impact: Option<f64>,
    pub execution_time_seconds: Option<u64>,
}

impl FixedTelemetry {
    pub fn new(inputs: LiveInputs) -> Self {
        Self {
            gas_price: Some(inputs.gas_price),
            liquidity: Some(inputs.liquidity),
            price_impact: Some(inputs.price_impact),
            execution_time_seconds: Some(inputs.execution_time_seconds),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            gas_price: None,
            liquidity: None,
            price_impact: None,
            execution_time_seconds: None,
        }
    }
}

impl Default for FixedTelemetry {
    fn default() -> Self {
        Self::new(LiveInputs::default())
    }
}

#[async_trait]
impl MarketTelemetry for FixedTelemetry {
    async fn gas_price(&self, _chain_id: u64) -> Result<f64> {
        match self.gas_price {
            Some(v) => Ok(v),
            None => bail!("gas price feed unavailable"),
        }
    }

    async fn liquidity(&self, _token_in: &str, _token_out: &str, _chain_id: u64) -> Result<f64> {
        match self.liquidity {
            Some(v) => Ok(v),
            None => bail!("liquidity feed unavailable"),
        }
    }

    async fn price_impact(
        &self,
        _token_in: &str,
        _token_out: &str,
        _amount_in: &str,
        _chain_id: u64,
    ) -> Result<f64> {
        match self.price_impact {
            Some(v) => Ok(v),
            None => bail!("price impact feed unavailable"),
        }
    }

    async fn execution_time(&self, _chain_id: u64) -> Result<u64> {
        match self.execution_time_seconds {
            Some(v) => Ok(v),
            None => bail!("execution time feed unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(chain_id: u64) -> SwapRequest {
        SwapRequest {
            token_in: "0xa".into(),
            token_out: "0xb".into(),
            amount_in: "1".into(),
            min_amount_out: "0.9".into(),
            destination_chain_id: chain_id,
            requester_address: "0xuser".into(),
            wants_privacy: false,
        }
    }

    #[tokio::test]
    async fn chain_tables_drive_gas_and_time() {
        let inputs = gather_live_inputs(&ChainTelemetry, &request(42161)).await;
        assert_eq!(inputs.gas_price, 0.1);
        assert_eq!(inputs.execution_time_seconds, 15);
        assert!((100_000.0..1_100_000.0).contains(&inputs.liquidity));
        assert!((0.1..2.1).contains(&inputs.price_impact));

        let unknown = gather_live_inputs(&ChainTelemetry, &request(999)).await;
        assert_eq!(unknown.gas_price, 20.0);
        assert_eq!(unknown.execution_time_seconds, 30);
    }

    #[tokio::test]
    async fn each_input_falls_back_independently() {
        let telemetry = FixedTelemetry {
            gas_price: Some(7.0),
            liquidity: None,
            price_impact: Some(1.5),
            execution_time_seconds: None,
        };
        let inputs = gather_live_inputs(&telemetry, &request(1)).await;
        let defaults = LiveInputs::default();
        assert_eq!(inputs.gas_price, 7.0);
        assert_eq!(inputs.liquidity, defaults.liquidity);
        assert_eq!(inputs.price_impact, 1.5);
        assert_eq!(inputs.execution_time_seconds, defaults.execution_time_seconds);

        let all_down = gather_live_inputs(&FixedTelemetry::unavailable(), &request(1)).await;
        assert_eq!(all_down, defaults);
    }
}
