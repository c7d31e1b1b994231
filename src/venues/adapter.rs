// Quote source adapter module
// This file defines the contract every external aggregator integration
// implements, its tagged success/failure results, and the demo payloads used
// when the live source is unavailable
//
// Numan Thabit 2025 Nov

use crate::amount::{parse_amount, retain};
use crate::registry::NATIVE_TOKEN;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Retention factor applied to demo quotes.
pub const DEMO_RETENTION: f64 = 0.98;
pub const DEMO_GAS_ESTIMATE: &str = "50000";
/// Router contract the demo settlement payload targets.
pub const DEMO_ROUTER: &str = "0x1111111254EEB25477B68fb85Ed929f73A960582";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRef {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    pub from_token: TokenRef,
    pub to_token: TokenRef,
    pub from_token_amount: String,
    pub to_token_amount: String,
    #[serde(default)]
    pub protocols: Vec<serde_json::Value>,
    pub estimated_gas: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPayload {
    pub from: String,
    pub to: String,
    pub data: String,
    pub value: String,
    pub gas: u64,
    pub gas_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapData {
    pub from_token: TokenRef,
    pub to_token: TokenRef,
    pub from_token_amount: String,
    pub to_token_amount: String,
    #[serde(default)]
    pub protocols: Vec<serde_json::Value>,
    pub tx: TxPayload,
}

/// Outcome of an adapter call. Adapters never surface errors any other way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum AdapterResult<T> {
    Success { data: T },
    Failure { error: String },
}

impl<T> AdapterResult<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        AdapterResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AdapterResult::Success { .. })
    }

    pub fn ok(self) -> Option<T> {
        match self {
            AdapterResult::Success { data } => Some(data),
            AdapterResult::Failure { .. } => None,
        }
    }
}

pub type QuoteResult = AdapterResult<QuoteData>;
pub type SwapDataResult = AdapterResult<SwapData>;

/// An external aggregator that can quote a pair and build settlement data.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// False when the source answers with demo payloads.
    fn is_live(&self) -> bool;

    async fn get_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        slippage_percent: f64,
    ) -> QuoteResult;

    async fn get_swap_data(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        from_address: &str,
        slippage_percent: f64,
    ) -> SwapDataResult;
}

/// Deterministic answers shaped exactly like live ones.
#[derive(Debug, Default, Clone)]
pub struct DemoQuoteSource;

impl DemoQuoteSource {
    pub fn quote(&self, token_in: &str, token_out: &str, amount_in: &str) -> QuoteResult {
        let amount = match parse_amount(amount_in) {
            Ok(v) => v,
            Err(err) => return QuoteResult::failure(err.to_string()),
        };
        QuoteResult::Success {
            data: QuoteData {
                from_token: demo_token(token_in, "FROM"),
                to_token: demo_token(token_out, "TO"),
                from_token_amount: amount_in.to_string(),
                to_token_amount: retain(amount, DEMO_RETENTION),
                protocols: demo_protocols(),
                estimated_gas: DEMO_GAS_ESTIMATE.to_string(),
            },
        }
    }

    pub fn swap_data(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        from_address: &str,
    ) -> SwapDataResult {
        let quote = match self.quote(token_in, token_out, amount_in) {
            AdapterResult::Success { data } => data,
            AdapterResult::Failure { error } => return SwapDataResult::Failure { error },
        };
        let value = if token_in.eq_ignore_ascii_case(NATIVE_TOKEN) {
            quote.from_token_amount.clone()
        } else {
            "0".to_string()
        };
        SwapDataResult::Success {
            data: SwapData {
                tx: TxPayload {
                    from: from_address.to_string(),
                    to: DEMO_ROUTER.to_string(),
                    data: "0x".to_string(),
                    value,
                    gas: 50_000,
                    gas_price: "20000000000".to_string(),
                },
                from_token: quote.from_token,
                to_token: quote.to_token,
                from_token_amount: quote.from_token_amount,
                to_token_amount: quote.to_token_amount,
                protocols: quote.protocols,
            },
        }
    }
}

fn demo_token(address: &str, symbol: &str) -> TokenRef {
    TokenRef {
        address: address.to_string(),
        symbol: symbol.to_string(),
        decimals: 18,
    }
}

fn demo_protocols() -> Vec<serde_json::Value> {
    vec![serde_json::json!(["UNISWAP_V3", "SUSHISWAP"])]
}

#[async_trait]
impl QuoteSource for DemoQuoteSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn is_live(&self) -> bool {
        false
    }

    async fn get_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        _slippage_percent: f64,
    ) -> QuoteResult {
        self.quote(token_in, token_out, amount_in)
    }

    async fn get_swap_data(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        from_address: &str,
        _slippage_percent: f64,
    ) -> SwapDataResult {
        self.swap_data(token_in, token_out, amount_in, from_address)
    }
}
