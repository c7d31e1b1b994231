// 1inch aggregator quote source
// REST client for the 1inch swap API; without credentials it answers with the
// demo payloads so callers see the same shape either way
//
// Numan Thabit 2025 Nov

use crate::amount::{format_decimal, format_units, parse_amount, parse_units, DEFAULT_DECIMALS};
use crate::config::OneInchConfig;
use crate::metrics::{ADAPTER_ERRORS, ADAPTER_LATENCY};
use crate::registry;
use crate::venues::adapter::{
    AdapterResult, DemoQuoteSource, QuoteData, QuoteResult, QuoteSource, SwapData, SwapDataResult,
    TokenRef, TxPayload,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEMO_API_KEY: &str = "demo-1inch-key";
const API_VERSION: &str = "v5.2";

#[derive(Debug, Clone)]
pub struct OneInchClient {
    http: Client,
    base_url: Url,
    chain_id: u64,
    api_key: String,
    retry_max_elapsed: Duration,
}

impl OneInchClient {
    pub fn new(cfg: &OneInchConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("build 1inch HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
            chain_id: cfg.chain_id,
            api_key,
            retry_max_elapsed: Duration::from_millis(cfg.retry_max_elapsed_ms),
        })
    }

    fn endpoint(&self, method: &str) -> Result<Url> {
        self.base_url
            .join(&format!("swap/{API_VERSION}/{}/{method}", self.chain_id))
            .with_context(|| format!("build 1inch {method} url"))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        method: &'static str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(method)?;
        let timer = ADAPTER_LATENCY.with_label_values(&["oneinch", method]).start_timer();
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await
            .with_context(|| format!("1inch {method} send"));
        timer.observe_duration();

        let resp = resp?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(HttpStatusError { status, body }));
        }
        resp.json::<T>()
            .await
            .with_context(|| format!("decode 1inch {method} response"))
    }

    /// Decimals of the token being sold: the registry first, then the 1inch
    /// token listing for the configured chain. Unknown tokens are an error.
    async fn input_decimals(&self, token: &str) -> Result<u32> {
        if let Some(decimals) = registry::token_decimals(self.chain_id, token) {
            return Ok(decimals.into());
        }
        let listing: RawTokenList = self.get_json("tokens", &[]).await?;
        listing
            .tokens
            .into_iter()
            .find(|(address, _)| address.eq_ignore_ascii_case(token))
            .map(|(_, info)| u32::from(info.decimals))
            .ok_or_else(|| anyhow!("unknown decimals for token {token} on chain {}", self.chain_id))
    }

    async fn base_units(&self, token: &str, amount_in: &str) -> Result<String> {
        let decimals = self.input_decimals(token).await?;
        parse_units(amount_in, decimals)
    }

    /// Quote lookups are idempotent, so transient failures are retried.
    pub async fn quote(&self, token_in: &str, token_out: &str, amount_in: &str) -> Result<QuoteData> {
        let amount = self.base_units(token_in, amount_in).await?;
        let query = vec![
            ("src", token_in.to_string()),
            ("dst", token_out.to_string()),
            ("amount", amount),
            ("includeTokensInfo", "true".to_string()),
            ("includeProtocols", "true".to_string()),
            ("includeGas", "true".to_string()),
        ];

        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(1),
            max_elapsed_time: Some(self.retry_max_elapsed),
            multiplier: 2.0,
            ..Default::default()
        };

        let query = &query;
        let raw: RawQuote = retry(backoff, move || async move {
            self.get_json::<RawQuote>("quote", query).await.map_err(|err| {
                if is_permanent(&err) {
                    backoff::Error::permanent(err)
                } else {
                    debug!(error = %err, "retrying 1inch quote");
                    backoff::Error::transient(err)
                }
            })
        })
        .await?;

        raw.into_quote(self.chain_id, token_in, token_out, amount_in)
    }

    pub async fn swap(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        from_address: &str,
        slippage_percent: f64,
    ) -> Result<SwapData> {
        let query = vec![
            ("src", token_in.to_string()),
            ("dst", token_out.to_string()),
            ("amount", self.base_units(token_in, amount_in).await?),
            ("from", from_address.to_string()),
            ("slippage", slippage_percent.to_string()),
            ("includeTokensInfo", "true".to_string()),
            ("includeProtocols", "true".to_string()),
        ];
        let raw: RawSwap = self.get_json("swap", &query).await?;
        raw.into_swap_data(self.chain_id, token_in, token_out, amount_in)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("http {status}: {body}")]
struct HttpStatusError {
    status: StatusCode,
    body: String,
}

/// 4xx other than rate limiting will not improve on retry.
fn is_permanent(err: &anyhow::Error) -> bool {
    err.downcast_ref::<HttpStatusError>()
        .map(|e| e.status.is_client_error() && e.status != StatusCode::TOO_MANY_REQUESTS)
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToken {
    address: String,
    symbol: String,
    decimals: u8,
}

impl RawToken {
    fn into_token(self) -> TokenRef {
        TokenRef {
            address: self.address,
            symbol: self.symbol,
            decimals: self.decimals,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTokenList {
    tokens: HashMap<String, RawToken>,
}

fn token_or(raw: Option<RawToken>, chain_id: u64, address: &str) -> TokenRef {
    raw.map(RawToken::into_token).unwrap_or_else(|| TokenRef {
        address: address.to_string(),
        symbol: String::new(),
        decimals: registry::token_decimals(chain_id, address).unwrap_or(DEFAULT_DECIMALS as u8),
    })
}

/// Base units back to a plain decimal string.
fn display_amount(base_units: &str, decimals: u8) -> Result<String> {
    let rendered = format_units(base_units, decimals as u32)?;
    Ok(format_decimal(parse_amount(&rendered)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    to_amount: String,
    #[serde(default)]
    from_token: Option<RawToken>,
    #[serde(default)]
    to_token: Option<RawToken>,
    #[serde(default)]
    protocols: Vec<serde_json::Value>,
    #[serde(default)]
    gas: Option<u64>,
}

impl RawQuote {
    fn into_quote(
        self,
        chain_id: u64,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
    ) -> Result<QuoteData> {
        let to_token = token_or(self.to_token, chain_id, token_out);
        Ok(QuoteData {
            to_token_amount: display_amount(&self.to_amount, to_token.decimals)?,
            from_token: token_or(self.from_token, chain_id, token_in),
            to_token,
            from_token_amount: amount_in.to_string(),
            protocols: self.protocols,
            estimated_gas: self.gas.unwrap_or(50_000).to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTx {
    from: String,
    to: String,
    data: String,
    value: String,
    gas: u64,
    gas_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSwap {
    to_amount: String,
    #[serde(default)]
    from_token: Option<RawToken>,
    #[serde(default)]
    to_token: Option<RawToken>,
    #[serde(default)]
    protocols: Vec<serde_json::Value>,
    tx: RawTx,
}

impl RawSwap {
    fn into_swap_data(
        self,
        chain_id: u64,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
    ) -> Result<SwapData> {
        let to_token = token_or(self.to_token, chain_id, token_out);
        Ok(SwapData {
            to_token_amount: display_amount(&self.to_amount, to_token.decimals)?,
            from_token: token_or(self.from_token, chain_id, token_in),
            to_token,
            from_token_amount: amount_in.to_string(),
            protocols: self.protocols,
            tx: TxPayload {
                from: self.tx.from,
                to: self.tx.to,
                data: self.tx.data,
                value: self.tx.value,
                gas: self.tx.gas,
                gas_price: self.tx.gas_price,
            },
        })
    }
}

/// Quote source backed by 1inch when credentials are configured, demo payloads otherwise.
pub struct OneInchQuoteSource {
    client: Option<OneInchClient>,
    demo: DemoQuoteSource,
}

impl OneInchQuoteSource {
    pub fn from_config(cfg: &OneInchConfig) -> Result<Self> {
        let client = match cfg.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && key != DEMO_API_KEY => {
                Some(OneInchClient::new(cfg, key.to_string())?)
            }
            _ => {
                warn!("1inch API key not configured; quote source running in demo mode");
                None
            }
        };
        Ok(Self {
            client,
            demo: DemoQuoteSource,
        })
    }

    pub fn demo() -> Self {
        Self {
            client: None,
            demo: DemoQuoteSource,
        }
    }
}

#[async_trait]
impl QuoteSource for OneInchQuoteSource {
    fn name(&self) -> &'static str {
        "1inch"
    }

    fn is_live(&self) -> bool {
        self.client.is_some()
    }

    async fn get_quote(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        _slippage_percent: f64,
    ) -> QuoteResult {
        let Some(client) = &self.client else {
            return self.demo.quote(token_in, token_out, amount_in);
        };
        match client.quote(token_in, token_out, amount_in).await {
            Ok(data) => AdapterResult::Success { data },
            Err(err) => {
                ADAPTER_ERRORS.with_label_values(&["oneinch", "quote"]).inc();
                warn!(error = %err, "1inch quote error");
                AdapterResult::failure(format!("{err:#}"))
            }
        }
    }

    async fn get_swap_data(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        from_address: &str,
        slippage_percent: f64,
    ) -> SwapDataResult {
        let Some(client) = &self.client else {
            return self.demo.swap_data(token_in, token_out, amount_in, from_address);
        };
        match client
            .swap(token_in, token_out, amount_in, from_address, slippage_percent)
            .await
        {
            Ok(data) => AdapterResult::Success { data },
            Err(err) => {
                ADAPTER_ERRORS.with_label_values(&["oneinch", "swap"]).inc();
                warn!(error = %err, "1inch swap data error");
                AdapterResult::failure(format!("{err:#}"))
            }
        }
    }
}
