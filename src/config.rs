// Configuration management module
// This file handles loading and parsing of configuration settings
// from environment variables (APP__ prefix, `__` as the nesting separator)
//
// Numan Thabit 2025 Nov

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP API bind address
    pub listen_addr: SocketAddr,
    /// Concurrency control for the HTTP surface
    pub max_inflight: usize,
    /// Orchestrations admitted per one-second window
    pub admission_rate_per_sec: u32,
    /// Slippage tolerance passed to the quote source, in percent
    pub default_slippage_percent: f64,
    /// Simulated settlement latency
    pub settlement_delay_ms: u64,
    /// Route scoring backend: "neutral" or "linear"
    pub scoring_strategy: String,
    /// Proof provider: "simulated", "deterministic" or "signed"
    pub proof_provider: String,
    /// Hex-encoded 32-byte Ed25519 key for the signed proof provider
    pub proof_signing_key_hex: Option<String>,
    pub oneinch: OneInchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneInchConfig {
    /// Absent or "demo-1inch-key" runs the quote source in demo mode
    pub api_key: Option<String>,
    pub base_url: Url,
    pub chain_id: u64,
    pub timeout_ms: u64,
    /// Retry budget for idempotent quote lookups
    pub retry_max_elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringKind {
    Neutral,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofKind {
    Simulated,
    Deterministic,
    Signed,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("listen_addr", "0.0.0.0:8080")?
            .set_default("max_inflight", 64)?
            .set_default("admission_rate_per_sec", 200)?
            .set_default("default_slippage_percent", 0.5)?
            .set_default("settlement_delay_ms", 2000)?
            .set_default("scoring_strategy", "neutral")?
            .set_default("proof_provider", "simulated")?
            .set_default("oneinch.base_url", "https://api.1inch.dev/")?
            .set_default("oneinch.chain_id", 1)?
            .set_default("oneinch.timeout_ms", 5000)?
            .set_default("oneinch.retry_max_elapsed_ms", 1500)?
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("assemble configuration sources")?;
        let cfg: Self = cfg.try_deserialize().context("decode configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_inflight > 0, "max_inflight must be positive");
        ensure!(
            self.admission_rate_per_sec > 0,
            "admission_rate_per_sec must be positive"
        );
        ensure!(
            self.default_slippage_percent.is_finite() && self.default_slippage_percent > 0.0,
            "default_slippage_percent must be positive"
        );
        self.scoring_kind()?;
        if self.proof_kind()? == ProofKind::Signed {
            self.signing_key_bytes()?;
        }
        Ok(())
    }

    pub fn scoring_kind(&self) -> Result<ScoringKind> {
        match self.scoring_strategy.to_ascii_lowercase().as_str() {
            "neutral" | "none" => Ok(ScoringKind::Neutral),
            "linear" => Ok(ScoringKind::Linear),
            other => bail!("unsupported scoring strategy: {other}"),
        }
    }

    pub fn proof_kind(&self) -> Result<ProofKind> {
        match self.proof_provider.to_ascii_lowercase().as_str() {
            "simulated" => Ok(ProofKind::Simulated),
            "deterministic" => Ok(ProofKind::Deterministic),
            "signed" => Ok(ProofKind::Signed),
            other => bail!("unsupported proof provider: {other}"),
        }
    }

    pub fn signing_key_bytes(&self) -> Result<[u8; 32]> {
        let hex_key = self
            .proof_signing_key_hex
            .as_deref()
            .context("APP__PROOF_SIGNING_KEY_HEX is required when proof_provider is signed")?;
        let bytes = hex::decode(hex_key.trim_start_matches("0x")).context("decode signing key hex")?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| anyhow::anyhow!("signing key must be 32 bytes, got {}", bytes.len()))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_inflight: 64,
            admission_rate_per_sec: 200,
            default_slippage_percent: 0.5,
            settlement_delay_ms: 2000,
            scoring_strategy: "neutral".to_string(),
            proof_provider: "simulated".to_string(),
            proof_signing_key_hex: None,
            oneinch: OneInchConfig::default(),
        }
    }
}

impl Default for OneInchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse("https://api.1inch.dev/").expect("static url parses"),
            chain_id: 1,
            timeout_ms: 5000,
            retry_max_elapsed_ms: 1500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.scoring_kind().unwrap(), ScoringKind::Neutral);
        assert_eq!(cfg.proof_kind().unwrap(), ProofKind::Simulated);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let cfg = AppConfig {
            scoring_strategy: "tensorflow".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig {
            proof_provider: "groth16".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn signed_provider_needs_a_32_byte_key() {
        let mut cfg = AppConfig {
            proof_provider: "signed".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());

        cfg.proof_signing_key_hex = Some("0x1234".into());
        assert!(cfg.validate().is_err());

        cfg.proof_signing_key_hex = Some("11".repeat(32));
        cfg.validate().unwrap();
        assert_eq!(cfg.signing_key_bytes().unwrap(), [0x11; 32]);
    }

    #[test]
    fn zero_admission_rate_is_rejected() {
        let cfg = AppConfig {
            admission_rate_per_sec: 0,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_slippage_is_rejected() {
        let cfg = AppConfig {
            default_slippage_percent: 0.0,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
