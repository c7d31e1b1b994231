use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use unicore_router::config::AppConfig;
use unicore_router::router::router::create_api_router;
use unicore_router::state::ServiceRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().context("initialize tracing subscriber")?;

    if let Err(err) = run().await {
        tracing::error!(error = ?err, "fatal router error");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("load configuration from environment")?;
    let services = Arc::new(ServiceRegistry::from_config(config).context("construct services")?);
    App { services }.run().await
}

struct App {
    services: Arc<ServiceRegistry>,
}

impl App {
    async fn run(self) -> Result<()> {
        let config = self.services.config.clone();
        info!(
            address = %config.listen_addr,
            quote_source = self.services.quote_source.name(),
            live_quotes = self.services.quote_source.is_live(),
            scoring = self.services.scorer.strategy_name(),
            proofs = self.services.commitments.provider_name(),
            "UniCore router online"
        );

        let api_router = create_api_router(self.services.clone());
        let listener = tokio::net::TcpListener::bind(config.listen_addr)
            .await
            .with_context(|| format!("bind API server address {}", config.listen_addr))?;
        info!(address = %config.listen_addr, "HTTP API server starting");
        let api_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, api_router).await {
                warn!(error = %e, "API server error");
            }
        });

        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    info!(
                        max_inflight = config.max_inflight,
                        available = self.services.admission.available(),
                        "UniCore heartbeat"
                    );
                }
                res = tokio::signal::ctrl_c() => {
                    if let Err(err) = res {
                        warn!(error = %err, "ctrl_c listener error");
                    }
                    info!("Shutdown signal received, exiting");
                    break;
                }
            }
        }

        self.services.admission.close();
        api_handle.abort();
        Ok(())
    }
}

fn init_tracing() -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("tracing subscriber init: {err}"))
}
