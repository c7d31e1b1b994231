// Router HTTP API implementation
// This file exposes route ranking, quoting, swap orchestration, proof
// verification and intent extraction over HTTP
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use crate::intent::{self, ConversationTurn, IntentExtraction};
use crate::metrics;
use crate::network::{
    self, IntentReceipt, IntentRecord, NewSwapIntent, SolverActionRequest, SolverInfo,
    SolverReceipt,
};
use crate::privacy::{ProofRecord, SwapCommitment};
use crate::registry::{self, TokenInfo};
use crate::router::execution::{CompletionStatus, SwapResult};
use crate::router::routes::{RankedRoutes, SwapRequest};
use crate::router::selector::QuoteSummary;
use crate::router::validation::ensure_valid;
use crate::state::ServiceRegistry;
use crate::venues::adapter::QuoteResult;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

impl From<SwapError> for ApiError {
    fn from(err: SwapError) -> Self {
        let status = match &err {
            SwapError::Validation(_) => StatusCode::BAD_REQUEST,
            SwapError::NoRoutes => StatusCode::NOT_FOUND,
            SwapError::Adapter(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, err.to_string())
    }
}

/// Undecodable bodies are validation errors and answer 400 like any other.
fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| SwapError::Validation(rejection.body_text()).into())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalQuoteQuery {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub slippage: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyProofRequest {
    pub proof: ProofRecord,
    pub commitment: SwapCommitment,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofResponse {
    pub valid: bool,
    pub commitment_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub intent_id: u64,
    pub src_chain_id: u64,
    pub dst_chain_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverQuery {
    pub solver_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SolverResponse {
    pub solver: SolverInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentsQuery {
    pub user_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntentsResponse {
    pub intents: Vec<IntentRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub quote_source: &'static str,
    pub live_quotes: bool,
    pub scoring: &'static str,
    pub proofs: &'static str,
}

/// Create the HTTP router with API endpoints
pub fn create_api_router(services: Arc<ServiceRegistry>) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .route("/api/v1/routes", post(ranked_routes))
        .route("/api/v1/quote", post(swap_quote))
        .route("/api/v1/quote/external", get(external_quote))
        .route("/api/v1/swap", post(submit_swap))
        .route("/api/v1/swap/verify", post(verify_completion))
        .route("/api/v1/proof/verify", post(verify_proof))
        .route("/api/v1/intent/extract", post(extract_intent))
        .route("/api/v1/chains/:id/tokens", get(chain_tokens))
        .route("/api/v1/solver", get(solver_info).post(solver_action))
        .route("/api/v1/intents", get(user_intents).post(create_intent))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(services)
}

async fn health_check(State(services): State<Arc<ServiceRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        quote_source: services.quote_source.name(),
        live_quotes: services.quote_source.is_live(),
        scoring: services.scorer.strategy_name(),
        proofs: services.commitments.provider_name(),
    })
}

async fn render_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

/// Ranked routes for a request; generation failures come back as the simulated set.
async fn ranked_routes(
    State(services): State<Arc<ServiceRegistry>>,
    payload: Result<Json<SwapRequest>, JsonRejection>,
) -> ApiResult<RankedRoutes> {
    let req = decode(payload)?;
    ensure_valid(&req)?;
    let _permit = admit(&services).await?;
    Ok(Json(services.aggregator.rank_routes(&req).await))
}

async fn swap_quote(
    State(services): State<Arc<ServiceRegistry>>,
    payload: Result<Json<SwapRequest>, JsonRejection>,
) -> ApiResult<QuoteSummary> {
    let req = decode(payload)?;
    ensure_valid(&req)?;
    let _permit = admit(&services).await?;
    Ok(Json(services.aggregator.quote_summary(&req).await?))
}

/// Raw adapter answer; failures are part of the body, not the status.
async fn external_quote(
    State(services): State<Arc<ServiceRegistry>>,
    Query(q): Query<ExternalQuoteQuery>,
) -> Json<QuoteResult> {
    let slippage = q.slippage.unwrap_or(services.config.default_slippage_percent);
    Json(
        services
            .quote_source
            .get_quote(&q.token_in, &q.token_out, &q.amount_in, slippage)
            .await,
    )
}

async fn submit_swap(
    State(services): State<Arc<ServiceRegistry>>,
    payload: Result<Json<SwapRequest>, JsonRejection>,
) -> ApiResult<SwapResult> {
    let req = decode(payload)?;
    ensure_valid(&req)?;
    let _permit = admit(&services).await?;
    Ok(Json(services.orchestrator.submit_swap_request(&req).await))
}

async fn verify_completion(
    State(services): State<Arc<ServiceRegistry>>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> ApiResult<CompletionStatus> {
    let req = decode(payload)?;
    Ok(Json(
        services
            .orchestrator
            .verify_swap_completion(req.intent_id, req.src_chain_id, req.dst_chain_id)
            .await,
    ))
}

async fn verify_proof(
    State(services): State<Arc<ServiceRegistry>>,
    payload: Result<Json<VerifyProofRequest>, JsonRejection>,
) -> ApiResult<VerifyProofResponse> {
    let req = decode(payload)?;
    let valid = services.commitments.verify_proof(&req.proof, &req.commitment);
    let commitment_hash = services.commitments.commitment_hash(&req.commitment)?;
    Ok(Json(VerifyProofResponse {
        valid,
        commitment_hash,
    }))
}

async fn extract_intent(
    payload: Result<Json<ConversationTurn>, JsonRejection>,
) -> ApiResult<IntentExtraction> {
    let turn = decode(payload)?;
    if turn.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message is required"));
    }
    Ok(Json(intent::extract(&turn)))
}

async fn chain_tokens(Path(chain_id): Path<u64>) -> Json<Vec<TokenInfo>> {
    Json(registry::supported_tokens(chain_id))
}

async fn solver_action(
    payload: Result<Json<SolverActionRequest>, JsonRejection>,
) -> ApiResult<SolverReceipt> {
    let req = decode(payload)?;
    Ok(Json(network::solver_action(&req)?))
}

async fn solver_info(Query(q): Query<SolverQuery>) -> ApiResult<SolverResponse> {
    let address = required(q.solver_address, "Solver address is required")?;
    Ok(Json(SolverResponse {
        solver: network::solver_info(&address),
    }))
}

async fn create_intent(
    payload: Result<Json<NewSwapIntent>, JsonRejection>,
) -> ApiResult<IntentReceipt> {
    let intent = decode(payload)?;
    Ok(Json(network::create_intent(&intent)?))
}

async fn user_intents(Query(q): Query<IntentsQuery>) -> ApiResult<IntentsResponse> {
    let user = required(q.user_address, "User address is required")?;
    Ok(Json(IntentsResponse {
        intents: network::intents_for(&user),
    }))
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, message))
}

async fn admit(
    services: &ServiceRegistry,
) -> Result<crate::control::AdmissionPermit, ApiError> {
    services
        .admission
        .acquire()
        .await
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, "service shutting down"))
}
