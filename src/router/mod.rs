// Router module - route optimization and swap orchestration
// This file wires candidate generation, scoring and aggregation together with
// the swap orchestrator and its HTTP surface
//
// Numan Thabit 2025 Nov

pub mod execution;
pub mod generator;
pub mod routes;
pub mod scorer;
pub mod selector;
pub mod telemetry;
pub mod validation;

#[allow(clippy::module_inception)]
pub mod router;

pub use execution::{SwapOrchestrator, SwapResult};
pub use routes::{PrivacyLevel, RouteCandidate, SwapRequest};
pub use scorer::RouteScorer;
pub use selector::RouteAggregator;
