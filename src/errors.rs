// Error types and error handling module
// This file defines the error taxonomy shared by the route aggregator,
// the privacy commitment service and the swap orchestrator
//
// Numan Thabit 2025 Nov

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwapError {
    /// Malformed request shape or missing field; rejected before any external call.
    #[error("validation failed: {0}")]
    Validation(String),
    /// External quote or settlement source unavailable or returned an error.
    #[error("adapter failure: {0}")]
    Adapter(String),
    /// Candidate generation or scoring failed; always recovered by the fallback set.
    #[error("route generation failed: {0}")]
    RouteGeneration(String),
    #[error("No routes available")]
    NoRoutes,
    #[error("privacy commitment failed: {0}")]
    Privacy(String),
    #[error("settlement failed: {0}")]
    Settlement(String),
}

impl SwapError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SwapError::Validation(_))
    }
}
