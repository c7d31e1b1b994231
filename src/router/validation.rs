// Pre-route validation module
// Rejects malformed swap requests before any external call is made
//
// Numan Thabit 2025 Nov

use crate::amount::parse_amount;
use crate::errors::SwapError;
use crate::registry;
use crate::router::routes::SwapRequest;
use tracing::warn;

/// Accumulated validation findings
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn into_result(self) -> Result<(), SwapError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(SwapError::Validation(self.errors.join("; ")))
        }
    }
}

/// Validate a swap request's shape. Unknown destination chains and identical
/// token pairs are allowed through with a warning.
pub fn validate_swap_request(req: &SwapRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (field, value) in [
        ("tokenIn", &req.token_in),
        ("tokenOut", &req.token_out),
        ("requesterAddress", &req.requester_address),
    ] {
        if value.trim().is_empty() {
            result.add_error(format!("{field} is required"));
        }
    }

    if req.amount_in.trim().is_empty() {
        result.add_error("amountIn is required".to_string());
    } else if let Err(e) = parse_amount(&req.amount_in) {
        result.add_error(format!("amountIn: {e}"));
    }

    if req.min_amount_out.trim().is_empty() {
        result.add_error("minAmountOut is required".to_string());
    } else if let Err(e) = parse_amount(&req.min_amount_out) {
        result.add_error(format!("minAmountOut: {e}"));
    }

    if req.destination_chain_id == 0 {
        result.add_error("destinationChainId is required".to_string());
    } else if registry::chain(req.destination_chain_id).is_none() {
        warn!(chain_id = req.destination_chain_id, "destination chain not in registry");
    }

    if !req.token_in.is_empty() && req.token_in.eq_ignore_ascii_case(&req.token_out) {
        warn!(token = %req.token_in, "tokenIn equals tokenOut");
    }

    result
}

/// Validate and convert to the error taxonomy in one step.
pub fn ensure_valid(req: &SwapRequest) -> Result<(), SwapError> {
    validate_swap_request(req).into_result()
}
