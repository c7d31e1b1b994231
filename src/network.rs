// Solver network and swap intent book
// Both stand in for contract calls: every answer is produced per request and
// nothing is stored between calls
//
// Numan Thabit 2025 Nov

use crate::amount::{format_amount, parse_amount_units, DEFAULT_DECIMALS};
use crate::errors::SwapError;
use crate::registry;
use crate::router::execution::random_tx_hash;
use crate::router::validation::ValidationResult;
use chrono::Utc;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::info;

const INTENT_ID_SPAN: u64 = 1_000_000;
const SIMULATED_STAKE: &str = "1000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolverAction {
    Stake,
    Unstake,
    UpdateReputation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverActionRequest {
    pub action: SolverAction,
    #[serde(default)]
    pub solver_address: Option<String>,
    /// Base units of the staking token
    #[serde(default)]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverReceipt {
    pub success: bool,
    pub message: String,
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverInfo {
    pub address: String,
    pub stake: String,
    pub reputation: u8,
    pub active: bool,
    pub total_swaps: u64,
    pub success_rate: f64,
    pub avg_execution_time: u64,
}

pub fn solver_action(req: &SolverActionRequest) -> Result<SolverReceipt, SwapError> {
    let address = req
        .solver_address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let message = match req.action {
        SolverAction::Stake => "Successfully staked as solver".to_string(),
        SolverAction::Unstake => "Successfully unstaked from solver network".to_string(),
        SolverAction::UpdateReputation => {
            let address = address.ok_or_else(|| {
                SwapError::Validation("solverAddress is required to update reputation".into())
            })?;
            format!("Reputation updated for solver {address}")
        }
    };

    info!(
        action = ?req.action,
        solver = address.unwrap_or("-"),
        amount = %req
            .amount
            .as_deref()
            .map(|a| format_amount(a, DEFAULT_DECIMALS))
            .unwrap_or_default(),
        "solver action"
    );
    Ok(SolverReceipt {
        success: true,
        message,
        transaction_hash: random_tx_hash(),
    })
}

pub fn solver_info(address: &str) -> SolverInfo {
    SolverInfo {
        address: address.to_string(),
        stake: parse_amount_units(SIMULATED_STAKE, DEFAULT_DECIMALS),
        reputation: 95,
        active: true,
        total_swaps: 1247,
        success_rate: 98.5,
        avg_execution_time: 45,
    }
}

/// Intent submitted for on-chain registration. Amounts are base units.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwapIntent {
    #[serde(default)]
    pub token_in: String,
    #[serde(default)]
    pub token_out: String,
    #[serde(default)]
    pub amount_in: String,
    #[serde(default)]
    pub min_amount_out: String,
    #[serde(default, alias = "destinationChainId")]
    pub dst_chain_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentReceipt {
    pub success: bool,
    pub intent_id: u64,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRecord {
    pub id: u64,
    pub user: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub min_amount_out: String,
    pub dst_chain_id: u64,
    pub fulfilled: bool,
    pub created_at: String,
}

pub fn validate_new_intent(intent: &NewSwapIntent) -> ValidationResult {
    let mut result = ValidationResult::new();
    for (value, message) in [
        (&intent.token_in, "Token in address is required"),
        (&intent.token_out, "Token out address is required"),
        (&intent.amount_in, "Amount in is required"),
        (&intent.min_amount_out, "Minimum amount out is required"),
    ] {
        if value.trim().is_empty() {
            result.add_error(message.to_string());
        }
    }
    if intent.dst_chain_id < 1 {
        result.add_error("Destination chain ID is required".to_string());
    }
    result
}

pub fn create_intent(intent: &NewSwapIntent) -> Result<IntentReceipt, SwapError> {
    validate_new_intent(intent).into_result()?;
    let intent_id = OsRng.next_u64() % INTENT_ID_SPAN;
    info!(
        intent_id,
        token_in = %intent.token_in,
        token_out = %intent.token_out,
        dst_chain = intent.dst_chain_id,
        "swap intent registered"
    );
    Ok(IntentReceipt {
        success: true,
        intent_id,
        message: "Swap intent created successfully",
    })
}

/// Open intents for a user: a single unfulfilled USDC to USDT swap to Polygon.
pub fn intents_for(user: &str) -> Vec<IntentRecord> {
    let token = |symbol: &str| registry::token_address(1, symbol).unwrap_or(registry::NATIVE_TOKEN);
    vec![IntentRecord {
        id: 1,
        user: user.to_string(),
        token_in: token("USDC").to_string(),
        token_out: token("USDT").to_string(),
        amount_in: parse_amount_units("1", DEFAULT_DECIMALS),
        min_amount_out: parse_amount_units("0.98", DEFAULT_DECIMALS),
        dst_chain_id: 137,
        fulfilled: false,
        created_at: Utc::now().to_rfc3339(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: SolverAction, address: Option<&str>) -> SolverActionRequest {
        SolverActionRequest {
            action,
            solver_address: address.map(str::to_string),
            amount: Some("1000000000000000000".into()),
        }
    }

    #[test]
    fn solver_actions_answer_with_a_receipt() {
        let receipt = solver_action(&request(SolverAction::Stake, None)).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.message, "Successfully staked as solver");
        assert_eq!(receipt.transaction_hash.len(), 66);

        let receipt =
            solver_action(&request(SolverAction::UpdateReputation, Some("0xsolver"))).unwrap();
        assert_eq!(receipt.message, "Reputation updated for solver 0xsolver");
    }

    #[test]
    fn reputation_update_needs_an_address() {
        let err = solver_action(&request(SolverAction::UpdateReputation, Some("  "))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn simulated_solver_stakes_a_thousand_tokens() {
        let info = solver_info("0xsolver");
        assert_eq!(info.stake, "1000000000000000000000");
        assert_eq!(info.reputation, 95);
    }

    #[test]
    fn intents_need_every_field() {
        let intent: NewSwapIntent = serde_json::from_value(serde_json::json!({
            "tokenIn": "0xa",
            "amountIn": "1"
        }))
        .unwrap();
        let errors = validate_new_intent(&intent).errors;
        assert_eq!(
            errors,
            [
                "Token out address is required",
                "Minimum amount out is required",
                "Destination chain ID is required"
            ]
        );
        assert!(create_intent(&intent).is_err());
    }

    #[test]
    fn user_intents_use_registry_tokens() {
        let intents = intents_for("0xuser");
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].token_out, "0xdAC17F958D2ee523a2206206994597C13D831ec7");
        assert_eq!(intents[0].amount_in, "1000000000000000000");
        assert_eq!(intents[0].min_amount_out, "980000000000000000");
        assert!(!intents[0].fulfilled);
    }
}
