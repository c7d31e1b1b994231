// Swap intent extraction from conversational replies
// The assistant embeds a JSON object in free text when it detects a swap;
// anything malformed or absent means no intent, never an error
//
// Numan Thabit 2025 Nov

use crate::router::routes::SwapRequest;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A free-text turn plus optional caller context.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentExtraction {
    pub response: String,
    pub swap_intent: Option<SwapRequest>,
}

/// A scalar the model may write as a string, a number or a boolean.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    fn text(self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }

    fn chain_id(&self) -> Option<u64> {
        match self {
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Number(n) => n.as_u64(),
            Scalar::Flag(_) => None,
        }
    }

    fn flag(&self) -> bool {
        match self {
            Scalar::Flag(b) => *b,
            Scalar::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            Scalar::Number(_) => false,
        }
    }
}

/// Intent as written by the model, before normalisation into a [`SwapRequest`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LooseIntent {
    token_in: Option<Scalar>,
    token_out: Option<Scalar>,
    amount_in: Option<Scalar>,
    min_amount_out: Option<Scalar>,
    #[serde(alias = "dstChainId")]
    destination_chain_id: Option<Scalar>,
    #[serde(alias = "userAddress")]
    requester_address: Option<Scalar>,
    #[serde(alias = "includePrivacy")]
    wants_privacy: Option<Scalar>,
}

impl LooseIntent {
    fn into_request(self) -> SwapRequest {
        let text = |field: Option<Scalar>| field.map(Scalar::text).unwrap_or_default();
        SwapRequest {
            destination_chain_id: self
                .destination_chain_id
                .as_ref()
                .and_then(Scalar::chain_id)
                .unwrap_or_default(),
            wants_privacy: self.wants_privacy.as_ref().is_some_and(Scalar::flag),
            token_in: text(self.token_in),
            token_out: text(self.token_out),
            amount_in: text(self.amount_in),
            min_amount_out: text(self.min_amount_out),
            requester_address: text(self.requester_address),
        }
    }
}

/// Widest `{ ... }` span in the text, parsed as a swap request.
pub fn extract_swap_intent(reply: &str) -> Option<SwapRequest> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }

    let candidate = &reply[start..=end];
    let value: serde_json::Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(err) => {
            debug!(error = %err, "reply carries no parseable intent");
            return None;
        }
    };
    if !value.is_object() {
        return None;
    }

    let intent = match serde_json::from_value::<LooseIntent>(value) {
        Ok(loose) => loose.into_request(),
        Err(err) => {
            debug!(error = %err, "intent fields have unexpected shapes");
            return None;
        }
    };
    let mentions_swap = [&intent.token_in, &intent.token_out, &intent.amount_in]
        .iter()
        .any(|field| !field.is_empty());
    mentions_swap.then_some(intent)
}

pub fn extract(turn: &ConversationTurn) -> IntentExtraction {
    IntentExtraction {
        response: turn.message.clone(),
        swap_intent: extract_swap_intent(&turn.message),
    }
}
