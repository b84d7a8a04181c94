// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the local REST API. Action requests carry the raw text the user typed;
//! validation happens in [`crate::stacks::ContractCallBuilder`], never here.
//!
//! ## Model Categories
//!
//! - **Actions**: tip, mint, list and buy requests plus their outcome
//! - **Registry**: read-only lookup responses

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::stacks::QueryResult;
use crate::wallet::{BroadcastOutcome, CallOutcome};

// =============================================================================
// Action Models
// =============================================================================

/// Tip an artist.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TipRequest {
    /// Artist id as typed, e.g. `"1"`.
    #[serde(default)]
    pub artist_id: String,
    /// Tip in micro-STX as typed, e.g. `"500000"`.
    #[serde(default)]
    pub amount: String,
}

/// Mint from a collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    #[serde(default)]
    pub collection_id: String,
}

/// List a token for sale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub token_id: String,
    /// Price in micro-STX.
    #[serde(default)]
    pub price: String,
}

/// Buy a listed token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub token_id: String,
}

/// Outcome of a submitted action.
///
/// `cancelled` means the user closed the wallet dialog; nothing was sent.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResponse {
    Broadcast {
        #[serde(rename = "txId")]
        tx_id: String,
        #[serde(rename = "explorerUrl")]
        explorer_url: String,
    },
    Cancelled,
}

impl From<CallOutcome> for ActionResponse {
    fn from(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Broadcast(BroadcastOutcome {
                tx_id,
                explorer_url,
            }) => ActionResponse::Broadcast {
                tx_id,
                explorer_url,
            },
            CallOutcome::Cancelled => ActionResponse::Cancelled,
        }
    }
}

// =============================================================================
// Registry Models
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct TotalArtistsResponse {
    pub total: u128,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistTipsResponse {
    pub artist_id: u128,
    /// Normalized registry value.
    #[schema(value_type = Object)]
    pub tips: QueryResult,
    /// Tips formatted as STX when the registry returns a plain amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips_stx: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SongCidResponse {
    pub song_id: u128,
    /// `null` when the song is not registered.
    pub ipfs_cid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_response_serializes_with_status_tag() {
        let broadcast = ActionResponse::from(CallOutcome::Broadcast(BroadcastOutcome {
            tx_id: "0xabc".to_string(),
            explorer_url: "https://explorer.hiro.so/txid/0xabc?chain=testnet".to_string(),
        }));
        assert_eq!(
            serde_json::to_value(&broadcast).unwrap(),
            json!({
                "status": "broadcast",
                "txId": "0xabc",
                "explorerUrl": "https://explorer.hiro.so/txid/0xabc?chain=testnet"
            })
        );
        assert_eq!(
            serde_json::to_value(ActionResponse::from(CallOutcome::Cancelled)).unwrap(),
            json!({ "status": "cancelled" })
        );
    }

    #[test]
    fn missing_request_fields_deserialize_as_empty() {
        let request: TipRequest = serde_json::from_value(json!({ "artistId": "1" })).unwrap();
        assert_eq!(request.amount, "");
    }
}
