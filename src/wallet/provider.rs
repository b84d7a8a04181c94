// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External signing capability.
//!
//! The signer owns the user's keys and shows the approval dialogs. This crate
//! only sees three operations, each resolving to exactly one outcome:
//! approved, cancelled or a raw failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::classify::{Boundary, RawFailure};
use crate::stacks::{CallDescriptor, NetworkSelector, TypedArgument};

/// App details shown in the wallet's connect dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Audioblocks DApp (Testnet)".to_string(),
            icon: None,
        }
    }
}

/// Handshake response awaiting completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSignIn {
    pub auth_response: String,
}

/// Opaque identity payload returned by the signer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentitySnapshot(pub Value);

impl IdentitySnapshot {
    /// `profile.stxAddress.<network>`, if present.
    pub fn stx_address(&self, network: NetworkSelector) -> Option<&str> {
        self.0
            .get("profile")?
            .get("stxAddress")?
            .get(network.as_str())?
            .as_str()
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Result of the connect dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Approved(PendingSignIn),
    Cancelled,
}

/// Result of the transaction approval dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Broadcast { tx_id: String },
    Cancelled,
}

/// The signing capability injected at startup.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Ask the user to connect this app.
    async fn connect(
        &self,
        metadata: &AppMetadata,
        network: NetworkSelector,
    ) -> Result<ConnectOutcome, RawFailure>;

    /// Exchange a handshake response for the identity payload.
    async fn complete_sign_in(&self, pending: &PendingSignIn)
        -> Result<IdentitySnapshot, RawFailure>;

    /// Ask the user to sign and broadcast a contract call.
    async fn submit_call(
        &self,
        call_id: &str,
        descriptor: &CallDescriptor,
    ) -> Result<SubmitOutcome, RawFailure>;
}

#[derive(Debug, Deserialize)]
struct SignerErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// `{ "result": .. }` or `{ "error": { "code", "message" } }`.
#[derive(Debug, Deserialize)]
struct SignerEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<SignerErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxResult {
    tx_id: String,
}

/// Signer reached over HTTP (a local wallet daemon or browser bridge).
#[derive(Debug, Clone)]
pub struct HttpSigner {
    base_url: String,
    http: Client,
}

impl HttpSigner {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RawFailure> {
        // Approval dialogs have no deadline; only reaching the signer is bounded.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| RawFailure::Http {
                boundary: Boundary::Signer,
                source,
            })?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    async fn post(
        &self,
        path: &str,
        payload: &Value,
        idempotency_key: Option<&str>,
    ) -> Result<Value, RawFailure> {
        let mut request = self
            .http
            .post(format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .header("Content-Type", "application/json")
            .json(payload);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await.map_err(|source| RawFailure::Http {
            boundary: Boundary::Signer,
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Signer errors carry a code even on non-2xx responses.
            if let Ok(SignerEnvelope {
                error: Some(error), ..
            }) = serde_json::from_str::<SignerEnvelope>(&body)
            {
                return Err(RawFailure::Signer {
                    code: error.code,
                    message: error.message,
                });
            }
            return Err(RawFailure::Status {
                boundary: Boundary::Signer,
                status: status.as_u16(),
                body,
            });
        }

        let envelope: SignerEnvelope = response.json().await.map_err(|e| RawFailure::Decode {
            boundary: Boundary::Signer,
            message: format!("POST {path} invalid JSON: {e}"),
        })?;
        unwrap_envelope(path, envelope)
    }
}

fn unwrap_envelope(path: &str, envelope: SignerEnvelope) -> Result<Value, RawFailure> {
    if let Some(error) = envelope.error {
        return Err(RawFailure::Signer {
            code: error.code,
            message: error.message,
        });
    }
    envelope.result.ok_or_else(|| RawFailure::Decode {
        boundary: Boundary::Signer,
        message: format!("POST {path} response has neither result nor error"),
    })
}

/// Wire body for `/contract-call`.
fn contract_call_payload(descriptor: &CallDescriptor) -> Value {
    let function_args: Vec<String> = descriptor.args().iter().map(TypedArgument::to_hex).collect();
    json!({
        "network": descriptor.network(),
        "contractAddress": descriptor.contract().address,
        "contractName": descriptor.contract().name,
        "functionName": descriptor.function_name(),
        "functionArgs": function_args,
        "anchorMode": descriptor.anchor_mode(),
    })
}

#[async_trait]
impl SigningProvider for HttpSigner {
    async fn connect(
        &self,
        metadata: &AppMetadata,
        network: NetworkSelector,
    ) -> Result<ConnectOutcome, RawFailure> {
        let result = self
            .post(
                "/connect",
                &json!({ "appDetails": metadata, "network": network }),
                None,
            )
            .await?;
        let pending: PendingSignIn =
            serde_json::from_value(result).map_err(|e| RawFailure::Decode {
                boundary: Boundary::Signer,
                message: format!("connect result: {e}"),
            })?;
        Ok(ConnectOutcome::Approved(pending))
    }

    async fn complete_sign_in(
        &self,
        pending: &PendingSignIn,
    ) -> Result<IdentitySnapshot, RawFailure> {
        let result = self
            .post(
                "/sign-in/complete",
                &json!({ "authResponse": pending.auth_response }),
                None,
            )
            .await?;
        if !result.is_object() {
            return Err(RawFailure::Decode {
                boundary: Boundary::Signer,
                message: "identity payload is not an object".to_string(),
            });
        }
        Ok(IdentitySnapshot(result))
    }

    async fn submit_call(
        &self,
        call_id: &str,
        descriptor: &CallDescriptor,
    ) -> Result<SubmitOutcome, RawFailure> {
        let result = self
            .post(
                "/contract-call",
                &contract_call_payload(descriptor),
                Some(call_id),
            )
            .await?;
        let tx: TxResult = serde_json::from_value(result).map_err(|e| RawFailure::Decode {
            boundary: Boundary::Signer,
            message: format!("contract-call result: {e}"),
        })?;
        Ok(SubmitOutcome::Broadcast { tx_id: tx.tx_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stacks::ContractCallBuilder;

    #[test]
    fn stx_address_reads_profile_by_network() {
        let identity = IdentitySnapshot(json!({
            "profile": {
                "stxAddress": {
                    "testnet": "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ",
                    "mainnet": "SP000000000000000000002Q6VF78"
                }
            }
        }));
        assert_eq!(
            identity.stx_address(NetworkSelector::Testnet),
            Some("ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ")
        );
        assert_eq!(
            identity.stx_address(NetworkSelector::Mainnet),
            Some("SP000000000000000000002Q6VF78")
        );
    }

    #[test]
    fn stx_address_missing_is_none() {
        let identity = IdentitySnapshot(json!({ "profile": {} }));
        assert_eq!(identity.stx_address(NetworkSelector::Testnet), None);
        let identity = IdentitySnapshot(json!("not an object"));
        assert_eq!(identity.stx_address(NetworkSelector::Testnet), None);
    }

    #[test]
    fn contract_call_payload_has_hex_args_in_order() {
        let descriptor = ContractCallBuilder::default().tip("1", "500000").unwrap();
        let payload = contract_call_payload(&descriptor);
        assert_eq!(payload["functionName"], "tip-artist");
        assert_eq!(payload["contractName"], "artist-registry");
        assert_eq!(payload["network"], "testnet");
        assert_eq!(payload["anchorMode"], "any");
        assert_eq!(
            payload["functionArgs"],
            json!([
                "0x0100000000000000000000000000000001",
                "0x010000000000000000000000000007a120"
            ])
        );
    }

    #[test]
    fn envelope_error_becomes_signer_failure() {
        let envelope: SignerEnvelope = serde_json::from_value(json!({
            "error": { "code": "user_cancelled", "message": "closed" }
        }))
        .unwrap();
        match unwrap_envelope("/connect", envelope) {
            Err(RawFailure::Signer { code, message }) => {
                assert_eq!(code, "user_cancelled");
                assert_eq!(message, "closed");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_envelope_is_decode_failure() {
        let envelope: SignerEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            unwrap_envelope("/connect", envelope),
            Err(RawFailure::Decode { .. })
        ));
    }

    #[test]
    fn default_metadata_names_the_app() {
        let metadata = AppMetadata::default();
        assert_eq!(metadata.name, "Audioblocks DApp (Testnet)");
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({ "name": "Audioblocks DApp (Testnet)" })
        );
    }
}
