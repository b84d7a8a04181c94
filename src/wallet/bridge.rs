// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Async boundary to the signing capability.
//!
//! At most one contract call is outstanding at a time. A second submission
//! while one is in flight fails with [`ClientError::ConcurrentCall`] without
//! reaching the provider.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::classify::{classify, ClientError};
use crate::stacks::{CallDescriptor, NetworkConfig};

use super::provider::{
    AppMetadata, ConnectOutcome, IdentitySnapshot, PendingSignIn, SigningProvider, SubmitOutcome,
};

/// A transaction the signer broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastOutcome {
    pub tx_id: String,
    pub explorer_url: String,
}

/// Terminal outcome of a submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Broadcast(BroadcastOutcome),
    Cancelled,
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct WalletBridge {
    provider: Option<Arc<dyn SigningProvider>>,
    network: NetworkConfig,
    in_flight: AtomicBool,
}

impl WalletBridge {
    /// `None` means no signer is installed; every operation then fails with
    /// [`ClientError::WalletUnavailable`].
    pub fn new(provider: Option<Arc<dyn SigningProvider>>, network: NetworkConfig) -> Self {
        Self {
            provider,
            network,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn SigningProvider>, ClientError> {
        self.provider
            .as_ref()
            .ok_or_else(|| ClientError::WalletUnavailable("no signing provider configured".to_string()))
    }

    /// Run the connect dialog.
    pub async fn connect(&self, metadata: &AppMetadata) -> Result<ConnectOutcome, ClientError> {
        let provider = self.provider()?;
        match provider.connect(metadata, self.network.selector).await {
            Ok(outcome) => Ok(outcome),
            Err(raw) => match classify(raw) {
                ClientError::UserCancelled => Ok(ConnectOutcome::Cancelled),
                err => {
                    debug!(error = %err, "Wallet connect failed");
                    Err(err)
                }
            },
        }
    }

    /// Finish a handshake and fetch the identity payload.
    pub async fn complete_sign_in(
        &self,
        pending: &PendingSignIn,
    ) -> Result<IdentitySnapshot, ClientError> {
        let provider = self.provider()?;
        provider.complete_sign_in(pending).await.map_err(|raw| {
            let err = classify(raw);
            debug!(error = %err, "Wallet sign-in completion failed");
            err
        })
    }

    /// Submit a call for signing and broadcast. The descriptor is consumed.
    pub async fn submit_call(&self, descriptor: CallDescriptor) -> Result<CallOutcome, ClientError> {
        let provider = self.provider()?;
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!(
                function = descriptor.function_name(),
                "Rejected contract call: another call is awaiting approval"
            );
            return Err(ClientError::ConcurrentCall);
        };

        let call_id = Uuid::new_v4().to_string();
        info!(
            call_id = %call_id,
            contract = %descriptor.contract(),
            function = descriptor.function_name(),
            "Submitting contract call"
        );

        let outcome = match provider.submit_call(&call_id, &descriptor).await {
            Ok(outcome) => outcome,
            Err(raw) => match classify(raw) {
                ClientError::UserCancelled => SubmitOutcome::Cancelled,
                err => {
                    warn!(call_id = %call_id, error = %err, "Contract call failed");
                    return Err(err);
                }
            },
        };

        match outcome {
            SubmitOutcome::Broadcast { tx_id } => {
                let tx_id = tx_id.trim().to_string();
                if tx_id.is_empty() {
                    return Err(ClientError::Protocol(
                        "signer returned an empty transaction id".to_string(),
                    ));
                }
                info!(call_id = %call_id, tx_id = %tx_id, "Contract call broadcast");
                Ok(CallOutcome::Broadcast(BroadcastOutcome {
                    explorer_url: self.network.explorer_tx_url(&tx_id),
                    tx_id,
                }))
            }
            SubmitOutcome::Cancelled => {
                info!(call_id = %call_id, "Contract call cancelled by user");
                Ok(CallOutcome::Cancelled)
            }
        }
    }
}
