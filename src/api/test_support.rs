// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared doubles for handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::classify::RawFailure;
use crate::session::SessionManager;
use crate::stacks::{
    CallDescriptor, ContractCallBuilder, LedgerRpc, NetworkSelector, ReadOnlyQueryClient,
    ReadOnlyRequest, STACKS_TESTNET,
};
use crate::state::AppState;
use crate::storage::{MemorySessionStore, SessionStore};
use crate::wallet::{
    AppMetadata, ConnectOutcome, IdentitySnapshot, PendingSignIn, SigningProvider, SubmitOutcome,
    WalletBridge,
};

pub const ADDRESS: &str = "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ";

/// Signer that approves sign-in and answers every call with a fixed result.
pub struct ScriptedSigner {
    /// `None` answers calls with a user cancellation.
    pub tx_id: Option<&'static str>,
    pub submits: AtomicUsize,
    pub last_function: std::sync::Mutex<Option<String>>,
}

impl ScriptedSigner {
    pub fn broadcasting(tx_id: &'static str) -> Arc<Self> {
        Arc::new(Self {
            tx_id: Some(tx_id),
            submits: AtomicUsize::new(0),
            last_function: std::sync::Mutex::new(None),
        })
    }

    pub fn cancelling() -> Arc<Self> {
        Arc::new(Self {
            tx_id: None,
            submits: AtomicUsize::new(0),
            last_function: std::sync::Mutex::new(None),
        })
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SigningProvider for ScriptedSigner {
    async fn connect(
        &self,
        _metadata: &AppMetadata,
        _network: NetworkSelector,
    ) -> Result<ConnectOutcome, RawFailure> {
        Ok(ConnectOutcome::Approved(PendingSignIn {
            auth_response: "auth-token".to_string(),
        }))
    }

    async fn complete_sign_in(
        &self,
        _pending: &PendingSignIn,
    ) -> Result<IdentitySnapshot, RawFailure> {
        Ok(IdentitySnapshot(json!({
            "profile": { "stxAddress": { "testnet": ADDRESS } }
        })))
    }

    async fn submit_call(
        &self,
        _call_id: &str,
        descriptor: &CallDescriptor,
    ) -> Result<SubmitOutcome, RawFailure> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_function.lock() {
            *last = Some(descriptor.function_name().to_string());
        }
        match self.tx_id {
            Some(tx_id) => Ok(SubmitOutcome::Broadcast {
                tx_id: tx_id.to_string(),
            }),
            None => Err(RawFailure::Signer {
                code: "user_cancelled".to_string(),
                message: "closed".to_string(),
            }),
        }
    }
}

/// Ledger answering every read-only call with the same hex value.
pub struct StaticLedger {
    pub hex: &'static str,
    pub calls: std::sync::Mutex<Vec<ReadOnlyRequest>>,
}

impl StaticLedger {
    pub fn new(hex: &'static str) -> Arc<Self> {
        Arc::new(Self {
            hex,
            calls: std::sync::Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LedgerRpc for StaticLedger {
    async fn call_read_only(&self, request: &ReadOnlyRequest) -> Result<String, RawFailure> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        Ok(self.hex.to_string())
    }
}

pub fn state_with(signer: Option<Arc<ScriptedSigner>>, ledger: Arc<StaticLedger>) -> AppState {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let provider = signer.map(|s| s as Arc<dyn SigningProvider>);
    let wallet = Arc::new(WalletBridge::new(provider, STACKS_TESTNET));
    let sessions = Arc::new(SessionManager::new(
        store,
        wallet.clone(),
        NetworkSelector::Testnet,
        AppMetadata::default(),
    ));
    let queries = ReadOnlyQueryClient::new(ledger, NetworkSelector::Testnet);
    AppState::new(sessions, wallet, queries, ContractCallBuilder::default())
}

/// Initialized state with no signer and a ledger returning `u0`.
pub async fn signed_out_state() -> AppState {
    let state = state_with(None, StaticLedger::new("0x0100000000000000000000000000000000"));
    state.sessions.initialize().await;
    state
}

/// Initialized and signed-in state using `signer`.
pub async fn signed_in_state(signer: Arc<ScriptedSigner>) -> AppState {
    let state = state_with(
        Some(signer),
        StaticLedger::new("0x0100000000000000000000000000000000"),
    );
    state.sessions.initialize().await;
    state
        .sessions
        .sign_in()
        .await
        .expect("scripted sign-in succeeds");
    state
}
