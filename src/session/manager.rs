// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session State Machine
//!
//! Owns the single [`Session`] value and every transition of it.
//!
//! ```text
//!            initialize (credential)            sign_in (approved)
//!   SignedOut ───────────────────────▶ SignedIn ◀──────────────── Pending
//!       ▲  │                                                         ▲
//!       │  └──────────────── sign_in (connect approved) ─────────────┘
//!       │
//!       └── sign_out / cancel / failure / recovery from invalid state
//! ```
//!
//! Transitions are serialized by one async lock and published through a
//! `watch` channel, so readers always see a whole snapshot and never wait.
//! Invalid persisted state is only seen inside `initialize()`: it is logged,
//! persisted state is cleared, and the manager settles at `SignedOut` before
//! publishing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::classify::{classify, ClientError, RawFailure};
use crate::stacks::c32::StacksAddress;
use crate::stacks::NetworkSelector;
use crate::storage::{SessionKey, SessionStore};
use crate::wallet::{AppMetadata, ConnectOutcome, IdentitySnapshot, PendingSignIn, WalletBridge};

/// Version of the persisted session record.
const SESSION_RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    SignedOut,
    Pending,
    SignedIn,
}

/// Read-only snapshot of the session.
///
/// `address` is set exactly when `status` is `SignedIn`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Session {
    pub status: SessionStatus,
    pub address: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub raw: Option<Value>,
}

impl Session {
    pub fn signed_out() -> Self {
        Self {
            status: SessionStatus::SignedOut,
            address: None,
            raw: None,
        }
    }

    fn pending() -> Self {
        Self {
            status: SessionStatus::Pending,
            address: None,
            raw: None,
        }
    }

    fn signed_in(address: String, raw: Value) -> Self {
        Self {
            status: SessionStatus::SignedIn,
            address: Some(address),
            raw: Some(raw),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.status == SessionStatus::SignedIn
    }
}

/// Completed sign-in as written under [`SessionKey::Session`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    version: u32,
    address: String,
    identity: Value,
    signed_in_at: DateTime<Utc>,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    bridge: Arc<WalletBridge>,
    network: NetworkSelector,
    metadata: AppMetadata,
    /// Serializes transitions; holds the token of the sign-in in flight.
    transitions: Mutex<CancellationToken>,
    /// One sign-in handshake at a time.
    handshake: Mutex<()>,
    initialized: AtomicBool,
    state: watch::Sender<Session>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        bridge: Arc<WalletBridge>,
        network: NetworkSelector,
        metadata: AppMetadata,
    ) -> Self {
        let (state, _) = watch::channel(Session::signed_out());
        Self {
            store,
            bridge,
            network,
            metadata,
            transitions: Mutex::new(CancellationToken::new()),
            handshake: Mutex::new(()),
            initialized: AtomicBool::new(false),
            state,
        }
    }

    /// Current snapshot. Never waits on an in-progress transition.
    pub fn current_session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// The signed-in session, or a `SessionError`.
    pub fn require_signed_in(&self) -> Result<Session, ClientError> {
        let session = self.current_session();
        if session.is_signed_in() {
            Ok(session)
        } else {
            Err(ClientError::Session("not signed in".to_string()))
        }
    }

    /// Restore the session from persisted state. Runs once; later calls
    /// return the current snapshot unchanged.
    pub async fn initialize(&self) -> Session {
        let _transition = self.transitions.lock().await;
        if self.is_initialized() {
            return self.current_session();
        }

        let session = match self.restore().await {
            Ok(session) => session,
            Err(err) => {
                info!(status = "invalid", reason = %err, "Persisted session is invalid, clearing");
                self.clear_persisted().await;
                Session::signed_out()
            }
        };

        self.publish(session);
        self.initialized.store(true, Ordering::Release);
        self.current_session()
    }

    /// Connect the wallet and sign in. A no-op when already signed in;
    /// a cancelled dialog leaves the user signed out without an error.
    ///
    /// The transition lock is only held between wallet round-trips, so a
    /// `sign_out` during the dialog wins and the late result is discarded.
    pub async fn sign_in(&self) -> Result<Session, ClientError> {
        let _handshake = self.handshake.lock().await;
        let cancel = {
            let mut active = self.transitions.lock().await;
            if !self.is_initialized() {
                return Err(ClientError::Session(
                    "session manager is not initialized".to_string(),
                ));
            }
            if self.current_session().is_signed_in() {
                return Ok(self.current_session());
            }
            *active = CancellationToken::new();
            active.clone()
        };

        let outcome = self.run_handshake(&cancel).await;

        let _transition = self.transitions.lock().await;
        if cancel.is_cancelled() {
            info!("Sign-in superseded by sign-out");
            return Ok(self.current_session());
        }
        let outcome = match outcome {
            Ok(Some(identity)) => self.persist(identity).await.map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(Some(session)) => {
                self.publish(session);
                Ok(self.current_session())
            }
            Ok(None) => {
                info!("Sign-in cancelled by user");
                self.clear_persisted().await;
                self.publish(Session::signed_out());
                Ok(self.current_session())
            }
            Err(err) => {
                warn!(error = %err, "Sign-in failed");
                self.clear_persisted().await;
                self.publish(Session::signed_out());
                Err(surface_sign_in_error(err))
            }
        }
    }

    /// Clear persisted state and return to `SignedOut`. Always succeeds.
    /// Before `initialize()` has run the snapshot is returned unchanged.
    pub async fn sign_out(&self) -> Session {
        let active = self.transitions.lock().await;
        if !self.is_initialized() {
            return self.current_session();
        }
        active.cancel();
        self.clear_persisted().await;
        self.publish(Session::signed_out());
        self.current_session()
    }

    /// Wallet round-trips of a sign-in. `Ok(None)` means the user cancelled
    /// or `cancel` fired.
    async fn run_handshake(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<IdentitySnapshot>, ClientError> {
        let connected = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            outcome = self.bridge.connect(&self.metadata) => outcome?,
        };
        let pending = match connected {
            ConnectOutcome::Approved(pending) => pending,
            ConnectOutcome::Cancelled => return Ok(None),
        };

        {
            let _transition = self.transitions.lock().await;
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let record = serde_json::to_string(&pending)
                .map_err(|e| ClientError::Unknown(format!("failed to encode handshake: {e}")))?;
            self.store
                .write(SessionKey::PendingSignIn, &record)
                .await
                .map_err(|e| classify(RawFailure::Storage(e)))?;
            self.publish(Session::pending());
        }

        let completed = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            identity = self.bridge.complete_sign_in(&pending) => identity,
        };
        match completed {
            Ok(identity) => Ok(Some(identity)),
            Err(ClientError::UserCancelled) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn restore(&self) -> Result<Session, ClientError> {
        if let Some(record) = self.read_key(SessionKey::Session).await? {
            let persisted: PersistedSession = serde_json::from_str(&record)
                .map_err(|e| ClientError::Session(format!("unreadable session record: {e}")))?;
            if persisted.version != SESSION_RECORD_VERSION {
                return Err(ClientError::Session(format!(
                    "unsupported session record version {}",
                    persisted.version
                )));
            }
            let identity = IdentitySnapshot(persisted.identity);
            let address = self.signed_in_address(&identity)?;
            if address != persisted.address {
                return Err(ClientError::Session(
                    "session record address does not match its identity".to_string(),
                ));
            }
            return Ok(Session::signed_in(address, identity.into_value()));
        }

        if let Some(record) = self.read_key(SessionKey::PendingSignIn).await? {
            let pending: PendingSignIn = serde_json::from_str(&record)
                .map_err(|e| ClientError::Session(format!("unreadable pending sign-in: {e}")))?;
            self.publish(Session::pending());
            let identity = self.bridge.complete_sign_in(&pending).await?;
            return self.persist(identity).await;
        }

        Ok(Session::signed_out())
    }

    /// Persist the credential and drop the pending key.
    async fn persist(&self, identity: IdentitySnapshot) -> Result<Session, ClientError> {
        let address = self.signed_in_address(&identity)?;

        let record = PersistedSession {
            version: SESSION_RECORD_VERSION,
            address: address.clone(),
            identity: identity.into_value(),
            signed_in_at: Utc::now(),
        };
        let encoded = serde_json::to_string(&record)
            .map_err(|e| ClientError::Unknown(format!("failed to encode session: {e}")))?;
        self.store
            .write(SessionKey::Session, &encoded)
            .await
            .map_err(|e| classify(RawFailure::Storage(e)))?;
        if let Err(e) = self.store.clear(SessionKey::PendingSignIn).await {
            warn!(key = SessionKey::PendingSignIn.as_str(), error = %e, "Failed to clear session key");
        }

        Ok(Session::signed_in(address, record.identity))
    }

    /// The identity's address for this network, validated as c32check.
    fn signed_in_address(&self, identity: &IdentitySnapshot) -> Result<String, ClientError> {
        let raw = identity.stx_address(self.network).ok_or_else(|| {
            ClientError::Session(format!("identity has no {} address", self.network))
        })?;
        let address: StacksAddress = raw
            .parse()
            .map_err(|e| ClientError::Session(format!("identity address {raw:?}: {e}")))?;
        if !self.network.address_versions().contains(&address.version) {
            return Err(ClientError::Session(format!(
                "identity address {raw:?} is not a {} address",
                self.network
            )));
        }
        Ok(address.to_string())
    }

    async fn read_key(&self, key: SessionKey) -> Result<Option<String>, ClientError> {
        self.store
            .read(key)
            .await
            .map_err(|e| classify(RawFailure::Storage(e)))
    }

    /// Clear every key independently; failures are logged, never returned.
    async fn clear_persisted(&self) {
        for key in SessionKey::ALL {
            if let Err(e) = self.store.clear(key).await {
                warn!(key = key.as_str(), error = %e, "Failed to clear session key");
            }
        }
    }

    fn publish(&self, session: Session) {
        info!(status = ?session.status, address = ?session.address, "Session transition");
        self.state.send_replace(session);
    }
}

/// Wallet and transport problems keep their kind; anything else that breaks
/// the handshake is reported as a session failure.
fn surface_sign_in_error(err: ClientError) -> ClientError {
    match err {
        ClientError::Session(_)
        | ClientError::WalletUnavailable(_)
        | ClientError::Network(_)
        | ClientError::ConcurrentCall
        | ClientError::Validation { .. } => err,
        other => ClientError::Session(format!("sign-in handshake failed: {other}")),
    }
}
