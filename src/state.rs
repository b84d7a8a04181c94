// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::session::SessionManager;
use crate::stacks::{ContractCallBuilder, ReadOnlyQueryClient};
use crate::storage::FileStorage;
use crate::wallet::WalletBridge;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub wallet: Arc<WalletBridge>,
    pub queries: ReadOnlyQueryClient,
    pub calls: ContractCallBuilder,
    /// Backing storage of the session store, probed by `/health`.
    pub storage: Option<FileStorage>,
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionManager>,
        wallet: Arc<WalletBridge>,
        queries: ReadOnlyQueryClient,
        calls: ContractCallBuilder,
    ) -> Self {
        Self {
            sessions,
            wallet,
            queries,
            calls,
            storage: None,
        }
    }

    pub fn with_storage(mut self, storage: FileStorage) -> Self {
        self.storage = Some(storage);
        self
    }
}
