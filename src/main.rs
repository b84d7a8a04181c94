// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use audioblocks_client::api::router;
use audioblocks_client::config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV};
use audioblocks_client::session::SessionManager;
use audioblocks_client::stacks::{ContractCallBuilder, HiroRpc, ReadOnlyQueryClient};
use audioblocks_client::state::AppState;
use audioblocks_client::storage::{FileSessionStore, FileStorage, SessionStore, StoragePaths};
use audioblocks_client::wallet::{HttpSigner, SigningProvider, WalletBridge};

fn init_tracing() {
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    // Persisted session storage
    let mut storage = FileStorage::new(StoragePaths::new(&config.data_dir));
    storage
        .initialize()
        .expect("Failed to initialize session storage");
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(storage.clone()));

    // Signer is optional; without one every wallet operation reports
    // WalletUnavailable.
    let signer = config.signer_url.as_ref().map(|url| {
        let signer = HttpSigner::new(url.as_str()).expect("Failed to build signer HTTP client");
        Arc::new(signer) as Arc<dyn SigningProvider>
    });
    if signer.is_none() {
        info!("SIGNER_URL not set; wallet actions are unavailable");
    }

    let selector = config.network.selector;
    let wallet = Arc::new(WalletBridge::new(signer, config.network.clone()));
    let sessions = Arc::new(SessionManager::new(
        store,
        wallet.clone(),
        selector,
        config.metadata.clone(),
    ));

    let session = sessions.initialize().await;
    info!(status = ?session.status, address = ?session.address, "Session restored");

    let ledger = HiroRpc::new(config.stacks_api_url.clone()).expect("Failed to build ledger client");
    let queries =
        ReadOnlyQueryClient::new(Arc::new(ledger), selector).with_registry(config.registry);
    let calls = ContractCallBuilder::new(selector, config.registry, config.marketplace)
        .with_min_tip(config.min_tip);

    let state = AppState::new(sessions, wallet, queries, calls).with_storage(storage);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    info!(
        addr = %config.bind_addr,
        network = config.network.name,
        api = %config.stacks_api_url,
        "Audioblocks client listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .expect("HTTP server failed");
}
