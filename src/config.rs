// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; an invalid value stops the process before it serves.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for persisted session state | `./data` |
//! | `HOST` | Server bind address | `127.0.0.1` |
//! | `PORT` | Server bind port | `8080` |
//! | `STACKS_API_URL` | Stacks node / API base URL | Stacks testnet API |
//! | `NETWORK` | Network selector (only `testnet`) | `testnet` |
//! | `SIGNER_URL` | External signer base URL | Unset (wallet unavailable) |
//! | `MIN_TIP_USTX` | Minimum tip in micro-STX | Unset (no floor) |
//! | `APP_NAME` | App name shown by the wallet | `Audioblocks DApp (Testnet)` |
//! | `APP_ICON_URL` | App icon shown by the wallet | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::stacks::c32::StacksAddress;
use crate::stacks::{
    ensure_testnet_network, ContractReference, NetworkConfig, ARTIST_REGISTRY, MARKETPLACE,
    STACKS_TESTNET,
};
use crate::storage::paths::DATA_ROOT;
use crate::wallet::AppMetadata;

/// Environment variable name for the session data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
/// Environment variable name for the bind host.
pub const HOST_ENV: &str = "HOST";
/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable name for the Stacks API base URL.
pub const STACKS_API_URL_ENV: &str = "STACKS_API_URL";
/// Environment variable name for the network selector.
pub const NETWORK_ENV: &str = "NETWORK";
/// Environment variable name for the signer base URL.
pub const SIGNER_URL_ENV: &str = "SIGNER_URL";
/// Environment variable name for the minimum tip.
pub const MIN_TIP_ENV: &str = "MIN_TIP_USTX";
/// Environment variable name for the wallet-facing app name.
pub const APP_NAME_ENV: &str = "APP_NAME";
/// Environment variable name for the wallet-facing app icon.
pub const APP_ICON_URL_ENV: &str = "APP_ICON_URL";
/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env_value(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Validated startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub network: NetworkConfig,
    pub stacks_api_url: url::Url,
    pub signer_url: Option<url::Url>,
    pub min_tip: Option<u128>,
    pub metadata: AppMetadata,
    pub registry: ContractReference,
    pub marketplace: ContractReference,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variables. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        ensure_testnet_network(get(NETWORK_ENV).as_deref())
            .map_err(|reason| ConfigError::invalid(NETWORK_ENV, reason))?;
        let network = STACKS_TESTNET;

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DATA_ROOT.to_string()));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, format!("{raw:?}: {e}")))?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, format!("{host:?}: {e}")))?;

        let stacks_api_url = parse_base_url(
            STACKS_API_URL_ENV,
            &get(STACKS_API_URL_ENV).unwrap_or_else(|| network.api_url.to_string()),
        )?;
        let signer_url = get(SIGNER_URL_ENV)
            .map(|raw| parse_base_url(SIGNER_URL_ENV, &raw))
            .transpose()?;

        let min_tip = get(MIN_TIP_ENV)
            .map(|raw| {
                raw.parse::<u128>()
                    .map_err(|e| ConfigError::invalid(MIN_TIP_ENV, format!("{raw:?}: {e}")))
            })
            .transpose()?;

        let defaults = AppMetadata::default();
        let metadata = AppMetadata {
            name: get(APP_NAME_ENV).unwrap_or(defaults.name),
            icon: get(APP_ICON_URL_ENV),
        };

        for contract in [ARTIST_REGISTRY, MARKETPLACE] {
            validate_contract(&network, &contract)?;
        }

        Ok(Self {
            data_dir,
            bind_addr,
            network,
            stacks_api_url,
            signer_url,
            min_tip,
            metadata,
            registry: ARTIST_REGISTRY,
            marketplace: MARKETPLACE,
        })
    }
}

/// Parse an http(s) base URL, normalized to end with `/` so joins append.
fn parse_base_url(name: &'static str, raw: &str) -> Result<url::Url, ConfigError> {
    let mut parsed =
        url::Url::parse(raw).map_err(|e| ConfigError::invalid(name, format!("{raw:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(name, "must be an http(s) URL"));
    }
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

fn validate_contract(
    network: &NetworkConfig,
    contract: &ContractReference,
) -> Result<(), ConfigError> {
    let address: StacksAddress = contract
        .address
        .parse()
        .map_err(|e| ConfigError::invalid("contract", format!("{contract}: {e}")))?;
    if !network.selector.address_versions().contains(&address.version) {
        return Err(ConfigError::invalid(
            "contract",
            format!("{contract} is not a {} address", network.selector),
        ));
    }
    Ok(())
}
