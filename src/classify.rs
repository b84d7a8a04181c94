// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy and the single raw-failure classification table.
//!
//! Every component boundary (ledger RPC, signer, session storage) reports its
//! failures as a [`RawFailure`] and converts it with [`classify`]. Nothing
//! else in the crate decides which [`ErrorKind`] a failure belongs to.

use serde::Serialize;
use utoipa::ToSchema;

use crate::storage::StorageError;

/// Closed set of failure kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range caller input. Never retried.
    Validation,
    /// Handshake or persisted-state failure. Forces a session reset.
    Session,
    /// Remote transport failure.
    Network,
    /// Unexpected or unparseable remote response.
    Protocol,
    /// Signing capability missing or unreachable.
    WalletUnavailable,
    /// A call was submitted while another one is outstanding.
    ConcurrentCall,
    /// The user dismissed the wallet dialog. Not a failure.
    UserCancelled,
    /// Anything not recognized above.
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Session => "session_error",
            ErrorKind::Network => "network_error",
            ErrorKind::Protocol => "protocol_error",
            ErrorKind::WalletUnavailable => "wallet_unavailable",
            ErrorKind::ConcurrentCall => "concurrent_call_error",
            ErrorKind::UserCancelled => "user_cancelled",
            ErrorKind::Unknown => "unknown_error",
        }
    }

    /// Whether a caller may blindly retry. Only meaningful for idempotent
    /// read-only queries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Protocol)
    }
}

/// Classified error returned by every public operation of the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("invalid `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("session error: {0}")]
    Session(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("a contract call is already awaiting approval")]
    ConcurrentCall,

    #[error("cancelled by user")]
    UserCancelled,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ClientError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ClientError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Session(_) => ErrorKind::Session,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Protocol(_) => ErrorKind::Protocol,
            ClientError::WalletUnavailable(_) => ErrorKind::WalletUnavailable,
            ClientError::ConcurrentCall => ErrorKind::ConcurrentCall,
            ClientError::UserCancelled => ErrorKind::UserCancelled,
            ClientError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Name of the offending input field for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ClientError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Which external collaborator produced a raw failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Ledger read-only RPC.
    Ledger,
    /// External signing provider.
    Signer,
    /// Persisted session storage.
    Storage,
}

/// Failure as reported by a collaborator, before classification.
#[derive(Debug)]
pub enum RawFailure {
    /// Transport-level HTTP failure.
    Http {
        boundary: Boundary,
        source: reqwest::Error,
    },
    /// Non-success HTTP status.
    Status {
        boundary: Boundary,
        status: u16,
        body: String,
    },
    /// Response body could not be decoded into the expected shape.
    Decode { boundary: Boundary, message: String },
    /// Remote reported a failure in its own payload (e.g. `okay: false`).
    Rejected { boundary: Boundary, message: String },
    /// Persisted session storage failure.
    Storage(StorageError),
    /// Signer reported an error code.
    Signer { code: String, message: String },
    /// Anything else, message preserved verbatim.
    Other(String),
}

/// Signer codes meaning the user dismissed the approval dialog.
const CANCEL_CODES: &[&str] = &["user_cancelled", "user_rejected", "cancelled", "canceled"];

/// Signer codes meaning the capability is not installed or not reachable.
const UNAVAILABLE_CODES: &[&str] = &["wallet_not_found", "not_installed", "unavailable"];

/// Signer codes meaning an approval dialog is already open.
const BUSY_CODES: &[&str] = &["request_pending", "busy"];

/// Map a raw failure onto exactly one [`ErrorKind`].
pub fn classify(raw: RawFailure) -> ClientError {
    match raw {
        RawFailure::Http { boundary, source } => {
            let message = source.to_string();
            match boundary {
                Boundary::Signer if source.is_connect() => ClientError::WalletUnavailable(message),
                Boundary::Ledger | Boundary::Signer if source.is_decode() => {
                    ClientError::Protocol(message)
                }
                Boundary::Ledger | Boundary::Signer => ClientError::Network(message),
                Boundary::Storage => ClientError::Session(message),
            }
        }
        RawFailure::Status {
            boundary,
            status,
            body,
        } => {
            let message = format!("HTTP {status}: {body}");
            match (boundary, status) {
                (Boundary::Signer, 409) => ClientError::ConcurrentCall,
                (Boundary::Signer, 404 | 502 | 503) => ClientError::WalletUnavailable(message),
                (Boundary::Signer, 401 | 403) => ClientError::Session(message),
                (Boundary::Ledger | Boundary::Signer, 408 | 429) => ClientError::Network(message),
                (Boundary::Ledger | Boundary::Signer, 500..=599) => ClientError::Network(message),
                (Boundary::Ledger | Boundary::Signer, 400..=499) => ClientError::Protocol(message),
                (Boundary::Storage, _) => ClientError::Session(message),
                _ => ClientError::Unknown(message),
            }
        }
        RawFailure::Decode { boundary, message } => match boundary {
            Boundary::Storage => ClientError::Session(message),
            Boundary::Ledger | Boundary::Signer => ClientError::Protocol(message),
        },
        RawFailure::Rejected { boundary, message } => match boundary {
            Boundary::Ledger => ClientError::Protocol(message),
            Boundary::Signer | Boundary::Storage => ClientError::Session(message),
        },
        RawFailure::Storage(e) => ClientError::Session(e.to_string()),
        RawFailure::Signer { code, message } => {
            let normalized = code.trim().to_ascii_lowercase();
            if CANCEL_CODES.contains(&normalized.as_str()) {
                ClientError::UserCancelled
            } else if UNAVAILABLE_CODES.contains(&normalized.as_str()) {
                ClientError::WalletUnavailable(message)
            } else if BUSY_CODES.contains(&normalized.as_str()) {
                ClientError::ConcurrentCall
            } else if normalized == "invalid_session" || normalized == "auth_rejected" {
                ClientError::Session(message)
            } else {
                ClientError::Unknown(format!("{code}: {message}"))
            }
        }
        RawFailure::Other(message) => ClientError::Unknown(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_codes_map_to_expected_kinds() {
        let cases = [
            ("user_rejected", ErrorKind::UserCancelled),
            ("Cancelled", ErrorKind::UserCancelled),
            ("wallet_not_found", ErrorKind::WalletUnavailable),
            ("request_pending", ErrorKind::ConcurrentCall),
            ("invalid_session", ErrorKind::Session),
            ("something_new", ErrorKind::Unknown),
        ];
        for (code, expected) in cases {
            let err = classify(RawFailure::Signer {
                code: code.to_string(),
                message: "m".to_string(),
            });
            assert_eq!(err.kind(), expected, "code {code}");
        }
    }

    #[test]
    fn ledger_statuses_split_between_network_and_protocol() {
        let status = |status| {
            classify(RawFailure::Status {
                boundary: Boundary::Ledger,
                status,
                body: String::new(),
            })
            .kind()
        };
        assert_eq!(status(503), ErrorKind::Network);
        assert_eq!(status(429), ErrorKind::Network);
        assert_eq!(status(400), ErrorKind::Protocol);
        assert_eq!(status(404), ErrorKind::Protocol);
    }

    #[test]
    fn signer_statuses_map_to_wallet_kinds() {
        let status = |status| {
            classify(RawFailure::Status {
                boundary: Boundary::Signer,
                status,
                body: "busy".to_string(),
            })
        };
        assert_eq!(status(409), ClientError::ConcurrentCall);
        assert_eq!(status(503).kind(), ErrorKind::WalletUnavailable);
        assert_eq!(status(401).kind(), ErrorKind::Session);
    }

    /// Transport error from a real request against `addr`.
    async fn transport_error(addr: std::net::SocketAddr) -> reqwest::Error {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap()
            .post(format!("http://{addr}/contract-call"))
            .send()
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn unresponsive_signer_is_network_not_unavailable() {
        // Accepts the connection and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _held = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
            drop(socket);
        });

        let source = transport_error(addr).await;
        assert!(source.is_timeout());
        let err = classify(RawFailure::Http {
            boundary: Boundary::Signer,
            source,
        });
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn unreachable_signer_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = transport_error(addr).await;
        assert!(source.is_connect());
        let err = classify(RawFailure::Http {
            boundary: Boundary::Signer,
            source,
        });
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
    }

    #[test]
    fn decode_failures_depend_on_boundary() {
        let ledger = classify(RawFailure::Decode {
            boundary: Boundary::Ledger,
            message: "bad hex".to_string(),
        });
        assert_eq!(ledger.kind(), ErrorKind::Protocol);

        let storage = classify(RawFailure::Decode {
            boundary: Boundary::Storage,
            message: "bad json".to_string(),
        });
        assert_eq!(storage.kind(), ErrorKind::Session);
    }

    #[test]
    fn unknown_preserves_original_message() {
        let err = classify(RawFailure::Other("socket exploded".to_string()));
        assert_eq!(err, ClientError::Unknown("socket exploded".to_string()));
        assert!(err.to_string().contains("socket exploded"));
    }

    #[test]
    fn validation_error_names_field() {
        let err = ClientError::validation("artist_id", "must be positive");
        assert_eq!(err.field(), Some("artist_id"));
        assert_eq!(err.kind().code(), "validation_error");
        assert_eq!(err.to_string(), "invalid `artist_id`: must be positive");
    }

    #[test]
    fn only_transport_kinds_are_retryable() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::Protocol.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::ConcurrentCall.is_retryable());
    }
}
