// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only contract lookups.
//!
//! Queries never touch the session and need no sign-in. Failures are
//! classified and returned as-is; retrying is up to the caller, which is
//! safe because every query here is idempotent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::classify::{classify, Boundary, ClientError, RawFailure};

use super::clarity::ClarityValue;
use super::types::{ContractReference, NetworkSelector, QueryResult, TypedArgument, ARTIST_REGISTRY};

/// `get-total-artists` on the registry.
pub const FN_GET_TOTAL_ARTISTS: &str = "get-total-artists";
/// `get-song-ipfs-cid (song-id uint)` on the registry.
pub const FN_GET_SONG_IPFS_CID: &str = "get-song-ipfs-cid";
/// `get-artist-tips (artist-id uint)` on the registry.
pub const FN_GET_ARTIST_TIPS: &str = "get-artist-tips";

/// A read-only call as sent to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyRequest {
    pub network: NetworkSelector,
    pub contract: ContractReference,
    pub function_name: String,
    /// Hex-serialized Clarity arguments.
    pub arguments: Vec<String>,
    pub sender: String,
}

/// Ledger read-only RPC.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Execute the call and return the hex-serialized Clarity result.
    async fn call_read_only(&self, request: &ReadOnlyRequest) -> Result<String, RawFailure>;
}

#[derive(Serialize)]
struct CallReadBody<'a> {
    sender: &'a str,
    arguments: &'a [String],
}

#[derive(Deserialize)]
struct CallReadResponse {
    okay: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

/// Stacks node `POST /v2/contracts/call-read/{address}/{name}/{function}`.
#[derive(Debug, Clone)]
pub struct HiroRpc {
    base_url: url::Url,
    http: reqwest::Client,
}

impl HiroRpc {
    pub fn new(base_url: url::Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ClientError::Unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, request: &ReadOnlyRequest) -> Result<url::Url, RawFailure> {
        let path = format!(
            "v2/contracts/call-read/{}/{}/{}",
            request.contract.address, request.contract.name, request.function_name
        );
        self.base_url
            .join(&path)
            .map_err(|e| RawFailure::Other(format!("invalid read-only URL: {e}")))
    }
}

#[async_trait]
impl LedgerRpc for HiroRpc {
    async fn call_read_only(&self, request: &ReadOnlyRequest) -> Result<String, RawFailure> {
        let url = self.endpoint(request)?;
        let response = self
            .http
            .post(url)
            .json(&CallReadBody {
                sender: &request.sender,
                arguments: &request.arguments,
            })
            .send()
            .await
            .map_err(|source| RawFailure::Http {
                boundary: Boundary::Ledger,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RawFailure::Status {
                boundary: Boundary::Ledger,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CallReadResponse = response.json().await.map_err(|source| RawFailure::Http {
            boundary: Boundary::Ledger,
            source,
        })?;

        if !parsed.okay {
            return Err(RawFailure::Rejected {
                boundary: Boundary::Ledger,
                message: parsed
                    .cause
                    .unwrap_or_else(|| "read-only call failed".to_string()),
            });
        }

        parsed.result.ok_or_else(|| RawFailure::Decode {
            boundary: Boundary::Ledger,
            message: "response is missing `result`".to_string(),
        })
    }
}

/// Executes read-only lookups and normalizes their values.
#[derive(Clone)]
pub struct ReadOnlyQueryClient {
    rpc: Arc<dyn LedgerRpc>,
    network: NetworkSelector,
    registry: ContractReference,
    sender: String,
}

impl ReadOnlyQueryClient {
    /// The caller address defaults to the registry deployer.
    pub fn new(rpc: Arc<dyn LedgerRpc>, network: NetworkSelector) -> Self {
        Self {
            rpc,
            network,
            registry: ARTIST_REGISTRY,
            sender: ARTIST_REGISTRY.address.to_string(),
        }
    }

    /// Run lookups as `sender` instead of the registry deployer.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Also resets the caller address to the new registry's deployer.
    pub fn with_registry(mut self, registry: ContractReference) -> Self {
        self.registry = registry;
        self.sender = registry.address.to_string();
        self
    }

    /// Call `function_name` on `contract` and normalize the result.
    pub async fn query(
        &self,
        contract: &ContractReference,
        function_name: &str,
        args: &[TypedArgument],
    ) -> Result<QueryResult, ClientError> {
        let request = ReadOnlyRequest {
            network: self.network,
            contract: *contract,
            function_name: function_name.to_string(),
            arguments: args.iter().map(TypedArgument::to_hex).collect(),
            sender: self.sender.clone(),
        };

        let raw = self.rpc.call_read_only(&request).await.map_err(|e| {
            let err = classify(e);
            tracing::debug!(contract = %contract, function = function_name, error = %err, "Read-only call failed");
            err
        })?;

        let value = ClarityValue::from_hex(&raw).map_err(|e| {
            classify(RawFailure::Decode {
                boundary: Boundary::Ledger,
                message: format!("{function_name}: {e}"),
            })
        })?;

        value.normalize().map_err(|err_value| {
            ClientError::Protocol(format!(
                "{contract}::{function_name} returned an error response: {}",
                serde_json::to_string(&err_value).unwrap_or_else(|_| format!("{err_value:?}"))
            ))
        })
    }

    /// Number of registered artists.
    pub async fn total_artists(&self) -> Result<u128, ClientError> {
        let value = self.query(&self.registry, FN_GET_TOTAL_ARTISTS, &[]).await?;
        value.as_u128().ok_or_else(|| {
            ClientError::Protocol(format!(
                "{FN_GET_TOTAL_ARTISTS} returned a non-numeric value"
            ))
        })
    }

    /// IPFS CID of a song, `None` if the song is unknown.
    pub async fn song_ipfs_cid(&self, song_id: u128) -> Result<Option<String>, ClientError> {
        let value = self
            .query(&self.registry, FN_GET_SONG_IPFS_CID, &[TypedArgument::UInt(song_id)])
            .await?;
        match value {
            QueryResult::Null => Ok(None),
            QueryResult::Text(cid) => Ok(Some(cid)),
            _ => Err(ClientError::Protocol(format!(
                "{FN_GET_SONG_IPFS_CID} returned a non-text value"
            ))),
        }
    }

    /// Tip total for an artist, as returned by the registry.
    pub async fn artist_tips(&self, artist_id: u128) -> Result<QueryResult, ClientError> {
        self.query(&self.registry, FN_GET_ARTIST_TIPS, &[TypedArgument::UInt(artist_id)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned RPC returning fixed responses and recording requests.
    struct FakeRpc {
        response: Box<dyn Fn() -> Result<String, RawFailure> + Send + Sync>,
        calls: AtomicUsize,
        last: Mutex<Option<ReadOnlyRequest>>,
    }

    impl FakeRpc {
        fn returning(hex: &'static str) -> Arc<Self> {
            Arc::new(Self {
                response: Box::new(move || Ok(hex.to_string())),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn failing(make: fn() -> RawFailure) -> Arc<Self> {
            Arc::new(Self {
                response: Box::new(move || Err(make())),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LedgerRpc for FakeRpc {
        async fn call_read_only(&self, request: &ReadOnlyRequest) -> Result<String, RawFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            (self.response)()
        }
    }

    fn client(rpc: Arc<FakeRpc>) -> ReadOnlyQueryClient {
        ReadOnlyQueryClient::new(rpc, NetworkSelector::Testnet)
    }

    #[tokio::test]
    async fn total_artists_is_a_plain_number() {
        let rpc = FakeRpc::returning("0x010000000000000000000000000000002a");
        let total = client(rpc.clone()).total_artists().await.unwrap();
        assert_eq!(total, 42);

        let request = rpc.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.function_name, "get-total-artists");
        assert!(request.arguments.is_empty());
        assert_eq!(request.sender, ARTIST_REGISTRY.address);
        assert_eq!(request.contract, ARTIST_REGISTRY);
    }

    #[tokio::test]
    async fn repeated_queries_are_value_equal() {
        let rpc = FakeRpc::returning("0x07010000000000000000000000000000002a");
        let client = client(rpc.clone());

        let first = client.query(&ARTIST_REGISTRY, "get-artist-tips", &[TypedArgument::UInt(1)]).await.unwrap();
        let second = client.query(&ARTIST_REGISTRY, "get-artist-tips", &[TypedArgument::UInt(1)]).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(rpc.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn arguments_are_hex_serialized() {
        let rpc = FakeRpc::returning("0x09");
        let cid = client(rpc.clone()).song_ipfs_cid(7).await.unwrap();
        assert_eq!(cid, None);

        let request = rpc.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.function_name, "get-song-ipfs-cid");
        assert_eq!(
            request.arguments,
            vec!["0x0100000000000000000000000000000007".to_string()]
        );
    }

    #[tokio::test]
    async fn song_cid_unwraps_optional_text() {
        let rpc = FakeRpc::returning("0x0a0d0000000462616679");
        let cid = client(rpc).song_ipfs_cid(1).await.unwrap();
        assert_eq!(cid.as_deref(), Some("bafy"));
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let rpc = FakeRpc::failing(|| RawFailure::Status {
            boundary: Boundary::Ledger,
            status: 503,
            body: "down".to_string(),
        });
        let err = client(rpc).total_artists().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn rejected_call_is_protocol_error() {
        let rpc = FakeRpc::failing(|| RawFailure::Rejected {
            boundary: Boundary::Ledger,
            message: "NoSuchPublicFunction".to_string(),
        });
        let err = client(rpc).total_artists().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("NoSuchPublicFunction"));
    }

    #[tokio::test]
    async fn garbage_result_is_protocol_error() {
        let rpc = FakeRpc::returning("0xnot-hex");
        let err = client(rpc).total_artists().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn unexpected_shape_is_protocol_error() {
        // (some "bafy") where a number was expected
        let rpc = FakeRpc::returning("0x0a0d0000000462616679");
        let err = client(rpc).total_artists().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn err_response_is_protocol_error() {
        let rpc = FakeRpc::returning("0x080100000000000000000000000000000194");
        let err = client(rpc)
            .query(&ARTIST_REGISTRY, "get-artist-tips", &[TypedArgument::UInt(9)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn endpoint_joins_contract_path() {
        let rpc = HiroRpc::new("https://api.testnet.hiro.so/".parse().unwrap()).unwrap();
        let request = ReadOnlyRequest {
            network: NetworkSelector::Testnet,
            contract: ARTIST_REGISTRY,
            function_name: "get-total-artists".to_string(),
            arguments: vec![],
            sender: ARTIST_REGISTRY.address.to_string(),
        };
        assert_eq!(
            rpc.endpoint(&request).unwrap().as_str(),
            "https://api.testnet.hiro.so/v2/contracts/call-read/ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ/artist-registry/get-total-artists"
        );
    }
}
