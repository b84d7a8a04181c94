// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks network, contract and call types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use super::clarity;

/// Which Stacks network a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NetworkSelector {
    Testnet,
    Mainnet,
}

impl NetworkSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkSelector::Testnet => "testnet",
            NetworkSelector::Mainnet => "mainnet",
        }
    }

    /// c32 address versions (single-sig, multi-sig) valid on this network.
    pub fn address_versions(&self) -> [u8; 2] {
        match self {
            NetworkSelector::Testnet => [26, 21],
            NetworkSelector::Mainnet => [22, 20],
        }
    }
}

impl fmt::Display for NetworkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stacks network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Selector carried on every call descriptor
    pub selector: NetworkSelector,
    /// Stacks node / API base URL
    pub api_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

impl NetworkConfig {
    /// Explorer link for a broadcast transaction.
    pub fn explorer_tx_url(&self, tx_id: &str) -> String {
        format!(
            "{}/txid/{}?chain={}",
            self.explorer_url,
            tx_id,
            self.selector.as_str()
        )
    }
}

/// Stacks testnet configuration.
pub const STACKS_TESTNET: NetworkConfig = NetworkConfig {
    name: "Stacks Testnet",
    selector: NetworkSelector::Testnet,
    api_url: "https://stacks-node-api.testnet.stacks.co",
    explorer_url: "https://explorer.hiro.so",
};

/// Supported network identifier for this build.
pub const NETWORK_TESTNET: &str = "testnet";

/// Validate network input for the testnet-only runtime.
pub fn ensure_testnet_network(raw: Option<&str>) -> Result<NetworkSelector, String> {
    let value = raw.unwrap_or(NETWORK_TESTNET).trim().to_ascii_lowercase();
    if value == NETWORK_TESTNET {
        Ok(NetworkSelector::Testnet)
    } else {
        Err(format!(
            "Only `{NETWORK_TESTNET}` network is supported in this deployment."
        ))
    }
}

/// A deployed Clarity contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContractReference {
    /// Deployer address (c32check)
    pub address: &'static str,
    /// Contract name
    pub name: &'static str,
}

impl fmt::Display for ContractReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

/// Artist registry: artist records, tips and song metadata.
pub const ARTIST_REGISTRY: ContractReference = ContractReference {
    address: "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ",
    name: "artist-registry",
};

/// NFT marketplace: minting, listing and buying.
pub const MARKETPLACE: ContractReference = ContractReference {
    address: "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ",
    name: "audioblocks-marketplace",
};

/// Micro-STX per STX.
pub const MICRO_STX_PER_STX: u128 = 1_000_000;

/// Format a micro-STX amount as STX, trimming trailing zeros.
pub fn format_micro_stx(amount: u128) -> String {
    let whole = amount / MICRO_STX_PER_STX;
    let remainder = amount % MICRO_STX_PER_STX;
    if remainder == 0 {
        return whole.to_string();
    }
    let decimal_str = format!("{remainder:06}");
    format!("{}.{}", whole, decimal_str.trim_end_matches('0'))
}

/// Where the transaction may be anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    #[default]
    Any,
}

/// A typed contract-call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArgument {
    UInt(u128),
}

impl TypedArgument {
    /// Clarity consensus serialization, `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        match self {
            TypedArgument::UInt(value) => clarity::encode_uint_hex(*value),
        }
    }
}

impl Serialize for TypedArgument {
    /// `{"kind":"uint","value":"500000"}`; the value is a string so no JSON
    /// consumer rounds it through a float.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("TypedArgument", 2)?;
        match self {
            TypedArgument::UInt(value) => {
                state.serialize_field("kind", "uint")?;
                state.serialize_field("value", &value.to_string())?;
            }
        }
        state.end()
    }
}

/// A fully validated contract call, ready for the signer.
///
/// Only [`super::ContractCallBuilder`] constructs these; there are no
/// setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    network: NetworkSelector,
    contract: ContractReference,
    function_name: &'static str,
    args: Vec<TypedArgument>,
    anchor_mode: AnchorMode,
}

impl CallDescriptor {
    pub(crate) fn new(
        network: NetworkSelector,
        contract: ContractReference,
        function_name: &'static str,
        args: Vec<TypedArgument>,
    ) -> Self {
        Self {
            network,
            contract,
            function_name,
            args,
            anchor_mode: AnchorMode::Any,
        }
    }

    pub fn network(&self) -> NetworkSelector {
        self.network
    }

    pub fn contract(&self) -> &ContractReference {
        &self.contract
    }

    pub fn function_name(&self) -> &str {
        self.function_name
    }

    pub fn args(&self) -> &[TypedArgument] {
        &self.args
    }

    pub fn anchor_mode(&self) -> AnchorMode {
        self.anchor_mode
    }
}

/// Plain value returned by a read-only lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Null,
    Bool(bool),
    Int(i128),
    UInt(u128),
    Text(String),
    List(Vec<QueryResult>),
    Map(BTreeMap<String, QueryResult>),
}

impl QueryResult {
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            QueryResult::UInt(value) => Some(*value),
            QueryResult::Int(value) => u128::try_from(*value).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_testnet_network_accepts_default_and_testnet() {
        assert_eq!(ensure_testnet_network(None), Ok(NetworkSelector::Testnet));
        assert_eq!(
            ensure_testnet_network(Some(" TestNet ")),
            Ok(NetworkSelector::Testnet)
        );
        assert!(ensure_testnet_network(Some("mainnet")).is_err());
    }

    #[test]
    fn contract_reference_displays_as_contract_id() {
        assert_eq!(
            ARTIST_REGISTRY.to_string(),
            "ST3HZSQ3EVYVFAX6KR3077S69FNZHB0XWMQ2WWTNJ.artist-registry"
        );
    }

    #[test]
    fn explorer_url_includes_chain() {
        assert_eq!(
            STACKS_TESTNET.explorer_tx_url("0xabc"),
            "https://explorer.hiro.so/txid/0xabc?chain=testnet"
        );
    }

    #[test]
    fn test_format_micro_stx() {
        assert_eq!(format_micro_stx(0), "0");
        assert_eq!(format_micro_stx(1_000_000), "1");
        assert_eq!(format_micro_stx(500_000), "0.5");
        assert_eq!(format_micro_stx(1_234_567), "1.234567");
        assert_eq!(format_micro_stx(1_000_010), "1.00001");
    }

    #[test]
    fn typed_argument_serializes_value_as_string() {
        let json = serde_json::to_value(TypedArgument::UInt(u128::MAX)).unwrap();
        assert_eq!(json["kind"], "uint");
        assert_eq!(json["value"], u128::MAX.to_string());
    }

    #[test]
    fn query_result_serializes_plainly() {
        let mut fields = BTreeMap::new();
        fields.insert("tips".to_string(), QueryResult::UInt(42));
        fields.insert("cid".to_string(), QueryResult::Text("bafy".to_string()));
        let json = serde_json::to_value(QueryResult::Map(fields)).unwrap();
        assert_eq!(json, serde_json::json!({"cid": "bafy", "tips": 42}));
    }
}
