// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract-call construction from raw UI input.
//!
//! Every action validates its fields and either returns a complete
//! [`CallDescriptor`] or a [`ClientError::Validation`] naming the first bad
//! field. Values are never clamped, rounded or defaulted.

use crate::classify::ClientError;

use super::types::{
    CallDescriptor, ContractReference, NetworkSelector, TypedArgument, ARTIST_REGISTRY,
    MARKETPLACE, STACKS_TESTNET,
};

/// `tip-artist (artist-id uint) (amount uint)` on the registry.
pub const FN_TIP_ARTIST: &str = "tip-artist";
/// `mint-nft (collection-id uint)` on the marketplace.
pub const FN_MINT_NFT: &str = "mint-nft";
/// `list-nft (collection-id uint) (token-id uint) (price uint)` on the marketplace.
pub const FN_LIST_NFT: &str = "list-nft";
/// `buy-nft (collection-id uint) (token-id uint)` on the marketplace.
pub const FN_BUY_NFT: &str = "buy-nft";

/// Builds call descriptors for the fixed set of Audioblocks actions.
#[derive(Debug, Clone)]
pub struct ContractCallBuilder {
    network: NetworkSelector,
    registry: ContractReference,
    marketplace: ContractReference,
    min_tip: Option<u128>,
}

impl Default for ContractCallBuilder {
    fn default() -> Self {
        Self::new(STACKS_TESTNET.selector, ARTIST_REGISTRY, MARKETPLACE)
    }
}

impl ContractCallBuilder {
    pub fn new(
        network: NetworkSelector,
        registry: ContractReference,
        marketplace: ContractReference,
    ) -> Self {
        Self {
            network,
            registry,
            marketplace,
            min_tip: None,
        }
    }

    /// Enforce a minimum tip (micro-STX). `None` enforces nothing.
    pub fn with_min_tip(mut self, floor: Option<u128>) -> Self {
        self.min_tip = floor;
        self
    }

    /// Tip an artist. Args: `[artist_id, amount]`.
    pub fn tip(&self, artist_id: &str, amount: &str) -> Result<CallDescriptor, ClientError> {
        let artist_id = parse_identifier("artist_id", artist_id)?;
        let amount = parse_amount("amount", amount)?;
        if let Some(floor) = self.min_tip {
            if amount < floor {
                return Err(ClientError::validation(
                    "amount",
                    format!("must be at least {floor} micro-STX"),
                ));
            }
        }

        Ok(CallDescriptor::new(
            self.network,
            self.registry,
            FN_TIP_ARTIST,
            vec![TypedArgument::UInt(artist_id), TypedArgument::UInt(amount)],
        ))
    }

    /// Mint from a collection. Args: `[collection_id]`.
    pub fn mint(&self, collection_id: &str) -> Result<CallDescriptor, ClientError> {
        let collection_id = parse_identifier("collection_id", collection_id)?;

        Ok(CallDescriptor::new(
            self.network,
            self.marketplace,
            FN_MINT_NFT,
            vec![TypedArgument::UInt(collection_id)],
        ))
    }

    /// List a token for sale. Args: `[collection_id, token_id, price]`.
    pub fn list(
        &self,
        collection_id: &str,
        token_id: &str,
        price: &str,
    ) -> Result<CallDescriptor, ClientError> {
        let collection_id = parse_identifier("collection_id", collection_id)?;
        let token_id = parse_identifier("token_id", token_id)?;
        let price = parse_amount("price", price)?;

        Ok(CallDescriptor::new(
            self.network,
            self.marketplace,
            FN_LIST_NFT,
            vec![
                TypedArgument::UInt(collection_id),
                TypedArgument::UInt(token_id),
                TypedArgument::UInt(price),
            ],
        ))
    }

    /// Buy a listed token. Args: `[collection_id, token_id]`.
    pub fn buy(&self, collection_id: &str, token_id: &str) -> Result<CallDescriptor, ClientError> {
        let collection_id = parse_identifier("collection_id", collection_id)?;
        let token_id = parse_identifier("token_id", token_id)?;

        Ok(CallDescriptor::new(
            self.network,
            self.marketplace,
            FN_BUY_NFT,
            vec![
                TypedArgument::UInt(collection_id),
                TypedArgument::UInt(token_id),
            ],
        ))
    }
}

/// Parse a non-negative whole number that fits in a Clarity `uint`.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<u128, ClientError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ClientError::validation(field, "is required"));
    }
    if value.starts_with('-') {
        return Err(ClientError::validation(field, "must not be negative"));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::validation(
            field,
            format!("must be a whole number, got {value:?}"),
        ));
    }
    value
        .parse::<u128>()
        .map_err(|_| ClientError::validation(field, "exceeds the uint range"))
}

/// Parse a positive whole-number identifier.
pub fn parse_identifier(field: &'static str, raw: &str) -> Result<u128, ClientError> {
    let value = parse_amount(field, raw)?;
    if value == 0 {
        return Err(ClientError::validation(field, "must be positive"));
    }
    Ok(value)
}
