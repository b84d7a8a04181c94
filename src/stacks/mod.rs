// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks ledger integration for the Audioblocks contracts.
//!
//! This module provides functionality for:
//! - Building validated contract calls (tip, mint, list, buy)
//! - Read-only contract queries through a Stacks node
//! - Clarity value and c32check address encoding

pub mod builder;
pub mod c32;
pub mod clarity;
pub mod query;
pub mod types;

pub use builder::ContractCallBuilder;
pub use query::{HiroRpc, LedgerRpc, ReadOnlyQueryClient, ReadOnlyRequest};
pub use types::*;
