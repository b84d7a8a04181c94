// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audioblocks Client - Stacks session and contract-call mediation
//!
//! This crate sits between the Audioblocks UI and the Stacks testnet. It owns
//! the wallet session state machine, turns raw UI input into typed contract
//! calls, and runs read-only registry lookups.
//!
//! ## Modules
//!
//! - `api` - Local HTTP API handlers (Axum)
//! - `classify` - Error taxonomy and raw-failure classification
//! - `session` - Session state machine
//! - `stacks` - Contract calls, read-only queries, Clarity and c32 codecs
//! - `storage` - Persisted session storage
//! - `wallet` - Signing provider and wallet bridge

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod stacks;
pub mod state;
pub mod storage;
pub mod wallet;
