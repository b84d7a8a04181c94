// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet integration: the signing capability and the bridge that drives it.

pub mod bridge;
pub mod provider;

pub use bridge::{BroadcastOutcome, CallOutcome, WalletBridge};
pub use provider::{
    AppMetadata, ConnectOutcome, HttpSigner, IdentitySnapshot, PendingSignIn, SigningProvider,
    SubmitOutcome,
};
