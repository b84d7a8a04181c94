// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User session lifecycle.

pub mod manager;

pub use manager::{Session, SessionManager, SessionStatus};
