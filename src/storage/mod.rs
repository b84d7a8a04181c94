// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persisted Session Storage
//!
//! Small keyed store for the serialized session credential. The session
//! manager is the sole reader and writer.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   session/
//!     session.json          # Completed sign-in credential
//!     pending-sign-in.json  # Handshake response awaiting completion
//! ```
//!
//! Each key is an independent file so clearing one can fail without
//! affecting the others.

pub mod file_storage;
pub mod paths;
pub mod session_store;

pub use file_storage::{FileStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use session_store::{FileSessionStore, MemorySessionStore, SessionKey, SessionStore};
