// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the persisted session layout.

use std::path::{Path, PathBuf};

/// Default base directory for persisted client state.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the session store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Session Paths ==========

    /// Directory holding one file per session key.
    pub fn session_dir(&self) -> PathBuf {
        self.root.join("session")
    }

    /// Path of the file backing a single session key.
    pub fn session_key(&self, key: &str) -> PathBuf {
        self.session_dir().join(format!("{key}.json"))
    }
}
