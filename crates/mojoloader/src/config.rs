// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration

use crate::error::Result;
use crate::runtime::Runtime;
use crate::search_path::{ROOT_OVERRIDE_ENV, SearchOrder, SearchPathSet};
use serde::Deserialize;
use std::path::Path;

/// Configuration for a loader
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Hosting environment
    pub runtime: Runtime,

    /// Whether the host is a trusted system application
    pub trusted: bool,

    /// Explicit search order; derived from `trusted` when unset
    pub search_order: Option<SearchOrder>,

    /// Replacement for the `/usr` search root
    pub root_override: Option<String>,

    /// Directory context reported by the top-level loader
    pub root: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            runtime: Runtime::default(),
            trusted: true,
            search_order: None,
            root_override: None,
            root: "./".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Parse a TOML configuration document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Apply `BEDLAM_ROOT` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ROOT_OVERRIDE_ENV).filter(|r| !r.is_empty()) {
            self.root_override = Some(root);
        }
        self
    }

    /// The search order in effect
    pub fn effective_search_order(&self) -> SearchOrder {
        self.search_order.unwrap_or(if self.trusted {
            SearchOrder::Trusted
        } else {
            SearchOrder::Public
        })
    }

    /// Build the immutable search path set
    ///
    /// The root override does not apply in a browser.
    pub fn search_paths(&self) -> SearchPathSet {
        let paths = SearchPathSet::new(self.effective_search_order());
        if self.runtime.is_browser() {
            paths
        } else {
            paths.with_root_override(self.root_override.as_deref())
        }
    }
}
