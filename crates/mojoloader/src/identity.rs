// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Library requests, resolved identities and the builtin naming scheme

use crate::error::{LoaderError, Result};
use serde::Deserialize;
use std::fmt;

/// Path segment every resolved version starts with
pub const VERSION_SEGMENT: &str = "version/";

/// A caller's request for one library, as it arrives at `require`
///
/// Both fields are optional so that missing input can be reported
/// instead of rejected by the type system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LibraryRequest {
    /// Library name, e.g. `"foundations"`
    #[serde(default)]
    pub name: Option<String>,
    /// Raw version number, e.g. `"1.0"`
    #[serde(default)]
    pub version: Option<String>,
}

impl LibraryRequest {
    /// Request `name` at raw version `version`
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }

    /// The name, if present and non-empty
    pub fn name(&self) -> Result<&str> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(LoaderError::MissingName),
        }
    }

    /// Validate the request into a resolved identity
    pub fn identify(&self) -> Result<VersionedIdentity> {
        let name = self.name()?;
        let version = resolve_version(name, self.version.as_deref())?;
        Ok(VersionedIdentity {
            name: name.to_string(),
            version,
            raw_version: self.version.clone().unwrap_or_default(),
        })
    }
}

/// A validated `(name, resolved version)` pair
#[derive(Debug, Clone)]
pub struct VersionedIdentity {
    /// Library name
    pub name: String,
    /// Resolved version path segment, e.g. `"version/1.0"`
    pub version: String,
    /// Raw version number the caller asked for
    pub raw_version: String,
}

impl PartialEq for VersionedIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for VersionedIdentity {}

impl fmt::Display for VersionedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Turn library `name`'s raw version number into its search-path segment
pub fn resolve_version(name: &str, raw: Option<&str>) -> Result<String> {
    match raw {
        Some(raw) if !raw.is_empty() => Ok(format!("{VERSION_SEGMENT}{raw}")),
        _ => Err(LoaderError::MissingVersion {
            name: name.to_string(),
        }),
    }
}

/// Reserved global name under which a host may pre-ship a library
///
/// `builtin_lib_name("foundations.json", "1.0")` is
/// `"palmfoundations_jsonVersion1_0"`.
pub fn builtin_lib_name(name: &str, raw_version: &str) -> String {
    format!(
        "palm{}Version{}",
        name.replace('.', "_"),
        raw_version.replace('.', "_")
    )
}
