// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for library resolution and loading

use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while resolving or loading a library
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A request carried no library name
    #[error("Missing library name")]
    MissingName,

    /// A request carried no usable version
    #[error("Library {name}: Missing version")]
    MissingVersion {
        /// Library name
        name: String,
    },

    /// A different version of the library is already loaded
    #[error("Library {name}: Dependency conflict (want '{wanted}' but already loaded '{loaded}')")]
    DependencyConflict {
        /// Library name
        name: String,
        /// Version the caller asked for
        wanted: String,
        /// Version held by the registry
        loaded: String,
    },

    /// No search prefix held a manifest and no builtin matched
    #[error("Failed to load library '{name} {version}' paths '{paths}'")]
    LibraryNotFound {
        /// Library name
        name: String,
        /// Resolved version
        version: String,
        /// Search prefixes tried, or `<command line>`
        paths: String,
    },

    /// The library was found but running its code failed
    #[error("Failed to load library '{name} {version}' paths '{paths}': {source}")]
    LoadExecution {
        /// Library name
        name: String,
        /// Resolved version
        version: String,
        /// Search prefixes tried, or `<command line>`
        paths: String,
        /// What the loaded code raised
        source: Box<LoaderError>,
    },

    /// The library is still loading further up the require chain
    #[error("Library {name}: Circular dependency detected while loading '{version}'")]
    CircularDependency {
        /// Library name
        name: String,
        /// Resolved version
        version: String,
    },

    /// The library is being loaded by another thread
    #[error("Library {name}: '{version}' is being loaded by another thread")]
    LoadInProgress {
        /// Library name
        name: String,
        /// Resolved version
        version: String,
    },

    /// A hook or builtin produced a value of the wrong kind
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Failure reported by a host capability
    #[error("{0}")]
    Host(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoaderError {
    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create an error raised by host-provided code
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// The innermost error behind nested load failures
    pub fn root_cause(&self) -> &LoaderError {
        let mut err = self;
        while let LoaderError::LoadExecution { source, .. } = err {
            err = source.as_ref();
        }
        err
    }
}

impl From<toml::de::Error> for LoaderError {
    fn from(err: toml::de::Error) -> Self {
        LoaderError::Config(err.to_string())
    }
}

impl From<&str> for LoaderError {
    fn from(s: &str) -> Self {
        LoaderError::Host(s.to_string())
    }
}

impl From<String> for LoaderError {
    fn from(s: String) -> Self {
        LoaderError::Host(s)
    }
}
