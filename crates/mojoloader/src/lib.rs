// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # mojoloader
//!
//! Run-time resolution and loading of versioned framework libraries.
//!
//! A host asks for libraries by name and version. The loader finds each one
//! on an ordered list of search prefixes through its `manifest.json`, runs
//! its code exactly once with the host's loading primitive, caches the
//! exports and hands them back. Loaded code receives its own
//! [`NestedLoader`] so it can require its dependencies against the same
//! cache.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mojoloader::{LibraryRequest, LoaderConfig, MojoLoader};
//! use std::sync::Arc;
//!
//! let loader = MojoLoader::builder(LoaderConfig::from_env())
//!     .evaluator(Arc::new(MyEngine::new()))
//!     .build()?;
//! let libs = loader.require(&[LibraryRequest::new("foundations", "1.0")])?;
//! let foundations = &libs["foundations"];
//! ```
//!
//! ## Layout on disk
//!
//! ```text
//! <prefix>/<name>/version/<version>/manifest.json
//! <prefix>/<name>/version/<version>/concatenated.js      (optional bundle)
//! <prefix>/<name>/version/<version>/javascript/<file>    (per manifest entry)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtins;
pub mod config;
pub mod error;
pub mod globals;
pub mod identity;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod resource;
pub mod runtime;
pub mod search_path;
pub mod strategy;
pub mod value;

// Re-exports
pub use builtins::{BuiltinHost, BuiltinTable};
pub use config::LoaderConfig;
pub use error::{LoaderError, Result};
pub use globals::{PROPAGATED_GLOBALS, propagate_globals};
pub use identity::{LibraryRequest, VersionedIdentity, builtin_lib_name, resolve_version};
pub use loader::{BIND_PARENT_HOOK, Libraries, LoaderBuilder, MojoLoader, NestedLoader, ON_ATTACH_HOOK};
pub use manifest::Manifest;
pub use resource::{FsReader, MemoryReader, ResourceReader};
pub use runtime::Runtime;
pub use search_path::{SearchOrder, SearchPathSet};
pub use strategy::{Evaluator, ModuleSystem, ScopedRequire, SourceUnit, StrategyKind};
pub use value::{NativeFunction, Scope, Value};

/// Version of the loader
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
