// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Libraries pre-shipped by the host
//!
//! Instead of probing the global object for a reserved name, hosts register
//! a factory under that name at startup. A registered factory short-circuits
//! manifest lookup and file loading for its library.

use crate::error::Result;
use crate::identity::builtin_lib_name;
use crate::runtime::Runtime;
use crate::value::Scope;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces a builtin library's exports
pub type BuiltinFactory = Arc<dyn Fn() -> Result<Scope> + Send + Sync>;

/// Which global object a builtin would have lived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinHost {
    /// The script/document global object
    Script,
    /// The server process global object
    Process,
}

impl BuiltinHost {
    /// The namespace consulted under `runtime`
    pub fn for_runtime(runtime: Runtime) -> Self {
        if runtime.is_server() {
            BuiltinHost::Process
        } else {
            BuiltinHost::Script
        }
    }
}

/// Registration table of builtin libraries, keyed by reserved global name
#[derive(Clone, Default)]
pub struct BuiltinTable {
    entries: HashMap<(BuiltinHost, String), BuiltinFactory>,
}

impl BuiltinTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under an already-derived global name
    pub fn register<F>(&mut self, host: BuiltinHost, global_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Scope> + Send + Sync + 'static,
    {
        self.entries
            .insert((host, global_name.into()), Arc::new(factory));
    }

    /// Register `factory` for library `name` at raw version `raw_version`
    pub fn register_library<F>(&mut self, host: BuiltinHost, name: &str, raw_version: &str, factory: F)
    where
        F: Fn() -> Result<Scope> + Send + Sync + 'static,
    {
        self.register(host, builtin_lib_name(name, raw_version), factory);
    }

    /// Find the factory for `global_name`
    pub fn lookup(&self, host: BuiltinHost, global_name: &str) -> Option<BuiltinFactory> {
        self.entries.get(&(host, global_name.to_string())).cloned()
    }

    /// Number of registered builtins
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for BuiltinTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort_by(|a, b| a.1.cmp(&b.1));
        f.debug_struct("BuiltinTable").field("entries", &names).finish()
    }
}
