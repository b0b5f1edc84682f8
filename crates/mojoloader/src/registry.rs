// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Registry of loaded libraries, one record per name

use crate::error::{LoaderError, Result};
use crate::identity::VersionedIdentity;
use crate::value::Scope;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::thread::{self, ThreadId};

/// One loaded or loading library
#[derive(Debug, Clone)]
pub struct LibraryRecord {
    /// Library name
    pub name: String,
    /// Resolved version, e.g. `"version/1.0"`
    pub version: String,
    /// Raw version number as requested
    pub raw_version: String,
    /// The library's exports
    pub exports: Scope,
    /// Whether loading has finished
    pub loaded: bool,
    /// Requests waiting on this library; always empty while loading is synchronous
    pub pending: Vec<String>,
    /// Version directory the library was loaded from, when known
    pub root: Option<String>,
    /// Thread running the load, while `loaded` is false
    pub loading_thread: Option<ThreadId>,
}

impl LibraryRecord {
    fn loading(identity: &VersionedIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            version: identity.version.clone(),
            raw_version: identity.raw_version.clone(),
            exports: Scope::new(),
            loaded: false,
            pending: Vec::new(),
            root: None,
            loading_thread: Some(thread::current().id()),
        }
    }

    /// Error for a request that found this record still loading
    fn unfinished(&self) -> LoaderError {
        if self.loading_thread == Some(thread::current().id()) {
            LoaderError::CircularDependency {
                name: self.name.clone(),
                version: self.version.clone(),
            }
        } else {
            LoaderError::LoadInProgress {
                name: self.name.clone(),
                version: self.version.clone(),
            }
        }
    }
}

/// Outcome of claiming a name in the registry
#[derive(Debug)]
pub enum Claim {
    /// The library was already loaded
    Cached(LibraryRecord),
    /// A loading record was created; the caller must load it
    Started(LibraryRecord),
}

/// Name-keyed library cache
#[derive(Debug, Default)]
pub struct Registry {
    records: DashMap<String, LibraryRecord>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by name
    pub fn get(&self, name: &str) -> Option<LibraryRecord> {
        self.records.get(name).map(|entry| entry.clone())
    }

    /// Return the cached record for `identity` or create a loading one
    ///
    /// Fails if another version owns the name, or if the library is still
    /// loading: further up this thread's call stack (`CircularDependency`)
    /// or on another thread (`LoadInProgress`).
    pub fn claim(&self, identity: &VersionedIdentity) -> Result<Claim> {
        match self.records.entry(identity.name.clone()) {
            Entry::Occupied(entry) => {
                let record = entry.get();
                if record.version != identity.version {
                    return Err(LoaderError::DependencyConflict {
                        name: identity.name.clone(),
                        wanted: identity.version.clone(),
                        loaded: record.version.clone(),
                    });
                }
                if !record.loaded {
                    return Err(record.unfinished());
                }
                Ok(Claim::Cached(record.clone()))
            }
            Entry::Vacant(entry) => {
                let record = LibraryRecord::loading(identity);
                entry.insert(record.clone());
                Ok(Claim::Started(record))
            }
        }
    }

    /// Mark a claimed library loaded with its final exports
    pub fn finish(&self, identity: &VersionedIdentity, exports: Scope, root: Option<String>) -> LibraryRecord {
        let mut record = self
            .records
            .entry(identity.name.clone())
            .or_insert_with(|| LibraryRecord::loading(identity));
        record.exports = exports;
        record.root = root;
        record.loaded = true;
        record.loading_thread = None;
        record.clone()
    }

    /// Drop a record whose load failed so the request can be retried
    pub fn abandon(&self, name: &str) {
        self.records.remove_if(name, |_, record| !record.loaded);
    }

    /// Insert a finished record with host-supplied exports
    ///
    /// Replaces the exports of a loaded record with the same version.
    pub fn seed(&self, identity: &VersionedIdentity, exports: Scope, root: Option<String>) -> Result<LibraryRecord> {
        match self.records.entry(identity.name.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.version != identity.version {
                    return Err(LoaderError::DependencyConflict {
                        name: identity.name.clone(),
                        wanted: identity.version.clone(),
                        loaded: record.version.clone(),
                    });
                }
                if !record.loaded {
                    return Err(record.unfinished());
                }
                record.exports = exports;
                if root.is_some() {
                    record.root = root;
                }
                Ok(record.clone())
            }
            Entry::Vacant(entry) => {
                let mut record = LibraryRecord::loading(identity);
                record.exports = exports;
                record.root = root;
                record.loaded = true;
                record.loading_thread = None;
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// Whether `name` has finished loading
    pub fn is_loaded(&self, name: &str) -> bool {
        self.records.get(name).is_some_and(|record| record.loaded)
    }

    /// Resolved version held for `name`
    pub fn loaded_version(&self, name: &str) -> Option<String> {
        self.records.get(name).map(|record| record.version.clone())
    }

    /// Sorted names of every record
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
