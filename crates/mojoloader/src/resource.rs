// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The "read resource at path" capability

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads a resource into a string
///
/// `Ok(None)` means nothing exists at `path`; `Err` is any other failure.
pub trait ResourceReader: Send + Sync {
    /// Read the resource at `path`
    fn read(&self, path: &str) -> Result<Option<String>>;
}

/// Reads resources from the local file system
#[derive(Debug, Clone, Default)]
pub struct FsReader {
    /// Directory relative paths are resolved against
    base: Option<PathBuf>,
}

impl FsReader {
    /// Resolve relative paths against the process working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base`
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResourceReader for FsReader {
    fn read(&self, path: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.full_path(path)) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process resource table, the equivalent of resources compiled into the host
#[derive(Debug, Default)]
pub struct MemoryReader {
    resources: HashMap<String, String>,
    reads: Mutex<Vec<String>>,
}

impl MemoryReader {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.resources.insert(path.into(), contents.into());
    }

    /// Builder form of [`MemoryReader::insert`]
    pub fn with(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Every path read so far, in order
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }
}

impl ResourceReader for MemoryReader {
    fn read(&self, path: &str) -> Result<Option<String>> {
        self.reads.lock().push(path.to_string());
        Ok(self.resources.get(path).cloned())
    }
}
