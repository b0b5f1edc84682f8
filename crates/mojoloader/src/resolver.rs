// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Library path resolution over the ordered search prefixes

use crate::error::Result;
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::resource::ResourceReader;
use crate::search_path::SearchPathSet;
use std::sync::Arc;
use tracing::debug;

/// A library version found on the search path
#[derive(Debug, Clone)]
pub struct Located {
    /// Version directory, always ending in `/`
    pub base: String,
    /// The manifest read from `base`
    pub manifest: Manifest,
}

/// Finds library manifests on the search path
#[derive(Clone)]
pub struct PathResolver {
    paths: SearchPathSet,
    reader: Arc<dyn ResourceReader>,
}

impl PathResolver {
    /// Create a resolver over `paths`, reading through `reader`
    pub fn new(paths: SearchPathSet, reader: Arc<dyn ResourceReader>) -> Self {
        Self { paths, reader }
    }

    /// The active search prefixes
    pub fn paths(&self) -> &SearchPathSet {
        &self.paths
    }

    /// The reader used for manifests and sources
    pub fn reader(&self) -> &Arc<dyn ResourceReader> {
        &self.reader
    }

    /// Find the first prefix holding a readable manifest for `name` at `version`
    ///
    /// Read and parse failures count as "not here" and the search moves on.
    pub fn locate(&self, name: &str, version: &str) -> Option<Located> {
        for prefix in self.paths.prefixes() {
            let base = format!("{prefix}{name}/{version}/");
            match self.read_manifest(&base) {
                Ok(Some(manifest)) => {
                    debug!("Located {} {} at {}", name, version, base);
                    return Some(Located { base, manifest });
                }
                Ok(None) => debug!("No manifest at {}", base),
                Err(e) => debug!("Unusable manifest at {}: {}", base, e),
            }
        }
        None
    }

    fn read_manifest(&self, base: &str) -> Result<Option<Manifest>> {
        let path = format!("{base}{MANIFEST_FILE}");
        match self.reader.read(&path)? {
            Some(source) => Ok(Some(Manifest::parse(&source)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
