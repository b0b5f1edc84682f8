// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `manifest.json` descriptor for one library version

use crate::error::Result;
use serde::Deserialize;

/// File name of the manifest inside a library version directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory under the version root holding the source files
pub const SOURCE_DIR: &str = "javascript/";

/// Pre-flattened bundle produced by the packaging step
pub const BUNDLE_FILE: &str = "concatenated.js";

/// Parsed library manifest
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Source files making up the library
    pub files: ManifestFiles,
}

/// The `files` field, either a bare list or keyed by language
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ManifestFiles {
    /// `"files": ["a.js", "b.js"]`
    List(Vec<String>),
    /// `"files": { "javascript": ["a.js", "b.js"] }`
    ByLanguage {
        /// Script sources in load order
        javascript: Vec<String>,
    },
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Source file names in load order
    pub fn sources(&self) -> &[String] {
        match &self.files {
            ManifestFiles::List(files) => files,
            ManifestFiles::ByLanguage { javascript } => javascript,
        }
    }

    /// Full resource paths of the source files below `base`
    pub fn source_paths(&self, base: &str) -> Vec<String> {
        self.sources()
            .iter()
            .map(|file| format!("{base}{SOURCE_DIR}{file}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyed_files() {
        let manifest =
            Manifest::parse(r#"{"files": {"javascript": ["a.js", "b.js"]}, "name": "x"}"#).unwrap();
        assert_eq!(manifest.sources(), ["a.js", "b.js"]);
    }

    #[test]
    fn test_parse_list_files() {
        let manifest = Manifest::parse(r#"{"files": ["main.js"]}"#).unwrap();
        assert_eq!(
            manifest.source_paths("fw/L/version/1.0/"),
            vec!["fw/L/version/1.0/javascript/main.js".to_string()]
        );
    }

    #[test]
    fn test_rejects_missing_files() {
        assert!(Manifest::parse("{}").is_err());
        assert!(Manifest::parse("null").is_err());
        assert!(Manifest::parse("not json").is_err());
    }
}
