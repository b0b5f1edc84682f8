// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Ordered search prefixes

use serde::Deserialize;

/// Search order for trusted hosts: system, private system, then local
pub const TRUSTED_PATHS: &[&str] = &[
    "/usr/palm/frameworks/",
    "/usr/palm/frameworks/private/",
    "frameworks/",
];

/// Search order for everyone else
pub const PUBLIC_PATHS: &[&str] = &["/usr/palm/frameworks/", "frameworks/"];

/// Single empty prefix: names are used as direct paths
pub const LOCAL_PATHS: &[&str] = &[""];

/// Prefix the root override replaces
pub const DEFAULT_ROOT: &str = "/usr";

/// Environment variable holding the root override
pub const ROOT_OVERRIDE_ENV: &str = "BEDLAM_ROOT";

/// Shown in errors instead of the prefix list for the local order
pub const DIRECT_PATH_MARKER: &str = "<command line>";

/// Which fixed prefix list to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrder {
    /// [`TRUSTED_PATHS`]
    Trusted,
    /// [`PUBLIC_PATHS`]
    Public,
    /// [`LOCAL_PATHS`]
    Local,
}

impl SearchOrder {
    fn prefixes(self) -> &'static [&'static str] {
        match self {
            SearchOrder::Trusted => TRUSTED_PATHS,
            SearchOrder::Public => PUBLIC_PATHS,
            SearchOrder::Local => LOCAL_PATHS,
        }
    }
}

/// The active, immutable list of search prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPathSet {
    prefixes: Vec<String>,
}

impl SearchPathSet {
    /// The fixed list for `order`
    pub fn new(order: SearchOrder) -> Self {
        Self::from_prefixes(order.prefixes().iter().copied())
    }

    /// An explicit prefix list, searched in the given order
    pub fn from_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Rewrite every prefix starting with [`DEFAULT_ROOT`] to start with `root`
    pub fn with_root_override(self, root: Option<&str>) -> Self {
        let Some(root) = root.filter(|r| !r.is_empty()) else {
            return self;
        };
        let prefixes = self
            .prefixes
            .into_iter()
            .map(|prefix| match prefix.strip_prefix(DEFAULT_ROOT) {
                Some(rest) => format!("{root}{rest}"),
                None => prefix,
            })
            .collect();
        Self { prefixes }
    }

    /// Prefixes in search order
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether this is the single empty local prefix
    pub fn is_direct(&self) -> bool {
        self.prefixes.first().is_some_and(|p| p.is_empty())
    }

    /// Text used in error messages
    pub fn describe(&self) -> String {
        if self.is_direct() {
            DIRECT_PATH_MARKER.to_string()
        } else {
            self.prefixes.join(",")
        }
    }
}
