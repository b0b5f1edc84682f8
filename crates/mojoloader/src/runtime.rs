// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Classification of the hosting environment

use serde::Deserialize;
use std::fmt;

/// The kind of host the loader runs inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Runtime {
    /// A server process with a file system and process globals
    Server,
    /// A standalone script host exposing `getenv` and friends
    #[default]
    EmbeddedScriptHost,
    /// A document context
    Browser,
}

impl Runtime {
    /// Stable name of the runtime
    pub fn as_str(self) -> &'static str {
        match self {
            Runtime::Server => "server",
            Runtime::EmbeddedScriptHost => "embedded-script-host",
            Runtime::Browser => "browser",
        }
    }

    /// Running in a server process
    pub fn is_server(self) -> bool {
        self == Runtime::Server
    }

    /// Running in an embedded script host
    pub fn is_embedded(self) -> bool {
        self == Runtime::EmbeddedScriptHost
    }

    /// Running in a document context
    pub fn is_browser(self) -> bool {
        self == Runtime::Browser
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
