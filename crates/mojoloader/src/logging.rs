// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Logging setup for hosts embedding the loader

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber for loader events
///
/// `RUST_LOG` takes precedence over `verbose`. Does nothing if a global
/// subscriber is already installed.
pub fn init(verbose: bool) {
    let default = if verbose { "mojoloader=debug" } else { "mojoloader=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
