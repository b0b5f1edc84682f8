// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host symbols forwarded into loaded libraries
//!
//! A library runs in its own scope. The only host capabilities it sees are
//! the ones named in [`PROPAGATED_GLOBALS`].

use crate::value::{NativeFunction, Scope, Value};

/// Host symbols copied into every loaded library's scope
pub const PROPAGATED_GLOBALS: &[&str] = &[
    // Common
    "console",
    "palmGetResource",
    "setTimeout",
    "clearTimeout",
    "setInterval",
    "clearInterval",
    // Embedded script host
    "getenv",
    "readInput",
    "quit",
    "include",
    "_mojoRequire",
    "webOS",
    "palmPutResource",
    // Application framework
    "XMLHttpRequest",
    "palmRequire",
    "palmInclude",
    "PalmServiceBridge",
    "PalmSystem",
];

/// Whether `name` is forwarded into loaded scopes
pub fn is_propagated(name: &str) -> bool {
    PROPAGATED_GLOBALS.contains(&name)
}

/// Copy allowlisted symbols from `from` into `to`
///
/// Bindings already present in `to` are left alone. Returns `to`.
pub fn propagate_globals<'a>(to: &'a Scope, from: &Scope) -> &'a Scope {
    if to.ptr_eq(from) {
        return to;
    }
    for &sym in PROPAGATED_GLOBALS {
        if to.contains(sym) {
            continue;
        }
        if let Some(value) = from.get(sym) {
            to.set(sym, value);
        }
    }
    to
}

/// Create a host global object with a `console` routed through `tracing`
pub fn create_globals() -> Scope {
    let globals = Scope::new();
    globals.set("console", create_console_object());
    globals
}

/// Console object whose methods log at the matching level
pub fn create_console_object() -> Value {
    let console = Scope::new();
    console.set(
        "log",
        NativeFunction::new("log", |args| {
            tracing::info!(target: "mojoloader::console", "{}", join_args(args));
            Ok(Value::Undefined)
        }),
    );
    console.set(
        "warn",
        NativeFunction::new("warn", |args| {
            tracing::warn!(target: "mojoloader::console", "{}", join_args(args));
            Ok(Value::Undefined)
        }),
    );
    console.set(
        "error",
        NativeFunction::new("error", |args| {
            tracing::error!(target: "mojoloader::console", "{}", join_args(args));
            Ok(Value::Undefined)
        }),
    );
    Value::Object(console)
}

fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            other => other.type_name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
