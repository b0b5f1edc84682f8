// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Fake host primitives shared by the integration tests

#![allow(dead_code)]

use mojoloader::{
    Evaluator, LoaderError, ModuleSystem, NestedLoader, Result, Scope, ScopedRequire, SourceUnit,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Library body: `(loader, exports, scope)`
pub type Program = Arc<dyn Fn(&NestedLoader, &Scope, &Scope) -> Result<()> + Send + Sync>;

/// Evaluator that runs a registered Rust closure per library name
#[derive(Default)]
pub struct ScriptedEval {
    programs: HashMap<String, Program>,
    pub units: Mutex<Vec<SourceUnit>>,
    pub roots: Mutex<Vec<Scope>>,
}

impl ScriptedEval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program<F>(mut self, library: &str, body: F) -> Self
    where
        F: Fn(&NestedLoader, &Scope, &Scope) -> Result<()> + Send + Sync + 'static,
    {
        self.programs.insert(library.to_string(), Arc::new(body));
        self
    }
}

impl Evaluator for ScriptedEval {
    fn evaluate(&self, unit: &SourceUnit, loader: NestedLoader, exports: &Scope, root: &Scope) -> Result<()> {
        self.units.lock().push(unit.clone());
        self.roots.lock().push(root.clone());
        exports.set("source", unit.source.as_str());
        exports.set("root", loader.root());
        match self.programs.get(&unit.library) {
            Some(body) => body(&loader, exports, root),
            None => Ok(()),
        }
    }
}

/// Module system that records each file and the scope it ran in
#[derive(Default)]
pub struct RecordingModules {
    pub files: Mutex<Vec<String>>,
    pub scopes: Mutex<Vec<Scope>>,
    pub fail_on: Option<String>,
}

impl ModuleSystem for RecordingModules {
    fn require_module(&self, path: &str, scope: &Scope) -> Result<()> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(LoaderError::host(format!("SyntaxError in {path}")));
        }
        self.files.lock().push(path.to_string());
        self.scopes.lock().push(scope.clone());
        if let Some(exports) = scope.get("exports").and_then(|v| v.as_object().cloned()) {
            exports.set(format!("ran:{path}"), true);
        }
        Ok(())
    }
}

/// Scoped require returning a fresh scope with an `exports` object
#[derive(Default)]
pub struct FreshScopeRequire {
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
    pub scopes: Mutex<Vec<Scope>>,
}

impl ScopedRequire for FreshScopeRequire {
    fn require(&self, loader: NestedLoader, paths: &[String]) -> Result<Scope> {
        self.calls.lock().push((loader.root().to_string(), paths.to_vec()));
        let scope = Scope::new();
        let exports = Scope::new();
        exports.set("files", paths.len() as f64);
        scope.set("exports", exports);
        scope.set("console", "library console");
        self.scopes.lock().push(scope.clone());
        Ok(scope)
    }
}

pub const MANIFEST: &str = r#"{"files": {"javascript": ["main.js"]}}"#;

/// Manifest plus one source file for `name` at `version` under `prefix`
pub fn library(reader: mojoloader::MemoryReader, prefix: &str, name: &str, version: &str) -> mojoloader::MemoryReader {
    reader
        .with(format!("{prefix}{name}/version/{version}/manifest.json"), MANIFEST)
        .with(
            format!("{prefix}{name}/version/{version}/javascript/main.js"),
            format!("// {prefix}{name} {version}"),
        )
}
