// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Load strategies
//!
//! Exactly one strategy is active per loader, chosen once from the
//! primitives the host provides:
//!
//! 1. A scoped require that loads many files into a fresh scope
//! 2. A module system that loads one file at a time into a given scope
//! 3. An evaluator that runs assembled source text

use crate::error::{LoaderError, Result};
use crate::globals::propagate_globals;
use crate::identity::VersionedIdentity;
use crate::loader::NestedLoader;
use crate::manifest::{BUNDLE_FILE, Manifest, SOURCE_DIR};
use crate::resource::ResourceReader;
use crate::value::{Scope, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Scope binding holding a library's exports
pub const EXPORTS_BINDING: &str = "exports";

/// Scope binding holding the library's nested loader
pub const LOADER_BINDING: &str = "MojoLoader";

/// Host primitive that loads a list of files into a fresh scope
pub trait ScopedRequire: Send + Sync {
    /// Load `paths` in order and return the scope they ran in
    ///
    /// The library's exports are read from the scope's `exports` binding.
    fn require(&self, loader: NestedLoader, paths: &[String]) -> Result<Scope>;
}

/// Host module system that loads a single file into a scope
pub trait ModuleSystem: Send + Sync {
    /// Run the file at `path` with `scope` as its top level
    fn require_module(&self, path: &str, scope: &Scope) -> Result<()>;
}

/// Host primitive that executes library source text
pub trait Evaluator: Send + Sync {
    /// Run `unit` as a function of `(MojoLoader, exports, root)`
    fn evaluate(&self, unit: &SourceUnit, loader: NestedLoader, exports: &Scope, root: &Scope) -> Result<()>;
}

/// Source text of one library, ready to evaluate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Library name
    pub library: String,
    /// The code
    pub source: String,
    /// Whether the code came from a pre-built bundle
    pub bundled: bool,
}

/// Loading primitives the host makes available
#[derive(Clone, Default)]
pub struct HostCapabilities {
    /// Application framework scoped require
    pub mojo_require: Option<Arc<dyn ScopedRequire>>,
    /// Script host scoped require, compatible with `mojo_require`
    pub palm_require: Option<Arc<dyn ScopedRequire>>,
    /// Generic module system
    pub module_system: Option<Arc<dyn ModuleSystem>>,
    /// Source evaluator
    pub evaluator: Option<Arc<dyn Evaluator>>,
}

/// Which strategy variant is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Host scoped require
    ScopedRequire,
    /// Composite loader over a module system
    ModuleSystem,
    /// Source assembly plus evaluation
    Eval,
}

/// Everything a strategy needs to load one library
pub struct LoadRequest<'a> {
    /// Library being loaded
    pub identity: &'a VersionedIdentity,
    /// Version directory
    pub base: &'a str,
    /// Manifest read from `base`
    pub manifest: &'a Manifest,
    /// The registry's exports object for this library
    pub exports: &'a Scope,
    /// Loader rooted at `base`
    pub loader: NestedLoader,
    /// Host global object
    pub globals: &'a Scope,
    /// Resource reader
    pub reader: &'a dyn ResourceReader,
}

/// The active load strategy
#[derive(Clone)]
pub enum LoadStrategy {
    /// Strategy 1
    Scoped(Arc<dyn ScopedRequire>),
    /// Strategy 2
    Composite(Arc<dyn ModuleSystem>),
    /// Strategy 3
    Eval(Arc<dyn Evaluator>),
}

impl LoadStrategy {
    /// Pick the richest primitive the host offers
    pub fn select(caps: &HostCapabilities) -> Result<Self> {
        if let Some(require) = caps.mojo_require.as_ref().or(caps.palm_require.as_ref()) {
            return Ok(LoadStrategy::Scoped(Arc::clone(require)));
        }
        if let Some(modules) = &caps.module_system {
            return Ok(LoadStrategy::Composite(Arc::clone(modules)));
        }
        match &caps.evaluator {
            Some(evaluator) => Ok(LoadStrategy::Eval(Arc::clone(evaluator))),
            None => Err(LoaderError::Config(
                "host provides no primitive for running library code".to_string(),
            )),
        }
    }

    /// The active variant
    pub fn kind(&self) -> StrategyKind {
        match self {
            LoadStrategy::Scoped(_) => StrategyKind::ScopedRequire,
            LoadStrategy::Composite(_) => StrategyKind::ModuleSystem,
            LoadStrategy::Eval(_) => StrategyKind::Eval,
        }
    }

    /// Whether builtin registrations are consulted before file loading
    pub fn uses_builtins(&self) -> bool {
        !matches!(self, LoadStrategy::Eval(_))
    }

    /// Load one library and return its exports
    pub fn load(&self, req: LoadRequest<'_>) -> Result<Scope> {
        match self {
            LoadStrategy::Scoped(require) => load_scoped(require.as_ref(), req),
            LoadStrategy::Composite(modules) => load_composite(modules.as_ref(), req),
            LoadStrategy::Eval(evaluator) => load_eval(evaluator.as_ref(), req),
        }
    }
}

impl fmt::Debug for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoadStrategy({:?})", self.kind())
    }
}

fn exports_of(scope: &Scope, fallback: &Scope) -> Scope {
    match scope.get(EXPORTS_BINDING) {
        Some(Value::Object(exports)) => exports,
        _ => fallback.clone(),
    }
}

fn load_scoped(require: &dyn ScopedRequire, req: LoadRequest<'_>) -> Result<Scope> {
    let paths = req.manifest.source_paths(req.base);
    let scope = require.require(req.loader, &paths)?;
    propagate_globals(&scope, req.globals);
    Ok(exports_of(&scope, req.exports))
}

fn load_composite(modules: &dyn ModuleSystem, req: LoadRequest<'_>) -> Result<Scope> {
    let scope = Scope::new();
    scope.set(LOADER_BINDING, Value::Loader(req.loader));
    scope.set(EXPORTS_BINDING, req.exports.clone());
    propagate_globals(&scope, req.globals);

    for path in req.manifest.source_paths(req.base) {
        modules.require_module(&path, &scope)?;
    }
    Ok(exports_of(&scope, req.exports))
}

fn load_eval(evaluator: &dyn Evaluator, req: LoadRequest<'_>) -> Result<Scope> {
    let unit = assemble_source(req.identity, req.base, req.manifest, req.reader)?;
    let root = Scope::new();
    propagate_globals(&root, req.globals);
    evaluator.evaluate(&unit, req.loader, req.exports, &root)?;
    Ok(req.exports.clone())
}

/// Produce the source text for a library
///
/// A pre-built bundle at `<base>/concatenated.js` is used as-is. Otherwise
/// the manifest's files are concatenated, each after a `sourceURL` marker.
pub fn assemble_source(
    identity: &VersionedIdentity,
    base: &str,
    manifest: &Manifest,
    reader: &dyn ResourceReader,
) -> Result<SourceUnit> {
    if let Some(source) = reader.read(&format!("{base}{BUNDLE_FILE}"))? {
        debug!("Using bundle for {}", identity);
        return Ok(SourceUnit {
            library: identity.name.clone(),
            source,
            bundled: true,
        });
    }

    let mut source = String::new();
    for file in manifest.sources() {
        let path = format!("{base}{SOURCE_DIR}{file}");
        let text = reader
            .read(&path)?
            .ok_or_else(|| LoaderError::host(format!("missing source file '{path}'")))?;
        source.push_str(&format!("\n\n//@ sourceURL={}/{}\n\n", identity.name, file));
        source.push_str(&text);
    }
    Ok(SourceUnit {
        library: identity.name.clone(),
        source,
        bundled: false,
    })
}
