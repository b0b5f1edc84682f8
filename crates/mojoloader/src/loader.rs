// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The loader context and the nested loaders handed to libraries
//!
//! A [`MojoLoader`] owns the registry, the search paths and the active
//! strategy. It is built once and shared by cloning the handle. Every
//! library receives a [`NestedLoader`] bound to its own root that forwards
//! to the same context, so dependencies resolve against one cache.

use crate::builtins::{BuiltinHost, BuiltinTable};
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::globals::create_globals;
use crate::identity::{LibraryRequest, VersionedIdentity, builtin_lib_name};
use crate::registry::{Claim, LibraryRecord, Registry};
use crate::resolver::PathResolver;
use crate::resource::{FsReader, ResourceReader};
use crate::runtime::Runtime;
use crate::search_path::{DIRECT_PATH_MARKER, SearchPathSet};
use crate::strategy::{
    Evaluator, HostCapabilities, LoadRequest, LoadStrategy, ModuleSystem, ScopedRequire,
    StrategyKind,
};
use crate::value::{Scope, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{error, info};

/// Exports hook called with `(globals, loader)` on every require
pub const BIND_PARENT_HOOK: &str = "__setGlobal__";

/// Exports hook called with no arguments on every require
pub const ON_ATTACH_HOOK: &str = "onLoad";

/// Exports of the requested libraries, keyed by name
pub type Libraries = HashMap<String, Scope>;

struct LoaderInner {
    runtime: Runtime,
    root: String,
    resolver: PathResolver,
    registry: Registry,
    strategy: LoadStrategy,
    builtins: BuiltinTable,
    globals: Scope,
}

/// Library loader context
///
/// Cloning shares the context. Loads may run on several threads, but a
/// library still loading elsewhere is reported as `LoadInProgress` rather
/// than waited for.
#[derive(Clone)]
pub struct MojoLoader {
    inner: Arc<LoaderInner>,
}

impl MojoLoader {
    /// Start building a loader from `config`
    pub fn builder(config: LoaderConfig) -> LoaderBuilder {
        LoaderBuilder::new(config)
    }

    /// Load every requested library and return their exports
    ///
    /// Requests are handled in order; the first failure aborts the call.
    pub fn require(&self, requests: &[LibraryRequest]) -> Result<Libraries> {
        let mut libs = Libraries::new();
        for request in requests {
            let (name, exports) = self.require_request(request)?;
            libs.insert(name, exports);
        }
        Ok(libs)
    }

    /// Load a single library and return its exports
    pub fn require_library(&self, name: &str, version: &str) -> Result<Scope> {
        self.require_request(&LibraryRequest::new(name, version))
            .map(|(_, exports)| exports)
    }

    fn require_request(&self, request: &LibraryRequest) -> Result<(String, Scope)> {
        let identity = request.identify()?;
        let record = match self.inner.registry.claim(&identity)? {
            Claim::Cached(record) => record,
            Claim::Started(record) => match self.load_library(&identity, &record.exports) {
                Ok((exports, root)) => self.inner.registry.finish(&identity, exports, root),
                Err(e) => {
                    self.inner.registry.abandon(&identity.name);
                    return Err(e);
                }
            },
        };
        self.attach(&record)?;
        Ok((identity.name, record.exports))
    }

    /// Run the optional late-binding hooks of a library's exports
    fn attach(&self, record: &LibraryRecord) -> Result<()> {
        if let Some(hook) = record.exports.function(BIND_PARENT_HOOK) {
            let root = record.root.as_deref().unwrap_or(&self.inner.root);
            hook.call(&[
                Value::Object(self.inner.globals.clone()),
                Value::Loader(self.new_loader(root)),
            ])?;
        }
        if let Some(hook) = record.exports.function(ON_ATTACH_HOOK) {
            hook.call(&[])?;
        }
        Ok(())
    }

    fn load_library(
        &self,
        identity: &VersionedIdentity,
        exports: &Scope,
    ) -> Result<(Scope, Option<String>)> {
        if let Some(exports) = self.load_builtin(identity)? {
            return Ok((exports, None));
        }

        let Some(located) = self.inner.resolver.locate(&identity.name, &identity.version) else {
            return Err(LoaderError::LibraryNotFound {
                name: identity.name.clone(),
                version: identity.version.clone(),
                paths: self.inner.resolver.paths().describe(),
            });
        };

        let request = LoadRequest {
            identity,
            base: &located.base,
            manifest: &located.manifest,
            exports,
            loader: self.new_loader(&located.base),
            globals: &self.inner.globals,
            reader: self.inner.resolver.reader().as_ref(),
        };
        match self.inner.strategy.load(request) {
            Ok(exports) => {
                info!("Loaded {} from {}", identity, located.base);
                Ok((exports, Some(located.base)))
            }
            Err(e) => {
                error!("Error loading {} from {}: {}", identity, located.base, e);
                Err(execution_error(identity, self.inner.resolver.paths().describe(), e))
            }
        }
    }

    fn load_builtin(&self, identity: &VersionedIdentity) -> Result<Option<Scope>> {
        if !self.inner.strategy.uses_builtins() {
            return Ok(None);
        }
        let host = BuiltinHost::for_runtime(self.inner.runtime);
        let name = builtin_lib_name(&identity.name, &identity.raw_version);
        let Some(factory) = self.inner.builtins.lookup(host, &name) else {
            return Ok(None);
        };
        info!("Using builtin: {}", name);
        match factory() {
            Ok(exports) => Ok(Some(exports)),
            Err(e) => {
                error!("Error creating builtin {}: {}", name, e);
                Err(execution_error(identity, DIRECT_PATH_MARKER.to_string(), e))
            }
        }
    }

    /// Base directory of a library without loading it
    pub fn locate(&self, request: &LibraryRequest) -> Result<Option<String>> {
        let identity = request.identify()?;
        Ok(self
            .inner
            .resolver
            .locate(&identity.name, &identity.version)
            .map(|located| located.base))
    }

    /// Register host-supplied exports for a library, bypassing the search
    ///
    /// Fails if a different version is already present.
    pub fn override_library(&self, request: &LibraryRequest, exports: Scope) -> Result<Scope> {
        let identity = request.identify()?;
        let record = self.inner.registry.seed(&identity, exports, None)?;
        info!("Overriding {}", identity);
        Ok(record.exports)
    }

    /// A loader bound to `root`, sharing this context
    ///
    /// The nested loader does not keep the context alive; once every
    /// `MojoLoader` handle is dropped its calls fail with `Config`.
    pub fn new_loader(&self, root: &str) -> NestedLoader {
        NestedLoader {
            root: root.to_string(),
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Reserved builtin name for a library
    pub fn builtin_lib_name(&self, name: &str, raw_version: &str) -> String {
        builtin_lib_name(name, raw_version)
    }

    /// The hosting runtime
    pub fn runtime(&self) -> Runtime {
        self.inner.runtime
    }

    /// Running in a server process
    pub fn is_server(&self) -> bool {
        self.inner.runtime.is_server()
    }

    /// Running in an embedded script host
    pub fn is_embedded(&self) -> bool {
        self.inner.runtime.is_embedded()
    }

    /// Running in a document context
    pub fn is_browser(&self) -> bool {
        self.inner.runtime.is_browser()
    }

    /// Directory context of the top-level loader
    pub fn root(&self) -> &str {
        &self.inner.root
    }

    /// The host global object
    pub fn globals(&self) -> &Scope {
        &self.inner.globals
    }

    /// Active search prefixes
    pub fn search_paths(&self) -> &SearchPathSet {
        self.inner.resolver.paths()
    }

    /// Active load strategy
    pub fn strategy_kind(&self) -> StrategyKind {
        self.inner.strategy.kind()
    }

    /// Whether `name` has finished loading
    pub fn is_loaded(&self, name: &str) -> bool {
        self.inner.registry.is_loaded(name)
    }

    /// Resolved version held for `name`
    pub fn loaded_version(&self, name: &str) -> Option<String> {
        self.inner.registry.loaded_version(name)
    }

    /// Names of every known library
    pub fn loaded_names(&self) -> Vec<String> {
        self.inner.registry.names()
    }
}

impl fmt::Debug for MojoLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MojoLoader")
            .field("runtime", &self.inner.runtime)
            .field("root", &self.inner.root)
            .field("paths", self.inner.resolver.paths())
            .field("strategy", &self.inner.strategy)
            .finish_non_exhaustive()
    }
}

fn execution_error(identity: &VersionedIdentity, paths: String, source: LoaderError) -> LoaderError {
    LoaderError::LoadExecution {
        name: identity.name.clone(),
        version: identity.version.clone(),
        paths,
        source: Box::new(source),
    }
}

/// A loader bound to one library's root
#[derive(Clone)]
pub struct NestedLoader {
    root: String,
    inner: Weak<LoaderInner>,
}

impl NestedLoader {
    /// The directory this loader reports as its own
    pub fn root(&self) -> &str {
        &self.root
    }

    fn loader(&self) -> Result<MojoLoader> {
        self.inner
            .upgrade()
            .map(|inner| MojoLoader { inner })
            .ok_or_else(|| LoaderError::Config("loader context has been dropped".into()))
    }

    /// See [`MojoLoader::require`]
    pub fn require(&self, requests: &[LibraryRequest]) -> Result<Libraries> {
        self.loader()?.require(requests)
    }

    /// See [`MojoLoader::require_library`]
    pub fn require_library(&self, name: &str, version: &str) -> Result<Scope> {
        self.loader()?.require_library(name, version)
    }

    /// See [`MojoLoader::locate`]
    pub fn locate(&self, request: &LibraryRequest) -> Result<Option<String>> {
        self.loader()?.locate(request)
    }

    /// See [`MojoLoader::override_library`]
    pub fn override_library(&self, request: &LibraryRequest, exports: Scope) -> Result<Scope> {
        self.loader()?.override_library(request, exports)
    }
}

impl fmt::Debug for NestedLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedLoader").field("root", &self.root).finish()
    }
}

/// Builder for [`MojoLoader`]
pub struct LoaderBuilder {
    config: LoaderConfig,
    caps: HostCapabilities,
    reader: Option<Arc<dyn ResourceReader>>,
    search_paths: Option<SearchPathSet>,
    builtins: BuiltinTable,
    globals: Option<Scope>,
}

impl LoaderBuilder {
    /// Start from `config`
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            caps: HostCapabilities::default(),
            reader: None,
            search_paths: None,
            builtins: BuiltinTable::new(),
            globals: None,
        }
    }

    /// Offer the application framework scoped require
    pub fn mojo_require(mut self, require: Arc<dyn ScopedRequire>) -> Self {
        self.caps.mojo_require = Some(require);
        self
    }

    /// Offer the script host scoped require
    pub fn palm_require(mut self, require: Arc<dyn ScopedRequire>) -> Self {
        self.caps.palm_require = Some(require);
        self
    }

    /// Offer a module system
    pub fn module_system(mut self, modules: Arc<dyn ModuleSystem>) -> Self {
        self.caps.module_system = Some(modules);
        self
    }

    /// Offer a source evaluator
    pub fn evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.caps.evaluator = Some(evaluator);
        self
    }

    /// Read resources through `reader` instead of the file system
    pub fn resource_reader(mut self, reader: Arc<dyn ResourceReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Search `paths` instead of the configured order
    pub fn search_paths(mut self, paths: SearchPathSet) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Use `builtins` as the builtin registration table
    pub fn builtins(mut self, builtins: BuiltinTable) -> Self {
        self.builtins = builtins;
        self
    }

    /// Use `globals` as the host global object
    pub fn globals(mut self, globals: Scope) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Select the strategy and build the loader
    pub fn build(self) -> Result<MojoLoader> {
        let strategy = LoadStrategy::select(&self.caps)?;
        let paths = self
            .search_paths
            .unwrap_or_else(|| self.config.search_paths());
        let reader = self
            .reader
            .unwrap_or_else(|| Arc::new(FsReader::new()) as Arc<dyn ResourceReader>);
        info!(
            "Loader ready: runtime={} strategy={:?} paths={}",
            self.config.runtime,
            strategy.kind(),
            paths.describe()
        );
        Ok(MojoLoader {
            inner: Arc::new(LoaderInner {
                runtime: self.config.runtime,
                root: self.config.root,
                resolver: PathResolver::new(paths, reader),
                registry: Registry::new(),
                strategy,
                builtins: self.builtins,
                globals: self.globals.unwrap_or_else(create_globals),
            }),
        })
    }
}
