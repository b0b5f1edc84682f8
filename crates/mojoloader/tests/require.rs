// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Registry, resolution and nested require behaviour

mod common;

use common::{ScriptedEval, library};
use mojoloader::{
    LibraryRequest, LoaderConfig, LoaderError, MemoryReader, MojoLoader, NativeFunction, Scope,
    SearchOrder, SearchPathSet, Value,
};
use parking_lot::Mutex;
use std::sync::Arc;

fn build(reader: MemoryReader, eval: ScriptedEval) -> (MojoLoader, Arc<MemoryReader>) {
    let reader = Arc::new(reader);
    let loader = MojoLoader::builder(LoaderConfig::default())
        .evaluator(Arc::new(eval))
        .resource_reader(reader.clone())
        .search_paths(SearchPathSet::from_prefixes(["p1/", "p2/"]))
        .build()
        .unwrap();
    (loader, reader)
}

#[test]
fn test_require_returns_cached_exports() {
    let (loader, reader) = build(library(MemoryReader::new(), "p1/", "L", "1.0"), ScriptedEval::new());

    let first = loader.require(&[LibraryRequest::new("L", "1.0")]).unwrap();
    let reads = reader.reads().len();
    let second = loader.require(&[LibraryRequest::new("L", "1.0")]).unwrap();

    assert!(first["L"].ptr_eq(&second["L"]));
    assert_eq!(reader.reads().len(), reads);
    assert!(loader.is_loaded("L"));
}

#[test]
fn test_version_conflict_keeps_first() {
    let reader = library(library(MemoryReader::new(), "p1/", "L", "1.0"), "p1/", "L", "2.0");
    let (loader, _) = build(reader, ScriptedEval::new());

    loader.require_library("L", "1.0").unwrap();
    let err = loader.require_library("L", "2.0").unwrap_err();

    match err {
        LoaderError::DependencyConflict { name, wanted, loaded } => {
            assert_eq!(name, "L");
            assert_eq!(wanted, "version/2.0");
            assert_eq!(loaded, "version/1.0");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(loader.loaded_version("L").as_deref(), Some("version/1.0"));
}

#[test]
fn test_earlier_prefix_wins() {
    let reader = library(library(MemoryReader::new(), "p1/", "L", "1.0"), "p2/", "L", "1.0");
    let (loader, _) = build(reader, ScriptedEval::new());

    let exports = loader.require_library("L", "1.0").unwrap();
    assert_eq!(exports.get("root"), Some(Value::from("p1/L/version/1.0/")));
    assert!(exports.get("source").unwrap().as_str().unwrap().contains("// p1/L 1.0"));
}

#[test]
fn test_missing_name_and_version() {
    let (loader, _) = build(MemoryReader::new(), ScriptedEval::new());

    let no_name = LibraryRequest {
        name: None,
        version: Some("1.0".into()),
    };
    assert!(matches!(loader.require(&[no_name]), Err(LoaderError::MissingName)));

    let no_version = LibraryRequest {
        name: Some("L".into()),
        version: None,
    };
    assert!(matches!(
        loader.require(&[no_version]),
        Err(LoaderError::MissingVersion { .. })
    ));
}

#[test]
fn test_not_found_lists_every_prefix() {
    let (loader, _) = build(MemoryReader::new(), ScriptedEval::new());
    let err = loader.require_library("Nowhere", "1.0").unwrap_err();

    match &err {
        LoaderError::LibraryNotFound { name, version, paths } => {
            assert_eq!(name, "Nowhere");
            assert_eq!(version, "version/1.0");
            assert_eq!(paths, "p1/,p2/");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(err.to_string().contains("Nowhere version/1.0"));
}

#[test]
fn test_not_found_marks_direct_paths() {
    let loader = MojoLoader::builder(LoaderConfig {
        search_order: Some(SearchOrder::Local),
        ..Default::default()
    })
    .evaluator(Arc::new(ScriptedEval::new()))
    .resource_reader(Arc::new(MemoryReader::new()))
    .build()
    .unwrap();

    let err = loader.require_library("L", "1.0").unwrap_err();
    assert!(err.to_string().ends_with("paths '<command line>'"));
}

#[test]
fn test_first_failure_aborts_multi_require() {
    let (loader, _) = build(library(MemoryReader::new(), "p1/", "A", "1.0"), ScriptedEval::new());

    let err = loader
        .require(&[
            LibraryRequest::new("A", "1.0"),
            LibraryRequest::new("Missing", "1.0"),
            LibraryRequest::new("A", "1.0"),
        ])
        .unwrap_err();
    assert!(matches!(err, LoaderError::LibraryNotFound { .. }));
    assert!(loader.is_loaded("A"));
    assert!(!loader.loaded_names().contains(&"Missing".to_string()));
}

#[test]
fn test_nested_require_reuses_cache() {
    let reader = library(library(MemoryReader::new(), "p1/", "Base", "1.0"), "p1/", "App", "1.0");
    let eval = ScriptedEval::new().program("App", |loader, exports, _| {
        let libs = loader.require(&[LibraryRequest::new("Base", "1.0")])?;
        exports.set("base", libs["Base"].clone());
        Ok(())
    });
    let (loader, reader) = build(reader, eval);

    let base = loader.require_library("Base", "1.0").unwrap();
    let app = loader.require_library("App", "1.0").unwrap();

    assert!(app.get("base").unwrap().as_object().unwrap().ptr_eq(&base));
    let base_manifest_reads = reader
        .reads()
        .iter()
        .filter(|p| p.ends_with("Base/version/1.0/manifest.json"))
        .count();
    assert_eq!(base_manifest_reads, 1);
}

#[test]
fn test_transitive_and_direct_share_one_load() {
    let reader = library(library(MemoryReader::new(), "p1/", "Base", "1.0"), "p1/", "App", "1.0");
    let eval = ScriptedEval::new().program("App", |loader, _, _| {
        loader.require_library("Base", "1.0")?;
        Ok(())
    });
    let (loader, reader) = build(reader, eval);

    let libs = loader
        .require(&[LibraryRequest::new("App", "1.0"), LibraryRequest::new("Base", "1.0")])
        .unwrap();
    assert_eq!(libs.len(), 2);
    let base_loads = reader
        .reads()
        .iter()
        .filter(|p| p.ends_with("Base/version/1.0/javascript/main.js"))
        .count();
    assert_eq!(base_loads, 1);
}

#[test]
fn test_circular_dependency_fails_fast() {
    let reader = library(library(MemoryReader::new(), "p1/", "A", "1.0"), "p1/", "B", "1.0");
    let eval = ScriptedEval::new()
        .program("A", |loader, _, _| loader.require_library("B", "1.0").map(|_| ()))
        .program("B", |loader, _, _| loader.require_library("A", "1.0").map(|_| ()));
    let (loader, _) = build(reader, eval);

    let err = loader.require_library("A", "1.0").unwrap_err();
    match err.root_cause() {
        LoaderError::CircularDependency { name, .. } => assert_eq!(name, "A"),
        other => panic!("unexpected {:?}", other),
    }
    // Neither half-loaded record survives
    assert!(loader.loaded_names().is_empty());
}

#[test]
fn test_execution_error_is_wrapped() {
    let reader = library(MemoryReader::new(), "p1/", "Bad", "1.0");
    let eval = ScriptedEval::new().program("Bad", |_, _, _| Err(LoaderError::host("ReferenceError: x")));
    let (loader, _) = build(reader, eval);

    let err = loader.require_library("Bad", "1.0").unwrap_err();
    match &err {
        LoaderError::LoadExecution { name, version, paths, source } => {
            assert_eq!(name, "Bad");
            assert_eq!(version, "version/1.0");
            assert_eq!(paths, "p1/,p2/");
            assert_eq!(source.to_string(), "ReferenceError: x");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!loader.is_loaded("Bad"));
}

#[test]
fn test_hooks_run_on_every_require() {
    let calls = Arc::new(Mutex::new(Vec::<String>::new()));
    let hook_calls = calls.clone();
    let eval = ScriptedEval::new().program("L", move |_, exports, _| {
        let log = hook_calls.clone();
        exports.set(
            "__setGlobal__",
            NativeFunction::new("__setGlobal__", move |args| {
                let root = args[1].as_loader().map(|l| l.root().to_string()).unwrap_or_default();
                assert!(args[0].as_object().unwrap().contains("console"));
                log.lock().push(format!("bind:{root}"));
                Ok(Value::Undefined)
            }),
        );
        let log = hook_calls.clone();
        exports.set(
            "onLoad",
            NativeFunction::new("onLoad", move |args| {
                assert!(args.is_empty());
                log.lock().push("load".to_string());
                Ok(Value::Undefined)
            }),
        );
        Ok(())
    });
    let (loader, _) = build(library(MemoryReader::new(), "p1/", "L", "1.0"), eval);

    loader.require_library("L", "1.0").unwrap();
    loader.require_library("L", "1.0").unwrap();

    assert_eq!(
        *calls.lock(),
        vec![
            "bind:p1/L/version/1.0/".to_string(),
            "load".to_string(),
            "bind:p1/L/version/1.0/".to_string(),
            "load".to_string(),
        ]
    );
}

#[test]
fn test_hooks_are_optional() {
    let (loader, _) = build(library(MemoryReader::new(), "p1/", "L", "1.0"), ScriptedEval::new());
    let exports = loader.require_library("L", "1.0").unwrap();
    assert!(!exports.contains("onLoad"));
    assert!(!exports.contains("__setGlobal__"));
}

#[test]
fn test_override_via_nested_loader() {
    let (loader, reader) = build(MemoryReader::new(), ScriptedEval::new());
    let nested = loader.new_loader("./");
    let exports = Scope::new();
    exports.set("stub", true);

    nested
        .override_library(&LibraryRequest::new("Stubbed", "1.0"), exports.clone())
        .unwrap();
    let got = nested.require_library("Stubbed", "1.0").unwrap();

    assert!(got.ptr_eq(&exports));
    assert!(reader.reads().is_empty());
    assert!(matches!(
        nested.override_library(&LibraryRequest::new("Stubbed", "2.0"), Scope::new()),
        Err(LoaderError::DependencyConflict { .. })
    ));
}

#[test]
fn test_nested_locate() {
    let (loader, _) = build(library(MemoryReader::new(), "p2/", "L", "1.0"), ScriptedEval::new());
    let nested = loader.new_loader("p2/Other/version/1.0/");
    assert_eq!(
        nested.locate(&LibraryRequest::new("L", "1.0")).unwrap().as_deref(),
        Some("p2/L/version/1.0/")
    );
    assert!(matches!(
        nested.locate(&LibraryRequest::default()),
        Err(LoaderError::MissingName)
    ));
}
