//! Module graph tests against real files in a temporary directory.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use hml_eval::{buffer_handler, EvalErrorKind, Interpreter, Value};
use hmlc::{LoadError, LoadState, ModuleId, ModuleLoader, RunConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// Helper Functions

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, source).unwrap();
    }
    dir
}

fn loader_for(dir: &Path) -> ModuleLoader {
    let mut config = RunConfig::new(dir.join("main.hml"));
    config.stdlib = Some(dir.join("std"));
    ModuleLoader::new(&config)
}

struct Run {
    loader: ModuleLoader,
    result: Result<ModuleId, LoadError>,
    output: String,
}

fn run(dir: &Path) -> Run {
    let handler = buffer_handler();
    let mut interpreter = Interpreter::with_print_handler(Arc::clone(&handler));
    let mut loader = loader_for(dir);
    let result = loader.run_entry(&dir.join("main.hml"), &mut interpreter);
    Run {
        loader,
        result,
        output: handler.get_output(),
    }
}

fn output(files: &[(&str, &str)]) -> String {
    let dir = project(files);
    let run = run(dir.path());
    run.result.unwrap();
    run.output
}

fn error(files: &[(&str, &str)]) -> LoadError {
    let dir = project(files);
    run(dir.path()).result.unwrap_err()
}

// Imports and exports

#[test]
fn test_named_import_with_alias() {
    let out = output(&[
        ("math.hml", "export fn add(a, b) { return a + b; }"),
        (
            "main.hml",
            "import { add as plus } from \"./math\";\nprint(plus(1, 2));",
        ),
    ]);
    assert_eq!(out, "3\n");
}

#[test]
fn test_export_list_alias() {
    let out = output(&[
        ("lib.hml", "let a = 7;\nexport { a as b };"),
        ("main.hml", "import { b } from \"./lib.hml\";\nprint(b);"),
    ]);
    assert_eq!(out, "7\n");
}

#[test]
fn test_reexport() {
    let out = output(&[
        ("base.hml", "export let x = 5;"),
        ("mid.hml", "export { x as y } from \"./base\";"),
        ("main.hml", "import { y } from \"./mid\";\nprint(y);"),
    ]);
    assert_eq!(out, "5\n");
}

#[test]
fn test_nested_directories_resolve_from_importer() {
    let out = output(&[
        ("lib/util.hml", "import { v } from \"./inner/value\";\nexport let w = v + 1;"),
        ("lib/inner/value.hml", "export const v = 41;"),
        ("main.hml", "import { w } from \"./lib/util\";\nprint(w);"),
    ]);
    assert_eq!(out, "42\n");
}

#[test]
fn test_namespace_import_keeps_export_order() {
    let dir = project(&[
        (
            "m.hml",
            "export let zeta = 1;\nexport fn alpha() { return 2; }\nexport const mid = 3;",
        ),
        (
            "main.hml",
            "import * as ns from \"./m\";\nprint(ns.zeta + ns.alpha() + ns.mid);",
        ),
    ]);
    let run = run(dir.path());
    let main = run.result.unwrap();
    assert_eq!(run.output, "6\n");

    let (_, env) = run.loader.exports(main).unwrap();
    let Some(Value::Object(ns)) = env.get("ns") else {
        panic!("expected namespace object");
    };
    let names: Vec<String> = ns.field_names().iter().map(ToString::to_string).collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_imported_binding_is_immutable() {
    let err = error(&[
        ("base.hml", "export let x = 5;"),
        ("main.hml", "import { x } from \"./base\";\nx = 6;"),
    ]);
    let LoadError::Runtime { error, .. } = err else {
        panic!("expected runtime error, got {err:?}");
    };
    assert_eq!(
        error.kind,
        EvalErrorKind::ImmutableBinding {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_unresolved_import() {
    let err = error(&[
        ("base.hml", "let hidden = 1;\nexport let shown = 2;"),
        ("main.hml", "import { hidden } from \"./base\";"),
    ]);
    assert!(
        matches!(&err, LoadError::UnresolvedImport { name, .. } if name == "hidden"),
        "got {err:?}"
    );
}

#[test]
fn test_stdlib_import() {
    let out = output(&[
        ("std/math.hml", "export fn square(n) { return n * n; }"),
        (
            "main.hml",
            "import { square } from \"@stdlib/math\";\nprint(square(9));",
        ),
    ]);
    assert_eq!(out, "81\n");
}

// Execution order

#[test]
fn test_shared_module_runs_once() {
    let out = output(&[
        ("shared.hml", "print(\"shared\");\nexport let state = { count: 0 };"),
        (
            "b.hml",
            "import { state } from \"./shared\";\nstate.count = state.count + 1;\nprint(\"b\");",
        ),
        (
            "c.hml",
            "import { state } from \"./shared\";\nstate.count = state.count + 1;\nprint(\"c\");",
        ),
        (
            "main.hml",
            "import * as b from \"./b\";\nimport * as c from \"./c\";\nimport { state } from \"./shared\";\nprint(state.count);",
        ),
    ]);
    assert_eq!(out, "shared\nb\nc\n2\n");
}

#[test]
fn test_execute_is_idempotent() {
    let dir = project(&[("main.hml", "print(\"once\");")]);
    let handler = buffer_handler();
    let mut interpreter = Interpreter::with_print_handler(Arc::clone(&handler));
    let mut loader = loader_for(dir.path());

    let id = loader
        .run_entry(&dir.path().join("main.hml"), &mut interpreter)
        .unwrap();
    loader.execute(id, &mut interpreter).unwrap();
    assert_eq!(handler.get_output(), "once\n");
    assert!(loader.is_executed(id));
}

#[test]
fn test_top_level_return_ends_module() {
    let out = output(&[
        ("lib.hml", "export let a = 1;\nreturn;\nexport let b = 2;"),
        ("main.hml", "import * as lib from \"./lib\";\nprint(lib.a);\nprint(lib[\"b\"]);"),
    ]);
    assert_eq!(out, "1\nnull\n");
}

// Load failures

#[test]
fn test_cycle_detected() {
    let err = error(&[
        ("a.hml", "import { b } from \"./b\";\nexport let a = 1;"),
        ("b.hml", "import { a } from \"./a\";\nexport let b = 2;"),
        ("main.hml", "import { a } from \"./a\";"),
    ]);
    let LoadError::CircularDependency { chain } = err else {
        panic!("expected cycle, got {err:?}");
    };
    assert!(chain.contains("a.hml -> "), "chain: {chain}");
    assert!(chain.ends_with("a.hml"), "chain: {chain}");
}

#[test]
fn test_self_import_is_a_cycle() {
    let err = error(&[("main.hml", "import { x } from \"./main\";\nexport let x = 1;")]);
    assert!(matches!(err, LoadError::CircularDependency { .. }), "got {err:?}");
}

#[test]
fn test_missing_module() {
    let err = error(&[("main.hml", "import { x } from \"./nowhere\";")]);
    let LoadError::NotFound { path } = err else {
        panic!("expected not found, got {err:?}");
    };
    assert!(path.ends_with("nowhere.hml"));
}

#[test]
fn test_parse_error_resets_module() {
    let dir = project(&[
        ("dep.hml", "export let = ;"),
        ("main.hml", "import { v } from \"./dep\";\nprint(v);"),
    ]);
    let first = run(dir.path());
    assert!(matches!(first.result, Err(LoadError::Parse { .. })));

    let mut loader = first.loader;
    let dep = loader.module_id(&dir.path().join("dep.hml")).unwrap();
    assert_eq!(loader.state(dep), LoadState::Unloaded);
    let main = loader.module_id(&dir.path().join("main.hml")).unwrap();
    assert_eq!(loader.state(main), LoadState::Unloaded);

    fs::write(dir.path().join("dep.hml"), "export let v = 3;").unwrap();
    let handler = buffer_handler();
    let mut interpreter = Interpreter::with_print_handler(Arc::clone(&handler));
    let main = loader
        .run_entry(&dir.path().join("main.hml"), &mut interpreter)
        .unwrap();
    assert_eq!(loader.state(main), LoadState::Loaded);
    assert_eq!(loader.state(dep), LoadState::Loaded);
    assert_eq!(handler.get_output(), "3\n");
}

#[test]
fn test_parse_error_report_has_location() {
    let err = error(&[("main.hml", "let x = 1;\nlet = 2;")]);
    let report = err.report();
    assert_eq!(report.len(), 1);
    assert!(report[0].contains("main.hml:2:"), "report: {report:?}");
}

#[test]
fn test_runtime_error_location() {
    let err = error(&[("main.hml", "let x = 1;\nprint(y);")]);
    let LoadError::Runtime {
        location, error, ..
    } = &err
    else {
        panic!("expected runtime error, got {err:?}");
    };
    assert_eq!(*location, Some((2, 7)));
    assert_eq!(error.message, "Undefined variable 'y'");
    assert_eq!(err.report()[0], "Runtime error: Undefined variable 'y'");
}

#[test]
fn test_runtime_error_keeps_finished_dependencies() {
    let dir = project(&[
        ("ok.hml", "export let v = 1;"),
        ("main.hml", "import { v } from \"./ok\";\nprint(1 / 0);"),
    ]);
    let run = run(dir.path());
    let err = run.result.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Runtime {
            error: hml_eval::EvalError {
                kind: EvalErrorKind::DivisionByZero,
                ..
            },
            ..
        }
    ));

    let ok = run.loader.module_id(&dir.path().join("ok.hml")).unwrap();
    assert!(run.loader.is_executed(ok));
    let main = run.loader.module_id(&dir.path().join("main.hml")).unwrap();
    assert!(!run.loader.is_executed(main));
}
