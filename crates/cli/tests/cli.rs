//! Drives `hookgen` commands in-process against scratch directories.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

const DOC: &str = r#"{
    "openapi": "3.1.0",
    "info": { "title": "Todos", "version": "1.0.0" },
    "paths": {
        "/todos": {
            "get": { "responses": { "200": { "description": "ok", "content": {
                "application/json": { "schema": { "type": "array", "items": { "type": "string" } } } } } } },
            "post": { "requestBody": { "content": {
                "application/json": { "schema": { "type": "object" } } } } }
        },
        "/todos/{id}": {
            "get": { "parameters": [{ "name": "id", "in": "path", "required": true }] }
        }
    }
}"#;

fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("openapi.json"), DOC).unwrap();
    tmp
}

fn hookgen(args: &[&str]) -> i32 {
    let mut argv = vec!["hookgen"];
    argv.extend_from_slice(args);
    hookgen_cli::run(argv)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_generate_writes_output() {
    let tmp = setup();
    let input = tmp.path().join("openapi.json");
    let output = tmp.path().join("src/api");

    let code = hookgen(&[
        "generate",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
    ]);
    assert_eq!(code, 0);
    assert!(output.join("types.ts").is_file());
    assert!(output.join("client.ts").is_file());
    assert!(output.join("index.ts").is_file());
    assert!(output.join("hooks/useGetTodos.ts").is_file());
    assert!(output.join("hooks/useGetTodosId.ts").is_file());
    assert!(output.join("hooks/usePostTodos.ts").is_file());
}

#[test]
fn test_check_detects_stale_output() {
    let tmp = setup();
    let input = tmp.path().join("openapi.json");
    let output = tmp.path().join("api");
    let base = ["--input", path_str(&input), "--output", path_str(&output)];

    // Nothing generated yet.
    let mut check = vec!["generate", "--check"];
    check.extend(base);
    assert_eq!(hookgen(&check), 1);
    assert!(!output.exists());

    let mut generate = vec!["generate"];
    generate.extend(base);
    assert_eq!(hookgen(&generate), 0);
    assert_eq!(hookgen(&check), 0);

    fs::write(output.join("hooks/useGetTodos.ts"), "// edited\n").unwrap();
    assert_eq!(hookgen(&check), 1);
    assert_eq!(
        fs::read_to_string(output.join("hooks/useGetTodos.ts")).unwrap(),
        "// edited\n"
    );
}

#[test]
fn test_config_file_and_flag_overrides() {
    let tmp = setup();
    let config = tmp.path().join("hookgen.toml");
    fs::write(
        &config,
        "input = \"openapi.json\"\noutput = \"web/api\"\ntarget = \"vue\"\nlayout = \"single-file\"\n",
    )
    .unwrap();

    assert_eq!(hookgen(&["generate", "--config", path_str(&config)]), 0);
    let hooks = fs::read_to_string(tmp.path().join("web/api/hooks.ts")).unwrap();
    assert!(hooks.contains("@tanstack/vue-query"));

    // Flags win over the file.
    assert_eq!(
        hookgen(&[
            "generate",
            "--config",
            path_str(&config),
            "--target",
            "react",
            "--layout",
            "per-route",
        ]),
        0
    );
    let out = tmp.path().join("web/api");
    assert!(!out.join("hooks.ts").exists());
    let hook = fs::read_to_string(out.join("hooks/useGetTodos.ts")).unwrap();
    assert!(hook.contains("@tanstack/react-query"));
}

#[test]
fn test_report_is_written_as_json() {
    let tmp = setup();
    let input = tmp.path().join("openapi.json");
    let output = tmp.path().join("api");
    let report = tmp.path().join("report.json");

    let code = hookgen(&[
        "generate",
        "--input",
        path_str(&input),
        "--output",
        path_str(&output),
        "--report",
        path_str(&report),
    ]);
    assert_eq!(code, 0);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["title"], "Todos");
    assert_eq!(json["routes"], 3);
    assert_eq!(json["queries"], 2);
    assert_eq!(json["mutations"], 1);
}

#[test]
fn test_fatal_errors_exit_with_one() {
    let tmp = setup();
    let output = tmp.path().join("api");

    let missing = tmp.path().join("missing.json");
    assert_eq!(
        hookgen(&[
            "generate",
            "--input",
            path_str(&missing),
            "--output",
            path_str(&output)
        ]),
        1
    );

    let swagger = tmp.path().join("swagger.json");
    fs::write(&swagger, r#"{ "swagger": "2.0", "paths": {} }"#).unwrap();
    assert_eq!(
        hookgen(&[
            "generate",
            "--input",
            path_str(&swagger),
            "--output",
            path_str(&output)
        ]),
        1
    );
    assert!(!output.exists());

    let config = tmp.path().join("bad.toml");
    fs::write(&config, "unknown_key = 1\n").unwrap();
    assert_eq!(hookgen(&["generate", "--config", path_str(&config)]), 1);
}

#[test]
fn test_inspect() {
    let tmp = setup();
    let input = tmp.path().join("openapi.json");
    assert_eq!(hookgen(&["inspect", "--input", path_str(&input)]), 0);
}
