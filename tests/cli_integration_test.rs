//! End-to-end tests driving the compiled binary.

use jsonschema::Validator;
use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

const EXTRACTION: &str = r#"{
  "entities": [
    {"name": "Author", "attributes": [{"name": "pen_name", "dataType": "VARCHAR(100)"}, {"name": "email"}, {"name": "born_on"}, {"name": "biography"}]},
    {"name": "Book", "attributes": [{"name": "title", "dataType": "VARCHAR(255)"}, {"name": "price"}]},
    {"name": "Genre"}
  ],
  "relationships": [
    {"sourceEntity": "Author", "targetEntity": "Book", "type": "ONE_TO_MANY", "verb": "writes"},
    {"sourceEntity": "Book", "targetEntity": "Genre", "type": "MANY_TO_MANY"}
  ]
}"#;

fn schema_forge_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_schema-forge"))
}

fn write_input(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run_ok(args: &[&str]) -> Output {
    let output = schema_forge_bin()
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_normalize_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);

    let output = run_ok(&["normalize", input.to_str().unwrap()]);
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(json["name"], "library");
    let tables = json["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 3);
    let book = tables.iter().find(|t| t["name"] == "book").unwrap();
    assert!(book["columns"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["name"] == "author_id" && c["isForeignKey"] == true));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Normalized 3 tables"));
}

#[test]
fn test_normalize_output_matches_exported_schema() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);
    let out = dir.path().join("schema.json");

    run_ok(&[
        "normalize",
        input.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--name",
        "bookstore",
        "--description",
        "Books and their authors",
    ]);
    let document: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(document["name"], "bookstore");
    assert_eq!(document["description"], "Books and their authors");

    let schema_output = run_ok(&["schema", "schema"]);
    let schema: Value = serde_json::from_str(&stdout(&schema_output)).unwrap();
    let validator = Validator::new(&schema).expect("Failed to compile schema");
    let errors: Vec<String> = validator.iter_errors(&document).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "schema violations: {:?}", errors);

    let extraction_output = run_ok(&["schema", "extraction"]);
    let extraction_schema: Value = serde_json::from_str(&stdout(&extraction_output)).unwrap();
    let validator = Validator::new(&extraction_schema).expect("Failed to compile schema");
    let input_json: Value = serde_json::from_str(EXTRACTION).unwrap();
    assert!(validator.is_valid(&input_json));
}

#[test]
fn test_sql_from_extraction_and_from_schema() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);
    let schema_file = dir.path().join("schema.json");
    run_ok(&["normalize", input.to_str().unwrap(), "-o", schema_file.to_str().unwrap()]);

    for file in [&input, &schema_file] {
        let output = run_ok(&["sql", file.to_str().unwrap(), "--dialect", "postgresql"]);
        let sql = stdout(&output);
        assert!(sql.contains("CREATE TABLE book_genre ("));
        assert!(sql.contains("PRIMARY KEY (book_id, genre_id)"));
        assert!(sql.contains("BEGIN;"));
    }
}

#[test]
fn test_sql_unknown_dialect_warns_and_uses_mysql() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);

    let output = schema_forge_bin()
        .args(["sql", input.to_str().unwrap(), "-d", "oracle"])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert!(stdout(&output).contains("ENGINE=InnoDB"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported dialect, falling back to mysql"));
}

#[test]
fn test_sql_config_controls_seed_data() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);
    let config = write_input(&dir, "config.yaml", "lookup:\n  keywords: []\n");

    let default = stdout(&run_ok(&["sql", input.to_str().unwrap(), "-d", "postgresql"]));
    assert!(default.contains("INSERT INTO genre (name) VALUES"));

    let configured = stdout(&run_ok(&[
        "sql",
        input.to_str().unwrap(),
        "-d",
        "postgresql",
        "--config",
        config.to_str().unwrap(),
    ]));
    assert!(!configured.contains("INSERT INTO genre"));
    assert!(configured.contains("Skipped seed data for genre"));
}

#[test]
fn test_sql_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);
    let out = dir.path().join("ddl").join("library.sql");

    let output = run_ok(&[
        "sql",
        input.to_str().unwrap(),
        "-d",
        "sqlite",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert!(stdout(&output).is_empty());
    let sql = fs::read_to_string(&out).unwrap();
    assert!(sql.contains("PRAGMA foreign_keys = OFF;"));
}

#[test]
fn test_diagram_command() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);

    let output = run_ok(&["diagram", input.to_str().unwrap(), "--strict"]);
    let text = stdout(&output);
    assert!(text.starts_with("erDiagram\n"));
    assert!(text.contains("    author ||--o{ book : \"writes\""));
    assert!(!text.contains("%% Validation"));
}

#[test]
fn test_diagram_strict_fails_on_empty_schema() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "empty.json", r#"{"name": "empty", "tables": []}"#);

    let output = schema_forge_bin()
        .args(["diagram", input.to_str().unwrap(), "--strict"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stdout(&output).contains("%% - Diagram is empty: no entities defined"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("diagram validation failed"));
}

#[test]
fn test_docs_command_formats() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);

    let md = stdout(&run_ok(&["docs", input.to_str().unwrap()]));
    assert!(md.starts_with("# library\n"));

    let html = stdout(&run_ok(&["docs", input.to_str().unwrap(), "-f", "html"]));
    assert!(html.starts_with("<!DOCTYPE html>"));

    let pdf = stdout(&run_ok(&["docs", input.to_str().unwrap(), "-f", "pdf"]));
    assert_eq!(pdf, md);
}

#[test]
fn test_docs_output_gets_format_extension() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);
    let out = dir.path().join("library");

    run_ok(&[
        "docs",
        input.to_str().unwrap(),
        "-f",
        "html",
        "-o",
        out.to_str().unwrap(),
    ]);
    let html = fs::read_to_string(dir.path().join("library.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!out.exists());
}

#[test]
fn test_config_file_changes_lookup_detection() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "library.json", EXTRACTION);
    let config = write_input(&dir, "config.yaml", "lookup:\n  max_columns: 0\n  keywords: []\n");

    let output = run_ok(&[
        "normalize",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(json["tables"]
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["isLookupTable"] == false));

    let default = run_ok(&["normalize", input.to_str().unwrap()]);
    let json: Value = serde_json::from_str(&stdout(&default)).unwrap();
    let genre = json["tables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "genre")
        .unwrap();
    assert_eq!(genre["isLookupTable"], true);
}

#[test]
fn test_missing_input_fails() {
    let output = schema_forge_bin()
        .args(["sql", "/nonexistent/schema.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("input file does not exist"));
}

#[test]
fn test_invalid_json_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "broken.json", "{not json");
    let output = schema_forge_bin()
        .args(["docs", input.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON"));
}

#[test]
fn test_schema_list() {
    let output = run_ok(&["schema", "--list"]);
    assert_eq!(stdout(&output), "extraction\nschema\n");

    let unknown = schema_forge_bin().args(["schema", "graph"]).output().unwrap();
    assert!(!unknown.status.success());
}

#[test]
fn test_completions() {
    let output = run_ok(&["completions", "bash"]);
    assert!(stdout(&output).contains("schema-forge"));
}
