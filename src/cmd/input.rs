//! Shared input loading and output writing for the generation commands.

use anyhow::{bail, Context, Result};
use schema_forge::model::{ExtractionResult, Schema};
use schema_forge::normalize::{NormalizeConfig, NormalizeOptions, Normalized, Normalizer};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON document from disk
pub fn read_json(file: &Path) -> Result<Value> {
    if !file.exists() {
        bail!("input file does not exist: {}", file.display());
    }
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", file.display()))
}

/// An extraction carries `entities`; a normalized schema carries `tables`
pub fn is_extraction(value: &Value) -> bool {
    value.get("entities").is_some()
}

pub fn load_normalizer(config: Option<&Path>) -> Result<Normalizer> {
    let config = match config {
        Some(path) => NormalizeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => NormalizeConfig::default(),
    };
    Ok(Normalizer::new(config))
}

/// Normalize an extraction, reporting repairs on stderr
pub fn normalize_value(
    value: Value,
    normalizer: &Normalizer,
    options: &NormalizeOptions,
) -> Result<Normalized> {
    let extraction: ExtractionResult =
        serde_json::from_value(value).context("input is not a valid extraction document")?;
    let normalized = normalizer.normalize(&extraction, options);
    report_warnings(&normalized);
    Ok(normalized)
}

fn report_warnings(normalized: &Normalized) {
    if !normalized.has_warnings() {
        return;
    }
    eprintln!("Normalization warnings ({}):", normalized.warnings.len());
    for warning in &normalized.warnings {
        eprintln!("  - {}", warning);
    }
}

/// Load a schema from either a normalized document or a raw extraction
pub fn load_schema(file: &Path, normalizer: &Normalizer) -> Result<Schema> {
    let value = read_json(file)?;
    if is_extraction(&value) {
        tracing::debug!(file = %file.display(), "input is an extraction, normalizing");
        let options = NormalizeOptions {
            name: file
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string()),
            description: None,
        };
        return Ok(normalize_value(value, normalizer, &options)?.schema);
    }
    serde_json::from_value(value).context("input is not a valid schema document")
}

/// Write to `output`, or stdout when absent
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_detects_extraction() {
        assert!(is_extraction(&serde_json::json!({"entities": []})));
        assert!(!is_extraction(&serde_json::json!({"name": "s", "tables": []})));
    }

    #[test]
    fn test_load_extraction_normalizes() {
        let file = temp_json(r#"{"entities": [{"name": "Book"}]}"#);
        let schema = load_schema(file.path(), &Normalizer::default()).unwrap();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].name, "book");
    }

    #[test]
    fn test_load_schema_document() {
        let file = temp_json(r#"{"name": "s", "tables": [], "relationships": []}"#);
        let schema = load_schema(file.path(), &Normalizer::default()).unwrap();
        assert_eq!(schema.name, "s");
        assert_eq!(schema.version, "1.0.0");
    }

    #[test]
    fn test_config_reaches_normalizer() {
        let mut config = NamedTempFile::new().unwrap();
        config
            .write_all(b"lookup:\n  keywords: []\n  max_columns: 0\n")
            .unwrap();
        config.flush().unwrap();

        let normalizer = load_normalizer(Some(config.path())).unwrap();
        assert_eq!(normalizer.config().lookup.max_columns, 0);
        let file = temp_json(r#"{"entities": [{"name": "Shelf"}]}"#);
        let schema = load_schema(file.path(), &normalizer).unwrap();
        assert!(!schema.tables[0].is_lookup_table);

        let schema = load_schema(file.path(), &Normalizer::default()).unwrap();
        assert!(schema.tables[0].is_lookup_table);
    }

    #[test]
    fn test_missing_file() {
        let err = load_schema(Path::new("/nonexistent/input.json"), &Normalizer::default()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
