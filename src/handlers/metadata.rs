use axum::{Json, extract::State};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Return the `[meta]` table of the metadata file as a flat JSON object
pub async fn get_metadata(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let meta = read_meta_table(&state.config.metadata_path).await?;
    Ok(Json(meta))
}

/// Read a TOML file and convert its `[meta]` table to JSON.
pub async fn read_meta_table(path: &Path) -> AppResult<Value> {
    let file = path.display().to_string();

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::MetadataUnreadable {
            file: file.clone(),
            reason: e.to_string(),
        })?;

    let document: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| AppError::MetadataUnreadable {
            file: file.clone(),
            reason: e.to_string(),
        })?;

    match document.get("meta") {
        Some(meta @ toml::Value::Table(_)) => Ok(toml_to_json(meta)),
        _ => Err(AppError::MetadataSectionMissing { file }),
    }
}

/// Convert TOML to JSON, rendering datetimes as their TOML text
fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(key, value)| (key.clone(), toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_meta_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deepgram.toml");
        fs::write(
            &path,
            r#"
[meta]
title = "Voice Agent"
description = "Talk to an AI agent"
tags = ["voice", "agent"]

[build]
command = "cargo build"
"#,
        )
        .unwrap();

        let meta = read_meta_table(&path).await.unwrap();

        assert_eq!(meta["title"], "Voice Agent");
        assert_eq!(meta["tags"][1], "agent");
        assert!(meta.get("command").is_none());
    }

    #[tokio::test]
    async fn test_datetimes_are_plain_strings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deepgram.toml");
        fs::write(
            &path,
            "[meta]\nreleased = 1979-05-27T07:32:00Z\nday = 2024-01-15\nversion = 2\nratio = 0.5\n",
        )
        .unwrap();

        let meta = read_meta_table(&path).await.unwrap();

        assert_eq!(
            meta,
            serde_json::json!({
                "released": "1979-05-27T07:32:00Z",
                "day": "2024-01-15",
                "version": 2,
                "ratio": 0.5,
            })
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = read_meta_table(Path::new("/nonexistent/deepgram.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MetadataUnreadable { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to read metadata from /nonexistent/deepgram.toml"
        );
    }

    #[tokio::test]
    async fn test_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deepgram.toml");
        fs::write(&path, "[meta\ntitle = ").unwrap();

        assert!(matches!(
            read_meta_table(&path).await,
            Err(AppError::MetadataUnreadable { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_meta_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deepgram.toml");
        fs::write(&path, "[build]\ncommand = \"make\"\n").unwrap();

        assert!(matches!(
            read_meta_table(&path).await,
            Err(AppError::MetadataSectionMissing { .. })
        ));
    }
}
