//! JSON export of the full catalog

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::{Catalog, Section};
use crate::version;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Document written by the export action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogExport<'a> {
    pub title: &'static str,
    pub exported_at: DateTime<Utc>,
    pub version: &'static str,
    pub sections: &'a [Section],
}

impl<'a> CatalogExport<'a> {
    pub fn new(catalog: &'a Catalog, exported_at: DateTime<Utc>) -> Self {
        Self {
            title: "PM Genius Prompt Library",
            exported_at,
            version: version::VERSION,
            sections: catalog.sections(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// File name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("pm-genius-prompts-{}.json", date.format("%Y-%m-%d"))
}

/// Write the catalog into `dir` under the dated file name, creating the
/// directory first when needed. Returns the path written.
pub fn export_to_dir(catalog: &Catalog, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let now = Utc::now();
    write_export(catalog, &dir.join(export_file_name(now.date_naive())), now)
}

/// Write the catalog as JSON to `output`. A path with a file extension is
/// written as-is; anything else is treated as a directory.
pub fn export_catalog(catalog: &Catalog, output: &Path) -> Result<PathBuf, ExportError> {
    if output.is_dir() || output.extension().is_none() {
        return export_to_dir(catalog, output);
    }
    write_export(catalog, output, Utc::now())
}

fn write_export(catalog: &Catalog, path: &Path, now: DateTime<Utc>) -> Result<PathBuf, ExportError> {
    let json = CatalogExport::new(catalog, now).to_json()?;
    std::fs::write(path, json).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Exported {} sections to {}", catalog.sections().len(), path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "pm-genius-prompts-2026-03-07.json");
    }

    #[test]
    fn test_export_document_shape() {
        let catalog = Catalog::builtin();
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let json = CatalogExport::new(&catalog, at).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "PM Genius Prompt Library");
        assert_eq!(value["version"], version::VERSION);
        assert!(value["exportedAt"].as_str().unwrap().starts_with("2026-01-02T03:04:05"));
        assert_eq!(value["sections"].as_array().unwrap().len(), 9);
        assert_eq!(value["sections"][3]["category"], "SAFe");

        let py_auth = &value["sections"][7]["items"][0];
        assert_eq!(py_auth["id"], "py-auth");
        assert_eq!(py_auth["codeSnippet"]["language"], "python");
    }

    #[test]
    fn test_export_into_directory() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::builtin();

        let path = export_catalog(&catalog, dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pm-genius-prompts-"));
        assert!(name.ends_with(".json"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Full WBS Generation"));
    }

    #[test]
    fn test_export_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let exports = dir.path().join("exports").join("pm");

        let path = export_to_dir(&Catalog::builtin(), &exports).unwrap();
        assert!(exports.is_dir());
        assert_eq!(path.parent(), Some(exports.as_path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pm-genius-prompts-") && name.ends_with(".json"));
        assert!(path.is_file());
    }

    #[test]
    fn test_export_path_without_extension_is_a_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("exports");

        let path = export_catalog(&Catalog::builtin(), &target).unwrap();
        assert!(target.is_dir());
        assert!(path.starts_with(&target));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("pm-genius-prompts-"));
    }

    #[test]
    fn test_export_to_explicit_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("custom.json");
        let path = export_catalog(&Catalog::builtin(), &target).unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }

    #[test]
    fn test_export_write_failure() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("out.json");
        let err = export_catalog(&Catalog::builtin(), &target).unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
