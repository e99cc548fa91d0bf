//! Whole-document JSON persistence.
//!
//! Every write goes through a temp file + rename so an interrupted save never
//! leaves a truncated document behind. There is no locking: concurrent writers
//! race and the last rename wins.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{NudgeError, Result};

/// Read and parse a JSON document.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`NudgeError::ConfigParse`] when the file exists but cannot be
/// parsed, or an I/O error when it cannot be read.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| NudgeError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Serialize `data` as pretty JSON and write it atomically.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(data)?;
    write_atomic(path, content.as_bytes())?;
    Ok(())
}

/// Write bytes atomically using temp file + rename.
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("nudge"),
        std::process::id()
    ));

    {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn write_then_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/doc.json");
        let doc = Doc {
            name: "water".to_string(),
            count: 8,
        };

        write_json(&path, &doc).unwrap();
        let read: Option<Doc> = read_json(&path).unwrap();
        assert_eq!(read, Some(doc));
    }

    #[test]
    fn missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let read: Option<Doc> = read_json(&tmp.path().join("absent.json")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_json::<Doc>(&path).unwrap_err();
        assert!(matches!(err, NudgeError::ConfigParse { .. }));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("atomic.json");
        write_atomic(&path, b"{}").unwrap();

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
