//! JSON and file helpers.
//!
//! Paths ending in `.gz` are transparently gzip-compressed on write and
//! decompressed on read.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {e}")))
}

pub fn to_json_pretty<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {e}")))
}

pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }
    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {e}")))
}

#[must_use]
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Reads a file, gunzipping `.gz` paths.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }
    let raw = std::fs::read(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {}", path.display())))?;
    if !is_gzip_path(path) {
        return Ok(raw);
    }
    let mut decoded = Vec::new();
    GzDecoder::new(raw.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| IoError::compression(format!("{}: {e}", path.display())))?;
    Ok(decoded)
}

/// Writes a file, gzipping `.gz` paths.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let payload = if is_gzip_path(path) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(bytes)
            .and_then(|()| encoder.finish())
            .map_err(|e| IoError::compression(format!("{}: {e}", path.display())))?
    } else {
        bytes.to_vec()
    };
    std::fs::write(path, payload)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("writing {}", path.display())))
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = read_bytes(path)?;
    let json = String::from_utf8(bytes)
        .map_err(|e| IoError::validation(format!("Invalid UTF-8 in {}: {e}", path.display())))?;
    from_json(&json).map_err(|e| e.with_context(format!("parsing {}", path.display())))
}

pub fn write_json_file<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    write_bytes(path, to_json_pretty(data)?.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        weights: Vec<f32>,
    }

    fn sample() -> Sample {
        Sample {
            name: "algae".to_string(),
            weights: vec![0.1, -0.333_333_34, f32::MIN_POSITIVE],
        }
    }

    #[test]
    fn test_empty_json_fails() {
        assert!(matches!(from_json::<Sample>("  "), Err(IoError::Validation(_))));
    }

    #[test]
    fn test_gzip_detection() {
        assert!(is_gzip_path(Path::new("pool.json.gz")));
        assert!(is_gzip_path(Path::new("POOL.GZ")));
        assert!(!is_gzip_path(Path::new("pool.json")));
    }

    #[test]
    fn test_plain_and_gzip_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["sample.json", "sample.json.gz"] {
            let path = dir.path().join(name);
            write_json_file(&sample(), &path).unwrap();
            let restored: Sample = read_json_file(&path).unwrap();
            assert_eq!(restored, sample());
        }
        let raw = std::fs::read(dir.path().join("sample.json.gz")).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json_file::<Sample>(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
    }
}
