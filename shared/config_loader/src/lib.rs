//! # Config Loader
//!
//! Locates configuration files on disk and decodes JSON ones into typed values.
//!
//! ```no_run
//! use config_loader::{find_and_load_json, load_config_file};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct AppConfig {
//!     device_index: i32,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Search the usual locations and decode
//!     let config: AppConfig = find_and_load_json("controller_config.json")?;
//!
//!     // Or read raw text from an explicit path
//!     let raw = load_config_file("./config/controller_config.json")?;
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a configuration file into a string without interpreting it.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))
}

/// Reads and decodes a JSON configuration file.
///
/// # Errors
///
/// [`ConfigError::FileNotFound`] / [`ConfigError::ReadError`] for I/O problems,
/// [`ConfigError::Parse`] when the document does not match `T`.
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = load_config_file(path)?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Searches common locations for a configuration file.
///
/// Search order:
/// 1. `CONFIG_PATH` environment variable (if set and existing)
/// 2. `./config/{filename}`
/// 3. `./{filename}`
pub fn find_config_file(filename: &str) -> Result<PathBuf> {
    if let Ok(path) = env::var("CONFIG_PATH") {
        let path_buf = PathBuf::from(&path);
        if path_buf.exists() {
            return Ok(path_buf);
        }
    }

    let config_dir = PathBuf::from("./config").join(filename);
    if config_dir.exists() {
        return Ok(config_dir);
    }

    let current_dir = PathBuf::from("./").join(filename);
    if current_dir.exists() {
        return Ok(current_dir);
    }

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found. Searched: CONFIG_PATH env var, ./config/{}, ./{}",
        filename, filename, filename
    )))
}

/// [`find_config_file`] followed by [`load_config_file`].
pub fn find_and_load(filename: &str) -> Result<String> {
    let path = find_config_file(filename)?;
    load_config_file(path)
}

/// [`find_config_file`] followed by [`load_json`].
pub fn find_and_load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = find_config_file(filename)?;
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        retries: u32,
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_find_nonexistent_file() {
        let result = find_config_file("file_that_definitely_does_not_exist_12345.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_json_decodes_typed_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.json");
        fs::write(&path, r#"{ "name": "cam", "retries": 3 }"#).unwrap();

        let sample: Sample = load_json(&path).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "cam".to_string(),
                retries: 3
            }
        );
    }

    #[test]
    fn test_load_json_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "name": "cam" }"#).unwrap();

        let result: Result<Sample> = load_json(&path);
        match result {
            Err(ConfigError::Parse { path: p, message }) => {
                assert!(p.ends_with("broken.json"));
                assert!(message.contains("retries"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
