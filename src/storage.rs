use crate::error::ShiftResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed store for tokens kept between runs, one JSON file per key
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }

    /// Load a value, `None` if nothing is stored under the key
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> ShiftResult<Option<T>> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> ShiftResult<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(value)?;
        fs::write(self.path(key), content)?;
        Ok(())
    }
}
