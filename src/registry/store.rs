use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};
use tracing::{debug, info};
use uuid::Uuid;

use super::record::{BirthdayRecord, StoredBirthday};
use crate::error::BirthdayError;

/// Full-snapshot JSON file backing the registry
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order. A missing file is an empty registry.
    pub async fn load(&self) -> Result<Vec<BirthdayRecord>, BirthdayError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No birthday file at {}, starting with an empty registry",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(BirthdayError::storage(&self.path, e)),
        };

        decode(&bytes).map_err(|e| BirthdayError::storage(&self.path, e))
    }

    /// Rewrite the whole file with `records`.
    ///
    /// The snapshot goes to a sibling temp file first and is renamed over
    /// the real one, so readers never observe a half-written file.
    pub async fn save(&self, records: &[BirthdayRecord]) -> Result<(), BirthdayError> {
        let bytes = encode(records).map_err(|e| BirthdayError::storage(&self.path, e))?;
        let tmp = self.temp_path();

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| BirthdayError::storage(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BirthdayError::storage(&self.path, e))?;

        debug!("Saved {} birthday(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Sibling temp file, unique per save so concurrent writers never share one
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "birthdays.json".into());
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

/// Serialize records as a user id keyed object, 4-space indented
pub fn encode(records: &[BirthdayRecord]) -> Result<Vec<u8>, serde_json::Error> {
    let mut map = Map::new();
    for record in records {
        map.insert(record.user_id.clone(), serde_json::to_value(record.to_stored())?);
    }

    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    Value::Object(map).serialize(&mut serializer)?;
    Ok(out)
}

/// Parse a registry file, keeping the order of its keys
pub fn decode(bytes: &[u8]) -> Result<Vec<BirthdayRecord>, serde_json::Error> {
    let map: Map<String, Value> = serde_json::from_slice(bytes)?;

    map.into_iter()
        .map(|(user_id, value)| {
            let stored: StoredBirthday = serde_json::from_value(value)?;
            Ok(BirthdayRecord::from_stored(user_id, stored))
        })
        .collect()
}
