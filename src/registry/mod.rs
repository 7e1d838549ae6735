/// Birthday registry: an ordered in-memory map mirrored to a JSON file
mod record;
mod store;

pub use record::BirthdayRecord;
pub use store::JsonStore;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::BirthdayError;
use crate::utils::datetime::{date_exists, format_date_input};

/// Registry of birthdays keyed by user id.
///
/// Every mutation holds the lock across check, mutate and persist, so two
/// concurrent requests for the same user cannot both succeed and the file
/// always holds a complete snapshot.
pub struct Registry {
    store: JsonStore,
    records: Mutex<Vec<BirthdayRecord>>,
}

impl Registry {
    /// Load the registry from `store`, starting empty if the file is absent
    pub async fn load(store: JsonStore) -> Result<Self, BirthdayError> {
        let records = store.load().await?;
        info!(
            "Loaded {} birthday(s) from {}",
            records.len(),
            store.path().display()
        );

        Ok(Self {
            store,
            records: Mutex::new(records),
        })
    }

    /// Register a birthday for `user_id`
    pub async fn add(
        &self,
        user_id: &str,
        name: &str,
        day: u32,
        month: u32,
        year: i32,
    ) -> Result<BirthdayRecord, BirthdayError> {
        if !date_exists(year, month, day) {
            return Err(BirthdayError::InvalidDate(format_date_input(day, month, year)));
        }

        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.user_id == user_id) {
            return Err(BirthdayError::AlreadyExists(user_id.to_string()));
        }

        let record = BirthdayRecord {
            user_id: user_id.to_string(),
            day,
            month,
            year,
            name: name.to_string(),
        };
        records.push(record.clone());

        if let Err(e) = self.store.save(&records).await {
            records.pop();
            return Err(e);
        }

        info!("User {} set birthday to {}", user_id, record.date_string());
        Ok(record)
    }

    /// Remove the birthday of `user_id`, returning the removed record
    pub async fn remove(&self, user_id: &str) -> Result<BirthdayRecord, BirthdayError> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.user_id == user_id)
            .ok_or_else(|| BirthdayError::NotFound(user_id.to_string()))?;

        let removed = records.remove(index);
        if let Err(e) = self.store.save(&records).await {
            records.insert(index, removed);
            return Err(e);
        }

        info!("User {} removed their birthday", user_id);
        Ok(removed)
    }

    pub async fn get(&self, user_id: &str) -> Option<BirthdayRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned()
    }

    /// All records in insertion order
    pub async fn list_all(&self) -> Vec<BirthdayRecord> {
        self.records.lock().await.clone()
    }

    /// Replace the in-memory copy with the file's contents and return it.
    ///
    /// On failure the in-memory copy is kept as is.
    pub async fn reload(&self) -> Result<Vec<BirthdayRecord>, BirthdayError> {
        let mut records = self.records.lock().await;
        match self.store.load().await {
            Ok(loaded) => {
                *records = loaded;
                Ok(records.clone())
            }
            Err(e) => {
                warn!("Keeping in-memory birthdays, reload failed: {}", e);
                Err(e)
            }
        }
    }
}
