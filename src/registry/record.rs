use serde::{Deserialize, Serialize};

use crate::utils::datetime::format_date_input;

/// A registered birthday for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayRecord {
    pub user_id: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    /// Display name cached at registration time
    pub name: String,
}

impl BirthdayRecord {
    /// Birth date as entered, e.g. "5/3/1990"
    pub fn date_string(&self) -> String {
        format_date_input(self.day, self.month, self.year)
    }

    pub(crate) fn to_stored(&self) -> StoredBirthday {
        StoredBirthday {
            date: self.date_string(),
            year: self.year,
            month: self.month,
            day: self.day,
            name: self.name.clone(),
        }
    }

    pub(crate) fn from_stored(user_id: String, stored: StoredBirthday) -> Self {
        Self {
            user_id,
            day: stored.day,
            month: stored.month,
            year: stored.year,
            name: stored.name,
        }
    }
}

/// On-disk shape of a record, keyed by user id in the registry file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredBirthday {
    pub date: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub name: String,
}
