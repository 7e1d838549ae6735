use std::sync::Arc;

use crate::config::BirthdaySettings;
use crate::registry::Registry;

/// Bot state shared across all handlers
#[derive(Clone)]
pub struct Data {
    /// Birthday registry backed by the JSON file
    pub registry: Arc<Registry>,
    pub settings: BirthdaySettings,
}

impl Data {
    pub fn new(registry: Registry, settings: BirthdaySettings) -> Self {
        Self {
            registry: Arc::new(registry),
            settings,
        }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
