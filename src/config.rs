use std::path::PathBuf;

use chrono::NaiveTime;
use chrono_tz::Tz;
use tracing::info;

use crate::constants::{
    DEFAULT_ANNOUNCE_TIME, DEFAULT_BIRTHDAYS_FILE, DEFAULT_OCCURRENCE_TIME, DEFAULT_TIMEZONE,
};
use crate::utils::timezone::{parse_time_string, parse_timezone};

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub birthdays_file: PathBuf,
    pub settings: BirthdaySettings,
}

/// Where and when birthdays are announced
#[derive(Debug, Clone)]
pub struct BirthdaySettings {
    pub channel_id: u64,
    pub role_id: u64,
    pub timezone: Tz,
    /// Local time of the daily reconciliation
    pub announce_time: NaiveTime,
    /// Local time of day used when displaying occurrences
    pub occurrence_time: NaiveTime,
}

/// Load configuration from the process environment
pub fn load_configuration() -> Result<Config, Box<dyn std::error::Error>> {
    load_from(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_from<F>(lookup: F) -> Result<Config, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let discord_token = lookup("DISCORD_TOKEN")
        .ok_or("DISCORD_TOKEN environment variable not set. Set it with: export DISCORD_TOKEN=your_bot_token")?;

    let channel_id = require_id(&lookup, "BIRTHDAY_CHANNEL_ID")?;
    let role_id = require_id(&lookup, "BIRTHDAY_ROLE_ID")?;

    let birthdays_file = lookup("BIRTHDAYS_FILE")
        .unwrap_or_else(|| DEFAULT_BIRTHDAYS_FILE.to_string())
        .into();

    let timezone = parse_timezone(
        &lookup("BIRTHDAY_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
    )
    .map_err(|e| format!("BIRTHDAY_TIMEZONE: {}", e))?;

    let announce_time = parse_time_string(
        &lookup("BIRTHDAY_ANNOUNCE_TIME").unwrap_or_else(|| DEFAULT_ANNOUNCE_TIME.to_string()),
    )
    .map_err(|e| format!("BIRTHDAY_ANNOUNCE_TIME: {}", e))?;

    let occurrence_time = parse_time_string(
        &lookup("BIRTHDAY_OCCURRENCE_TIME").unwrap_or_else(|| DEFAULT_OCCURRENCE_TIME.to_string()),
    )
    .map_err(|e| format!("BIRTHDAY_OCCURRENCE_TIME: {}", e))?;

    info!(
        "Birthdays announced daily at {} {} in channel {}",
        announce_time.format("%H:%M"),
        timezone,
        channel_id
    );

    Ok(Config {
        discord_token,
        birthdays_file,
        settings: BirthdaySettings {
            channel_id,
            role_id,
            timezone,
            announce_time,
            occurrence_time,
        },
    })
}

fn require_id<F>(lookup: &F, key: &str) -> Result<u64, String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).ok_or_else(|| format!("{} environment variable not set", key))?;
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| format!("{} must be a Discord snowflake id, got '{}'", key, raw))
}
