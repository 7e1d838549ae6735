use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use tracing::{error, info};

use super::parser::BirthdayCommand;
use crate::config::BirthdaySettings;
use crate::constants::{COLOR_ADDED, COLOR_INFO, COLOR_REMOVED};
use crate::error::BirthdayError;
use crate::registry::{BirthdayRecord, Registry};
use crate::utils::datetime::{
    calculate_age, local_datetime, next_occurrence, parse_date_argument,
};
use crate::utils::message_formatter::{
    build_added_description, build_age_description, build_check_description, build_help_text,
    build_list_description, build_list_line, build_removed_description,
};
use crate::utils::messages::{
    build_already_set_error, build_date_format_help, build_invalid_date_error,
    build_not_set_error, build_storage_error, build_target_not_set, build_unreadable_birthday,
};

/// A chat user as seen by the command layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
}

/// What the bot answers with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain reply to the invoking message
    Text(String),
    /// Embed posted in the invoking channel
    Embed {
        title: &'static str,
        description: String,
        color: u32,
    },
}

/// Run one birthday command for `author`.
///
/// `target` is the first mentioned user, used by `check` and `age`.
/// Command errors become replies; nothing here fails the caller.
pub async fn execute(
    command: &BirthdayCommand,
    registry: &Registry,
    settings: &BirthdaySettings,
    author: &Member,
    target: Option<&Member>,
    now: DateTime<Tz>,
) -> Reply {
    match command {
        BirthdayCommand::Add(date) => add(registry, author, date.as_deref()).await,
        BirthdayCommand::Remove => remove(registry, author).await,
        BirthdayCommand::Check => check(registry, settings, target.unwrap_or(author), now).await,
        BirthdayCommand::Age => age(registry, target.unwrap_or(author), now).await,
        BirthdayCommand::List => list(registry, settings, now).await,
        BirthdayCommand::Help => Reply::Embed {
            title: "Birthday Bot Help 🎂",
            description: build_help_text(),
            color: COLOR_INFO,
        },
    }
}

async fn add(registry: &Registry, author: &Member, date: Option<&str>) -> Reply {
    let Some((day, month, year)) = date.and_then(parse_date_argument) else {
        return Reply::Text(build_date_format_help());
    };

    match registry.add(&author.id, &author.name, day, month, year).await {
        Ok(record) => Reply::Embed {
            title: "Birthday Added 🎉",
            description: build_added_description(&author.id, &author.name, &record.date_string()),
            color: COLOR_ADDED,
        },
        Err(BirthdayError::InvalidDate(_)) => Reply::Text(build_invalid_date_error()),
        Err(BirthdayError::AlreadyExists(_)) => {
            Reply::Text(build_already_set_error(&author.id, &author.name))
        }
        Err(e) => {
            error!("Failed to add birthday for user {}: {}", author.id, e);
            Reply::Text(build_storage_error())
        }
    }
}

async fn remove(registry: &Registry, author: &Member) -> Reply {
    match registry.remove(&author.id).await {
        Ok(_) => Reply::Embed {
            title: "Birthday Removed 🗑️",
            description: build_removed_description(&author.id, &author.name),
            color: COLOR_REMOVED,
        },
        Err(BirthdayError::NotFound(_)) => {
            Reply::Text(build_not_set_error(&author.id, &author.name))
        }
        Err(e) => {
            error!("Failed to remove birthday for user {}: {}", author.id, e);
            Reply::Text(build_storage_error())
        }
    }
}

async fn check(
    registry: &Registry,
    settings: &BirthdaySettings,
    target: &Member,
    now: DateTime<Tz>,
) -> Reply {
    let Some(record) = registry.get(&target.id).await else {
        return Reply::Text(build_target_not_set(&target.id, &target.name));
    };

    let Some(birth_date) = NaiveDate::from_ymd_opt(record.year, record.month, record.day) else {
        error!("Stored birthday {} of user {} is not a date", record.date_string(), record.user_id);
        return Reply::Text(build_unreadable_birthday(&target.id, &target.name, &record.date_string()));
    };

    let birth = local_datetime(&settings.timezone, birth_date.and_time(settings.occurrence_time));
    let next = next_occurrence(record.day, record.month, &now, settings.occurrence_time);

    Reply::Embed {
        title: "Birthday Check 🎂",
        description: build_check_description(
            &target.id,
            &target.name,
            birth.timestamp(),
            next.map(|dt| dt.timestamp()),
        ),
        color: COLOR_INFO,
    }
}

async fn age(registry: &Registry, target: &Member, now: DateTime<Tz>) -> Reply {
    let Some(record) = registry.get(&target.id).await else {
        return Reply::Text(build_target_not_set(&target.id, &target.name));
    };

    let age = calculate_age(record.day, record.month, record.year, now.date_naive());
    Reply::Embed {
        title: "Birthday Age 🎂",
        description: build_age_description(&target.id, &target.name, age),
        color: COLOR_INFO,
    }
}

async fn list(registry: &Registry, settings: &BirthdaySettings, now: DateTime<Tz>) -> Reply {
    let records = registry.list_all().await;
    let lines: Vec<String> = upcoming_order(records, &now, settings)
        .into_iter()
        .map(|(record, next)| build_list_line(&record.user_id, next, &record.date_string()))
        .collect();

    info!("Listing {} birthday(s)", lines.len());
    Reply::Embed {
        title: "Birthday List 🎂",
        description: build_list_description(&lines),
        color: COLOR_INFO,
    }
}

/// Pair each record with its next occurrence, soonest first.
///
/// Records without a computable occurrence go last; ties keep registry order.
fn upcoming_order(
    records: Vec<BirthdayRecord>,
    now: &DateTime<Tz>,
    settings: &BirthdaySettings,
) -> Vec<(BirthdayRecord, Option<i64>)> {
    let mut entries: Vec<_> = records
        .into_iter()
        .map(|record| {
            let next = next_occurrence(record.day, record.month, now, settings.occurrence_time)
                .map(|dt| dt.timestamp());
            (record, next)
        })
        .collect();

    entries.sort_by_key(|(_, next)| next.map_or((1, 0), |ts| (0, ts)));
    entries
}
