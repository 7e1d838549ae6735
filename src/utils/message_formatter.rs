/// Pure functions for birthday embed text (Discord-agnostic)
use crate::constants::EMBED_DESCRIPTION_LIMIT;
use crate::utils::messages::format_user;

/// Discord timestamp markup, rendered in each reader's local time
pub fn discord_timestamp(unix: i64, style: char) -> String {
    format!("<t:{}:{}>", unix, style)
}

pub fn build_added_description(user_id: &str, name: &str, date: &str) -> String {
    format!(
        "{} Your birthday on **{}** has been successfully added!",
        format_user(user_id, name),
        date
    )
}

pub fn build_removed_description(user_id: &str, name: &str) -> String {
    format!(
        "{} Your birthday has been successfully removed.",
        format_user(user_id, name)
    )
}

/// Describe a stored birthday and when it next comes around
pub fn build_check_description(
    user_id: &str,
    name: &str,
    birth_unix: i64,
    next_unix: Option<i64>,
) -> String {
    let next = next_unix
        .map(|ts| discord_timestamp(ts, 'R'))
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{} has their birthday set on **{}** (next birthday: {})",
        format_user(user_id, name),
        discord_timestamp(birth_unix, 'F'),
        next
    )
}

pub fn build_age_description(user_id: &str, name: &str, age: i32) -> String {
    format!("{} is **{}** years old.", format_user(user_id, name), age)
}

/// One line of the birthday list
pub fn build_list_line(user_id: &str, next_unix: Option<i64>, date: &str) -> String {
    match next_unix {
        Some(ts) => format!(
            "- <@{}> **{}** ({})",
            user_id,
            discord_timestamp(ts, 'F'),
            discord_timestamp(ts, 'R')
        ),
        None => format!("<@{}> (Error processing birthday) - {}", user_id, date),
    }
}

/// Join list lines into one embed description.
///
/// Lines that would push the description past Discord's limit are dropped
/// and counted in a closing "and N more" line.
pub fn build_list_description(lines: &[String]) -> String {
    if lines.is_empty() {
        return "No birthdays registered yet. Add yours with **!birthday add DD/MM/YYYY**.".to_string();
    }

    let reserve = LIST_SEPARATOR.len() + build_more_line(lines.len()).chars().count();
    let mut description = String::new();
    let mut length = 0;

    for (shown, line) in lines.iter().enumerate() {
        let separator = if shown == 0 { 0 } else { LIST_SEPARATOR.len() };
        let added = separator + line.chars().count();
        let budget = if shown + 1 == lines.len() {
            EMBED_DESCRIPTION_LIMIT
        } else {
            EMBED_DESCRIPTION_LIMIT - reserve
        };

        if length + added > budget {
            if shown > 0 {
                description.push_str(LIST_SEPARATOR);
            }
            description.push_str(&build_more_line(lines.len() - shown));
            return description;
        }

        if shown > 0 {
            description.push_str(LIST_SEPARATOR);
        }
        description.push_str(line);
        length += added;
    }

    description
}

const LIST_SEPARATOR: &str = "\n\n";

fn build_more_line(hidden: usize) -> String {
    format!("…and {} more", hidden)
}

pub fn build_help_text() -> String {
    "**Commands**:\n\
    - **!birthday add DD/MM/YYYY**: Add your birthday.\n\
    - **!birthday remove**: Remove your birthday.\n\
    - **!birthday check [@user]**: Check a birthday.\n\
    - **!birthday age [@user]**: Check someone's age.\n\
    - **!birthday list**: List all birthdays."
        .to_string()
}

/// Body of the daily announcement for one celebrant
pub fn build_announcement_description(name: &str, age: i32) -> String {
    format!(
        "Everyone, let's wish a very happy birthday to {}! 🎂🎈\nThey turned {} today!",
        name, age
    )
}
