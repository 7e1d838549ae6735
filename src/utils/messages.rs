/// Pure functions for formatting plain-text replies (Discord-agnostic)

/// Mention a user followed by their name, e.g. "<@123> (alice)"
pub fn format_user(user_id: &str, name: &str) -> String {
    format!("<@{}> ({})", user_id, name)
}

/// Reply for a missing or malformed date argument
pub fn build_date_format_help() -> String {
    "Please provide a date in DD/MM/YYYY format.".to_string()
}

/// Reply for a well-formed date that does not exist
pub fn build_invalid_date_error() -> String {
    "Invalid date. Please provide a valid date in DD/MM/YYYY format.".to_string()
}

/// Reply when the caller already has a birthday
pub fn build_already_set_error(user_id: &str, name: &str) -> String {
    format!(
        "{} You already have a birthday set, use **!birthday remove** to remove it then add a new one.",
        format_user(user_id, name)
    )
}

/// Reply when the caller has no birthday to remove
pub fn build_not_set_error(user_id: &str, name: &str) -> String {
    format!("{} You don't have a birthday set.", format_user(user_id, name))
}

/// Reply when someone looks up a user without a birthday
pub fn build_target_not_set(user_id: &str, name: &str) -> String {
    format!("{} doesn't have a birthday set.", format_user(user_id, name))
}

/// Reply when a stored birthday is not a real date
pub fn build_unreadable_birthday(user_id: &str, name: &str, date: &str) -> String {
    format!("{} (Error processing birthday) - {}", format_user(user_id, name), date)
}

/// Reply when the registry file could not be written (doesn't expose internals)
pub fn build_storage_error() -> String {
    "Could not save birthdays right now. Please try again later.".to_string()
}
