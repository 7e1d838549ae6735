/// Prefix every birthday command starts with
pub const COMMAND_PREFIX: &str = "!birthday";

/// Default location of the birthday registry file
pub const DEFAULT_BIRTHDAYS_FILE: &str = "./birthdays.json";

/// Default timezone for all birthday date math
pub const DEFAULT_TIMEZONE: &str = "GMT";

/// Default local time of the daily birthday announcement (HH:MM)
pub const DEFAULT_ANNOUNCE_TIME: &str = "15:00";

/// Default local time of day shown for birthday occurrences (HH:MM)
pub const DEFAULT_OCCURRENCE_TIME: &str = "16:00";

/// Embed colors
pub const COLOR_INFO: u32 = 0x00FFFF;
pub const COLOR_ADDED: u32 = 0x34EB46;
pub const COLOR_REMOVED: u32 = 0xEB4034;
pub const COLOR_ANNOUNCEMENT: u32 = 0xFFFF00;

/// Longest embed description Discord accepts, in characters
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "birthday_bot=info";
