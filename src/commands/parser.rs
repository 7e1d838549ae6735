/// Tokenizer for `!birthday` text commands (Discord-agnostic)
use crate::constants::COMMAND_PREFIX;

/// A recognised birthday command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayCommand {
    /// Raw date argument, if one was given
    Add(Option<String>),
    Remove,
    Check,
    Age,
    List,
    Help,
}

/// Parse a message into a command.
///
/// Returns `None` for messages that are not birthday commands or name an
/// unknown action. Tokens after the ones an action uses are ignored.
pub fn parse_command(content: &str) -> Option<BirthdayCommand> {
    let mut tokens = content.split_whitespace();
    if tokens.next()? != COMMAND_PREFIX {
        return None;
    }

    let command = match tokens.next()? {
        "add" => BirthdayCommand::Add(tokens.next().map(str::to_string)),
        "remove" => BirthdayCommand::Remove,
        "check" => BirthdayCommand::Check,
        "age" => BirthdayCommand::Age,
        "list" => BirthdayCommand::List,
        "help" => BirthdayCommand::Help,
        _ => return None,
    };

    Some(command)
}
