// Command modules
mod birthday;
mod parser;

// Re-export the command surface
pub use birthday::{Member, Reply, execute};
pub use parser::{BirthdayCommand, parse_command};
