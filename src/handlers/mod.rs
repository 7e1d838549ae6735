/// Handler modules for Discord events
mod message;

// Re-export main handler functions
pub use message::handle_message;
