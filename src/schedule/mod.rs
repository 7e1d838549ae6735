/// Schedule management modules
mod birthday_tasks;
mod discord;
mod manager;
mod platform;

pub use manager::start_schedule_manager;
