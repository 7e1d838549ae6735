mod commands;
mod config;
mod constants;
mod error;
mod handlers;
mod models;
mod registry;
mod schedule;
mod utils;

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    config::load_configuration,
    constants::LOG_DIRECTIVE,
    handlers::handle_message,
    models::{Data, Error},
    registry::{JsonStore, Registry},
    schedule::start_schedule_manager,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    // Load configuration from environment
    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Load the birthday registry; an absent file starts empty
    let registry = match Registry::load(JsonStore::new(&config.birthdays_file)).await {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to load birthdays: {}", e);
            std::process::exit(1);
        }
    };

    let data = Data::new(registry, config.settings);

    // Create and start the bot
    if let Err(e) = start_bot(config.discord_token, data).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the logging system
fn initialize_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse().expect("valid log directive")),
        )
        .init();
}

/// Create and start the Discord bot
async fn start_bot(token: String, data: Data) -> Result<(), Error> {
    // Wrap data in Arc for sharing with the schedule manager
    let data_for_framework = Arc::new(data);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, _framework: poise::FrameworkContext<'_, Data, Error>, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        handle_message(ctx, new_message, data).await;
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            let http = ctx.http.clone();
            start_schedule_manager(http, Arc::clone(&data_for_framework));
            info!("Schedule manager task started");

            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                Ok((*data_for_framework).clone())
            })
        })
        .build();

    // Message commands need content access; role reconciliation lists members
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;

    Ok(())
}
