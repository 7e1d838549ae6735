use chrono::Utc;
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateMessage};
use tracing::{debug, error};

use crate::{
    commands::{BirthdayCommand, Member, Reply, execute, parse_command},
    models::{Data, Error},
};

/// Handle a chat message, answering `!birthday` commands
pub async fn handle_message(ctx: &serenity::Context, message: &serenity::Message, data: &Data) {
    let Some(command) = command_for(message.author.bot, &message.content) else {
        return;
    };

    debug!(
        "User {} ran {:?} in channel {}",
        message.author.id, command, message.channel_id
    );

    let author = member_from(&message.author);
    let target = message.mentions.first().map(member_from);
    let now = Utc::now().with_timezone(&data.settings.timezone);

    let reply = execute(
        &command,
        &data.registry,
        &data.settings,
        &author,
        target.as_ref(),
        now,
    )
    .await;

    if let Err(e) = send_reply(ctx, message, reply).await {
        error!(
            "Failed to answer {:?} for user {} in channel {}: {}",
            command, message.author.id, message.channel_id, e
        );
    }
}

/// The command a message asks for; messages from bots are never commands
fn command_for(author_is_bot: bool, content: &str) -> Option<BirthdayCommand> {
    if author_is_bot {
        return None;
    }
    parse_command(content)
}

fn member_from(user: &serenity::User) -> Member {
    Member {
        id: user.id.to_string(),
        name: user.name.clone(),
    }
}

async fn send_reply(
    ctx: &serenity::Context,
    message: &serenity::Message,
    reply: Reply,
) -> Result<(), Error> {
    match reply {
        Reply::Text(text) => {
            message.reply(ctx, text).await?;
        }
        Reply::Embed {
            title,
            description,
            color,
        } => {
            let embed = CreateEmbed::new()
                .title(title)
                .description(description)
                .colour(color);
            message
                .channel_id
                .send_message(ctx, CreateMessage::new().embed(embed))
                .await?;
        }
    }

    Ok(())
}
