use async_trait::async_trait;
use poise::serenity_prelude::{
    self as serenity, ChannelId, ChannelType, CreateEmbed, CreateMessage, GuildChannel, GuildId,
    RoleId, UserId,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::platform::{Announcement, BirthdayPlatform};
use crate::config::BirthdaySettings;
use crate::constants::COLOR_ANNOUNCEMENT;
use crate::error::BirthdayError;
use crate::utils::message_formatter::build_announcement_description;

/// Members fetched per page when listing role holders
const MEMBER_PAGE_SIZE: u64 = 1000;

const ROLE_AUDIT_REASON: &str = "Birthday role update";

/// Discord-backed platform for the configured channel and role
pub struct DiscordPlatform {
    http: Arc<serenity::Http>,
    channel_id: ChannelId,
    role_id: RoleId,
    /// Guild owning the announcement channel, looked up once
    guild_id: OnceCell<GuildId>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<serenity::Http>, settings: &BirthdaySettings) -> Self {
        Self {
            http,
            channel_id: ChannelId::new(settings.channel_id),
            role_id: RoleId::new(settings.role_id),
            guild_id: OnceCell::new(),
        }
    }

    fn channel_error(&self, reason: impl ToString) -> BirthdayError {
        BirthdayError::ChannelResolutionFailed {
            channel_id: self.channel_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Fetch the announcement channel, which must be a guild text channel
    async fn text_channel(&self) -> Result<GuildChannel, BirthdayError> {
        let channel = self
            .channel_id
            .to_channel(&self.http)
            .await
            .map_err(|e| self.channel_error(e))?
            .guild()
            .ok_or_else(|| self.channel_error("not a guild channel"))?;

        if channel.kind != ChannelType::Text {
            return Err(self.channel_error("not a text channel"));
        }
        Ok(channel)
    }

    async fn guild_id(&self) -> Result<GuildId, BirthdayError> {
        self.guild_id
            .get_or_try_init(|| async { self.text_channel().await.map(|c| c.guild_id) })
            .await
            .copied()
    }
}

fn parse_user_id(user_id: &str) -> Option<UserId> {
    user_id
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(UserId::new)
}

#[async_trait]
impl BirthdayPlatform for DiscordPlatform {
    async fn resolve_user(&self, user_id: &str) -> Result<String, BirthdayError> {
        let identity_error = |reason: String| BirthdayError::IdentityResolutionFailed {
            user_id: user_id.to_string(),
            reason,
        };

        let id = parse_user_id(user_id).ok_or_else(|| identity_error("malformed id".into()))?;
        let guild_id = self.guild_id().await?;
        let member = guild_id
            .member(&self.http, id)
            .await
            .map_err(|e| identity_error(e.to_string()))?;

        Ok(member.display_name().to_string())
    }

    async fn announce(&self, announcement: &Announcement) -> Result<(), BirthdayError> {
        let channel = self.text_channel().await?;

        let embed = CreateEmbed::new()
            .title("🎉 Happy Birthday! 🎉")
            .description(build_announcement_description(
                &announcement.name,
                announcement.age,
            ))
            .colour(COLOR_ANNOUNCEMENT);
        let message = CreateMessage::new()
            .content(format!("<@{}>", announcement.user_id))
            .embed(embed);

        channel
            .send_message(&self.http, message)
            .await
            .map_err(|e| BirthdayError::DeliveryFailed(e.to_string()))?;
        Ok(())
    }

    async fn role_holders(&self) -> Result<Vec<String>, BirthdayError> {
        let guild_id = self.guild_id().await?;
        let mut holders = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild_id
                .members(&self.http, Some(MEMBER_PAGE_SIZE), after)
                .await
                .map_err(|e| self.channel_error(format!("failed to list members: {}", e)))?;

            let full_page = page.len() as u64 == MEMBER_PAGE_SIZE;
            after = page.last().map(|m| m.user.id);
            holders.extend(
                page.iter()
                    .filter(|m| m.roles.contains(&self.role_id))
                    .map(|m| m.user.id.to_string()),
            );

            if !full_page || after.is_none() {
                break;
            }
        }

        Ok(holders)
    }

    async fn grant_role(&self, user_id: &str) -> Result<(), BirthdayError> {
        let role_error = |reason: String| BirthdayError::RoleUpdateFailed {
            user_id: user_id.to_string(),
            reason,
        };

        let id = parse_user_id(user_id).ok_or_else(|| role_error("malformed id".into()))?;
        let guild_id = self.guild_id().await?;
        self.http
            .add_member_role(guild_id, id, self.role_id, Some(ROLE_AUDIT_REASON))
            .await
            .map_err(|e| role_error(e.to_string()))
    }

    async fn revoke_role(&self, user_id: &str) -> Result<(), BirthdayError> {
        let role_error = |reason: String| BirthdayError::RoleUpdateFailed {
            user_id: user_id.to_string(),
            reason,
        };

        let id = parse_user_id(user_id).ok_or_else(|| role_error("malformed id".into()))?;
        let guild_id = self.guild_id().await?;
        self.http
            .remove_member_role(guild_id, id, self.role_id, Some(ROLE_AUDIT_REASON))
            .await
            .map_err(|e| role_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("123"), Some(UserId::new(123)));
        assert_eq!(parse_user_id("0"), None);
        assert_eq!(parse_user_id("abc"), None);
        assert_eq!(parse_user_id(""), None);
    }
}
