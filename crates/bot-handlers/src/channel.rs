use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId};

use orders::{InviteMinter, InviteRequest, MintError};

/// Invite links of the private channel, minted by the bot itself. The bot
/// must be a channel admin allowed to invite users
#[derive(Debug, Clone)]
pub struct ChannelInvites {
    bot: Bot,
    channel: ChatId,
}

impl ChannelInvites {
    pub fn new(bot: Bot, channel: ChatId) -> Self {
        Self { bot, channel }
    }
}

#[async_trait]
impl InviteMinter for ChannelInvites {
    async fn create_invite(&self, request: &InviteRequest) -> Result<String, MintError> {
        let link = self
            .bot
            .create_chat_invite_link(self.channel)
            .expire_date(request.expire_at)
            .member_limit(request.member_limit)
            .name(request.name.clone())
            .await
            .map_err(MintError::new)?;
        log::debug!("created invite link '{}' in channel {}", request.name, self.channel);
        Ok(link.invite_link)
    }

    async fn revoke_invite(&self, link: &str) -> Result<(), MintError> {
        self.bot
            .revoke_chat_invite_link(self.channel, link)
            .await
            .map_err(MintError::new)?;
        Ok(())
    }
}
