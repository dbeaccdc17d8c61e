use common::types::UserId;

use crate::models::InviteLink;

use super::{Result, DB};

impl DB {
    pub async fn get_invite_link(&self, user_id: UserId) -> Option<InviteLink> {
        self.tables.invite_links.get(&user_id.to_string()).await
    }
    /// Save link as the user's current one. Returns the record it replaced
    pub async fn put_invite_link(&self, link: InviteLink) -> Result<Option<InviteLink>> {
        let key = link.user_id().to_string();
        log::debug!("saving invite link for user {key}, order {}", link.order_id());
        self.tables
            .invite_links
            .update(|links| (links.insert(key, link), true))
            .await
    }
}
