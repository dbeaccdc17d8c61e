use common::types::UserId;

use crate::models::Member;

use super::{Result, DB};

impl DB {
    pub async fn get_member(&self, user_id: UserId) -> Option<Member> {
        self.tables.members.get(&user_id.to_string()).await
    }
    pub async fn is_member(&self, user_id: UserId) -> bool {
        self.tables.members.contains(&user_id.to_string()).await
    }
    /// Save member if the user isn't one yet. Returns `false` and leaves the
    /// existing record untouched otherwise
    pub async fn put_member_once(&self, member: Member) -> Result<bool> {
        let key = member.user_id().to_string();
        let added = self
            .tables
            .members
            .update(|members| {
                if members.contains_key(&key) {
                    return (false, false);
                }
                members.insert(key.clone(), member);
                (true, true)
            })
            .await?;

        if added {
            log::info!("user {key} added to members");
        } else {
            log::debug!("user {key} is already a member");
        }
        Ok(added)
    }
    /// Members in join order
    pub async fn all_members(&self) -> Vec<Member> {
        let mut members = self
            .tables
            .members
            .read(|members| members.values().cloned().collect::<Vec<_>>())
            .await;
        members.sort_by_key(Member::joined_at);
        members
    }
}
