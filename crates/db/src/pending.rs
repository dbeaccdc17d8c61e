use common::types::UserId;

use crate::models::PendingAction;

use super::{Result, DB};

impl DB {
    pub async fn get_pending_action(&self, user_id: UserId) -> Option<PendingAction> {
        self.tables.pending_actions.get(&user_id.to_string()).await
    }
    pub async fn put_pending_action(&self, user_id: UserId, action: PendingAction) -> Result<()> {
        log::debug!("user {user_id} pending action: {action:?}");
        self.tables
            .pending_actions
            .update(|actions| {
                actions.insert(user_id.to_string(), action);
                ((), true)
            })
            .await
    }
    /// Remove and return pending action of the user
    pub async fn take_pending_action(&self, user_id: UserId) -> Result<Option<PendingAction>> {
        self.tables
            .pending_actions
            .update(|actions| {
                let action = actions.remove(&user_id.to_string());
                let changed = action.is_some();
                (action, changed)
            })
            .await
    }
}
