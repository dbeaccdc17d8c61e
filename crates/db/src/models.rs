use std::fmt::Display;

use serde::{Deserialize, Serialize};

use common::{types::UserId, DateTime};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    AwaitingApproval,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
    /// Order still waits for payment or for the admin
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::AwaitingApproval)
    }
    /// Legal lifecycle edges. Approved and rejected are terminal
    pub fn can_become(self, next: Self) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Pending, AwaitingApproval)
                | (Pending, Approved)
                | (AwaitingApproval, Approved)
                | (Pending, Rejected)
                | (AwaitingApproval, Rejected)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("order can't go from {from} to {to}")]
pub struct IllegalTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct Order {
    /// `ORD<unix seconds>`, bumped on collision when stored
    order_id: String,
    user_id: UserId,
    username: Option<String>,
    first_name: String,
    amount: u32,
    #[builder(default)]
    status: OrderStatus,
    created_at: DateTime,
    /// End of payment window
    expires_at: DateTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirmed_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejected_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reject_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invite_link: Option<String>,
}

impl Order {
    pub fn make_id(created_at: DateTime) -> String {
        format!("ORD{}", created_at.timestamp())
    }
    pub fn order_id(&self) -> &str {
        &self.order_id
    }
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
    pub fn first_name(&self) -> &str {
        &self.first_name
    }
    pub fn amount(&self) -> u32 {
        self.amount
    }
    pub fn status(&self) -> OrderStatus {
        self.status
    }
    pub fn created_at(&self) -> DateTime {
        self.created_at
    }
    pub fn expires_at(&self) -> DateTime {
        self.expires_at
    }
    pub fn confirmed_at(&self) -> Option<DateTime> {
        self.confirmed_at
    }
    pub fn approved_at(&self) -> Option<DateTime> {
        self.approved_at
    }
    pub fn rejected_at(&self) -> Option<DateTime> {
        self.rejected_at
    }
    pub fn reject_reason(&self) -> Option<&str> {
        self.reject_reason.as_deref()
    }
    pub fn invite_link(&self) -> Option<&str> {
        self.invite_link.as_deref()
    }
    pub fn is_expired(&self, now: DateTime) -> bool {
        now > self.expires_at
    }
    /// `@username` if known, first name otherwise
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(u) => format!("@{u}"),
            None => self.first_name.clone(),
        }
    }
    /// Give a stale pending order a fresh payment window
    pub fn renew(&mut self, expires_at: DateTime) {
        self.expires_at = expires_at;
    }
    pub fn mark_confirmed(&mut self, at: DateTime) -> Result<(), IllegalTransition> {
        self.transition(OrderStatus::AwaitingApproval)?;
        self.confirmed_at = Some(at);
        Ok(())
    }
    pub fn mark_approved(&mut self, at: DateTime, invite_link: String) -> Result<(), IllegalTransition> {
        self.transition(OrderStatus::Approved)?;
        self.approved_at = Some(at);
        self.invite_link = Some(invite_link);
        Ok(())
    }
    pub fn mark_rejected(&mut self, at: DateTime, reason: Option<String>) -> Result<(), IllegalTransition> {
        self.transition(OrderStatus::Rejected)?;
        self.rejected_at = Some(at);
        self.reject_reason = reason;
        Ok(())
    }
    fn transition(&mut self, to: OrderStatus) -> Result<(), IllegalTransition> {
        if !self.status.can_become(to) {
            return Err(IllegalTransition { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
    pub(crate) fn set_order_id(&mut self, id: String) {
        self.order_id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct Member {
    user_id: UserId,
    username: Option<String>,
    first_name: String,
    /// Order that granted access
    order_id: String,
    joined_at: DateTime,
    #[builder(default = true)]
    active: bool,
}

impl Member {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
    pub fn first_name(&self) -> &str {
        &self.first_name
    }
    pub fn order_id(&self) -> &str {
        &self.order_id
    }
    pub fn joined_at(&self) -> DateTime {
        self.joined_at
    }
    pub fn active(&self) -> bool {
        self.active
    }
}

/// Last invite link issued to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
pub struct InviteLink {
    user_id: UserId,
    link: String,
    order_id: String,
    created_at: DateTime,
    expires_at: DateTime,
    /// Redemption is enforced by the channel's member limit; this flag is
    /// only recorded
    #[builder(default)]
    used: bool,
    username: Option<String>,
}

impl InviteLink {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
    pub fn link(&self) -> &str {
        &self.link
    }
    pub fn order_id(&self) -> &str {
        &self.order_id
    }
    pub fn created_at(&self) -> DateTime {
        self.created_at
    }
    pub fn expires_at(&self) -> DateTime {
        self.expires_at
    }
    pub fn used(&self) -> bool {
        self.used
    }
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// What the bot is waiting for from a user between messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    /// Next photo from the user is payment evidence for the order
    AwaitingScreenshot { order_id: String, since: DateTime },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total_orders: usize,
    pub pending: usize,
    pub awaiting_approval: usize,
    pub approved: usize,
    pub rejected: usize,
    pub members: usize,
    pub invite_links: usize,
    /// Sum over approved orders
    pub revenue: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    use OrderStatus::*;

    #[test]
    fn test_status_transitions() {
        let all = [Pending, AwaitingApproval, Approved, Rejected];
        let legal = [
            (Pending, AwaitingApproval),
            (Pending, Approved),
            (Pending, Rejected),
            (AwaitingApproval, Approved),
            (AwaitingApproval, Rejected),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_become(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_status_json_names() {
        assert_eq!(serde_json::to_string(&AwaitingApproval).unwrap(), "\"awaiting_approval\"");
        assert_eq!(serde_json::from_str::<OrderStatus>("\"rejected\"").unwrap(), Rejected);
    }

    #[test]
    fn test_terminal_order_is_not_reopened() {
        let now = common::from_unix(1000);
        let mut order = Order::builder()
            .order_id(Order::make_id(now))
            .user_id(UserId(1))
            .first_name("U1".to_string())
            .amount(109)
            .created_at(now)
            .expires_at(now)
            .build();
        assert_eq!(order.order_id(), "ORD1000");

        order.mark_rejected(now, Some("no payment".to_string())).unwrap();
        let err = order.mark_approved(now, "https://t.me/+x".to_string()).unwrap_err();
        assert_eq!(err, IllegalTransition { from: Rejected, to: Approved });
        assert_eq!(order.status(), Rejected);
        assert!(order.invite_link().is_none());
    }
}
