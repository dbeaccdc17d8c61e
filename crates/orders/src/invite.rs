use std::{fmt::Display, sync::Arc};

use async_trait::async_trait;
use chrono::Duration;

use common::{types::Customer, Cleanup, DateTime};
use db::{InviteLink, DB};

use crate::IssuanceError;

/// Each link admits exactly one member
pub const INVITE_MEMBER_LIMIT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRequest {
    pub expire_at: DateTime,
    pub member_limit: u32,
    /// Label shown in the channel's invite link list
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MintError(String);

impl MintError {
    pub fn new(e: impl Display) -> Self {
        Self(e.to_string())
    }
}

/// Channel management side: creates and revokes invite links of the private
/// channel
#[async_trait]
pub trait InviteMinter: Send + Sync {
    /// Create link, returns its url
    async fn create_invite(&self, request: &InviteRequest) -> Result<String, MintError>;

    async fn revoke_invite(&self, link: &str) -> Result<(), MintError>;
}

#[derive(Clone)]
pub struct InviteIssuer {
    minter: Arc<dyn InviteMinter>,
    db: DB,
    validity: Duration,
}

impl InviteIssuer {
    pub fn new(minter: Arc<dyn InviteMinter>, db: DB, validity_hours: u32) -> Self {
        Self {
            minter,
            db,
            validity: Duration::hours(validity_hours.into()),
        }
    }
    /// Best-effort revoke of a link that must not stay usable
    pub async fn revoke(&self, link: &str) {
        self.minter
            .revoke_invite(link)
            .await
            .cleanup("revoking invite link");
    }
    /// Mint a single-use link for the customer and record it as their current
    /// one. A link recorded earlier for the same user is revoked
    pub async fn issue(&self, customer: &Customer, order_id: &str, now: DateTime) -> Result<String, IssuanceError> {
        let request = InviteRequest {
            expire_at: now + self.validity,
            member_limit: INVITE_MEMBER_LIMIT,
            name: format!("User_{}_{}", customer.user_id, now.timestamp()),
        };

        let link = self.minter.create_invite(&request).await.map_err(|source| {
            log::warn!("failed to create invite link for order {order_id}: {source}");
            IssuanceError::Mint {
                order_id: order_id.to_owned(),
                source,
            }
        })?;

        let record = InviteLink::builder()
            .user_id(customer.user_id)
            .link(link.clone())
            .order_id(order_id.to_owned())
            .created_at(now)
            .expires_at(request.expire_at)
            .maybe_username(customer.username.clone())
            .build();

        let previous = match self.db.put_invite_link(record).await {
            Ok(previous) => previous,
            Err(source) => {
                // link nobody knows about must not stay usable
                self.minter
                    .revoke_invite(&link)
                    .await
                    .cleanup("revoking unrecorded invite link");
                return Err(IssuanceError::Store {
                    order_id: order_id.to_owned(),
                    source,
                });
            }
        };

        if let Some(previous) = previous.filter(|p| p.link() != link) {
            log::debug!("revoking previous link of user {}", customer.user_id);
            self.minter
                .revoke_invite(previous.link())
                .await
                .cleanup("revoking previous invite link");
        }

        log::info!("created single-use invite link for user {}, order {order_id}", customer.user_id);
        Ok(link)
    }
}
