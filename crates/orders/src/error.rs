use db::models::IllegalTransition;

use crate::MintError;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(String),
    #[error("order {0} belongs to another user")]
    NotOwner(String),
    #[error("payment window of order {0} has expired")]
    Expired(String),
    #[error("order {0} is already waiting for approval")]
    AlreadyConfirmed(String),
    #[error("order {order_id}: {source}")]
    InvalidTransition {
        order_id: String,
        #[source]
        source: IllegalTransition,
    },
    #[error(transparent)]
    Issuance(#[from] IssuanceError),
    #[error(transparent)]
    Store(#[from] db::Error),
}

impl OrderError {
    pub(crate) fn transition(order_id: &str, source: IllegalTransition) -> Self {
        Self::InvalidTransition {
            order_id: order_id.to_owned(),
            source,
        }
    }
}

/// Invite link could not be issued. The order stays as it was and can be
/// approved again
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error("failed to create invite link for order {order_id}: {source}")]
    Mint {
        order_id: String,
        #[source]
        source: MintError,
    },
    #[error("failed to record invite link for order {order_id}: {source}")]
    Store {
        order_id: String,
        #[source]
        source: db::Error,
    },
}
