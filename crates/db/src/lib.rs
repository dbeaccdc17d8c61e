//! JSON file store for orders, members, invite links and pending user actions.
//!
//! Every mapping lives in its own file under the data dir and is guarded by
//! its own lock; each mutation rewrites the whole file by atomic replace.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use table::Table;

mod invite;
mod member;
pub mod models;
mod order;
mod pending;
mod table;

#[cfg(test)]
mod tests;

pub use models::{InviteLink, Member, Order, OrderStatus, PendingAction, Stats};

const ORDERS_FILE: &str = "orders.json";
const MEMBERS_FILE: &str = "members.json";
const INVITE_LINKS_FILE: &str = "invite_links.json";
const PENDING_ACTIONS_FILE: &str = "pending_actions.json";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to serialize {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

impl Error {
    fn io(path: &Path, e: std::io::Error) -> Self {
        Self::Io(path.to_path_buf(), e)
    }
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct DB {
    tables: Arc<Tables>,
}

#[derive(Debug)]
struct Tables {
    orders: Table<Order>,
    members: Table<Member>,
    invite_links: Table<InviteLink>,
    pending_actions: Table<PendingAction>,
}

impl DB {
    /// Open store in `dir`, creating the directory if needed
    pub async fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::io(dir, e))?;
        log::debug!("opening store at {}", dir.display());

        let tables = Tables {
            orders: Table::open(dir, ORDERS_FILE).await,
            members: Table::open(dir, MEMBERS_FILE).await,
            invite_links: Table::open(dir, INVITE_LINKS_FILE).await,
            pending_actions: Table::open(dir, PENDING_ACTIONS_FILE).await,
        };
        Ok(Self {
            tables: Arc::new(tables),
        })
    }
}

// Stats
impl DB {
    pub async fn load_stats(&self) -> Stats {
        let mut stats = self
            .tables
            .orders
            .read(|orders| {
                let mut stats = Stats {
                    total_orders: orders.len(),
                    ..Stats::default()
                };
                for order in orders.values() {
                    match order.status() {
                        OrderStatus::Pending => stats.pending += 1,
                        OrderStatus::AwaitingApproval => stats.awaiting_approval += 1,
                        OrderStatus::Approved => {
                            stats.approved += 1;
                            stats.revenue += u64::from(order.amount());
                        }
                        OrderStatus::Rejected => stats.rejected += 1,
                    }
                }
                stats
            })
            .await;
        stats.members = self.tables.members.len().await;
        stats.invite_links = self.tables.invite_links.len().await;
        stats
    }
}
