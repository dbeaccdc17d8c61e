use std::sync::Arc;

use chrono::Duration;

use common::{types::Customer, types::UserId, ApprovalMode, Config, DateTime};
use db::{Member, Order, OrderStatus, PendingAction, DB};

use crate::{invite::InviteIssuer, locks::KeyedLocks, OrderError};

type Result<T, E = OrderError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy)]
pub struct OrderSettings {
    pub amount: u32,
    pub payment_window: Duration,
    pub mode: ApprovalMode,
}

impl From<&Config> for OrderSettings {
    fn from(config: &Config) -> Self {
        Self {
            amount: config.payment.amount,
            payment_window: Duration::minutes(config.payment.window_minutes.into()),
            mode: config.payment.approval_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartPayment {
    Created(Order),
    /// User already had an open order; pending ones get a fresh window
    Existing(Order),
    AlreadyMember,
}

impl StartPayment {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::Created(o) | Self::Existing(o) => Some(o),
            Self::AlreadyMember => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub order: Order,
    pub invite_link: String,
    /// `false` if the user was a member before this order
    pub new_member: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// Manual mode: waiting for the admin
    Queued(Order),
    /// Auto mode: link issued
    Approved(Approval),
    AlreadyApproved(Order),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApproveOutcome {
    Approved(Approval),
    AlreadyApproved(Order),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectOutcome {
    Rejected(Order),
    AlreadyRejected(Order),
}

/// Owns every order status change. All changes of one order run under that
/// order's lock, so a link is issued at most once per order.
#[derive(Clone)]
pub struct Orders {
    db: DB,
    issuer: InviteIssuer,
    settings: OrderSettings,
    locks: Arc<KeyedLocks>,
}

impl Orders {
    pub fn new(db: DB, issuer: InviteIssuer, settings: OrderSettings) -> Self {
        Self {
            db,
            issuer,
            settings,
            locks: Arc::default(),
        }
    }
    pub fn db(&self) -> &DB {
        &self.db
    }
    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }
    /// Give the user an order to pay. Never creates a second open order
    pub async fn start_payment(&self, customer: &Customer, now: DateTime) -> Result<StartPayment> {
        let _user_guard = self.locks.lock(&user_key(customer.user_id)).await;

        if self.db.is_member(customer.user_id).await {
            log::debug!("user {} is already a member", customer.user_id);
            return Ok(StartPayment::AlreadyMember);
        }

        if let Some(open) = self.db.find_open_order(customer.user_id).await {
            let _order_guard = self.locks.lock(open.order_id()).await;
            // re-read under the order lock, it could have moved meanwhile
            let Some(mut order) = self.db.get_order(open.order_id()).await else {
                return Err(OrderError::NotFound(open.order_id().to_owned()));
            };
            if order.status() == OrderStatus::Pending && order.is_expired(now) {
                order.renew(now + self.settings.payment_window);
                self.db.put_order(order.clone()).await?;
                log::info!("order {} renewed for user {}", order.order_id(), customer.user_id);
            }
            match order.status() {
                OrderStatus::Pending | OrderStatus::AwaitingApproval => return Ok(StartPayment::Existing(order)),
                OrderStatus::Approved => return Ok(StartPayment::AlreadyMember),
                OrderStatus::Rejected => (),
            }
        }

        let order = Order::builder()
            .order_id(Order::make_id(now))
            .user_id(customer.user_id)
            .maybe_username(customer.username.clone())
            .first_name(customer.first_name.clone())
            .amount(self.settings.amount)
            .created_at(now)
            .expires_at(now + self.settings.payment_window)
            .build();
        let order = self.db.add_order(order).await?;
        log::info!(
            "new order {} by user {} ({})",
            order.order_id(),
            customer.user_id,
            customer.handle()
        );
        Ok(StartPayment::Created(order))
    }
    /// User says the order is paid
    pub async fn confirm(&self, order_id: &str, user_id: UserId, now: DateTime) -> Result<ConfirmOutcome> {
        let _guard = self.locks.lock(order_id).await;
        let mut order = self.owned_order(order_id, user_id).await?;

        match order.status() {
            OrderStatus::Pending => (),
            OrderStatus::Approved => {
                self.ensure_member(&order).await?;
                return Ok(ConfirmOutcome::AlreadyApproved(order));
            }
            OrderStatus::AwaitingApproval => return Err(OrderError::AlreadyConfirmed(order_id.to_owned())),
            OrderStatus::Rejected => {
                return Err(OrderError::transition(
                    order_id,
                    db::models::IllegalTransition {
                        from: OrderStatus::Rejected,
                        to: OrderStatus::AwaitingApproval,
                    },
                ))
            }
        }
        if order.is_expired(now) {
            log::debug!("order {order_id} confirmed after {}", order.expires_at());
            return Err(OrderError::Expired(order_id.to_owned()));
        }

        match self.settings.mode {
            ApprovalMode::Manual => {
                order
                    .mark_confirmed(now)
                    .map_err(|e| OrderError::transition(order_id, e))?;
                self.db.put_order(order.clone()).await?;
                log::info!("order {order_id} is waiting for approval");
                Ok(ConfirmOutcome::Queued(order))
            }
            ApprovalMode::Auto => {
                let approval = self.approve_locked(order, now).await?;
                log::info!("order {order_id} approved automatically");
                Ok(ConfirmOutcome::Approved(approval))
            }
        }
    }
    /// Check that the user may attach a payment screenshot to the order and
    /// remember that the next photo is for it
    pub async fn await_screenshot(&self, order_id: &str, user_id: UserId, now: DateTime) -> Result<Order> {
        let _guard = self.locks.lock(order_id).await;
        let order = self.owned_order(order_id, user_id).await?;

        match order.status() {
            OrderStatus::Pending if order.is_expired(now) => return Err(OrderError::Expired(order_id.to_owned())),
            OrderStatus::Pending | OrderStatus::AwaitingApproval => (),
            from => {
                return Err(OrderError::transition(
                    order_id,
                    db::models::IllegalTransition {
                        from,
                        to: OrderStatus::AwaitingApproval,
                    },
                ))
            }
        }

        self.db
            .put_pending_action(
                user_id,
                PendingAction::AwaitingScreenshot {
                    order_id: order_id.to_owned(),
                    since: now,
                },
            )
            .await?;
        Ok(order)
    }
    /// Order the next photo of the user belongs to, if any. Consumes the
    /// pending action
    pub async fn take_screenshot_target(&self, user_id: UserId) -> Result<Option<String>> {
        Ok(self.db.take_pending_action(user_id).await?.map(|action| match action {
            PendingAction::AwaitingScreenshot { order_id, .. } => order_id,
        }))
    }
    /// Admin approves the order: issue the invite link, add member, then mark
    /// approved. Nothing changes if the link can't be issued
    pub async fn approve(&self, order_id: &str, now: DateTime) -> Result<ApproveOutcome> {
        let _guard = self.locks.lock(order_id).await;
        let order = self
            .db
            .get_order(order_id)
            .await
            .ok_or_else(|| OrderError::NotFound(order_id.to_owned()))?;

        match order.status() {
            OrderStatus::Approved => {
                log::debug!("order {order_id} is already approved");
                self.ensure_member(&order).await?;
                Ok(ApproveOutcome::AlreadyApproved(order))
            }
            OrderStatus::Rejected => Err(OrderError::transition(
                order_id,
                db::models::IllegalTransition {
                    from: OrderStatus::Rejected,
                    to: OrderStatus::Approved,
                },
            )),
            OrderStatus::Pending | OrderStatus::AwaitingApproval => {
                let approval = self.approve_locked(order, now).await?;
                log::info!("order {order_id} approved by admin");
                Ok(ApproveOutcome::Approved(approval))
            }
        }
    }
    pub async fn reject(&self, order_id: &str, reason: Option<String>, now: DateTime) -> Result<RejectOutcome> {
        let _guard = self.locks.lock(order_id).await;
        let mut order = self
            .db
            .get_order(order_id)
            .await
            .ok_or_else(|| OrderError::NotFound(order_id.to_owned()))?;

        if order.status() == OrderStatus::Rejected {
            return Ok(RejectOutcome::AlreadyRejected(order));
        }
        order
            .mark_rejected(now, reason)
            .map_err(|e| OrderError::transition(order_id, e))?;
        self.db.put_order(order.clone()).await?;
        log::info!("order {order_id} rejected");
        Ok(RejectOutcome::Rejected(order))
    }
    /// Orders waiting for the admin first, then unpaid ones
    pub async fn open_orders(&self) -> Vec<Order> {
        let mut orders = self.db.orders_by_status(OrderStatus::AwaitingApproval).await;
        orders.extend(self.db.orders_by_status(OrderStatus::Pending).await);
        orders
    }
    /// Must be called with the order lock held. The member is written before
    /// the order turns approved, so an approved order always has its member.
    /// If either write fails the fresh link is revoked and the order stays open
    async fn approve_locked(&self, mut order: Order, now: DateTime) -> Result<Approval> {
        let customer = Customer::new(order.user_id(), order.username().map(ToOwned::to_owned), order.first_name());
        let invite_link = self.issuer.issue(&customer, order.order_id(), now).await?;

        let new_member = match self.db.put_member_once(member_of(&order, now)).await {
            Ok(new_member) => new_member,
            Err(e) => {
                self.issuer.revoke(&invite_link).await;
                return Err(e.into());
            }
        };

        order
            .mark_approved(now, invite_link.clone())
            .map_err(|e| OrderError::transition(order.order_id(), e))?;
        if let Err(e) = self.db.put_order(order.clone()).await {
            self.issuer.revoke(&invite_link).await;
            return Err(e.into());
        }

        Ok(Approval {
            order,
            invite_link,
            new_member,
        })
    }
    /// Approved orders written before members came first may lack their
    /// member; add it when the order is seen again
    async fn ensure_member(&self, order: &Order) -> Result<()> {
        let joined_at = order.approved_at().unwrap_or_else(|| order.created_at());
        if self.db.put_member_once(member_of(order, joined_at)).await? {
            log::warn!("order {} was approved without member, added", order.order_id());
        }
        Ok(())
    }
    async fn owned_order(&self, order_id: &str, user_id: UserId) -> Result<Order> {
        let order = self
            .db
            .get_order(order_id)
            .await
            .ok_or_else(|| OrderError::NotFound(order_id.to_owned()))?;
        if order.user_id() != user_id {
            log::warn!("user {user_id} tried to use order {order_id} of user {}", order.user_id());
            return Err(OrderError::NotOwner(order_id.to_owned()));
        }
        Ok(order)
    }
}

fn member_of(order: &Order, joined_at: DateTime) -> Member {
    Member::builder()
        .user_id(order.user_id())
        .maybe_username(order.username().map(ToOwned::to_owned))
        .first_name(order.first_name().to_owned())
        .order_id(order.order_id().to_owned())
        .joined_at(joined_at)
        .build()
}

fn user_key(user_id: UserId) -> String {
    format!("user:{user_id}")
}
