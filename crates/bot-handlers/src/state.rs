use std::sync::Arc;

use teloxide::{types::ChatId, Bot};

use common::{types::UserId, ApprovalMode, Config};
use db::DB;
use orders::{InviteIssuer, OrderSettings, Orders, PaymentDetails, PngQr, QrRenderer};

use crate::{channel::ChannelInvites, keyboards::admin_url, texts};

/// Everything handlers need, injected into the dispatcher
#[derive(Clone)]
pub struct BotState {
    config: Arc<Config>,
    orders: Orders,
    payment: PaymentDetails,
    qr: Arc<dyn QrRenderer>,
}

impl BotState {
    pub fn new(config: Config, bot: Bot, db: DB) -> Self {
        let minter = ChannelInvites::new(bot, ChatId(config.channel.id));
        let issuer = InviteIssuer::new(Arc::new(minter), db.clone(), config.channel.invite_link_hours);
        let orders = Orders::new(db, issuer, OrderSettings::from(&config));

        Self {
            payment: PaymentDetails::from(&config),
            config: Arc::new(config),
            orders,
            qr: Arc::new(PngQr::default()),
        }
    }
    pub(crate) fn config(&self) -> &Config {
        &self.config
    }
    pub(crate) fn orders(&self) -> &Orders {
        &self.orders
    }
    pub(crate) fn db(&self) -> &DB {
        self.orders.db()
    }
    pub(crate) fn payment(&self) -> &PaymentDetails {
        &self.payment
    }
    pub(crate) fn qr(&self) -> &dyn QrRenderer {
        self.qr.as_ref()
    }
    pub(crate) fn admin_chat(&self) -> ChatId {
        ChatId(self.config.admin_chat_id)
    }
    pub fn is_admin(&self, user_id: UserId, username: Option<&str>) -> bool {
        self.config.is_admin(user_id, username)
    }
    pub(crate) fn screenshots_enabled(&self) -> bool {
        self.config.payment.approval_mode == ApprovalMode::Manual
    }
    pub(crate) fn price(&self) -> String {
        texts::price(self.config.payment.amount, &self.config.payment.currency)
    }
    pub(crate) fn invite_hours(&self) -> u32 {
        self.config.channel.invite_link_hours
    }
    pub(crate) fn admin_contact(&self) -> String {
        self.config.admin_contact()
    }
    pub(crate) fn admin_url(&self) -> Option<reqwest::Url> {
        self.config.admin_handle().and_then(admin_url)
    }
}
