use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode},
};

use common::{now, types::UserId, LogError};
use db::Order;
use orders::{ApproveOutcome, OrderError, RejectOutcome};

use crate::{
    callback::AdminDecision,
    commands::{split_reject_args, AdminCommand},
    keyboards::Keyboards,
    state::BotState,
    texts,
    utils::remove_keyboard,
};

const MEMBERS_PAGE: usize = 20;
const RECENT_ORDERS: usize = 10;

pub async fn admin_command_handler(bot: Bot, msg: Message, cmd: AdminCommand, state: BotState) -> ResponseResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if !state.is_admin(user.id.into(), user.username.as_deref()) {
        log::warn!("user {} tried admin command {cmd:?}", user.id);
        bot.send_message(msg.chat.id, texts::unauthorized()).await?;
        return Ok(());
    }

    let text = match cmd {
        AdminCommand::Pending => texts::pending_orders(&state.orders().open_orders().await),
        AdminCommand::Approve(args) => match args.split_whitespace().next() {
            Some(order_id) => approve_order(&bot, &state, order_id).await,
            None => texts::admin_usage("approve"),
        },
        AdminCommand::Reject(args) => match split_reject_args(&args) {
            Some((order_id, reason)) => reject_order(&bot, &state, order_id, reason).await,
            None => texts::admin_usage("reject"),
        },
        AdminCommand::Stats => {
            let stats = state.db().load_stats().await;
            let currency = state.config().payment.currency.clone();
            texts::stats(&stats, |revenue| match u32::try_from(revenue) {
                Ok(amount) => texts::price(amount, &currency),
                Err(_) => format!("{revenue} {currency}"),
            })
        }
        AdminCommand::Members => {
            let members = state.db().all_members().await;
            let shown = &members[..members.len().min(MEMBERS_PAGE)];
            texts::members(shown, members.len())
        }
        AdminCommand::Orders => texts::recent_orders(&state.db().recent_orders(RECENT_ORDERS).await),
    };

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Approve or reject button under an order notification
pub(crate) async fn admin_callback_handler(
    bot: &Bot,
    q: &CallbackQuery,
    state: &BotState,
    order_id: &str,
    decision: AdminDecision,
) -> ResponseResult<()> {
    if !state.is_admin(q.from.id.into(), q.from.username.as_deref()) {
        log::warn!("user {} pressed admin button for order {order_id}", q.from.id);
        bot.answer_callback_query(q.id.clone())
            .text(texts::ALERT_UNAUTHORIZED)
            .show_alert(true)
            .await?;
        return Ok(());
    }
    bot.answer_callback_query(q.id.clone()).await?;

    let text = match decision {
        AdminDecision::Approve => approve_order(bot, state, order_id).await,
        AdminDecision::Reject => reject_order(bot, state, order_id, None).await,
    };

    let chat_id = match &q.message {
        Some(message) => {
            remove_keyboard(bot, message.chat().id, message.id()).await;
            message.chat().id
        }
        None => state.admin_chat(),
    };
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Run approval and tell the user. Returns report for the admin
pub(crate) async fn approve_order(bot: &Bot, state: &BotState, order_id: &str) -> String {
    match state.orders().approve(order_id, now()).await {
        Ok(ApproveOutcome::Approved(approval)) => {
            send_invite(bot, state, approval.order.user_id(), &approval.invite_link).await;
            texts::admin_approved(&approval.order, approval.new_member)
        }
        Ok(ApproveOutcome::AlreadyApproved(_)) => texts::admin_already_approved(order_id),
        Err(OrderError::Issuance(e)) => {
            if let Some(order) = state.db().get_order(order_id).await {
                notify_user(bot, order.user_id(), texts::issuance_failed_user()).await;
            }
            texts::admin_issuance_failed(order_id, &e.to_string())
        }
        Err(e) => {
            if let OrderError::Store(_) = e {
                log::error!("failed to approve order {order_id}: {e}");
            }
            texts::admin_error(&e.to_string())
        }
    }
}

pub(crate) async fn reject_order(bot: &Bot, state: &BotState, order_id: &str, reason: Option<&str>) -> String {
    match state
        .orders()
        .reject(order_id, reason.map(ToOwned::to_owned), now())
        .await
    {
        Ok(RejectOutcome::Rejected(order)) => {
            notify_user(
                bot,
                order.user_id(),
                texts::user_rejected(order.order_id(), order.reject_reason()),
            )
            .await;
            texts::admin_rejected(&order)
        }
        Ok(RejectOutcome::AlreadyRejected(_)) => texts::admin_already_rejected(order_id),
        Err(e) => {
            if let OrderError::Store(_) = e {
                log::error!("failed to reject order {order_id}: {e}");
            }
            texts::admin_error(&e.to_string())
        }
    }
}

/// Ask the admin to review an order, with the payment screenshot if there is one
pub(crate) async fn notify_admin_order(bot: &Bot, state: &BotState, order: &Order, screenshot: Option<InputFile>) {
    let text = texts::admin_order(order, &state.price());
    let keyboard = Keyboards::admin_order(order.order_id());

    let res = match screenshot {
        Some(photo) => bot
            .send_photo(state.admin_chat(), photo)
            .caption(text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ()),
        None => bot
            .send_message(state.admin_chat(), text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ()),
    };
    res.log_error_msg_with(|| format!("failed to notify admin about order {}", order.order_id()));
}

pub(crate) async fn notify_admin(bot: &Bot, state: &BotState, text: String) {
    bot.send_message(state.admin_chat(), text)
        .parse_mode(ParseMode::Html)
        .await
        .log_error_msg("failed to notify admin");
}

/// Invite link with a join button
pub(crate) async fn send_invite(bot: &Bot, state: &BotState, user_id: UserId, link: &str) {
    let request = bot
        .send_message(user_id, texts::invite(link, state.invite_hours()))
        .parse_mode(ParseMode::Html)
        .protect_content(true);
    let request = match Keyboards::join_channel(link) {
        Some(keyboard) => request.reply_markup(keyboard),
        None => request,
    };
    request
        .await
        .log_error_msg_with(|| format!("failed to send invite link to user {user_id}"));
}

pub(crate) async fn notify_user(bot: &Bot, user_id: UserId, text: String) {
    bot.send_message(user_id, text)
        .parse_mode(ParseMode::Html)
        .await
        .log_error_msg_with(|| format!("failed to notify user {user_id}"));
}
