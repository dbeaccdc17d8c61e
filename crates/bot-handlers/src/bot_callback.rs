use teloxide::{
    prelude::*,
    types::{InputFile, MessageId, ParseMode},
};

use common::{now, types::Customer, types::UserId};
use db::Order;
use orders::{ConfirmOutcome, OrderError, StartPayment};

use crate::{
    bot_admin_messages::{admin_callback_handler, notify_admin, notify_admin_order, notify_user, send_invite},
    bot_messages::home_screen,
    callback::Callback,
    keyboards::Keyboards,
    payload::{PayloadData, PayloadParseError},
    state::BotState,
    texts::{self, PaymentScreen},
    utils::{delete_message, edit_or_resend},
};

const QR_FILE_NAME: &str = "payment-qr.png";

pub async fn callback_handler(bot: Bot, q: CallbackQuery, state: BotState) -> ResponseResult<()> {
    let answer_err = bot.answer_callback_query(q.id.clone()).show_alert(true);

    let Some(data) = q.data.as_deref() else {
        log::error!("got empty callback {:?} from user {}", q.id, q.from.id);
        answer_err.text(texts::ALERT_TRY_AGAIN).await?;
        return Ok(());
    };
    let callback = match Callback::try_from_payload(data) {
        Ok(callback) => callback,
        Err(PayloadParseError::Outdated) => {
            log::debug!("outdated callback: {data}");
            answer_err.text(texts::ALERT_OUTDATED).await?;
            return Ok(());
        }
        Err(e) => {
            log::error!("invalid callback {data}: {e}");
            answer_err.text(texts::ALERT_TRY_AGAIN).await?;
            return Ok(());
        }
    };
    log::debug!("got callback {callback:?} from user {}", q.from.id);

    let customer = Customer::from(&q.from);
    let (chat_id, message_id) = match &q.message {
        Some(message) => (message.chat().id, Some(message.id())),
        None => (ChatId::from(q.from.id), None),
    };

    match callback {
        Callback::Admin { order_id, decision } => {
            return admin_callback_handler(&bot, &q, &state, &order_id, decision).await;
        }
        Callback::Home | Callback::Back => {
            bot.answer_callback_query(q.id.clone()).await?;
            let (text, keyboard) = home_screen(&state, &customer).await;
            edit_or_resend(&bot, chat_id, message_id, text, keyboard).await?;
        }
        Callback::Plan => {
            bot.answer_callback_query(q.id.clone()).await?;
            let (text, keyboard) = if state.db().is_member(customer.user_id).await {
                home_screen(&state, &customer).await
            } else {
                let price = state.price();
                (
                    texts::plan(&price, state.invite_hours()),
                    Keyboards::plan(&price).into(),
                )
            };
            edit_or_resend(&bot, chat_id, message_id, text, keyboard).await?;
        }
        Callback::HowItWorks => {
            bot.answer_callback_query(q.id.clone()).await?;
            let text = texts::how_it_works(&state.price(), state.invite_hours());
            edit_or_resend(&bot, chat_id, message_id, text, Keyboards::how_it_works().into()).await?;
        }
        Callback::Contact => {
            bot.answer_callback_query(q.id.clone()).await?;
            let text = texts::contact(&state.admin_contact());
            let keyboard = Keyboards::contact(state.admin_url()).into();
            edit_or_resend(&bot, chat_id, message_id, text, keyboard).await?;
        }
        Callback::Pay => {
            bot.answer_callback_query(q.id.clone()).await?;
            start_payment(&bot, &state, &customer, chat_id, message_id).await?;
        }
        Callback::Paid { order_id } => {
            let res = state.orders().confirm(&order_id, customer.user_id, now()).await;
            match after_confirm(&bot, &state, customer.user_id, &order_id, res, None).await {
                Some(notice) => answer_err.text(notice).await?,
                None => bot.answer_callback_query(q.id.clone()).await?,
            };
        }
        Callback::Screenshot { order_id } => {
            match state
                .orders()
                .await_screenshot(&order_id, customer.user_id, now())
                .await
            {
                Ok(_) => {
                    bot.answer_callback_query(q.id.clone()).await?;
                    bot.send_message(chat_id, texts::screenshot_request(&order_id))
                        .parse_mode(ParseMode::Html)
                        .await?;
                }
                Err(e) => {
                    answer_err.text(order_error_notice(&order_id, &e)).await?;
                }
            }
        }
    }

    Ok(())
}

/// Replace the menu with the payment screen of the user's open order
async fn start_payment(
    bot: &Bot,
    state: &BotState,
    customer: &Customer,
    chat_id: ChatId,
    message_id: Option<MessageId>,
) -> ResponseResult<()> {
    let order = match state.orders().start_payment(customer, now()).await {
        Ok(StartPayment::Created(order) | StartPayment::Existing(order)) => order,
        Ok(StartPayment::AlreadyMember) => {
            let (text, keyboard) = home_screen(state, customer).await;
            return edit_or_resend(bot, chat_id, message_id, text, keyboard).await;
        }
        Err(e) => {
            log::error!("failed to start payment for user {}: {e}", customer.user_id);
            bot.send_message(chat_id, texts::ALERT_TRY_AGAIN).await?;
            return Ok(());
        }
    };

    if let Some(message_id) = message_id {
        delete_message(bot, chat_id, message_id).await;
    }
    send_payment_screen(bot, state, chat_id, &order).await
}

async fn send_payment_screen(bot: &Bot, state: &BotState, chat_id: ChatId, order: &Order) -> ResponseResult<()> {
    let png = state
        .payment()
        .upi_uri(order.order_id(), order.amount())
        .and_then(|uri| state.qr().render(&uri));
    let Some(png) = png else {
        bot.send_message(chat_id, texts::qr_failed())
            .protect_content(true)
            .await?;
        return Ok(());
    };

    let price = state.price();
    let admin = state.admin_contact();
    let text = texts::payment(&PaymentScreen {
        order,
        price: &price,
        payee_id: &state.payment().payee_id,
        window_minutes: state.orders().settings().payment_window.num_minutes(),
        invite_hours: state.invite_hours(),
        admin: &admin,
        screenshot: state.screenshots_enabled(),
    });

    bot.send_photo(chat_id, InputFile::memory(png).file_name(QR_FILE_NAME))
        .caption(text)
        .parse_mode(ParseMode::Html)
        .reply_markup(Keyboards::payment(order.order_id(), state.screenshots_enabled()))
        .protect_content(true)
        .await?;
    Ok(())
}

/// Tell the user and the admin how confirmation went. Returns a short notice
/// when the user has to be told about a failure
pub(crate) async fn after_confirm(
    bot: &Bot,
    state: &BotState,
    user_id: UserId,
    order_id: &str,
    res: Result<ConfirmOutcome, OrderError>,
    screenshot: Option<InputFile>,
) -> Option<&'static str> {
    match res {
        Ok(ConfirmOutcome::Queued(order)) => {
            let text = if screenshot.is_some() {
                texts::screenshot_received(order_id)
            } else {
                texts::waiting_approval(order_id)
            };
            notify_admin_order(bot, state, &order, screenshot).await;
            notify_user(bot, user_id, text).await;
            None
        }
        Ok(ConfirmOutcome::Approved(approval)) => {
            send_invite(bot, state, user_id, &approval.invite_link).await;
            notify_admin(bot, state, texts::admin_new_member(&approval.order)).await;
            None
        }
        Ok(ConfirmOutcome::AlreadyApproved(order)) => {
            let link = order
                .invite_link()
                .unwrap_or(state.config().channel.fallback_link.as_str());
            send_invite(bot, state, user_id, link).await;
            None
        }
        // another screenshot for an order the admin hasn't looked at yet
        Err(OrderError::AlreadyConfirmed(_)) if screenshot.is_some() => {
            if let Some(order) = state.db().get_order(order_id).await {
                notify_admin_order(bot, state, &order, screenshot).await;
            }
            notify_user(bot, user_id, texts::screenshot_received(order_id)).await;
            None
        }
        Err(OrderError::Issuance(e)) => {
            notify_admin(bot, state, texts::admin_issuance_failed(order_id, &e.to_string())).await;
            notify_user(bot, user_id, texts::issuance_failed_user()).await;
            None
        }
        Err(e) => Some(order_error_notice(order_id, &e)),
    }
}

fn order_error_notice(order_id: &str, e: &OrderError) -> &'static str {
    match e {
        OrderError::NotFound(_) => texts::ALERT_NOT_FOUND,
        OrderError::NotOwner(_) => texts::ALERT_NOT_OWNER,
        OrderError::Expired(_) => texts::ALERT_EXPIRED,
        OrderError::AlreadyConfirmed(_) => texts::ALERT_ALREADY_CONFIRMED,
        OrderError::InvalidTransition { .. } => texts::ALERT_CLOSED,
        OrderError::Issuance(_) | OrderError::Store(_) => {
            log::error!("order {order_id}: {e}");
            texts::ALERT_TRY_AGAIN
        }
    }
}
