use teloxide::{
    prelude::*,
    types::{InlineKeyboardMarkup, InputFile, ParseMode},
};

use common::{now, types::Customer, types::UserId};

use crate::{
    bot_callback::after_confirm, commands::Command, keyboards::Keyboards, state::BotState, texts,
};

pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, state: BotState) -> ResponseResult<()> {
    if !is_private(&msg) {
        log::debug!("ignoring command in public chat {}", msg.chat.id);
        return Ok(());
    }

    match cmd {
        Command::Start => {
            let Some(user) = msg.from.as_ref() else {
                return Ok(());
            };
            let (text, keyboard) = home_screen(&state, &Customer::from(user)).await;
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .protect_content(true)
                .await?;
            log::debug!("user {} opened menu", user.id);
        }
        Command::Help => {
            bot.send_message(msg.chat.id, texts::help(&state.config().bot_name))
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }
    Ok(())
}

/// Photos are payment screenshots when the user asked to send one
pub async fn photo_handler(bot: Bot, msg: Message, state: BotState) -> ResponseResult<()> {
    if !is_private(&msg) {
        log::debug!("ignoring photo in public chat {}", msg.chat.id);
        return Ok(());
    }
    let (Some(user), Some(photo)) = (msg.from.as_ref(), msg.photo().and_then(|sizes| sizes.last())) else {
        return Ok(());
    };
    let user_id: UserId = user.id.into();

    let order_id = match state.orders().take_screenshot_target(user_id).await {
        Ok(Some(order_id)) => order_id,
        Ok(None) => {
            bot.send_message(msg.chat.id, texts::unexpected_photo()).await?;
            return Ok(());
        }
        Err(e) => {
            log::error!("failed to load pending action of user {user_id}: {e}");
            bot.send_message(msg.chat.id, texts::ALERT_TRY_AGAIN).await?;
            return Ok(());
        }
    };
    log::info!("got payment screenshot for order {order_id} from user {user_id}");

    let screenshot = InputFile::file_id(photo.file.id.clone());
    let res = state.orders().confirm(&order_id, user_id, now()).await;
    if let Some(notice) = after_confirm(&bot, &state, user_id, &order_id, res, Some(screenshot)).await {
        bot.send_message(msg.chat.id, notice).await?;
    }
    Ok(())
}

pub async fn message_handler(bot: Bot, msg: Message) -> ResponseResult<()> {
    if is_private(&msg) {
        bot.send_message(msg.chat.id, texts::unknown_message()).await?;
    }
    Ok(())
}

/// User-facing flows only run in a private chat with the bot
pub(crate) fn is_private(msg: &Message) -> bool {
    msg.chat.is_private()
}

/// Welcome screen, or the stored invite link for members
pub(crate) async fn home_screen(state: &BotState, customer: &Customer) -> (String, InlineKeyboardMarkup) {
    if !state.db().is_member(customer.user_id).await {
        let text = texts::welcome(&state.config().bot_name, &customer.first_name, &state.price());
        return (text, Keyboards::welcome().into());
    }

    let link = match state.db().get_invite_link(customer.user_id).await {
        Some(link) => link.link().to_owned(),
        None => {
            log::warn!("member {} has no invite link record", customer.user_id);
            state.config().channel.fallback_link.clone()
        }
    };
    let text = texts::already_member(&customer.first_name, &link, &state.admin_contact());
    let keyboard = Keyboards::join_channel(&link).map(Into::into).unwrap_or_default();
    (text, keyboard)
}
