use teloxide::{
    prelude::*,
    types::{InlineKeyboardMarkup, MessageId, ParseMode},
    ApiError, RequestError,
};

use common::Cleanup;

/// Show a menu screen in place of `message_id`. Photo messages and messages
/// too old to edit are deleted and the screen is sent anew
pub(crate) async fn edit_or_resend(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    text: String,
    keyboard: InlineKeyboardMarkup,
) -> ResponseResult<()> {
    if let Some(id) = message_id {
        let res = bot
            .edit_message_text(chat_id, id, text.clone())
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard.clone())
            .await;
        match res {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => return Ok(()),
            Err(e) => {
                log::debug!("failed to edit message {} in chat {chat_id}: {e}", id.0);
                delete_message(bot, chat_id, id).await;
            }
        }
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .protect_content(true)
        .await?;
    Ok(())
}

pub(crate) async fn delete_message(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    bot.delete_message(chat_id, message_id)
        .await
        .cleanup("deleting message");
}

/// Remove inline buttons, so a decision can't be taken twice from one message
pub(crate) async fn remove_keyboard(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    bot.edit_message_reply_markup(chat_id, message_id)
        .await
        .cleanup("removing keyboard");
}
