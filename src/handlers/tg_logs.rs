use std::fmt::Display;

use log::Level;
use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    types::{ChatId, ParseMode},
    utils::markdown::{code_block_with_lang, escape},
    Bot,
};
use tokio::sync::mpsc::Receiver;

use common::Cleanup;

pub(crate) async fn start_tg_logs_job(bot: Bot, chat_id: ChatId, mut rx: Receiver<LogMessage>) {
    log::debug!("forwarding logs to chat {chat_id}");
    while let Some(msg) = rx.recv().await {
        bot.send_message(chat_id, msg.to_string())
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .cleanup("sending log to admin");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogMessage {
    /// Shown as code block
    Code(String),
    /// Plain text, escaped when sent
    Text(String),
}

impl LogMessage {
    pub(crate) fn error(s: impl Into<String>, target: &str, file: Option<&str>, line: Option<u32>) -> Self {
        let mut msg = format!("[ERROR] {}\n        at {target}", s.into());
        if let Some(file) = file {
            msg += &format!(": {file}");
            if let Some(line) = line {
                msg += &format!(":{line}");
            }
        }
        Self::Code(msg)
    }
    pub(crate) fn notice(s: impl Into<String>, level: Level) -> Self {
        Self::Text(format!("{}: {}", level_to_string(level), s.into()))
    }
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogMessage::Code(s) => code_block_with_lang(s, "log").fmt(f),
            LogMessage::Text(s) => escape(s).fmt(f),
        }
    }
}

fn level_to_string(level: Level) -> &'static str {
    match level {
        Level::Error => "Error",
        Level::Warn => "Warning",
        Level::Info => "Info",
        Level::Debug => "Debug",
        Level::Trace => "Trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        let msg = LogMessage::error("boom", "orders::invite", Some("invite.rs"), Some(42));
        assert_eq!(
            msg,
            LogMessage::Code("[ERROR] boom\n        at orders::invite: invite.rs:42".to_string())
        );
        assert_eq!(
            LogMessage::notice("bot started", Level::Info).to_string(),
            "Info: bot started"
        );
    }
}
