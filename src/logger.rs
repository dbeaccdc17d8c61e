use log::{
    kv::{Key, Source},
    Level, LevelFilter, Metadata, Record,
};
use simplelog::{Config, SharedLogger};
use tokio::sync::mpsc::{error::TrySendError, Sender};

use crate::handlers::tg_logs::LogMessage;

/// Errors from these are routine network hiccups, not worth a message
const IGNORED: &[&str] = &["TerminatedByOtherGetUpdates", "ConnectionReset"];

/// Forwards error records, and records marked with `tg = true`, to the admin
/// chat through the tg logs job
#[derive(Debug)]
pub(crate) struct TgLogger {
    sender: Sender<LogMessage>,
    level: LevelFilter,
}

impl TgLogger {
    pub(crate) fn new(sender: Sender<LogMessage>, level: LevelFilter) -> Box<Self> {
        Box::new(Self { sender, level })
    }
    fn should_forward(&self, record: &Record) -> bool {
        // failures of the job itself would loop
        if record.target().contains("tg_logs") {
            return false;
        }
        let marked = record
            .key_values()
            .get(Key::from("tg"))
            .and_then(|v| v.to_bool())
            .unwrap_or(false);
        if !marked && record.level() != Level::Error {
            return false;
        }
        let text = record.args().to_string();
        !IGNORED.iter().any(|s| text.contains(s))
    }
}

impl log::Log for TgLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || !self.should_forward(record) {
            return;
        }

        let msg = if record.level() == Level::Error {
            LogMessage::error(record.args().to_string(), record.target(), record.file(), record.line())
        } else {
            LogMessage::notice(record.args().to_string(), record.level())
        };
        match self.sender.try_send(msg) {
            Ok(()) => (),
            Err(TrySendError::Full(_)) => eprintln!("tg logs queue is full, dropping message"),
            Err(TrySendError::Closed(_)) => (),
        }
    }

    fn flush(&self) {}
}

impl SharedLogger for TgLogger {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn config(&self) -> Option<&Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn log::Log> {
        Box::new(*self)
    }
}
