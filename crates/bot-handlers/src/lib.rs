mod bot_admin_messages;
mod bot_callback;
mod bot_messages;
mod callback;
mod channel;
mod commands;
mod keyboards;
mod payload;
mod state;
mod texts;
mod utils;

pub use bot_admin_messages::admin_command_handler;
pub use bot_callback::callback_handler;
pub use bot_messages::{command_handler, message_handler, photo_handler};
pub use channel::ChannelInvites;
pub use commands::{AdminCommand, Command};
pub use payload::CALLBACK_VERSION;
pub use state::BotState;
