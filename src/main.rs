use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use simplelog::LevelFilter;
use teloxide::{
    prelude::*,
    types::{BotCommandScope, Recipient},
    utils::command::BotCommands,
};
use tokio::{
    signal,
    sync::mpsc::{self, Sender},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use bot_handlers::{
    admin_command_handler, callback_handler, command_handler, message_handler, photo_handler, AdminCommand,
    BotState, Command,
};
use common::{run_until_cancelled, Cleanup, Config};
use db::DB;

use crate::handlers::tg_logs::{start_tg_logs_job, LogMessage};
use crate::logger::TgLogger;

mod handlers;
mod logger;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TG_LOGS_QUEUE: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::path_from_env();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_term_logger();
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let tg_logs_chan = mpsc::channel(TG_LOGS_QUEUE);
    init_logger(&config.log_level, tg_logs_chan.0);
    log::debug!("config loaded from {}", config_path.display());

    let db = DB::init(&config.data_dir).await?;

    let bot = Bot::with_client(
        &config.bot_token,
        Client::builder().timeout(REQUEST_TIMEOUT).build()?,
    );
    let admin_chat = ChatId(config.admin_chat_id);
    set_commands(&bot, admin_chat).await?;

    let state = BotState::new(config, bot.clone(), db);
    let cancel_token = CancellationToken::new();

    let mut jobs = JoinSet::new();
    jobs.spawn(run_until_cancelled(
        cancel_token.clone(),
        "tg logs",
        start_tg_logs_job(bot.clone(), admin_chat, tg_logs_chan.1),
    ));
    jobs.spawn(run_until_cancelled(cancel_token.clone(), "dispatcher", start_bot(bot, state)));

    jobs.spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to listen for SIGINT: {e}");
        }
        log::info!("shutting down");
        cancel_token.cancel();
    });

    while (jobs.join_next().await).is_some() {}

    Ok(())
}

/// Users see their commands, the admin chat sees admin ones too
async fn set_commands(bot: &Bot, admin_chat: ChatId) -> Result<()> {
    bot.set_my_commands(Command::bot_commands()).await?;
    bot.set_my_commands(
        Command::bot_commands()
            .into_iter()
            .chain(AdminCommand::bot_commands()),
    )
    .scope(BotCommandScope::Chat {
        chat_id: Recipient::Id(admin_chat),
    })
    .await
    .cleanup("setting admin commands");
    Ok(())
}

fn noisy_filters(builder: &mut simplelog::ConfigBuilder) -> &mut simplelog::ConfigBuilder {
    builder
        .add_filter_ignore_str("h2")
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .add_filter_ignore_str("rustls")
}

fn init_logger(level: &str, sender: Sender<LogMessage>) {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let level = level.parse().unwrap_or_else(|_| {
        eprintln!("unknown log level {level}, using info");
        LevelFilter::Info
    });
    let term_config = noisy_filters(&mut ConfigBuilder::new()).build();

    let res = CombinedLogger::init(vec![
        TermLogger::new(level, term_config, TerminalMode::Mixed, ColorChoice::Auto),
        TgLogger::new(sender, LevelFilter::Info),
    ]);
    if let Err(e) = res {
        eprintln!("failed to init logger: {e}");
    }
}

/// Only used to report a broken config, before the real logger exists
fn init_term_logger() {
    use simplelog::{ColorChoice, TermLogger, TerminalMode};

    let _ = TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .inspect_err(|e| eprintln!("failed to init logger: {e}"));
}

async fn start_bot(bot: Bot, state: BotState) {
    log::info!(tg = true; "bot started");
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(command_handler),
                )
                .branch(
                    dptree::entry()
                        .filter_command::<AdminCommand>()
                        .endpoint(admin_command_handler),
                )
                .branch(dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(photo_handler))
                .branch(dptree::endpoint(message_handler)),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler));
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_update| async move { log::debug!("unhandled update") })
        .error_handler(LoggingErrorHandler::with_custom_text("error in dispatcher"))
        .build()
        .dispatch()
        .await;
}
