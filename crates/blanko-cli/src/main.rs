//! The blanko binary: startup wiring plus a local console frontend.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blanko_application::Dispatcher;
use blanko_core::ids::ConversationId;
use blanko_core::transport::Incoming;
use blanko_infrastructure::{
    load_catalog, load_config, load_lexicon, TypesetRenderer, BOT_TOKEN_ENV,
};
use blanko_interaction::{
    AttachmentCache, DialogueMachine, NavigationController, UpdateRouter,
};

use console::ConsoleTransport;

/// Menu-driven document filling bot.
#[derive(Parser)]
#[command(name = "blanko", version)]
struct Cli {
    /// Path to the configuration file (defaults to the platform config
    /// directory).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Conversation id used for the local console session.
    #[arg(long, default_value_t = 1)]
    conversation: i64,
    /// Where delivered documents are saved.
    #[arg(long, default_value = "downloads")]
    downloads_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    if config.bot.token.is_empty() {
        anyhow::bail!("no bot token configured: set [bot] token or {BOT_TOKEN_ENV}");
    }

    let (tree, chains) =
        load_catalog(config.paths.catalog.as_deref()).context("loading catalog")?;
    let lexicon =
        Arc::new(load_lexicon(config.paths.lexicon.as_deref()).context("loading lexicon")?);

    let store = blanko_core::session::SessionStore::new();
    let cache = Arc::new(AttachmentCache::new());
    let transport = Arc::new(ConsoleTransport::new(cli.downloads_dir.clone()));
    let renderer = Arc::new(TypesetRenderer::new(
        config.paths.templates_dir.clone(),
        config.paths.work_dir.clone(),
        config.render.typeset_command.clone(),
    ));

    let navigation = Arc::new(NavigationController::new(
        Arc::new(tree),
        lexicon.clone(),
        cache,
        transport.clone(),
        config.paths.photos_dir.clone(),
        config.paths.templates_dir.clone(),
        config.menu.keyboard_width,
    ));
    let dialogue = Arc::new(DialogueMachine::new(
        store.clone(),
        Arc::new(chains),
        lexicon.clone(),
        transport.clone(),
        renderer,
        navigation.clone(),
    ));
    let router = Arc::new(UpdateRouter::new(
        navigation,
        dialogue,
        store.clone(),
        lexicon,
        transport.clone(),
    ));

    let dispatcher = Dispatcher::new(router, store);
    let _sweeper = dispatcher.start_idle_sweeper(&config.session);
    info!(
        keyboard_width = config.menu.keyboard_width,
        idle_timeout_secs = config.session.idle_timeout_secs,
        "blanko started"
    );

    run_console(dispatcher, transport, ConversationId(cli.conversation)).await
}

async fn run_console(
    dispatcher: Arc<Dispatcher>,
    transport: Arc<ConsoleTransport>,
    conversation: ConversationId,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== blanko console ===".bright_magenta().bold());
    println!(
        "{}",
        "Type /start to open the menu, a button number to press it, plain text to answer prompts, 'quit' to exit."
            .bright_black()
    );

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "quit" || trimmed == "exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let incoming = if let Some(name) = trimmed.strip_prefix('/') {
                    Incoming::Command {
                        conversation,
                        name: name.to_string(),
                    }
                } else if let Ok(index) = trimmed.parse::<usize>() {
                    match transport.press(index) {
                        Some(incoming) => incoming,
                        None => {
                            println!("{}", "no such button".yellow());
                            continue;
                        }
                    }
                } else {
                    transport.incoming_message(conversation, trimmed)
                };

                dispatcher.dispatch(incoming).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("readline error: {err:?}").red());
                break;
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
