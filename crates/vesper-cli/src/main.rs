//! vesper - terminal chat client for a remote AI assistant

mod config;
mod ui;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;
use vesper_api::{AssistantClient, HistoryClient, Message, http::build_client};
use vesper_chat::{
    ChatConfig, ChatController, ChatEvent, CleanupScheduler, Locale, Notification, SendOutcome,
};

use config::Config;

/// vesper - chat with a remote AI assistant
#[derive(Parser, Debug)]
#[command(name = "vesper")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// History store URL (overrides config)
    #[arg(long)]
    history_url: Option<String>,

    /// Assistant endpoint URL (overrides config)
    #[arg(long)]
    assistant_url: Option<String>,

    /// Notification and label language (en, ru)
    #[arg(long)]
    locale: Option<Locale>,

    /// Send a single message, print the reply and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Clear the remote history and exit
    #[arg(long)]
    clear: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize config and exit
    if args.init_config {
        match Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let history_url = args
        .history_url
        .clone()
        .unwrap_or_else(|| cfg.history_url().to_string());
    let assistant_url = args
        .assistant_url
        .clone()
        .unwrap_or_else(|| cfg.assistant_url().to_string());
    let locale = args.locale.or(cfg.locale).unwrap_or_default();

    let one_shot = args.command.is_some() || args.clear;
    let use_tui = !one_shot && !args.no_tui && cfg.tui.unwrap_or(true);

    init_logging(args.verbose, use_tui)?;
    tracing::debug!(%history_url, %assistant_url, %locale, "starting");

    let client = build_client(cfg.request_timeout())?;
    let chat = ChatController::new(
        ChatConfig { locale },
        Arc::new(HistoryClient::with_client(client.clone(), history_url)),
        Arc::new(AssistantClient::with_client(client, assistant_url)),
    );

    if args.clear {
        return run_clear(&chat).await;
    }

    if let Some(command) = args.command {
        let result = run_command(&chat, &command).await;
        chat.flush().await;
        return result;
    }

    let cleanup = cfg
        .daily_cleanup
        .then(|| CleanupScheduler::new(cfg.cleanup_policy).spawn(chat.clone()));

    let result = if use_tui {
        ui::run_tui(chat.clone()).await
    } else {
        run_line_mode(&chat).await
    };

    if let Some(cleanup) = cleanup {
        cleanup.shutdown().await;
    }
    // Don't drop the last reply on the floor
    chat.flush().await;
    result
}

/// Install the tracing subscriber. TUI mode logs to a file so the screen stays clean.
fn init_logging(verbose: bool, to_file: bool) -> anyhow::Result<()> {
    let default_filter = if verbose { "vesper=debug" } else { "vesper=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if to_file {
        let path = Config::log_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

async fn run_clear(chat: &ChatController) -> anyhow::Result<()> {
    match chat.clear().await {
        Ok(()) => {
            println!("{}", chat.locale().history_cleared());
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{}: {}", chat.locale().clear_failed(), e)),
    }
}

async fn run_command(chat: &ChatController, command: &str) -> anyhow::Result<()> {
    let mut events = chat.subscribe();

    match chat.send(command).await {
        SendOutcome::Replied(message) => {
            println!("{}", message.content);
            Ok(())
        }
        SendOutcome::Ignored => Err(anyhow::anyhow!("Nothing to send")),
        SendOutcome::Discarded => Ok(()),
        SendOutcome::Failed => {
            let text = std::iter::from_fn(|| events.try_recv().ok())
                .find_map(|event| match event {
                    ChatEvent::Notification { notification } => Some(notification.text),
                    _ => None,
                })
                .unwrap_or_else(|| chat.locale().connection_error().to_string());
            Err(anyhow::anyhow!(text))
        }
    }
}

/// One line per message for plain output
fn format_message(message: &Message, locale: Locale) -> String {
    let label = if message.is_user() {
        locale.user_label()
    } else {
        locale.assistant_label()
    };
    format!(
        "[{}] {}: {}",
        message.timestamp.with_timezone(&Local).format("%H:%M"),
        label,
        message.content
    )
}

fn format_notification(notification: &Notification) -> String {
    if notification.is_error() {
        format!("! {}", notification.text)
    } else {
        format!("* {}", notification.text)
    }
}

async fn run_line_mode(chat: &ChatController) -> anyhow::Result<()> {
    let locale = chat.locale();

    // Notifications can come from the nightly cleanup at any time
    let mut events = chat.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ChatEvent::Notification { notification }) => {
                    println!("{}", format_notification(&notification));
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    chat.load().await;
    for message in chat.messages() {
        println!("{}", format_message(&message, locale));
    }

    if io::stderr().is_terminal() {
        eprintln!("{} (/clear, /quit)", locale.title());
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let line = input.trim_end_matches(['\r', '\n']);
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                // Result is reported by the notification printer
                let _ = chat.clear().await;
            }
            _ => {
                chat.set_input(line);
                if let SendOutcome::Replied(reply) = chat.submit_input().await {
                    println!("{}", format_message(&reply, locale));
                }
            }
        }
    }

    printer.abort();
    Ok(())
}
