#![deny(dead_code)] // DO NOT REMOVE THIS EVER
use anyhow::Result;
use clap::Parser;
use log::info;
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

mod ui;
mod utils;

use crate::ui::ChatUI;
use parley::config::Config;
use parley::delivery::{DeliverySimulator, DeliveryUpdate};
use parley::{seed, ChatSession, ChatStore};

/// Command line arguments for Parley
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Parley: a terminal chat client running on mock conversations.",
    long_about = "Parley is a terminal chat client backed by in-memory mock conversations.\n\n\
    Sent messages are marked delivered and then read by timers, no network is involved.\n\
    Command line options override values from the config file."
)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON file with the conversations to start from
    #[arg(long, value_name = "PATH")]
    seed: Option<PathBuf>,

    /// Where to write the log
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Delay before a sent message is marked delivered
    #[arg(long, value_name = "MS")]
    delivered_after_ms: Option<u64>,

    /// Delay before a sent message is marked read, counted from sending
    #[arg(long, value_name = "MS")]
    read_after_ms: Option<u64>,

    /// Terminal width below which the conversation list becomes an overlay
    #[arg(long, value_name = "COLUMNS")]
    narrow_width: Option<u16>,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(seed) = &self.seed {
            config.seed_file = Some(seed.clone());
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(ms) = self.delivered_after_ms {
            config.delivered_after_ms = ms;
        }
        if let Some(ms) = self.read_after_ms {
            config.read_after_ms = ms;
        }
        if let Some(width) = self.narrow_width {
            config.narrow_width = width;
        }
    }
}

/// Builds the chat store from the seed file, or the built-in mock data.
fn build_store(config: &Config) -> Result<ChatStore> {
    let conversations = match &config.seed_file {
        Some(path) => seed::load_seed(path)?,
        None => seed::mock_conversations(&config.local_user),
    };

    let store = ChatStore::with_initial(
        conversations,
        config.local_user.clone(),
        config.initial_conversation.as_deref(),
    )?;
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply_to(&mut config);

    utils::setup_logging(&config.log_file, config.log_level()?)?;
    info!("Parley starting up");
    info!("System information: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Logging to file: {}", config.log_file.display());

    let store = build_store(&config)?;
    let (simulator, mut delivery_rx) = DeliverySimulator::new(config.timings());
    let session = ChatSession::new(store, simulator);

    // Setup terminal UI
    let mut terminal = ui::setup_terminal()?;
    let mut chat_ui = ChatUI::new(session);

    let result =
        run_main_loop(&mut chat_ui, &mut terminal, &mut delivery_rx, config.narrow_width).await;

    // Restore the terminal even if the loop failed
    chat_ui.shutdown();
    ui::restore_terminal(terminal)?;
    result?;

    info!("Parley shut down cleanly");
    println!("Chat session ended.");
    Ok(())
}

async fn run_main_loop(
    chat_ui: &mut ChatUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    delivery_rx: &mut mpsc::Receiver<DeliveryUpdate>,
    narrow_width: u16,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        chat_ui.resize(size.width, narrow_width);

        // Draw the UI
        terminal.draw(|f| chat_ui.draw(f))?;

        // Handle user input
        if chat_ui.handle_input()? {
            info!("Quit requested");
            break;
        }

        // Apply any receipts whose timers fired
        while let Ok(update) = delivery_rx.try_recv() {
            chat_ui.apply_delivery(update);
        }

        // Let the timer tasks make progress between frames
        tokio::task::yield_now().await;
    }
    Ok(())
}
