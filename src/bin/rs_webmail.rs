use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use rs_webmail::api::http::HttpTransport;
use rs_webmail::commands;
use rs_webmail::config::{load_config, load_config_from};
use rs_webmail::session::{MemoryStorage, Session, SessionStore};
use rs_webmail::terminal::run_tui;

#[derive(Parser)]
#[command(name = "rs_webmail")]
#[command(about = "Terminal client for the webmail HTTP service", long_about = None)]
struct Cli {
    /// Read the config from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the session in memory only; nothing is written to disk or the keyring
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the TUI (default)
    Tui,

    /// Print the message list of a folder for the stored session
    Fetch {
        #[arg(long, default_value = "inbox")]
        folder: String,

        /// Defaults to page_size from the config
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Send a message for the stored session; the body is read from stdin
    Send {
        #[arg(long)]
        to: String,

        #[arg(long, default_value = "")]
        subject: String,
    },

    /// Forget the stored session
    Logout,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .map_err(|e| anyhow!("Configuration error: {e}"))?;

    let store = if cli.ephemeral {
        SessionStore::new(MemoryStorage::new())
    } else {
        SessionStore::from_config(&cfg)?
    };
    let session = Session::restore(store).shared();
    let transport = HttpTransport::new(cfg.endpoints.clone())?;

    match cli.cmd.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(session, Arc::new(transport), cfg.page_size),

        Command::Fetch { folder, limit } => {
            let messages =
                commands::fetch(session, &transport, &folder, limit.unwrap_or(cfg.page_size))?;
            for m in &messages {
                println!("{}", commands::listing_line(m));
            }
            Ok(())
        }

        Command::Send { to, subject } => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            let confirmation = commands::send(&session, &transport, &to, &subject, &body)?;
            println!("{confirmation}");
            Ok(())
        }

        Command::Logout => {
            if commands::logout(&session) {
                println!("Signed out");
            } else {
                println!("No stored session");
            }
            Ok(())
        }
    }
}
