//! Command-line interface parsing and handling
//!
//! Subcommands other than `chat` run to completion on stdout and never touch
//! the terminal mode. `chat` resolves everything it needs first, so a bad
//! flag or missing credential is reported before the screen is taken over.

pub mod history;
pub mod model_list;
pub mod startup;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::history::run_history;
use crate::cli::model_list::print_models;
use crate::cli::startup::{prepare_chat, StartupError};
use crate::core::catalog::ModelCatalog;
use crate::core::config::{Config, ConfigKey};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "chatbox", version)]
#[command(about = "A terminal chat client for Cloudflare Workers AI models")]
#[command(
    long_about = "chatbox is a full-screen terminal chat interface for the text-generation \
models hosted on Cloudflare Workers AI. The whole conversation is sent with every request, \
and conversations can be saved to a local SQLite database.\n\n\
Environment Variables:\n\
  CLOUDFLARE_API_TOKEN      API token with Workers AI access (required)\n\
  CLOUDFLARE_ACC_ID         Cloudflare account id (required)\n\
  CLOUDFLARE_API_BASE_URL   Override the API base URL (optional)\n\
  CHATBOX_DEBUG             Append raw input events to messages.log or the given path\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  Ctrl+E            Choose a different model\n\
  Ctrl+S            Save the conversation\n\
  PageUp/PageDown   Scroll through the conversation\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to start with: identifier, display name, or catalog number
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// SQLite database used for saved conversations
    #[arg(short = 'd', long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Color theme (dark, light)
    #[arg(long, global = true, value_name = "THEME")]
    pub theme: Option<String>,

    /// Write diagnostic logs to the given file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable saving for this session
    #[arg(long, global = true)]
    pub no_save: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List the selectable models
    Models,
    /// List saved conversations, or print one
    History {
        /// Session to print
        id: Option<i64>,
        /// Delete the session instead of printing it
        #[arg(long, requires = "id")]
        delete: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(e) = init_tracing(path) {
            eprintln!("❌ Failed to open log file {}: {e}", path.display());
            std::process::exit(1);
        }
    }

    match args.command.clone().unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let context = match prepare_chat(&args).await {
                Ok(context) => context,
                Err(e) => exit_with(e),
            };
            run_chat(context).await
        }
        Commands::Models => {
            let config = Config::load()?;
            print_models(&ModelCatalog::builtin(), config.default_model.as_deref());
            Ok(())
        }
        Commands::History { id, delete } => {
            let config = Config::load()?;
            let path = args.database.clone().unwrap_or_else(|| config.database_path());
            if let Err(e) = run_history(&path, id, delete).await {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            let key = parse_key_or_exit(&key);
            let value = value.join(" ");
            let mut config = Config::load()?;
            if let Err(e) = config.set(key, &value, &ModelCatalog::builtin()) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            let stored = config.get(key).unwrap_or(value);
            println!("✅ Set {key} to: {stored}");
            Ok(())
        }
        Commands::Unset { key } => {
            let key = parse_key_or_exit(&key);
            let mut config = Config::load()?;
            config.unset(key);
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            println!("Configuration ({})", Config::get_config_path()?.display());
            for key in ConfigKey::ALL {
                let value = config.get(key).unwrap_or_else(|| "(unset)".to_string());
                println!("  {key}: {value}");
            }
            Ok(())
        }
    }
}

fn parse_key_or_exit(key: &str) -> ConfigKey {
    match ConfigKey::parse(key) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("❌ {e}");
            let names: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
            eprintln!("Available keys: {}", names.join(", "));
            std::process::exit(1);
        }
    }
}

fn exit_with(error: StartupError) -> ! {
    eprintln!("❌ {error}");
    std::process::exit(1);
}
