//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod auth;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::ask::run_ask;
use crate::cli::auth::{run_auth, run_deauth};
use crate::core::app::App;
use crate::core::config::data::path_display;
use crate::core::config::printing::mask_secret;
use crate::core::config::settings::ENV_ACCESS_TOKEN;
use crate::core::config::{Config, Settings, SettingsError};
use crate::core::keyring::TokenStore;
use crate::core::persona::Persona;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::LoggingState;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")");
const DEFAULT_LOG_FILTER: &str = "beautydesk=info";

#[derive(Parser)]
#[command(name = "beautydesk")]
#[command(version = VERSION)]
#[command(about = "医美AI客服助手: a terminal client for the clinic's customer-service bots")]
#[command(
    long_about = "beautydesk is a full-screen terminal chat client for the PowerMatrix \
medical-aesthetics customer-service bots. Two personas are available: a formal agent \
(basic, 常规Bot) and a friendlier assistant (cutie, 人性化Bot).\n\n\
Configuration:\n\
  Settings are read from config.toml in the platform config directory (see \
'beautydesk config'), overridden by environment variables:\n\
  BEAUTYDESK_API_URL         Chat endpoint URL\n\
  BEAUTYDESK_ACCESS_TOKEN    Bearer token (or store it with 'beautydesk auth')\n\
  BEAUTYDESK_BOT_ID_BASIC    Bot id of the basic persona\n\
  BEAUTYDESK_BOT_ID_CUTIE    Bot id of the cutie persona\n\
  BEAUTYDESK_USER            Caller id sent with each request\n\n\
Controls:\n\
  Enter                  Send the message\n\
  Shift+Enter/Alt+Enter  Insert a newline\n\
  Ctrl+P / F2            Switch persona (starts a new conversation)\n\
  PgUp/PgDn/Home/End     Scroll the transcript\n\
  Up/Down                Scroll when the input is empty\n\
  Ctrl+C / Esc           Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append the transcript to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,

    /// Write diagnostics to the specified file (filter with RUST_LOG)
    #[arg(long, global = true, value_name = "FILE")]
    pub trace_file: Option<PathBuf>,

    /// Persona to start with: basic or cutie
    #[arg(short = 'p', long, global = true, value_name = "PERSONA")]
    pub persona: Option<Persona>,

    /// Do not read the access token from the system keyring
    #[arg(long, global = true)]
    pub env_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// Print the reply as received instead of rendering markdown
        #[arg(long)]
        raw: bool,
        /// The question; multiple words are joined with spaces
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
    },
    /// Show the configuration file contents
    Config,
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (multiple words are joined)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Store the access token in the system keyring
    Auth,
    /// Remove the access token from the system keyring
    Deauth,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

/// Diagnostics go to `--trace-file` when given. Without one, only the
/// non-interactive commands log, to stderr, since the chat screen owns the
/// terminal.
fn init_tracing(trace_file: Option<&Path>, interactive: bool) -> Result<(), Box<dyn Error>> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if let Some(path) = trace_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::registry()
            .with(filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .try_init()?;
    } else if !interactive {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

fn config_path(args: &Args) -> Result<PathBuf, Box<dyn Error>> {
    match &args.config {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::default_path()?),
    }
}

fn report_settings_error(err: &SettingsError) -> ! {
    eprintln!("{err}");
    let fixes = err.quick_fixes();
    if !fixes.is_empty() {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in fixes {
            eprintln!("  • {fix}");
        }
    }
    std::process::exit(1);
}

/// Resolve settings from the config file, environment and keyring, exiting
/// with a hint when a required value is missing.
fn load_settings(args: &Args) -> Result<Settings, Box<dyn Error>> {
    let config = Config::load_from_path(&config_path(args)?)?;

    let env_token_set = std::env::var(ENV_ACCESS_TOKEN).is_ok_and(|v| !v.trim().is_empty());
    let keyring_token = if env_token_set {
        None
    } else {
        match TokenStore::new_with_keyring(!args.env_only).get_token() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, recoverable = err.is_recoverable(), "keyring unavailable");
                None
            }
        }
    };

    let mut settings = match Settings::resolve_from_process_env(&config, keyring_token) {
        Ok(settings) => settings,
        Err(err) => report_settings_error(&err),
    };
    if let Some(persona) = args.persona {
        settings.default_persona = persona;
    }
    Ok(settings)
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let interactive = matches!(args.command, None | Some(Commands::Chat));
    init_tracing(args.trace_file.as_deref(), interactive)?;

    match args.command.as_ref().unwrap_or(&Commands::Chat) {
        Commands::Chat => {
            let settings = load_settings(&args)?;
            let logging = match LoggingState::new(args.log.clone()) {
                Ok(logging) => logging,
                Err(e) => {
                    eprintln!("❌ Cannot open log file: {e}");
                    std::process::exit(1);
                }
            };
            let app = App::new(settings, logging)?;
            run_chat(app).await
        }
        Commands::Ask { raw, query } => {
            let settings = load_settings(&args)?;
            run_ask(&settings, query, *raw).await
        }
        Commands::Config => {
            let path = config_path(&args)?;
            let config = Config::load_from_path(&path)?;
            println!("Config file: {}", path_display(&path));
            config.print_all();
            Ok(())
        }
        Commands::Set { key, value } => {
            let path = config_path(&args)?;
            let mut config = Config::load_from_path(&path)?;
            let value = value.join(" ");
            if let Err(e) = config.set_key(key, &value) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save_to_path(&path)?;
            let shown = if key == "token" {
                mask_secret(value.trim())
            } else {
                value.trim().to_string()
            };
            println!("✅ Set {key} to: {shown}");
            Ok(())
        }
        Commands::Unset { key } => {
            let path = config_path(&args)?;
            let mut config = Config::load_from_path(&path)?;
            if let Err(e) = config.unset_key(key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save_to_path(&path)?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Auth => {
            if let Err(e) = run_auth(args.env_only) {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            if let Err(e) = run_deauth(args.env_only) {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
