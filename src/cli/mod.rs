//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches to the
//! appropriate command handlers.

pub mod characters;
pub mod conversations;
pub mod health;
pub mod say;
pub mod scenes;

use std::error::Error;

use clap::{Parser, Subcommand};

use crate::api::StageClient;
use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "greenroom")]
#[command(about = "A terminal client for roleplay stage servers")]
#[command(
    long_about = "Greenroom talks to a roleplay stage server: it manages the \
character roster, the scene graph, and saved conversations, and it streams \
chat replies live as the model generates them.\n\n\
Configuration:\n\
  greenroom set server-url http://localhost:8000\n\
  greenroom set default-scene <sid>\n\
  greenroom set default-character <id>\n\n\
Logging goes to stderr and follows RUST_LOG."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Stage server base URL (overrides the configured one)
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and stream the reply to stdout
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
        /// Character id the LLM plays (defaults to default-character)
        #[arg(short = 'c', long)]
        character: Option<i64>,
        /// Scene the message belongs to (defaults to default-scene)
        #[arg(short = 's', long)]
        scene: Option<String>,
        /// Character id speaking the message
        #[arg(long, default_value_t = 0)]
        sender: i64,
        /// Wait for the whole reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },
    /// Manage the character roster
    Characters {
        #[command(subcommand)]
        command: characters::CharacterCommands,
    },
    /// Inspect scenes and their casts
    Scenes {
        #[command(subcommand)]
        command: scenes::SceneCommands,
    },
    /// Browse and prune saved conversations
    Conversations {
        #[command(subcommand)]
        command: conversations::ConversationCommands,
    },
    /// Check that the stage server is up
    Health,
    /// Set configuration values (bare `set` prints the configuration)
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(server) = args.server {
        config.server_url = Some(server);
    }
    let client = StageClient::from_config(&config);

    match args.command.unwrap_or(Commands::Health) {
        Commands::Say {
            message,
            character,
            scene,
            sender,
            no_stream,
        } => say::run_say(client, &config, message, character, scene, sender, no_stream).await,
        Commands::Characters { command } => characters::run(client, command).await,
        Commands::Scenes { command } => scenes::run(client, command).await,
        Commands::Conversations { command } => conversations::run(client, command).await,
        Commands::Health => health::check(client).await,
        Commands::Set { key: None, .. } => {
            config.print_all();
            Ok(())
        }
        Commands::Set {
            key: Some(key),
            value,
        } => match value {
            Some(value) => {
                config.set_value(&key, &value)?;
                config.save()?;
                println!("Set {key} = {value}");
                Ok(())
            }
            None => {
                eprintln!("Usage: greenroom set <key> <value>");
                std::process::exit(1);
            }
        },
        Commands::Unset { key } => {
            config.unset_value(&key)?;
            config.save()?;
            println!("Unset {key}");
            Ok(())
        }
    }
}
