mod commands;
mod config;
mod error;
mod logging;

#[cfg(feature = "chat")]
mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{resolve_settings, Overrides};

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(about = "Chat with a remote agent and manage its knowledge base", long_about = None)]
struct Cli {
    /// Base URL of the agent server
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Agent to talk to
    #[arg(long, global = true)]
    agent_id: Option<String>,

    /// Knowledge base that uploads go to
    #[arg(long, global = true)]
    rag_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[cfg(feature = "chat")]
    /// Start an interactive chat session
    Chat {
        /// Where to write logs while the UI owns the terminal
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Send a single message and print the reply
    Ask {
        message: String,
    },

    /// Upload a file to the knowledge base
    Upload {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = resolve_settings(Overrides {
        base_url: cli.base_url,
        agent_id: cli.agent_id,
        rag_id: cli.rag_id,
    });

    match cli.command {
        #[cfg(feature = "chat")]
        Command::Chat { log_file } => {
            let path = log_file.unwrap_or_else(logging::default_log_path);
            logging::init_file(&path)?;
            chat::run(settings).await?;
        }
        Command::Ask { message } => {
            logging::init_stderr();
            commands::ask(&settings, &message).await?;
        }
        Command::Upload { path } => {
            logging::init_stderr();
            commands::upload(&settings, &path).await?;
        }
    }

    Ok(())
}
