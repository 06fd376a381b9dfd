mod cli;
mod config;
mod groq_client;
mod langsmith;
mod responder;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::input_source::InputSource;
use crate::cli::chat::ChatContext;
use crate::config::Config;
use crate::groq_client::GroqClient;
use crate::langsmith::{LangSmithTracer, TracedResponder};
use crate::responder::Responder;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat(ChatArgs),
}

#[derive(clap::Args)]
struct ChatArgs {
    /// Send a single message, print the reply and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Model to use (overrides GROQ_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the chat completions API (overrides GROQ_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn build_responder(config: &Config) -> Result<Box<dyn Responder>> {
    let client = GroqClient::new(config)?;
    info!("Using model {}", client.model());

    match &config.tracing {
        Some(tracing_config) => {
            let tracer = LangSmithTracer::new(tracing_config)?;
            info!("Submitting traces to LangSmith project {}", tracer.project());
            Ok(Box::new(TracedResponder::new(client, tracer)))
        }
        None => Ok(Box::new(client)),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Chat(args)) => args,
        None => cli.chat,
    };

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting Groq Chat CLI");

    let config = Config::from_env()?.with_overrides(args.model, args.base_url)?;
    let responder = build_responder(&config)?;

    let input_source = match args.input {
        Some(_) => None,
        None => Some(InputSource::new()?),
    };

    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        args.input,
        input_source,
        responder,
    );
    chat_context.run().await
}
