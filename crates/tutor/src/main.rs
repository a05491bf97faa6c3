use anyhow::Result;
use clap::{Parser, Subcommand};
use tutor::cli::client::DEFAULT_SERVER_URL;
use tutor::cli::commands;

#[derive(Parser)]
#[command(name = "tutor")]
#[command(about = "Tutor - ask questions about professors using their reviews")]
#[command(version)]
struct Cli {
  /// Base URL of the tutor server
  #[arg(long, global = true, env = "TUTOR_URL", default_value = DEFAULT_SERVER_URL)]
  url: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Scrape a professor profile page and store it for retrieval
  Ingest {
    /// Profile page URL
    #[arg(value_name = "PAGE_URL")]
    page: String,
  },
  /// Ask a single question and stream the answer
  Ask {
    /// Question (space-separated)
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// Start an interactive conversation
  Chat,
  /// Check that the server is up
  Status,
}

async fn handle(base_url: &str, command: Command) -> Result<()> {
  match command {
    Command::Ingest { page } => commands::ingest(base_url, &page).await,
    Command::Ask { question } => commands::ask(base_url, &question).await,
    Command::Chat => commands::chat(base_url).await,
    Command::Status => commands::status(base_url).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  handle(&cli.url, cli.command).await?;
  Ok(())
}
