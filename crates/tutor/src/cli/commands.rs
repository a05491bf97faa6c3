use anyhow::{anyhow, Result};
use colored::*;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::client::{get_client, TutorClient};
use crate::cli::display::{display_record, display_status};
use crate::server::models::chat::ChatMessage;
use crate::server::services::prompts::ASSISTANT_GREETING;

/// Scrape a profile page through the server and show what was stored
pub async fn ingest(base_url: &str, url: &str) -> Result<()> {
  let client = get_client(base_url)?;
  let response = client.ingest(url).await?;

  println!("{} {}", "✓".green(), response.message);
  display_record(&response.id, &response.data);
  Ok(())
}

/// Ask a single question and stream the answer to stdout
pub async fn ask(base_url: &str, question: &[String]) -> Result<()> {
  let question = question.join(" ");
  if question.trim().is_empty() {
    return Err(anyhow!("A question is required"));
  }

  let client = get_client(base_url)?;
  stream_answer(&client, &[ChatMessage::user(question)]).await?;
  Ok(())
}

/// Interactive conversation; the whole history is resent each turn
pub async fn chat(base_url: &str) -> Result<()> {
  let client = get_client(base_url)?;
  let mut conversation = Conversation::new();

  println!("{} {}", "assistant>".magenta().bold(), ASSISTANT_GREETING);
  println!("{}", "Type a question, or 'exit' to quit.".dimmed());

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("{} ", "you>".cyan().bold());
    std::io::stdout().flush()?;

    let Some(line) = lines.next_line().await? else {
      println!();
      break;
    };
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    if matches!(line, "exit" | "quit") {
      break;
    }

    let outgoing = conversation.with_user(line);
    print!("{} ", "assistant>".magenta().bold());
    match stream_answer(&client, &outgoing).await {
      Ok(reply) => conversation.commit(outgoing, reply),
      Err(e) => println!("{} {}", "✗".red(), e),
    }
  }

  Ok(())
}

/// Show server health and the index it serves from
pub async fn status(base_url: &str) -> Result<()> {
  let client = get_client(base_url)?;
  let status = client.status().await?;
  display_status(base_url, &status);
  Ok(())
}

async fn stream_answer(client: &TutorClient, messages: &[ChatMessage]) -> Result<String> {
  let reply = client
    .chat_stream(messages, |chunk| {
      print!("{chunk}");
      let _ = std::io::stdout().flush();
    })
    .await?;
  println!();
  Ok(reply)
}

/// Client side chat history
///
/// Each turn sends a fresh copy of the history with the new question appended;
/// the history only grows once the answer has streamed in completely.
#[derive(Debug, Clone)]
pub struct Conversation {
  messages: Vec<ChatMessage>,
}

impl Default for Conversation {
  fn default() -> Self {
    Self::new()
  }
}

impl Conversation {
  pub fn new() -> Self {
    Self { messages: vec![ChatMessage::assistant(ASSISTANT_GREETING)] }
  }

  pub fn messages(&self) -> &[ChatMessage] {
    &self.messages
  }

  /// History plus a new user turn, leaving the stored history untouched
  pub fn with_user(&self, content: &str) -> Vec<ChatMessage> {
    let mut outgoing = self.messages.clone();
    outgoing.push(ChatMessage::user(content));
    outgoing
  }

  /// Adopt a sent history and the answer it produced
  pub fn commit(&mut self, sent: Vec<ChatMessage>, reply: String) {
    self.messages = sent;
    self.messages.push(ChatMessage::assistant(reply));
  }
}
