//! Display formatting utilities for CLI output

use colored::*;

use crate::server::models::professor::ProfessorRecord;
use crate::server::types::StatusResponse;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();

    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.len() + 1 + word.len() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

/// Print a stored professor record
pub fn display_record(id: &str, record: &ProfessorRecord) {
  println!("=== {} ({}) ===", record.professor.yellow().bold(), id.dimmed());
  println!("{} {}", "Subject:".cyan(), or_unknown(&record.subject));
  println!("{} {}", "Star Rating:".cyan(), or_unknown(&record.star_rating));

  if record.reviews.is_empty() {
    println!("{}", "No reviews found on the page.".dimmed());
    return;
  }

  println!("{} ({})", "Reviews:".cyan(), record.reviews.len());
  for review in &record.reviews {
    let mut lines = wrap_text(review, 76).into_iter();
    if let Some(first) = lines.next() {
      println!("  - {first}");
    }
    for line in lines {
      println!("    {line}");
    }
  }
}

/// Print server health
pub fn display_status(base_url: &str, status: &StatusResponse) {
  println!("{} {} at {}", "✓".green(), status.status.green().bold(), base_url.cyan());
  println!("  version:   {}", status.version);
  println!("  index:     {}", status.index.blue());
  println!("  namespace: {}", status.namespace.blue());
}

fn or_unknown(value: &str) -> ColoredString {
  if value.trim().is_empty() {
    "unknown".dimmed()
  } else {
    value.normal()
  }
}
