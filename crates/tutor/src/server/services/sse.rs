//! Incremental server-sent events decoder
//!
//! Bytes arrive from the provider in arbitrary chunks; lines are only decoded
//! once complete, so multi-byte characters split across chunks survive.

/// Accumulates raw bytes and yields the `data` payload of each complete event
#[derive(Debug, Default)]
pub struct SseDecoder {
  buffer: Vec<u8>,
  data_lines: Vec<String>,
}

impl SseDecoder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Feed a chunk of bytes, returning the payloads of any events it completed
  pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
    self.buffer.extend_from_slice(chunk);

    let mut events = Vec::new();
    while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
      let line: Vec<u8> = self.buffer.drain(..=newline).collect();
      let line = String::from_utf8_lossy(&line);
      let line = line.trim_end_matches(['\n', '\r']);
      if let Some(event) = self.process_line(line) {
        events.push(event);
      }
    }
    events
  }

  /// Flush whatever is left once the byte stream has ended
  pub fn finish(&mut self) -> Option<String> {
    if !self.buffer.is_empty() {
      let rest = std::mem::take(&mut self.buffer);
      let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
      if let Some(event) = self.process_line(&line) {
        return Some(event);
      }
    }
    self.dispatch()
  }

  fn process_line(&mut self, line: &str) -> Option<String> {
    if line.is_empty() {
      return self.dispatch();
    }
    if line.starts_with(':') {
      return None;
    }

    let (field, value) = match line.split_once(':') {
      Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
      None => (line, ""),
    };

    // event, id and retry fields carry nothing the completion stream needs
    if field == "data" {
      self.data_lines.push(value.to_string());
    }
    None
  }

  fn dispatch(&mut self) -> Option<String> {
    if self.data_lines.is_empty() {
      return None;
    }
    Some(std::mem::take(&mut self.data_lines).join("\n"))
  }
}
