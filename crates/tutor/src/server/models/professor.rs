//! Professor records as scraped from review pages and stored in the vector index

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID_PREFIX: &str = "professor-";

/// A scraped professor profile
///
/// Every field is best-effort: markup that could not be found leaves an empty
/// string or an empty review list rather than failing the scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfessorRecord {
  /// Display name as shown on the page
  pub professor: String,

  /// Star rating as reported by the page (e.g. "4.5")
  #[serde(default)]
  pub star_rating: String,

  /// Department or subject taught
  #[serde(default)]
  pub subject: String,

  /// Review comments in page order
  #[serde(default)]
  pub reviews: Vec<String>,
}

impl ProfessorRecord {
  pub fn new(
    professor: impl Into<String>,
    star_rating: impl Into<String>,
    subject: impl Into<String>,
    reviews: Vec<String>,
  ) -> Self {
    Self {
      professor: professor.into(),
      star_rating: star_rating.into(),
      subject: subject.into(),
      reviews,
    }
  }

  /// Stable vector id derived from the display name
  pub fn id(&self) -> String {
    record_id(&self.professor)
  }

  pub fn has_name(&self) -> bool {
    !self.professor.trim().is_empty()
  }

  /// Text embedded for this record: all reviews joined into one blob.
  ///
  /// Falls back to the display name when the page had no reviews so the
  /// record can still be found by name.
  pub fn embedding_text(&self) -> String {
    let joined = self.reviews.join(" ");
    if joined.trim().is_empty() {
      self.professor.trim().to_string()
    } else {
      joined
    }
  }

  /// Metadata stored next to the vector; read back verbatim at query time
  pub fn to_metadata(&self) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("professor".to_string(), Value::String(self.professor.clone()));
    metadata.insert("star_rating".to_string(), Value::String(self.star_rating.clone()));
    metadata.insert("subject".to_string(), Value::String(self.subject.clone()));
    metadata.insert(
      "reviews".to_string(),
      Value::Array(self.reviews.iter().cloned().map(Value::String).collect()),
    );
    metadata
  }
}

/// Derive the vector id for a professor name.
///
/// Lowercase, trimmed, every whitespace run collapsed into a single hyphen.
pub fn record_id(name: &str) -> String {
  let slug = name.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
  format!("{ID_PREFIX}{slug}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_record_id_lowercases_and_hyphenates() {
    assert_eq!(record_id("Jane Smith"), "professor-jane-smith");
    assert_eq!(record_id("  Michael   de la Cruz\t"), "professor-michael-de-la-cruz");
  }

  #[test]
  fn test_record_id_is_deterministic_across_spacing() {
    assert_eq!(record_id("Emily Chen"), record_id("Emily  Chen"));
    assert_eq!(record_id("EMILY CHEN"), record_id("emily chen"));
  }

  #[test]
  fn test_embedding_text_joins_reviews_with_spaces() {
    let record = ProfessorRecord::new(
      "Jane Smith",
      "4",
      "Math",
      vec!["Clear lectures.".to_string(), "Fair exams.".to_string()],
    );
    assert_eq!(record.embedding_text(), "Clear lectures. Fair exams.");
  }

  #[test]
  fn test_embedding_text_falls_back_to_name() {
    let record = ProfessorRecord::new(" Jane Smith ", "", "", Vec::new());
    assert_eq!(record.embedding_text(), "Jane Smith");
  }

  #[test]
  fn test_metadata_keeps_every_field() {
    let record = ProfessorRecord::new("Jane Smith", "4.5", "Math", vec!["Great".to_string()]);
    let metadata = record.to_metadata();

    assert_eq!(metadata["professor"], "Jane Smith");
    assert_eq!(metadata["star_rating"], "4.5");
    assert_eq!(metadata["subject"], "Math");
    assert_eq!(metadata["reviews"], serde_json::json!(["Great"]));
  }

  #[test]
  fn test_nameless_record_is_detected() {
    assert!(!ProfessorRecord::default().has_name());
    assert!(!ProfessorRecord::new("   ", "", "", Vec::new()).has_name());
  }
}
