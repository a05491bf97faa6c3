//! Professor profile scraper
//!
//! Fetches one review page and pulls out the name, rating, department and
//! review comments by structural selectors. Markup changes on the target site
//! degrade to empty fields instead of failures.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};
use crate::server::models::professor::ProfessorRecord;

const NAME_SELECTORS: &[&str] = &["h1", "div.NameTitle__Name-dowf0z-0"];
const RATING_SELECTOR: &str = ".RatingValue__Numerator-qw8sqy-2.liyUjw";
const DEPARTMENT_SELECTOR: &str = "a.TeacherDepartment__StyledDepartmentLink-fl79e8-0.iMmVHb";
const REVIEW_SELECTOR: &str = "div.Comments__StyledComments-dzzyvm-0.gRjWel";
const DEPARTMENT_SUFFIX: &str = "department";

#[async_trait]
pub trait ProfileScraper: Send + Sync {
  async fn scrape(&self, url: &Url) -> Result<ProfessorRecord>;
}

pub struct HttpProfileScraper {
  client: Client,
}

impl HttpProfileScraper {
  pub fn new(client: Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl ProfileScraper for HttpProfileScraper {
  async fn scrape(&self, url: &Url) -> Result<ProfessorRecord> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| Error::fetch(format!("{url} is unreachable: {e}")))?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::fetch(format!("{url} returned status {status}")));
    }

    let html =
      response.text().await.map_err(|e| Error::fetch(format!("failed to read {url}: {e}")))?;

    let record = parse_profile(&html);
    tracing::debug!(
      %url,
      professor = %record.professor,
      reviews = record.reviews.len(),
      "scraped profile page"
    );
    Ok(record)
  }
}

/// Extract a professor record from a profile page
pub fn parse_profile(html: &str) -> ProfessorRecord {
  let document = Html::parse_document(html);

  let professor = NAME_SELECTORS
    .iter()
    .find_map(|css| select_texts(&document, css).into_iter().next())
    .unwrap_or_default();
  let star_rating = select_texts(&document, RATING_SELECTOR).into_iter().next().unwrap_or_default();
  let subject = select_texts(&document, DEPARTMENT_SELECTOR)
    .into_iter()
    .next()
    .map(|text| strip_department_suffix(&text))
    .unwrap_or_default();
  let reviews = select_texts(&document, REVIEW_SELECTOR);

  ProfessorRecord { professor, star_rating, subject, reviews }
}

/// Non-empty, whitespace-collapsed text of every element matching `css`
fn select_texts(document: &Html, css: &str) -> Vec<String> {
  let Ok(selector) = Selector::parse(css) else {
    tracing::warn!(css, "ignoring unparseable selector");
    return Vec::new();
  };

  document.select(&selector).map(element_text).filter(|text| !text.is_empty()).collect()
}

fn element_text(element: ElementRef<'_>) -> String {
  element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// "Mathematics department" -> "Mathematics"
fn strip_department_suffix(text: &str) -> String {
  let trimmed = text.trim();
  let cut = trimmed.len().saturating_sub(DEPARTMENT_SUFFIX.len());
  if trimmed.is_char_boundary(cut) && trimmed[cut..].eq_ignore_ascii_case(DEPARTMENT_SUFFIX) {
    trimmed[..cut].trim_end().to_string()
  } else {
    trimmed.to_string()
  }
}
