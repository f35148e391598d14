//! Scraper seam and the HTTP implementation used by the refresh workflow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use handbook_core::{AppError, AppResult};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const USER_AGENT: &str = concat!(
    "handbook-assistant/",
    env!("CARGO_PKG_VERSION"),
    " (+https://handbook.gitlab.com)"
);

/// Containers tried in order before falling back to `body`.
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    ".content",
    ".handbook-content",
    ".markdown-body",
    "article",
    ".post-content",
];

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Extracted text is cut to this many characters.
const MAX_CONTENT_CHARS: usize = 3000;

/// Pages with less text than this are treated as failed fetches.
const MIN_CONTENT_CHARS: usize = 100;

/// Freshly fetched page content.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub body_text: String,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches the current text behind a document URL.
///
/// Failures are reported as [`AppError::FetchFailed`].
#[async_trait]
pub trait ScraperService: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<FetchedPage>;
}

pub struct HttpScraper {
    client: Client,
}

impl HttpScraper {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Knowledge(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ScraperService for HttpScraper {
    async fn fetch(&self, url: &str) -> AppResult<FetchedPage> {
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch_failed(url, format!("HTTP {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::fetch_failed(url, e.to_string()))?;

        let body_text = extract_main_text(&html)
            .ok_or_else(|| AppError::fetch_failed(url, "no readable content"))?;

        let chars = body_text.chars().count();
        if chars < MIN_CONTENT_CHARS {
            return Err(AppError::fetch_failed(
                url,
                format!("content too short ({} characters)", chars),
            ));
        }

        Ok(FetchedPage {
            body_text,
            fetched_at: Utc::now(),
        })
    }
}

/// Pull readable text out of an HTML page.
///
/// Uses the first matching content container, or `body`. Navigation chrome
/// and scripts are skipped, whitespace is collapsed and the result is capped
/// at [`MAX_CONTENT_CHARS`]. Returns `None` when nothing readable is left.
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let container = CONTENT_SELECTORS
        .iter()
        .chain(std::iter::once(&"body"))
        .filter_map(|sel| Selector::parse(sel).ok())
        .find_map(|selector| document.select(&selector).next())?;

    let mut words: Vec<&str> = Vec::new();
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !skipped {
            words.extend(text.split_whitespace());
        }
    }

    let text: String = words.join(" ").chars().take(MAX_CONTENT_CHARS).collect();
    let text = text.trim_end().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_main_and_skips_chrome() {
        let html = r#"
            <html><body>
              <header>Site header</header>
              <nav>Home | About</nav>
              <main>
                <h1>Values</h1>
                <p>Transparency   and
                   collaboration.</p>
                <script>var tracking = true;</script>
                <footer>Page footer</footer>
              </main>
              <footer>Copyright</footer>
            </body></html>
        "#;

        let text = extract_main_text(html).unwrap();
        assert_eq!(text, "Values Transparency and collaboration.");
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><div><p>Plain page text.</p></div><style>p {}</style></body></html>";
        assert_eq!(extract_main_text(html).unwrap(), "Plain page text.");
    }

    #[test]
    fn test_content_is_capped() {
        let html = format!("<html><body><article>{}</article></body></html>", "word ".repeat(2000));
        let text = extract_main_text(&html).unwrap();
        assert!(text.chars().count() <= MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_empty_page_has_no_text() {
        let html = "<html><body><nav>Only navigation</nav></body></html>";
        assert!(extract_main_text(html).is_none());
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpScraper::new(Duration::from_secs(5)).is_ok());
    }
}
