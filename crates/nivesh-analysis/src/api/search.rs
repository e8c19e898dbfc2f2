//! Web search client
//!
//! The pipeline needs a generic "query in, ranked results out" capability for
//! ticker resolution and news. [`WebSearch`] is the seam the components
//! depend on; [`DuckDuckGoClient`] is the shipped implementation, scraping
//! the DuckDuckGo HTML endpoint (the same backend the original toolchain's
//! search library uses, which has no official API).

use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, instrument};

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

static RESULT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#)
        .expect("valid result link pattern")
});

static RESULT_SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#)
        .expect("valid result snippet pattern")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title
    pub title: String,
    /// Body snippet
    pub body: String,
    /// Source URL
    pub href: String,
}

/// Trait for web search backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Run a search and return at most `max_results` hits, ranked
    async fn search(
        &self,
        query: &str,
        region: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>>;
}

/// Render hits the way tool output presents them to the model
pub fn render_hits(hits: &[SearchHit]) -> String {
    let mut response = String::from("\nSearch Results:\n");
    for hit in hits {
        response.push_str(&format!("Title: {}\n", hit.title));
        response.push_str(&format!("Body: {}\n", hit.body));
        response.push_str(&format!("Sources: {}\n", hit.href));
    }
    response
}

/// DuckDuckGo HTML search client
pub struct DuckDuckGoClient {
    client: Client,
}

impl DuckDuckGoClient {
    /// Create a new client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoClient {
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        region: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(SEARCH_URL)
            .header("User-Agent", USER_AGENT)
            .form(&[("q", query), ("kl", region)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AnalysisError::Search(format!(
                "search request failed with HTTP {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        let hits = parse_results(&html, max_results);
        debug!("search returned {} hits", hits.len());
        Ok(hits)
    }
}

/// Parse result links and snippets out of the DuckDuckGo HTML page
fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let links = RESULT_LINK_RE.captures_iter(html);
    let mut snippets = RESULT_SNIPPET_RE.captures_iter(html);

    let mut hits = Vec::new();
    for link in links {
        if hits.len() >= max_results {
            break;
        }

        let href = resolve_redirect(&link[1]);
        let title = strip_tags(&link[2]);
        let body = snippets
            .next()
            .map(|c| strip_tags(&c[1]))
            .unwrap_or_default();

        hits.push(SearchHit { title, body, href });
    }
    hits
}

/// Unwrap DuckDuckGo's redirect links to the target URL
fn resolve_redirect(href: &str) -> String {
    if let Some(start) = href.find("uddg=") {
        let encoded = &href[start + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    href.to_string()
}

/// Drop markup and decode the entities DuckDuckGo emits
fn strip_tags(fragment: &str) -> String {
    let text = TAG_RE.replace_all(fragment, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <div class="result">
          <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.nseindia.com%2Fquote%3Fsymbol%3DTCS&amp;rut=abc">TCS Share Price &amp; <b>NSE</b> Quote</a>
          <a class="result__snippet" href="/ignored">Tata Consultancy Services Ltd. live price.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://example.com/tcs">Second result</a>
          <a class="result__snippet" href="/ignored">Second snippet</a>
        </div>
    "#;

    #[test]
    fn test_parse_results() {
        let hits = parse_results(SAMPLE_HTML, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "TCS Share Price & NSE Quote");
        assert_eq!(hits[0].body, "Tata Consultancy Services Ltd. live price.");
        assert_eq!(hits[0].href, "https://www.nseindia.com/quote?symbol=TCS");
        assert_eq!(hits[1].href, "https://example.com/tcs");
    }

    #[test]
    fn test_parse_results_caps_count() {
        let hits = parse_results(SAMPLE_HTML, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_render_hits() {
        let hits = vec![SearchHit {
            title: "TCS quote".to_string(),
            body: "Live price".to_string(),
            href: "https://example.com".to_string(),
        }];

        let rendered = render_hits(&hits);
        assert!(rendered.starts_with("\nSearch Results:\n"));
        assert!(rendered.contains("Title: TCS quote\n"));
        assert!(rendered.contains("Body: Live price\n"));
        assert!(rendered.contains("Sources: https://example.com\n"));
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Bold</b> &amp; plain"), "Bold & plain");
    }

    #[test]
    fn test_resolve_redirect_passthrough() {
        assert_eq!(
            resolve_redirect("https://example.com/page"),
            "https://example.com/page"
        );
    }
}
