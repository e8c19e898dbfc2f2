//! Recent news retrieval
//!
//! A recency-biased search for the resolved ticker: the query embeds the
//! current date so the search engine favours fresh coverage.

use crate::api::search::{SearchHit, WebSearch};
use crate::config::AnalysisConfig;
use crate::error::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Fetches and formats recent news for a ticker
pub struct NewsRetriever {
    search: Arc<dyn WebSearch>,
    config: Arc<AnalysisConfig>,
}

impl NewsRetriever {
    /// Create a new retriever
    pub fn new(search: Arc<dyn WebSearch>, config: Arc<AnalysisConfig>) -> Self {
        Self { search, config }
    }

    /// Fetch recent news, describing any failure in the output
    pub async fn fetch(&self, ticker: &str) -> String {
        match self.try_fetch(ticker).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("news for {ticker} failed: {e}");
                format!("An error occurred while fetching recent news: {e}")
            }
        }
    }

    #[instrument(skip(self))]
    async fn try_fetch(&self, ticker: &str) -> Result<String> {
        let query = format!("{ticker} recent news on {}", Utc::now().format("%d %B %Y"));

        let hits = self
            .search
            .search(&query, &self.config.search_region, self.config.news_max_results)
            .await?;

        Ok(render_news(ticker, &hits))
    }
}

fn render_news(ticker: &str, hits: &[SearchHit]) -> String {
    let mut news = format!("\n## Recent news for {ticker}\n");
    for hit in hits {
        news.push_str(&format!("Title: {}\n", hit.title));
        news.push_str(&format!("Article: {}\n", hit.body));
        news.push_str(&format!("Sources: {}\n", hit.href));
    }
    news
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::search::MockWebSearch;
    use crate::error::AnalysisError;

    #[tokio::test]
    async fn test_fetch_renders_news() {
        let mut search = MockWebSearch::new();
        search
            .expect_search()
            .withf(|query, region, max_results| {
                query.starts_with("RELIANCE recent news on ") && region == "in" && *max_results == 5
            })
            .returning(|_, _, _| {
                Ok(vec![SearchHit {
                    title: "Reliance Q4 results".to_string(),
                    body: "Reliance reported quarterly earnings...".to_string(),
                    href: "https://news.example.com/reliance-q4".to_string(),
                }])
            });

        let retriever = NewsRetriever::new(
            Arc::new(search),
            Arc::new(AnalysisConfig::default()),
        );

        let rendered = retriever.fetch("RELIANCE").await;
        assert!(rendered.starts_with("\n## Recent news for RELIANCE\n"));
        assert!(rendered.contains("Title: Reliance Q4 results\n"));
        assert!(rendered.contains("Article: Reliance reported quarterly earnings...\n"));
        assert!(rendered.contains("Sources: https://news.example.com/reliance-q4\n"));
    }

    #[tokio::test]
    async fn test_fetch_error_becomes_text() {
        let mut search = MockWebSearch::new();
        search
            .expect_search()
            .returning(|_, _, _| Err(AnalysisError::Search("timed out".to_string())));

        let retriever = NewsRetriever::new(
            Arc::new(search),
            Arc::new(AnalysisConfig::default()),
        );

        let rendered = retriever.fetch("RELIANCE").await;
        assert!(rendered.starts_with("An error occurred while fetching recent news:"));
    }

    #[test]
    fn test_render_empty_news() {
        let rendered = render_news("TCS", &[]);
        assert_eq!(rendered, "\n## Recent news for TCS\n");
    }
}
