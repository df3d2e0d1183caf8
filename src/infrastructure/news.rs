use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

/// A single headline returned by `/news`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
}

fn fallback_articles() -> Vec<Article> {
    vec![
        Article {
            title: "Markets steady as trading competition enters new round".to_string(),
            url: "https://example.com/markets-steady".to_string(),
        },
        Article {
            title: "Analysts watch volatility as teams adjust positions".to_string(),
            url: "https://example.com/volatility-watch".to_string(),
        },
    ]
}

struct Cache {
    articles: Vec<Article>,
    fetched_at: Instant,
}

/// Best-effort read-through to an upstream news feed, with a cache and a
/// fixed fallback article set on any error. The upstream is treated as
/// opaque; it is never required for the server to run.
pub struct NewsService {
    upstream_url: Option<String>,
    client: reqwest::Client,
    cache_ttl: Duration,
    cache: Mutex<Option<Cache>>,
}

impl NewsService {
    pub fn new(upstream_url: Option<String>, request_timeout: Duration, cache_ttl: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            upstream_url,
            client,
            cache_ttl,
            cache: Mutex::new(None),
        }
    }

    pub async fn articles(&self) -> Vec<Article> {
        let Some(url) = &self.upstream_url else {
            return fallback_articles();
        };

        let mut cache = self.cache.lock().await;
        if let Some(entry) = cache.as_ref()
            && entry.fetched_at.elapsed() < self.cache_ttl
        {
            return entry.articles.clone();
        }

        match self.fetch(url).await {
            Ok(articles) => {
                *cache = Some(Cache {
                    articles: articles.clone(),
                    fetched_at: Instant::now(),
                });
                articles
            }
            Err(e) => {
                warn!("news upstream fetch failed, serving fallback articles: {e}");
                fallback_articles()
            }
        }
    }

    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<Article>> {
        let articles: Vec<Article> = self.client.get(url).send().await?.json().await?;
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_upstream_url_serves_fallback() {
        let service = NewsService::new(None, Duration::from_millis(100), Duration::from_secs(300));
        let articles = service.articles().await;
        assert!(!articles.is_empty());
    }

    #[tokio::test]
    async fn unreachable_upstream_serves_fallback() {
        let service = NewsService::new(
            Some("http://127.0.0.1:1".to_string()),
            Duration::from_millis(200),
            Duration::from_secs(300),
        );
        let articles = service.articles().await;
        assert!(!articles.is_empty());
    }
}
