use anyhow::Context;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::CatalogConfig;

/// Thin passthrough to the TMDb v3 API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    api_key: String,
    language: String,
}

impl CatalogClient {
    pub fn new(cfg: &CatalogConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid catalog base url {}", cfg.base_url))?;
        anyhow::ensure!(!base_url.cannot_be_a_base(), "catalog base url cannot be a base");
        Ok(Self {
            http: Client::builder().build().context("build http client")?,
            base_url,
            api_key: cfg.api_key.clone(),
            language: cfg.language.clone(),
        })
    }

    fn url(&self, segments: &[&str], page: Option<u32>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api_key", &self.api_key)
                .append_pair("language", &self.language);
            if let Some(page) = page {
                query.append_pair("page", &page.to_string());
            }
        }
        url
    }

    async fn get(&self, segments: &[&str], page: Option<u32>) -> anyhow::Result<Value> {
        let url = self.url(segments, page);
        debug!(path = %url.path(), "catalog request");
        let body = self
            .http
            .get(url)
            .send()
            .await
            .context("send catalog request")?
            .error_for_status()
            .context("catalog status")?
            .json::<Value>()
            .await
            .context("decode catalog body")?;
        Ok(body)
    }

    pub async fn genres(&self) -> anyhow::Result<Value> {
        Ok(pluck(self.get(&["genre", "movie", "list"], None).await?, "genres"))
    }

    pub async fn popular(&self) -> anyhow::Result<Value> {
        Ok(pluck(self.get(&["movie", "popular"], None).await?, "results"))
    }

    pub async fn now_playing(&self, page: u32) -> anyhow::Result<Value> {
        Ok(pluck(
            self.get(&["movie", "now_playing"], Some(page)).await?,
            "results",
        ))
    }

    pub async fn movie(&self, movie_id: &str) -> anyhow::Result<Value> {
        self.get(&["movie", movie_id], None).await
    }

    pub async fn recommendations(&self, movie_id: &str) -> anyhow::Result<Value> {
        self.get(&["movie", movie_id, "recommendations"], Some(1))
            .await
    }
}

/// Take one field out of an upstream body, `null` when absent.
fn pluck(mut body: Value, key: &str) -> Value {
    body.get_mut(key).map(Value::take).unwrap_or(Value::Null)
}
