//! Chronik REST API client.
//!
//! Requests go to the instance that answered last. Failures another instance
//! might not share (connection errors, 404 from a lagging node, 5xx) move on
//! to the next URL in order; anything else is returned immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::chain::BlockResponse;
use crate::domain::{BlockInfo, BlockRef, BlockchainInfo, TokenInfo, TxHistoryPage};
use crate::error::{IndexerError, Result};
use crate::port::BlockSource;

/// HTTP client for one or more chronik instances.
pub struct ChronikClient {
    http: HttpClient,
    /// Base URLs without trailing slash, in failover order.
    urls: Vec<String>,
    /// Index into `urls` of the instance that answered last.
    preferred: AtomicUsize,
}

impl ChronikClient {
    /// Create a client over `urls`, tried in order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::NoUrls`] for an empty list, or an HTTP error if
    /// the client cannot be built.
    pub fn new(urls: Vec<String>, timeout: Duration) -> Result<Self> {
        if urls.is_empty() {
            return Err(IndexerError::NoUrls.into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = HttpClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            urls: urls
                .into_iter()
                .map(|url| url.trim_end_matches('/').to_string())
                .collect(),
            preferred: AtomicUsize::new(0),
        })
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// URL currently tried first.
    #[must_use]
    pub fn preferred_url(&self) -> &str {
        &self.urls[self.preferred.load(Ordering::Relaxed) % self.urls.len()]
    }

    async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let start = self.preferred.load(Ordering::Relaxed);
        let mut last_err = IndexerError::NoUrls;

        for offset in 0..self.urls.len() {
            let index = (start + offset) % self.urls.len();
            let base = &self.urls[index];

            match self.get_from(base, path).await {
                Ok(value) => {
                    if index != start {
                        info!(url = %base, "Switched to indexer");
                        self.preferred.store(index, Ordering::Relaxed);
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => {
                    warn!(url = %base, path, error = %err, "Indexer request failed, trying next");
                    last_err = err;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(last_err.into())
    }

    async fn get_from<T>(&self, base: &str, path: &str) -> std::result::Result<T, IndexerError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{base}{path}");
        debug!(url = %url, "Indexer request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| IndexerError::Unreachable {
                url: base.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(IndexerError::NotFound(path.to_string())),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                return Err(IndexerError::BadRequest {
                    path: path.to_string(),
                    body,
                });
            }
            status => {
                return Err(IndexerError::Status {
                    status: status.as_u16(),
                    path: path.to_string(),
                })
            }
        }

        response
            .json::<T>()
            .await
            .map_err(|source| IndexerError::Decode {
                path: path.to_string(),
                source,
            })
    }
}

#[async_trait]
impl BlockSource for ChronikClient {
    async fn blockchain_info(&self) -> Result<BlockchainInfo> {
        self.get("/blockchain-info").await
    }

    async fn block(&self, block: &BlockRef) -> Result<BlockInfo> {
        let response: BlockResponse = self.get(&format!("/block/{block}")).await?;
        Ok(response.block_info)
    }

    async fn block_txs(
        &self,
        block: &BlockRef,
        page: u32,
        page_size: u32,
    ) -> Result<TxHistoryPage> {
        let path = format!("/block-txs/{block}?page={page}&page_size={page_size}");
        let txs: TxHistoryPage = self.get(&path).await?;
        debug!(%block, page, num_pages = txs.num_pages, "Fetched block txs");
        Ok(txs)
    }

    async fn token(&self, token_id: &str) -> Result<TokenInfo> {
        self.get(&format!("/token/{token_id}")).await
    }
}
