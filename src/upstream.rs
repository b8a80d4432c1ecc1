//! Dataset API access.
//!
//! The [`Upstream`] trait is the seam between the engines and the network;
//! [`HttpUpstream`] is the reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, LAST_MODIFIED};
use tracing::debug;

use crate::config::Config;
use crate::error::{QueryError, QueryResult};
use crate::io::archive::gunzip_or_plain;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportQuery {
    pub regulator_id: Option<i64>,
    pub expression_sources: Vec<String>,
    pub expression_time: Option<f64>,
}

impl ExportQuery {
    pub fn from_config(config: &Config, regulator_id: Option<i64>) -> Self {
        Self {
            regulator_id,
            expression_sources: config.expression_sources.clone(),
            expression_time: config.expression_time,
        }
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.regulator_id {
            params.push(("regulator_id".to_string(), id.to_string()));
        }
        if !self.expression_sources.is_empty() {
            params.push((
                "expression_source".to_string(),
                self.expression_sources.join(","),
            ));
        }
        if let Some(time) = self.expression_time {
            params.push(("expression_time".to_string(), format!("{}", time)));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportBody {
    pub text: String,
    pub last_modified: Option<String>,
}

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Metadata export as delimited text.
    async fn export(&self, query: &ExportQuery) -> QueryResult<ExportBody>;

    /// Raw gzip-compressed tar archive for one rank-response record.
    async fn record_archive(&self, record_id: &str) -> QueryResult<Vec<u8>>;

    /// JSON document from an absolute URL.
    async fn fetch_json(&self, url: &str) -> QueryResult<serde_json::Value>;
}

pub struct HttpUpstream {
    http: Client,
    config: Config,
}

impl HttpUpstream {
    pub fn new(config: Config) -> QueryResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QueryError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    async fn get_bytes(
        &self,
        url: &str,
        params: &[(String, String)],
        token: Option<&str>,
    ) -> QueryResult<(Vec<u8>, Option<String>)> {
        let mut request = self.http.get(url).query(params);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::upstream(
                Some(status.as_u16()),
                format!("GET {} returned {}", url, status),
            ));
        }
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        debug!(url, bytes = bytes.len(), "upstream response received");
        Ok((bytes.to_vec(), last_modified))
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn export(&self, query: &ExportQuery) -> QueryResult<ExportBody> {
        let (base, token) = self.config.upstream_credentials()?;
        let url = format!("{}export/", base);
        let (bytes, last_modified) = self.get_bytes(&url, &query.params(), Some(&token)).await?;
        Ok(ExportBody {
            text: gunzip_or_plain(&bytes),
            last_modified,
        })
    }

    async fn record_archive(&self, record_id: &str) -> QueryResult<Vec<u8>> {
        let (base, token) = self.config.upstream_credentials()?;
        let url = format!("{}record_table_and_files/", base);
        let params = [("id".to_string(), record_id.to_string())];
        let (bytes, _) = self.get_bytes(&url, &params, Some(&token)).await?;
        Ok(bytes)
    }

    async fn fetch_json(&self, url: &str) -> QueryResult<serde_json::Value> {
        let token = self.config.api_token.clone();
        let (bytes, _) = self.get_bytes(url, &[], token.as_deref()).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| QueryError::Malformed(format!("invalid JSON from {}: {}", url, e)))
    }
}
