use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_WORKER_LIMIT: usize = 4;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RANK_BIN: u32 = 150;
pub const DEFAULT_EXPRESSION_SOURCES: [&str; 3] = ["kemmeren_tfko", "mcisaac_oe", "hu_reimann_tfko"];
pub const TARGET_COLUMN: &str = "target";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub data_dir: PathBuf,
    pub binding_file: String,
    pub perturbation_file: String,
    pub binding_remote: Option<String>,
    pub perturbation_remote: Option<String>,
    pub cache_ttl: Duration,
    pub worker_limit: usize,
    pub request_timeout: Duration,
    pub max_rank_bin: u32,
    pub expression_sources: Vec<String>,
    pub expression_time: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            data_dir: PathBuf::from("data"),
            binding_file: "binding_corr.csv".to_string(),
            perturbation_file: "perturbation_corr.csv".to_string(),
            binding_remote: None,
            perturbation_remote: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            worker_limit: DEFAULT_WORKER_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_rank_bin: DEFAULT_MAX_RANK_BIN,
            expression_sources: DEFAULT_EXPRESSION_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            expression_time: Some(15.0),
        }
    }
}

impl Config {
    /// Base URL (with trailing slash) and token for the dataset API.
    pub fn upstream_credentials(&self) -> QueryResult<(String, String)> {
        let base = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QueryError::Config("API base URL is not set".to_string()))?;
        let token = self
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QueryError::Config("API token is not set".to_string()))?;
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        Ok((base, token.to_string()))
    }

    pub fn correlation_source(&self, kind: SourceKind) -> crate::correlation::CorrelationSource {
        let (file, remote) = match kind {
            SourceKind::Binding => (&self.binding_file, &self.binding_remote),
            SourceKind::Perturbation => (&self.perturbation_file, &self.perturbation_remote),
        };
        crate::correlation::CorrelationSource {
            name: kind.as_str().to_string(),
            path: self.data_dir.join(file),
            exclude: HashSet::from([TARGET_COLUMN.to_string()]),
            remote: remote.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Binding,
    Perturbation,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Binding => "binding",
            SourceKind::Perturbation => "perturbation",
        }
    }
}
