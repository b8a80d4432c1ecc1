use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::correlation::matrix::{build_from_table, canonicalize};
use crate::error::{QueryError, QueryResult};
use crate::io::table::decode_delimited;
use crate::schema::v1::CorrelationMatrixPayload;
use crate::upstream::Upstream;

/// One logical correlation dataset: a local snapshot plus an optional
/// remote JSON endpoint serving a precomputed payload.
#[derive(Debug, Clone)]
pub struct CorrelationSource {
    pub name: String,
    pub path: PathBuf,
    pub exclude: HashSet<String>,
    pub remote: Option<String>,
}

/// Local snapshot first, remote endpoint second. Each is tried once; when
/// both fail the remote error is returned.
pub async fn load_correlation(
    source: &CorrelationSource,
    upstream: Option<&dyn Upstream>,
) -> QueryResult<CorrelationMatrixPayload> {
    let start = Instant::now();
    let local_err = match load_local(source).await {
        Ok(payload) => {
            info!(
                source = %source.name,
                labels = payload.labels.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "correlation matrix computed from local snapshot"
            );
            return Ok(payload);
        }
        Err(err) => {
            warn!(source = %source.name, path = %source.path.display(), error = %err, "local correlation source failed");
            err
        }
    };

    let (Some(url), Some(upstream)) = (source.remote.as_deref(), upstream) else {
        return Err(local_err);
    };
    match load_remote(upstream, url).await {
        Ok(payload) => {
            info!(source = %source.name, url, "correlation matrix loaded from remote endpoint");
            Ok(payload)
        }
        Err(err) => {
            warn!(source = %source.name, url, error = %err, "remote correlation source failed");
            Err(err)
        }
    }
}

pub async fn load_local(source: &CorrelationSource) -> QueryResult<CorrelationMatrixPayload> {
    let bytes = tokio::fs::read(&source.path)
        .await
        .map_err(|e| QueryError::Io(format!("{}: {}", source.path.display(), e)))?;
    let table = decode_delimited(&source.path, &bytes)
        .map_err(|e| QueryError::Malformed(format!("{:#}", e)))?;
    Ok(build_from_table(&table, &source.exclude))
}

pub async fn load_remote(upstream: &dyn Upstream, url: &str) -> QueryResult<CorrelationMatrixPayload> {
    let value = upstream.fetch_json(url).await?;
    validate_payload(value).map(canonicalize)
}

/// Accepts a remote payload only when it has the expected shape.
pub fn validate_payload(value: Value) -> QueryResult<CorrelationMatrixPayload> {
    let obj = value
        .as_object()
        .ok_or_else(|| QueryError::Malformed("correlation payload is not an object".to_string()))?;
    if !obj.get("labels").is_some_and(Value::is_array) {
        return Err(QueryError::Malformed("`labels` is not an array".to_string()));
    }
    if !obj.get("matrix").is_some_and(Value::is_array) {
        return Err(QueryError::Malformed("`matrix` is not an array".to_string()));
    }
    for field in ["min", "max"] {
        if !obj.get(field).is_some_and(Value::is_number) {
            return Err(QueryError::Malformed(format!("`{}` is not a number", field)));
        }
    }

    let payload: CorrelationMatrixPayload = serde_json::from_value(value)
        .map_err(|e| QueryError::Malformed(format!("correlation payload: {}", e)))?;
    let n = payload.labels.len();
    if payload.matrix.len() != n || payload.matrix.iter().any(|row| row.len() != n) {
        return Err(QueryError::Malformed(format!(
            "matrix is not {}x{} to match labels",
            n, n
        )));
    }
    Ok(payload)
}
