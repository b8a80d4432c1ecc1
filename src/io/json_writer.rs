use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::error::QueryError;
use crate::schema::v1::Provenance;

/// Envelope written by the CLI: the payload plus where it came from.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub provenance: Provenance,
    pub data: &'a T,
}

pub fn to_json_string<T: Serialize>(provenance: Provenance, data: &T) -> Result<String> {
    let envelope = Envelope { provenance, data };
    serde_json::to_string_pretty(&envelope).context("failed to serialize payload")
}

pub fn error_json(err: &QueryError) -> Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({ "error": err.report() }))
        .context("failed to serialize error")
}

pub fn write_json<T: Serialize>(path: &Path, provenance: Provenance, data: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &Envelope { provenance, data })?;
    Ok(())
}
