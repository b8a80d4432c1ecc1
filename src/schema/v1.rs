use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrixPayload {
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResponseMetadataRow {
    /// Rank-response record id; names the per-replicate archive upstream.
    pub id: String,
    pub regulator_id: i64,
    pub regulator_symbol: String,
    pub regulator_locus_tag: Option<String>,
    pub binding_id: Option<String>,
    pub binding_source: Option<String>,
    pub expression_id: String,
    pub expression_source: String,
    pub expression_time: Option<f64>,
    pub promotersetsig: Option<String>,
    pub rank25: Option<f64>,
    pub rank50: Option<f64>,
    pub dto_empirical_pvalue: Option<f64>,
    pub univariate_pvalue: Option<f64>,
    pub random_expectation: Option<f64>,
    pub binding_qc_status: Option<String>,
    pub expression_qc_status: Option<String>,
    pub genomic_inserts: Option<f64>,
    pub mito_inserts: Option<f64>,
    pub plasmid_inserts: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedPlotData {
    pub x: Vec<u32>,
    pub y: Vec<f64>,
    pub random: Vec<f64>,
    pub ci_lower: Vec<f64>,
    pub ci_upper: Vec<f64>,
}

impl ProcessedPlotData {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicateTrace {
    pub replicate_id: String,
    pub binding_id: Option<String>,
    pub binding_source: Option<String>,
    pub promotersetsig: Option<String>,
    pub plot: ProcessedPlotData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResponseExpressionGroup {
    pub expression_id: String,
    pub expression_source: String,
    pub time: Option<f64>,
    pub random: Option<f64>,
    pub traces: Vec<ReplicateTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatorSummary {
    pub id: i64,
    pub symbol: Option<String>,
    pub locus_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatorRankResponse {
    pub regulator: RegulatorSummary,
    pub metadata: Vec<RankResponseMetadataRow>,
    pub expression_groups: BTreeMap<String, Vec<RankResponseExpressionGroup>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPayload {
    pub metadata: Vec<RankResponseMetadataRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_timestamp: Option<String>,
}

/// Where a query answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Served from a live cache entry.
    Hit,
    /// Computed by this caller.
    Miss,
    /// Awaited a computation another caller already had in flight.
    Busy,
    /// Recomputed on an explicit refresh.
    Refreshed,
    /// Expired entry served because recomputation failed.
    Stale,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Hit => "hit",
            Provenance::Miss => "miss",
            Provenance::Busy => "busy",
            Provenance::Refreshed => "refreshed",
            Provenance::Stale => "stale",
        }
    }

    pub fn is_fresh(&self) -> bool {
        !matches!(self, Provenance::Stale)
    }
}
