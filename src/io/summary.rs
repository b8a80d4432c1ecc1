use crate::schema::v1::{
    CorrelationMatrixPayload, MetadataPayload, Provenance, RegulatorRankResponse,
};

pub fn format_correlation_summary(
    source: &str,
    payload: &CorrelationMatrixPayload,
    provenance: Provenance,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("tfbp-explorer v{}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!(
        "Correlation: source={}, datasets={}, cache={}\n",
        source,
        payload.labels.len(),
        provenance.as_str()
    ));
    out.push_str(&format!("Range: [{:+.4}, {:+.4}]\n", payload.min, payload.max));
    out
}

pub fn format_metadata_summary(payload: &MetadataPayload, provenance: Provenance) -> String {
    let mut regulators: Vec<i64> = payload.metadata.iter().map(|r| r.regulator_id).collect();
    regulators.sort_unstable();
    regulators.dedup();

    let mut out = String::new();
    out.push_str(&format!("tfbp-explorer v{}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!(
        "Metadata: {} rows, {} regulators, cache={}\n",
        payload.metadata.len(),
        regulators.len(),
        provenance.as_str()
    ));
    if let Some(ts) = &payload.source_timestamp {
        out.push_str(&format!("Source timestamp: {}\n", ts));
    }
    out
}

pub fn format_regulator_summary(payload: &RegulatorRankResponse, provenance: Provenance) -> String {
    let reg = &payload.regulator;
    let mut out = String::new();
    out.push_str(&format!("tfbp-explorer v{}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!(
        "Regulator: {} ({}{}), cache={}\n",
        reg.id,
        reg.symbol.as_deref().unwrap_or("unknown"),
        reg.locus_tag
            .as_deref()
            .map(|t| format!(", {}", t))
            .unwrap_or_default(),
        provenance.as_str()
    ));
    out.push_str(&format!("Metadata rows: {}\n", payload.metadata.len()));
    if payload.expression_groups.is_empty() {
        out.push_str("Curves: none\n");
    }
    for (source, groups) in &payload.expression_groups {
        let traces: usize = groups.iter().map(|g| g.traces.len()).sum();
        out.push_str(&format!(
            "{}: {} experiments, {} traces\n",
            source,
            groups.len(),
            traces
        ));
    }
    out
}
