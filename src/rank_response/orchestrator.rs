use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{QueryError, QueryResult};
use crate::io::archive::extract_member;
use crate::io::table::parse_delimited;
use crate::math::binomial::Binomial;
use crate::pool::run_bounded;
use crate::rank_response::curve::{build_curve, observations_from_table};
use crate::rank_response::metadata::parse_metadata;
use crate::schema::v1::{
    MetadataPayload, ProcessedPlotData, RankResponseExpressionGroup, RankResponseMetadataRow,
    RegulatorRankResponse, RegulatorSummary, ReplicateTrace,
};
use crate::upstream::{ExportQuery, Upstream};

pub async fn fetch_metadata(
    upstream: &dyn Upstream,
    query: &ExportQuery,
) -> QueryResult<MetadataPayload> {
    let body = upstream.export(query).await?;
    let metadata = parse_metadata(&body.text)
        .map_err(|e| QueryError::Malformed(format!("metadata export: {:#}", e)))?;
    Ok(MetadataPayload {
        metadata,
        source_timestamp: body.last_modified,
    })
}

/// Downloads one replicate archive and turns its CSV member into a curve.
/// `Ok(None)` means the member parsed but held no usable rank bins.
pub async fn fetch_replicate_curve(
    upstream: &dyn Upstream,
    record_id: &str,
    max_bin: u32,
) -> QueryResult<Option<ProcessedPlotData>> {
    let archive = upstream.record_archive(record_id).await?;
    let member = extract_member(&archive, record_id)
        .map_err(|e| QueryError::Malformed(format!("archive for {}: {:#}", record_id, e)))?
        .ok_or_else(|| {
            QueryError::Malformed(format!("archive has no member {}.csv", record_id))
        })?;
    let text = String::from_utf8(member)
        .map_err(|_| QueryError::Malformed(format!("{}.csv is not UTF-8", record_id)))?;
    let table = parse_delimited(&text)
        .map_err(|e| QueryError::Malformed(format!("{}.csv: {:#}", record_id, e)))?;
    let observations = observations_from_table(&table)
        .map_err(|e| QueryError::Malformed(format!("{}.csv: {:#}", record_id, e)))?;
    let mut binomial = Binomial::new();
    Ok(build_curve(&observations, max_bin, &mut binomial))
}

/// Metadata plus grouped curves for one regulator. Replicates that fail to
/// download or parse are logged and left out.
pub async fn regulator_rank_response(
    upstream: &dyn Upstream,
    config: &Config,
    regulator_id: i64,
) -> QueryResult<RegulatorRankResponse> {
    let start = Instant::now();
    let query = ExportQuery::from_config(config, Some(regulator_id));
    let mut payload = fetch_metadata(upstream, &query).await?;
    payload.metadata.retain(|row| row.regulator_id == regulator_id);
    let metadata = payload.metadata;

    let record_ids: BTreeSet<String> = metadata.iter().map(|row| row.id.clone()).collect();
    let total = record_ids.len();
    let max_bin = config.max_rank_bin;

    let results = run_bounded(record_ids, config.worker_limit, |record_id| async move {
        let result = fetch_replicate_curve(upstream, &record_id, max_bin).await;
        (record_id, result)
    })
    .await;

    let mut curves = HashMap::new();
    let mut failed = 0usize;
    for (record_id, result) in results {
        match result {
            Ok(Some(curve)) => {
                curves.insert(record_id, curve);
            }
            Ok(None) => debug!(replicate = %record_id, "replicate has no rank bins in range"),
            Err(err) => {
                failed += 1;
                warn!(
                    regulator_id,
                    replicate = %record_id,
                    kind = ?err.kind(),
                    error = %err,
                    "replicate skipped"
                );
            }
        }
    }

    info!(
        regulator_id,
        replicates = total,
        curves = curves.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "regulator rank response assembled"
    );

    Ok(assemble(regulator_id, metadata, &curves))
}

/// Groups curves by expression source, then by expression id. Output order
/// depends only on the ids, never on the order `curves` was filled in.
pub fn assemble(
    regulator_id: i64,
    metadata: Vec<RankResponseMetadataRow>,
    curves: &HashMap<String, ProcessedPlotData>,
) -> RegulatorRankResponse {
    let regulator = RegulatorSummary {
        id: regulator_id,
        symbol: metadata.first().map(|r| r.regulator_symbol.clone()),
        locus_tag: metadata.iter().find_map(|r| r.regulator_locus_tag.clone()),
    };

    let mut sources: BTreeMap<String, BTreeMap<String, RankResponseExpressionGroup>> =
        BTreeMap::new();
    let mut sorted: Vec<&RankResponseMetadataRow> = metadata.iter().collect();
    sorted.sort_by(|a, b| compare_ids(&a.id, &b.id));

    for row in sorted {
        let groups = sources.entry(row.expression_source.clone()).or_default();
        let Some(curve) = curves.get(&row.id) else {
            continue;
        };
        let group = groups
            .entry(row.expression_id.clone())
            .or_insert_with(|| RankResponseExpressionGroup {
                expression_id: row.expression_id.clone(),
                expression_source: row.expression_source.clone(),
                time: row.expression_time,
                random: None,
                traces: Vec::new(),
            });
        if group.time.is_none() {
            group.time = row.expression_time;
        }
        if group.random.is_none() {
            group.random = row
                .random_expectation
                .or_else(|| curve.random.first().copied());
        }
        if group.traces.iter().any(|t| t.replicate_id == row.id) {
            continue;
        }
        group.traces.push(ReplicateTrace {
            replicate_id: row.id.clone(),
            binding_id: row.binding_id.clone(),
            binding_source: row.binding_source.clone(),
            promotersetsig: row.promotersetsig.clone(),
            plot: curve.clone(),
        });
    }

    let expression_groups = sources
        .into_iter()
        .map(|(source, groups)| {
            let mut groups: Vec<RankResponseExpressionGroup> = groups.into_values().collect();
            groups.sort_by(|a, b| compare_ids(&a.expression_id, &b.expression_id));
            (source, groups)
        })
        .collect();

    RegulatorRankResponse {
        regulator,
        metadata,
        expression_groups,
    }
}

/// Numeric ids compare numerically, everything else lexicographically.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
