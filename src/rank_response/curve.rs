//! Rank-response curve: the fraction of the top-`k` bound genes that are
//! responsive, against a fixed random-expectation baseline and its 95%
//! binomial envelope.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::io::table::NumericTable;
use crate::math::binomial::Binomial;
use crate::math::numeric::parse_bool;
use crate::schema::v1::ProcessedPlotData;

pub const RANK_BIN_COLUMN: &str = "rank_bin";
pub const RESPONSIVE_COLUMN: &str = "responsive";
pub const RANDOM_COLUMN: &str = "random";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankObservation {
    pub rank_bin: i64,
    pub responsive: bool,
    pub random: Option<f64>,
}

#[derive(Debug, Default, Clone, Copy)]
struct BinTally {
    successes: u64,
    random: Option<f64>,
}

/// Per-gene observations from one replicate's CSV. Rows without a usable
/// rank bin are dropped; a missing responsive flag counts as not responsive.
pub fn observations_from_table(table: &NumericTable) -> Result<Vec<RankObservation>> {
    for column in [RANK_BIN_COLUMN, RESPONSIVE_COLUMN] {
        if table.column_index(column).is_none() {
            bail!("replicate table has no '{}' column", column);
        }
    }
    let mut out = Vec::with_capacity(table.n_rows());
    for row in table.rows() {
        let Some(bin) = row.number(RANK_BIN_COLUMN) else {
            continue;
        };
        if bin.fract() != 0.0 {
            continue;
        }
        out.push(RankObservation {
            rank_bin: bin as i64,
            responsive: row
                .text(RESPONSIVE_COLUMN)
                .and_then(parse_bool)
                .unwrap_or(false),
            random: row.number(RANDOM_COLUMN),
        });
    }
    Ok(out)
}

/// Builds the curve for bins in `(0, max_bin]`. Returns `None` when no
/// observation survives the filter.
///
/// The baseline is the random value of the smallest bin and is broadcast
/// unchanged to every point; if that bin carries no value the first bin
/// that does is used, and 0 when none do.
pub fn build_curve(
    observations: &[RankObservation],
    max_bin: u32,
    binomial: &mut Binomial,
) -> Option<ProcessedPlotData> {
    let mut bins: BTreeMap<u32, BinTally> = BTreeMap::new();
    for obs in observations {
        if obs.rank_bin <= 0 || obs.rank_bin > max_bin as i64 {
            continue;
        }
        let tally = bins.entry(obs.rank_bin as u32).or_default();
        if obs.responsive {
            tally.successes += 1;
        }
        if obs.random.is_some() {
            tally.random = obs.random;
        }
    }
    if bins.is_empty() {
        return None;
    }

    let baseline = bins
        .values()
        .find_map(|t| t.random)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    let n = bins.len();
    let mut plot = ProcessedPlotData {
        x: Vec::with_capacity(n),
        y: Vec::with_capacity(n),
        random: Vec::with_capacity(n),
        ci_lower: Vec::with_capacity(n),
        ci_upper: Vec::with_capacity(n),
    };

    let mut cumulative = 0u64;
    for (&bin, tally) in &bins {
        cumulative += tally.successes;
        let k = bin as u64;
        let (lower, upper) = binomial.confidence_interval_95(k, baseline);
        plot.x.push(bin);
        plot.y.push((cumulative as f64 / k as f64).min(1.0));
        plot.random.push(baseline);
        plot.ci_lower.push(lower.min(baseline));
        plot.ci_upper.push(upper.max(baseline));
    }
    Some(plot)
}
