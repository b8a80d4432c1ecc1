use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::schema::v1::{RankResponseMetadataRow, RegulatorRankResponse};

pub fn write_metadata_tsv(path: &Path, rows: &[RankResponseMetadataRow]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_metadata(&mut w, rows)?;
    w.flush()?;
    Ok(())
}

pub fn write_metadata<W: Write>(w: &mut W, rows: &[RankResponseMetadataRow]) -> Result<()> {
    writeln!(
        w,
        "id\tregulator_id\tregulator_symbol\tregulator_locus_tag\tbinding_source\texpression_source\texpression_id\texpression_time\tpromotersetsig\trank25\trank50\tdto_empirical_pvalue\tunivariate_pvalue\trandom_expectation"
    )?;
    for r in rows {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            r.id,
            r.regulator_id,
            r.regulator_symbol,
            text(&r.regulator_locus_tag),
            text(&r.binding_source),
            r.expression_source,
            r.expression_id,
            num(r.expression_time),
            text(&r.promotersetsig),
            num(r.rank25),
            num(r.rank50),
            num(r.dto_empirical_pvalue),
            num(r.univariate_pvalue),
            num(r.random_expectation),
        )?;
    }
    Ok(())
}

pub fn write_curves_tsv(path: &Path, payload: &RegulatorRankResponse) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_curves(&mut w, payload)?;
    w.flush()?;
    Ok(())
}

pub fn write_curves<W: Write>(w: &mut W, payload: &RegulatorRankResponse) -> Result<()> {
    writeln!(
        w,
        "expression_source\texpression_id\treplicate_id\trank\ty\trandom\tci_lower\tci_upper"
    )?;
    for (source, groups) in &payload.expression_groups {
        for group in groups {
            for trace in &group.traces {
                let plot = &trace.plot;
                let n = plot.x.len();
                ensure_len(plot.y.len(), n, "y")?;
                ensure_len(plot.random.len(), n, "random")?;
                ensure_len(plot.ci_lower.len(), n, "ci_lower")?;
                ensure_len(plot.ci_upper.len(), n, "ci_upper")?;
                for i in 0..n {
                    writeln!(
                        w,
                        "{}\t{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
                        source,
                        group.expression_id,
                        trace.replicate_id,
                        plot.x[i],
                        plot.y[i],
                        plot.random[i],
                        plot.ci_lower[i],
                        plot.ci_upper[i]
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn num(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

fn ensure_len(got: usize, expected: usize, name: &str) -> Result<()> {
    if got != expected {
        bail!("{} length mismatch: {} != {}", name, got, expected);
    }
    Ok(())
}
