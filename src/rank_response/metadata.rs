use anyhow::{Result, bail};
use tracing::warn;

use crate::io::table::{NumericTable, TableRow, parse_delimited};
use crate::schema::v1::RankResponseMetadataRow;

const ID: &[&str] = &["id"];
const REGULATOR_ID: &[&str] = &["regulator_id", "regulator"];
const REGULATOR_SYMBOL: &[&str] = &["regulator_symbol", "symbol"];
const REGULATOR_LOCUS_TAG: &[&str] = &["regulator_locus_tag", "locus_tag"];
const BINDING_ID: &[&str] = &["binding_id", "binding"];
const BINDING_SOURCE: &[&str] = &["binding_source"];
const EXPRESSION_ID: &[&str] = &["expression_id", "expression"];
const EXPRESSION_SOURCE: &[&str] = &["expression_source"];
const EXPRESSION_TIME: &[&str] = &["expression_time", "time"];
const PROMOTERSETSIG: &[&str] = &["promotersetsig"];
const RANK25: &[&str] = &["rank_25", "rank25"];
const RANK50: &[&str] = &["rank_50", "rank50"];
const DTO_PVALUE: &[&str] = &["dto_empirical_pvalue"];
const UNIVARIATE_PVALUE: &[&str] = &["univariate_pvalue"];
const RANDOM_EXPECTATION: &[&str] = &["random_expectation", "random"];
const BINDING_QC: &[&str] = &["binding_qc_status", "binding_status"];
const EXPRESSION_QC: &[&str] = &["expression_qc_status", "expression_status"];
const GENOMIC_INSERTS: &[&str] = &["genomic_inserts"];
const MITO_INSERTS: &[&str] = &["mito_inserts"];
const PLASMID_INSERTS: &[&str] = &["plasmid_inserts"];

const REQUIRED: [(&str, &[&str]); 5] = [
    ("id", ID),
    ("regulator_id", REGULATOR_ID),
    ("regulator_symbol", REGULATOR_SYMBOL),
    ("expression_id", EXPRESSION_ID),
    ("expression_source", EXPRESSION_SOURCE),
];

pub fn parse_metadata(text: &str) -> Result<Vec<RankResponseMetadataRow>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let table = parse_delimited(text)?;
    metadata_from_table(&table)
}

pub fn metadata_from_table(table: &NumericTable) -> Result<Vec<RankResponseMetadataRow>> {
    for (name, aliases) in REQUIRED {
        if !aliases.iter().any(|a| table.column_index(a).is_some()) {
            bail!("metadata export has no '{}' column", name);
        }
    }

    let mut rows = Vec::with_capacity(table.n_rows());
    let mut skipped = 0usize;
    for row in table.rows() {
        match parse_row(&row) {
            Some(parsed) => rows.push(parsed),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, kept = rows.len(), "metadata rows without required fields skipped");
    }
    Ok(rows)
}

fn text(row: &TableRow<'_>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|a| row.text(a)).map(str::to_string)
}

fn number(row: &TableRow<'_>, aliases: &[&str]) -> Option<f64> {
    aliases.iter().find_map(|a| row.number(a))
}

/// Integer-valued ids may arrive as "12" or "12.0".
fn id_text(row: &TableRow<'_>, aliases: &[&str]) -> Option<String> {
    let raw = text(row, aliases)?;
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v.is_finite() => Some(format!("{}", v as i64)),
        _ => Some(raw),
    }
}

fn parse_row(row: &TableRow<'_>) -> Option<RankResponseMetadataRow> {
    let regulator_id = number(row, REGULATOR_ID).filter(|v| v.fract() == 0.0)? as i64;
    Some(RankResponseMetadataRow {
        id: id_text(row, ID)?,
        regulator_id,
        regulator_symbol: text(row, REGULATOR_SYMBOL)?,
        regulator_locus_tag: text(row, REGULATOR_LOCUS_TAG),
        binding_id: id_text(row, BINDING_ID),
        binding_source: text(row, BINDING_SOURCE),
        expression_id: id_text(row, EXPRESSION_ID)?,
        expression_source: text(row, EXPRESSION_SOURCE)?,
        expression_time: number(row, EXPRESSION_TIME),
        promotersetsig: id_text(row, PROMOTERSETSIG),
        rank25: number(row, RANK25),
        rank50: number(row, RANK50),
        dto_empirical_pvalue: number(row, DTO_PVALUE),
        univariate_pvalue: number(row, UNIVARIATE_PVALUE),
        random_expectation: number(row, RANDOM_EXPECTATION),
        binding_qc_status: text(row, BINDING_QC),
        expression_qc_status: text(row, EXPRESSION_QC),
        genomic_inserts: number(row, GENOMIC_INSERTS),
        mito_inserts: number(row, MITO_INSERTS),
        plasmid_inserts: number(row, PLASMID_INSERTS),
    })
}
