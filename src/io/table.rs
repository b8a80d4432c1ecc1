use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;

use crate::io::archive::{gunzip, is_gzip};
use crate::math::numeric::{Cell, is_null_like, parse_numeric};

static MISSING: Cell = Cell::Missing;

/// Header-keyed table of raw cells. Short records are padded with
/// `Cell::Missing` so every row exposes every declared column.
#[derive(Debug, Clone)]
pub struct NumericTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl NumericTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().map(move |cells| TableRow { table: self, cells })
    }

    /// Column coerced to numbers; unparseable cells become `None`.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| parse_numeric(&r[idx])).collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a NumericTable,
    cells: &'a [Cell],
}

impl<'a> TableRow<'a> {
    pub fn get(&self, column: &str) -> &'a Cell {
        match self.table.column_index(column) {
            Some(idx) => &self.cells[idx],
            None => &MISSING,
        }
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).as_str().filter(|s| !is_null_like(s)).map(str::trim)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        parse_numeric(self.get(column))
    }
}

pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let tabs = header.matches('\t').count();
    let commas = header.matches(',').count();
    if tabs > commas { b'\t' } else { b',' }
}

pub fn parse_delimited(text: &str) -> Result<NumericTable> {
    parse_delimited_with(text, sniff_delimiter(text))
}

pub fn parse_delimited_with(text: &str, delimiter: u8) -> Result<NumericTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read header row")?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("delimited text has no header row");
    }

    let mut index = HashMap::with_capacity(headers.len());
    for (i, h) in headers.iter().enumerate() {
        if index.insert(h.clone(), i).is_some() {
            bail!("duplicate column '{}' in header", h);
        }
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed record at row {}", line + 2))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut cells = Vec::with_capacity(headers.len());
        for i in 0..headers.len() {
            cells.push(match record.get(i) {
                Some(raw) => Cell::Text(raw.to_string()),
                None => Cell::Missing,
            });
        }
        rows.push(cells);
    }

    Ok(NumericTable {
        headers,
        index,
        rows,
    })
}

/// Parses file contents read elsewhere. The delimiter follows the file
/// extension (`.tsv`/`.txt` tab, `.csv` comma), sniffed otherwise; `.gz`
/// content is decompressed first.
pub fn decode_delimited(path: &Path, bytes: &[u8]) -> Result<NumericTable> {
    let text = if is_gzip(bytes) {
        let raw = gunzip(bytes).with_context(|| format!("failed to decompress {}", path.display()))?;
        String::from_utf8(raw).with_context(|| format!("{} is not UTF-8", path.display()))?
    } else {
        std::str::from_utf8(bytes)
            .with_context(|| format!("{} is not UTF-8", path.display()))?
            .to_string()
    };
    let delimiter = match path
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.trim_end_matches(".gz"))
    {
        Some(name) if name.ends_with(".tsv") || name.ends_with(".txt") => b'\t',
        Some(name) if name.ends_with(".csv") => b',',
        _ => sniff_delimiter(&text),
    };
    parse_delimited_with(&text, delimiter)
        .with_context(|| format!("failed to parse {}", path.display()))
}
