#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use tfbp_explorer::error::{QueryError, QueryResult};
use tfbp_explorer::upstream::{ExportBody, ExportQuery, Upstream};

#[derive(Default)]
pub struct FakeUpstream {
    pub export_text: String,
    pub last_modified: Option<String>,
    pub archives: HashMap<String, Vec<u8>>,
    pub json: HashMap<String, serde_json::Value>,
    pub delay: Option<Duration>,
    pub export_error: Option<QueryError>,
    pub export_calls: AtomicUsize,
    pub archive_calls: AtomicUsize,
    pub json_calls: AtomicUsize,
    pub queries: parking_lot::Mutex<Vec<ExportQuery>>,
}

impl FakeUpstream {
    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    pub fn archive_calls(&self) -> usize {
        self.archive_calls.load(Ordering::SeqCst)
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn export(&self, query: &ExportQuery) -> QueryResult<ExportBody> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());
        self.pause().await;
        if let Some(err) = &self.export_error {
            return Err(err.clone());
        }
        Ok(ExportBody {
            text: self.export_text.clone(),
            last_modified: self.last_modified.clone(),
        })
    }

    async fn record_archive(&self, record_id: &str) -> QueryResult<Vec<u8>> {
        self.archive_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.archives
            .get(record_id)
            .cloned()
            .ok_or_else(|| QueryError::upstream(Some(404), format!("record {} not found", record_id)))
    }

    async fn fetch_json(&self, url: &str) -> QueryResult<serde_json::Value> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.json
            .get(url)
            .cloned()
            .ok_or_else(|| QueryError::upstream(Some(404), format!("{} not found", url)))
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn tar_gz(members: &[(&str, &[u8])]) -> Vec<u8> {
    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Replicate CSV with one gene per bin in `1..=bins`; bins listed in
/// `responsive` are marked responsive.
pub fn replicate_csv(bins: u32, responsive: &[u32], random: f64) -> String {
    let mut out = String::from("rank_bin,responsive,random\n");
    for bin in 1..=bins {
        let flag = if responsive.contains(&bin) { "True" } else { "False" };
        out.push_str(&format!("{},{},{}\n", bin, flag, random));
    }
    out
}

pub const METADATA_CSV: &str = "\
id,regulator_id,regulator_symbol,regulator_locus_tag,binding_id,binding_source,expression_id,expression_source,expression_time,promotersetsig,rank_25,rank_50,dto_empirical_pvalue,univariate_pvalue,random_expectation
101,7,GAL4,YPL248C,11,harbison,21,kemmeren_tfko,,5001,0.4,0.3,0.01,NA,0.2
102,7,GAL4,YPL248C,12,callingcards,21,kemmeren_tfko,,5002,0.5,0.4,,0.03,0.2
103,7,GAL4,YPL248C,11,harbison,22,mcisaac_oe,15,5001,NA,0.2,,,0.1
104,7,GAL4,YPL248C,12,callingcards,22,mcisaac_oe,15,5002,,,,,0.1
105,7,GAL4,YPL248C,13,chipexo,23,hu_reimann_tfko,,5003,,,,,
";

/// Archives for replicates 101-103; 104 and 105 are missing upstream.
pub fn partial_archives() -> HashMap<String, Vec<u8>> {
    let mut archives = HashMap::new();
    let r101 = replicate_csv(5, &[1, 3, 5], 0.2);
    let r102 = replicate_csv(5, &[2], 0.2);
    let r103 = gzip(replicate_csv(4, &[1, 2], 0.1).as_bytes());
    archives.insert(
        "101".to_string(),
        tar_gz(&[("README.txt", &b"ignored"[..]), ("101.csv", r101.as_bytes())]),
    );
    archives.insert("102".to_string(), tar_gz(&[("data/102.csv", r102.as_bytes())]));
    archives.insert("103".to_string(), tar_gz(&[("103.csv.gz", r103.as_slice())]));
    archives
}
