mod common;

use std::fs;

use tempfile::TempDir;
use tfbp_explorer::config::Config;
use tfbp_explorer::error::QueryError;
use tfbp_explorer::io::json_writer::{error_json, write_json};
use tfbp_explorer::io::summary::format_regulator_summary;
use tfbp_explorer::io::tsv_writer::{write_curves_tsv, write_metadata_tsv};
use tfbp_explorer::rank_response::{parse_metadata, regulator_rank_response};
use tfbp_explorer::schema::v1::Provenance;

use common::FakeUpstream;

async fn response() -> tfbp_explorer::schema::v1::RegulatorRankResponse {
    let upstream = FakeUpstream {
        export_text: common::METADATA_CSV.to_string(),
        archives: common::partial_archives(),
        ..FakeUpstream::default()
    };
    regulator_rank_response(&upstream, &Config::default(), 7)
        .await
        .unwrap()
}

#[tokio::test]
async fn curves_tsv_has_one_line_per_point() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("curves.tsv");
    write_curves_tsv(&path, &response().await).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "expression_source\texpression_id\treplicate_id\trank\ty\trandom\tci_lower\tci_upper"
    );
    // 101 and 102 have five bins each, 103 has four.
    assert_eq!(lines.len(), 1 + 5 + 5 + 4);
    assert!(lines[1].starts_with("kemmeren_tfko\t21\t101\t1\t1.000000\t0.200000\t"));
    for line in &lines[1..] {
        assert_eq!(line.split('\t').count(), 8);
    }
}

#[test]
fn metadata_tsv_leaves_missing_cells_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("metadata.tsv");
    let rows = parse_metadata(common::METADATA_CSV).unwrap();
    write_metadata_tsv(&path, &rows).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 6);
    let last: Vec<&str> = lines[5].split('\t').collect();
    assert_eq!(last[0], "105");
    assert_eq!(last[5], "hu_reimann_tfko");
    assert_eq!(last[13], "");
}

#[tokio::test]
async fn json_envelope_uses_camel_case_fields() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("regulator.json");
    write_json(&path, Provenance::Miss, &response().await).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["provenance"], "miss");
    let data = &value["data"];
    assert_eq!(data["regulator"]["locusTag"], "YPL248C");
    let trace = &data["expressionGroups"]["kemmeren_tfko"][0]["traces"][0];
    assert_eq!(trace["replicateId"], "101");
    assert!(trace["plot"]["ciLower"].is_array());
    assert!(trace["plot"]["ciUpper"].is_array());
}

#[test]
fn error_report_names_the_failure_kind() {
    let err = QueryError::upstream(Some(503), "GET /export/ returned 503");
    let value: serde_json::Value = serde_json::from_str(&error_json(&err).unwrap()).unwrap();
    assert_eq!(value["error"]["kind"], "upstream_unreachable");
    assert_eq!(value["error"]["status"], 503);
    assert!(value["error"]["message"].as_str().unwrap().contains("HTTP 503"));

    let err = QueryError::Config("API token is not set".to_string());
    let value: serde_json::Value = serde_json::from_str(&error_json(&err).unwrap()).unwrap();
    assert_eq!(value["error"]["kind"], "configuration_missing");
    assert!(value["error"].get("status").is_none());
}

#[tokio::test]
async fn regulator_summary_counts_traces() {
    let summary = format_regulator_summary(&response().await, Provenance::Hit);
    assert!(summary.contains("Regulator: 7 (GAL4, YPL248C), cache=hit"));
    assert!(summary.contains("kemmeren_tfko: 1 experiments, 2 traces"));
    assert!(summary.contains("hu_reimann_tfko: 0 experiments, 0 traces"));
}
