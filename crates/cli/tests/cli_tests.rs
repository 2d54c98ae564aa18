// End-to-end tests driving the `bomrecon` binary over the BOM fixtures.
//
// Run with: cargo test -p bomrecon-cli --test cli_tests

use std::path::PathBuf;
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Reader};
use tempfile::tempdir;

fn bomrecon() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bomrecon"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("BOMRECON_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../recon/tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run(args: &[&str]) -> Output {
    bomrecon().args(args).output().expect("spawn bomrecon")
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\nstdout:\n{stdout}"))
}

// ===========================================================================
// compare
// ===========================================================================

#[test]
fn compare_with_discrepancies_exits_1() {
    let out = run(&["compare", &fixture("sap_bom.csv"), &fixture("hplm_bom.csv")]);
    assert_eq!(code(&out), 1, "stderr: {}", stderr(&out));

    let err = stderr(&out);
    assert!(err.contains("SAP vs HPLM: 8 parts, 3 correct, 2 shortages, 3 surpluses"), "{err}");
    assert!(err.contains("Missing 5 in HPLM"));
    assert!(err.contains("error: 5 of 8 parts have discrepancies"));
    // human output never goes to stdout
    assert!(out.stdout.is_empty());
}

#[test]
fn compare_identical_boms_exits_0() {
    let sap = fixture("sap_bom.csv");
    let out = run(&[
        "compare", &sap, &sap, "--reference-label", "ERP", "--comparison-label", "PLM", "-q",
    ]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(stderr(&out).is_empty(), "quiet mode printed: {}", stderr(&out));
}

#[test]
fn compare_json_contract() {
    let out = run(&["compare", &fixture("sap_bom.csv"), &fixture("hplm_bom.csv"), "--json"]);
    assert_eq!(code(&out), 1);

    let json = stdout_json(&out);
    assert_eq!(json["meta"]["reference_label"], "SAP");
    assert_eq!(json["report"]["total"], 8);
    assert_eq!(json["report"]["correct_pct"], 37.5);
    assert_eq!(json["rows"].as_array().unwrap().len(), 8);
    assert_eq!(json["rows"][0]["part_number"], "00012345");
    assert_eq!(json["reference_mapping"]["part_number"]["column"], "Component number");
}

#[test]
fn compare_json_filtered_rows() {
    let out = run(&[
        "compare",
        &fixture("sap_bom.csv"),
        &fixture("hplm_bom.csv"),
        "--json",
        "--filter",
        "shortages",
    ]);
    let json = stdout_json(&out);
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["status"] == "shortage"));
    // the report still covers every row
    assert_eq!(json["report"]["total"], 8);
}

#[test]
fn compare_config_file_and_tolerance_override() {
    let args = |tolerance: &'static str| {
        vec![
            "compare".to_string(),
            fixture("sap_bom.csv"),
            fixture("generic_bom.csv"),
            "--config".to_string(),
            fixture("erp_plm.recon.toml"),
            "--tolerance".to_string(),
            tolerance.to_string(),
            "--json".to_string(),
        ]
    };

    let out = bomrecon().args(args("0.05")).output().unwrap();
    let json = stdout_json(&out);
    assert_eq!(json["meta"]["comparison_label"], "PLM");
    assert_eq!(json["meta"]["quantity_tolerance"], 0.05);
    assert_eq!(json["report"]["total"], 6);

    let out = bomrecon().args(args("1.5")).output().unwrap();
    assert_eq!(code(&out), 6, "out-of-range tolerance is a config error");
}

#[test]
fn compare_writes_every_export() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("recon.xlsx");
    let checklist = dir.path().join("floor.xlsx");
    let issues = dir.path().join("issues.csv");
    let summary = dir.path().join("summary.csv");
    let json = dir.path().join("run.json");

    let out = run(&[
        "compare",
        &fixture("sap_bom.csv"),
        &fixture("hplm_bom.csv"),
        "--report",
        report.to_str().unwrap(),
        "--checklist",
        checklist.to_str().unwrap(),
        "--issues-csv",
        issues.to_str().unwrap(),
        "--summary-csv",
        summary.to_str().unwrap(),
        "--output",
        json.to_str().unwrap(),
    ]);
    assert_eq!(code(&out), 1, "stderr: {}", stderr(&out));

    let mut wb = open_workbook_auto(&report).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Summary", "Issues", "All Data"]);
    let issues_sheet = wb.worksheet_range("Issues").unwrap();
    assert_eq!(issues_sheet.height(), 1 + 5);

    let mut wb = open_workbook_auto(&checklist).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Floor Validation", "Instructions"]);

    let issues_text = std::fs::read_to_string(&issues).unwrap();
    assert_eq!(issues_text.lines().count(), 1 + 5);
    assert!(issues_text.lines().next().unwrap().starts_with("Part Number,Status,Issues"));

    let summary_text = std::fs::read_to_string(&summary).unwrap();
    assert_eq!(summary_text.lines().count(), 2);

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(saved["report"]["shortage"], 2);

    assert!(stderr(&out).contains(&format!("wrote {}", report.display())));
}

#[test]
fn include_correct_requires_checklist() {
    let out = run(&[
        "compare",
        &fixture("sap_bom.csv"),
        &fixture("hplm_bom.csv"),
        "--include-correct",
    ]);
    assert_eq!(code(&out), 2);
}

// ===========================================================================
// error families
// ===========================================================================

#[test]
fn unsupported_extension_is_usage_error() {
    let out = run(&["compare", "bom.pdf", &fixture("hplm_bom.csv")]);
    assert_eq!(code(&out), 2);
    assert!(stderr(&out).contains("unsupported file format 'pdf'"));
    assert!(stderr(&out).contains("hint:"));
}

#[test]
fn missing_file_is_io_error() {
    let out = run(&["compare", "does-not-exist.csv", &fixture("hplm_bom.csv")]);
    assert_eq!(code(&out), 3);
}

#[test]
fn empty_dataset_is_input_error() {
    let dir = tempdir().unwrap();
    let empty = dir.path().join("empty.csv");
    std::fs::write(&empty, "Component number,Component quantity\n").unwrap();

    let out = run(&["compare", empty.to_str().unwrap(), &fixture("hplm_bom.csv")]);
    assert_eq!(code(&out), 4);
    assert!(stderr(&out).contains("SAP dataset is empty"));
}

#[test]
fn unmappable_columns_are_mapping_error() {
    // SAP column names do not satisfy the strict HPLM patterns
    let sap = fixture("sap_bom.csv");
    let out = run(&["compare", &sap, &sap]);
    assert_eq!(code(&out), 5);
    assert!(stderr(&out).contains("HPLM: could not map critical columns"));
}

// ===========================================================================
// map
// ===========================================================================

#[test]
fn map_json_shows_inferred_columns() {
    let out = run(&["map", &fixture("hplm_bom.csv"), "--source", "HPLM", "--json"]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));

    let json = stdout_json(&out);
    assert_eq!(json["source_label"], "HPLM");
    assert_eq!(json["part_number"]["column"], "ERP Part Number");
    assert_eq!(json["unit"]["column"], "Unit Of Measure");
    assert_eq!(json["is_valid"], true);
}

#[test]
fn map_human_summary_on_stderr() {
    let out = run(&["map", &fixture("sap_bom.csv")]);
    assert_eq!(code(&out), 0);
    let err = stderr(&out);
    assert!(err.contains("SAP columns:"));
    assert!(err.contains("'Component number' (100% confidence, high)"), "{err}");
}

#[test]
fn map_invalid_mapping_exits_5() {
    let out = run(&["map", &fixture("sap_bom.csv"), "--source", "HPLM"]);
    assert_eq!(code(&out), 5);
    assert!(stderr(&out).contains("unmapped"));
}

// ===========================================================================
// config
// ===========================================================================

#[test]
fn config_validate_accepts_fixture() {
    let out = run(&["config", "validate", &fixture("erp_plm.recon.toml")]);
    assert_eq!(code(&out), 0, "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("valid: reference 'ERP', comparison 'PLM', tolerance 5%"));
}

#[test]
fn config_validate_rejects_bad_values() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.recon.toml");
    std::fs::write(&bad, "[matching]\nsimilarity_threshold = 2.0\n").unwrap();
    let out = run(&["config", "validate", bad.to_str().unwrap()]);
    assert_eq!(code(&out), 6);

    std::fs::write(&bad, "[sources\n").unwrap();
    let out = run(&["config", "validate", bad.to_str().unwrap()]);
    assert_eq!(code(&out), 6);
}

#[test]
fn long_version_names_commit_and_target() {
    let out = run(&["--version"]);
    assert_eq!(code(&out), 0);
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains(env!("CARGO_PKG_VERSION")), "{text}");
    assert!(text.contains(" ("), "{text}");
    assert!(text.contains("target:"), "{text}");
}

#[test]
fn config_show_round_trips() {
    let out = run(&["config", "show"]);
    assert_eq!(code(&out), 0);
    let text = String::from_utf8(out.stdout).unwrap();
    let config = bomrecon_recon::ReconConfig::from_toml(&text).unwrap();
    assert_eq!(config, bomrecon_recon::ReconConfig::default());
}
