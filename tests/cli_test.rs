//! Binary-level tests: drive the CLI against temp-file fixtures.

use assert_cmd::Command;
use predicates::prelude::*;

const DEMAND_HEADER: &str =
    "Id,UpdateDate,Part,Program,Qty,Area,MaterialMaster,OrderOrDocument,SAPValue\n";
const SUPPLY_HEADER: &str = "Material Document,Movement type,Material,Qty in unit of entry,Unit of Entry,Storage Location,Order,Posting Date,Time of Entry,Reference\n";

struct Fixture {
    _dir: tempfile::TempDir,
    demand: std::path::PathBuf,
    supply: std::path::PathBuf,
}

fn fixture(demand_body: &str, supply_body: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let demand = dir.path().join("demand.csv");
    let supply = dir.path().join("supply.csv");
    std::fs::write(&demand, format!("{DEMAND_HEADER}{demand_body}")).unwrap();
    std::fs::write(&supply, format!("{SUPPLY_HEADER}{supply_body}")).unwrap();
    Fixture {
        _dir: dir,
        demand,
        supply,
    }
}

fn matched_pair() -> Fixture {
    fixture(
        "71,2024-03-04 08:00:00,A1,,5,12.0,M1,,\n",
        "4900000001,101,A1,5,EA,PROD,30012345,2024-03-04,06:00:00,\n\
         4900000002,261,M1,-12.0,IN2,MAIN,30012345,2024-03-04,09:00:00,\n",
    )
}

#[test]
fn test_reconcile_text_output() {
    let fx = matched_pair();

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["reconcile", "--demand"])
        .arg(&fx.demand)
        .arg("--supply")
        .arg(&fx.supply)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 rows resolved"))
        .stdout(predicate::str::contains("30012345"));
}

#[test]
fn test_reconcile_writes_output_csv() {
    let fx = matched_pair();
    let out = fx.demand.parent().unwrap().join("updates.csv");

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["reconcile", "--demand"])
        .arg(&fx.demand)
        .arg("--supply")
        .arg(&fx.supply)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("row,reference,consumption"));
    assert!(written.contains("2,30012345,12.0000"));
}

#[test]
fn test_reconcile_json_output() {
    let fx = matched_pair();

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["reconcile", "--format", "json", "--demand"])
        .arg(&fx.demand)
        .arg("--supply")
        .arg(&fx.supply)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"resolutions\""))
        .stdout(predicate::str::contains("\"30012345\""));
}

#[test]
fn test_unmatched_reports_leftovers() {
    let fx = fixture("71,2024-03-04 08:00:00,A1,,5,12.0,M1,,\n", "");

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["unmatched", "--demand"])
        .arg(&fx.demand)
        .arg("--supply")
        .arg(&fx.supply)
        .assert()
        .success()
        .stdout(predicate::str::contains("Not matched (1 rows)"))
        .stdout(predicate::str::contains("A1"));
}

#[test]
fn test_unmatched_clean_run() {
    let fx = matched_pair();

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["unmatched", "--demand"])
        .arg(&fx.demand)
        .arg("--supply")
        .arg(&fx.supply)
        .assert()
        .success()
        .stdout(predicate::str::contains("Everything matched"));
}

#[test]
fn test_classify_lists_entities() {
    let fx = matched_pair();

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["classify", "--supply"])
        .arg(&fx.supply)
        .assert()
        .success()
        .stdout(predicate::str::contains("order 30012345"))
        .stdout(predicate::str::contains("1 entities"));
}

#[test]
fn test_missing_file_fails() {
    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args([
            "reconcile",
            "--demand",
            "no-such-demand.csv",
            "--supply",
            "no-such-supply.csv",
        ])
        .assert()
        .failure();
}

#[test]
fn test_exclusions_flag() {
    let fx = fixture("71,2024-03-04 08:00:00,1230055A-X1A,20231,5,12.0,50W-0075,,\n", "");
    let inbox = fx.demand.parent().unwrap().join("inbox.txt");
    std::fs::write(
        &inbox,
        "Planned order not found for 1230055A-X1A, D-1230055-10001, 5.000, Sigmanest Program:20231\n",
    )
    .unwrap();

    Command::cargo_bin("ledger-recon")
        .unwrap()
        .args(["reconcile", "--demand"])
        .arg(&fx.demand)
        .arg("--supply")
        .arg(&fx.supply)
        .arg("--exclusions")
        .arg(&inbox)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 excluded"))
        .stdout(predicate::str::contains("Excluded rows: 2"));
}
