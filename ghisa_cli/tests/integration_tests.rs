use assert_cmd::Command;
use predicates::prelude::*;

fn ghisa() -> Command {
    Command::cargo_bin("ghisa").expect("binary built")
}

#[test]
fn preview_prints_the_demo_trace() {
    ghisa()
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("Esercizio Squat 1 serie di 3 con 80 kg"))
        .stdout(predicate::str::contains("Blocco Pausa 2 minuti"))
        .stdout(predicate::str::contains("Tabata Round 1 - Burpees lavoro 20 secondi"));
}

#[test]
fn preview_is_the_default_command() {
    ghisa()
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocco Pausa 2 minuti"));
}

#[test]
fn curve_prints_each_cluster() {
    ghisa()
        .args(["curve", "--count", "3", "--shape", "ascending", "--min", "80", "--max", "95"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cluster 1: 80.0%"))
        .stdout(predicate::str::contains("cluster 2: 87.5%"))
        .stdout(predicate::str::contains("cluster 3: 95.0%"));
}

#[test]
fn curve_rejects_unknown_shape() {
    ghisa()
        .args(["curve", "--count", "3", "--shape", "spiral", "--min", "80", "--max", "95"])
        .assert()
        .failure();
}

#[test]
fn wave_curve_with_three_clusters_succeeds() {
    ghisa()
        .args(["curve", "--count", "3", "--shape", "wave", "--min", "80", "--max", "95"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cluster 2: 95.0%"));
}

#[test]
fn run_completes_the_demo_session() {
    ghisa()
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 100%"))
        .stdout(predicate::str::contains("Squat"))
        .stdout(predicate::str::contains("Legs"));
}

#[test]
fn run_json_emits_a_parsable_summary() {
    let output = ghisa().args(["run", "--json"]).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json_start = stdout.find('{').expect("json object in output");
    let summary: serde_json::Value = serde_json::from_str(&stdout[json_start..]).unwrap();

    assert_eq!(summary["completion_ratio"].as_f64(), Some(1.0));
    assert!(summary["total_tonnage_kg"].as_f64().unwrap() > 0.0);
}
