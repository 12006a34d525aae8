use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::TestEnv;

#[test]
fn test_init_creates_database() {
    let env = TestEnv::new();

    env.cmd()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(fs::metadata(&env.db).is_ok());
}

#[test]
fn test_site_lifecycle() {
    let env = TestEnv::initialized();

    env.cmd()
        .args([
            "site",
            "add",
            "Martin",
            "--address",
            "4 rue des Acacias",
            "--type",
            "professional",
            "--lat",
            "45.75",
            "--lon",
            "4.85",
        ])
        .assert()
        .success()
        .stdout(contains("Job site #1 added").and(contains("45.75000, 4.85000")));

    env.add_site("Dupont", "8 allée des Roses");

    env.cmd()
        .args(["site", "list", "--sort", "name"])
        .assert()
        .success()
        .stdout(contains("Martin").and(contains("Dupont")).and(contains("2 site(s)")));

    env.cmd()
        .args(["site", "list", "--search", "acacias"])
        .assert()
        .success()
        .stdout(contains("Martin").and(contains("Dupont").not()));

    env.cmd()
        .args(["site", "edit", "2", "--services", "mow,weed", "--notes", "portail bleu"])
        .assert()
        .success();

    env.cmd()
        .args(["site", "show", "2"])
        .assert()
        .success()
        .stdout(contains("mow,weed").and(contains("portail bleu")));

    env.cmd()
        .args(["site", "del", "1", "--yes"])
        .assert()
        .success()
        .stdout(contains("Job site #1 deleted"));

    env.cmd()
        .args(["site", "show", "1"])
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn test_visit_add_list_and_delete() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    env.cmd()
        .args([
            "visit", "add", "1", "--type", "mow", "--date", "2025-05-12", "--in", "08:00",
            "--out", "09:30", "--notes", "pelouse haute",
        ])
        .assert()
        .success()
        .stdout(contains("Visit #1 recorded").and(contains("01h 30m")));

    env.cmd()
        .args(["visit", "add", "1", "--type", "trim", "--date", "2025-05-20"])
        .assert()
        .success();

    env.cmd()
        .args(["visit", "list", "--type", "mow", "--period", "2025-05"])
        .assert()
        .success()
        .stdout(contains("2025-05-12").and(contains("2025-05-20").not()));

    env.cmd()
        .args(["visit", "add", "1", "--type", "mow", "--in", "10:00", "--out", "09:00"])
        .assert()
        .failure()
        .stderr(contains("OUT must be later than IN"));

    env.cmd()
        .args(["visit", "add", "1", "--type", "mow", "--date", "2025-13-01"])
        .assert()
        .failure();

    env.cmd().args(["visit", "del", "2"]).assert().success();

    env.cmd()
        .args(["visit", "list"])
        .assert()
        .success()
        .stdout(contains("2025-05-20").not());
}

#[test]
fn test_weeding_done_records_a_visit() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    env.cmd()
        .args(["weeding", "plan", "1", "--date", "2025-04-01", "--notes", "allées"])
        .assert()
        .success();

    env.cmd()
        .args(["weeding", "list"])
        .assert()
        .success()
        .stdout(contains("2025-04-01").and(contains("late")));

    env.cmd()
        .args(["weeding", "done", "1", "--date", "2025-04-03"])
        .assert()
        .success();

    env.cmd()
        .args(["weeding", "list", "--pending"])
        .assert()
        .success()
        .stdout(contains("No weeding planned"));

    env.cmd()
        .args(["visit", "list", "--type", "weed"])
        .assert()
        .success()
        .stdout(contains("2025-04-03"));
}

#[test]
fn test_extras_and_total_to_invoice() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    env.cmd()
        .args(["extra", "add", "--site", "1", "--desc", "Abattage", "--amount", "250"])
        .assert()
        .success();

    env.cmd()
        .args([
            "extra", "add", "--client", "Voisin", "--desc", "Évacuation", "--amount", "40.5",
        ])
        .assert()
        .success();

    env.cmd()
        .args([
            "extra", "add", "--site", "1", "--client", "Voisin", "--desc", "x", "--amount", "1",
        ])
        .assert()
        .failure()
        .stderr(contains("not both"));

    env.cmd()
        .args(["extra", "add", "--desc", "x", "--amount", "1"])
        .assert()
        .failure();

    env.cmd().args(["extra", "invoice", "2"]).assert().success();

    env.cmd()
        .args(["extra", "list"])
        .assert()
        .success()
        .stdout(contains("Martin").and(contains("Voisin")).and(contains("Total to invoice: 250.00")));

    // Extras outlive their site.
    env.cmd().args(["site", "del", "1", "--yes"]).assert().success();
    env.cmd()
        .args(["extra", "list"])
        .assert()
        .success()
        .stdout(contains("(deleted site)"));
}

#[test]
fn test_export_csv_and_json() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");
    env.cmd()
        .args(["visit", "add", "1", "--type", "mow", "--date", "2025-05-12"])
        .assert()
        .success();
    env.cmd()
        .args(["visit", "add", "1", "--type", "mow", "--date", "2024-05-12"])
        .assert()
        .success();

    let csv = env.path_str("visits.csv");
    env.cmd()
        .args(["export", "--what", "visits", "--format", "csv", "--file", &csv, "--range", "2025"])
        .assert()
        .success();

    let content = fs::read_to_string(&csv).unwrap();
    assert!(content.starts_with("id,site,client,type,date"));
    assert!(content.contains("2025-05-12"));
    assert!(!content.contains("2024-05-12"));

    let json = env.path_str("sites.json");
    env.cmd()
        .args(["export", "--what", "sites", "--format", "json", "--file", &json, "--force"])
        .assert()
        .success();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(1));

    env.cmd()
        .args(["export", "--format", "csv", "--file", &csv, "--range", "2025-02-30"])
        .assert()
        .failure();
}

#[test]
fn test_export_xlsx_and_pdf_write_files() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");
    env.cmd()
        .args(["extra", "add", "--site", "1", "--desc", "Taille", "--amount", "80"])
        .assert()
        .success();

    let xlsx = env.path_str("extras.xlsx");
    env.cmd()
        .args(["export", "--what", "extras", "--format", "xlsx", "--file", &xlsx])
        .assert()
        .success();
    assert!(fs::metadata(&xlsx).unwrap().len() > 0);

    let pdf = env.path_str("sites.pdf");
    env.cmd()
        .args(["export", "--what", "sites", "--format", "pdf", "--file", &pdf])
        .assert()
        .success();
    assert!(fs::read(&pdf).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_backup_and_restore() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    let archive = env.path_str("backup.zip");
    env.cmd()
        .args(["backup", "--file", &archive])
        .assert()
        .success()
        .stdout(contains("Backup created"));

    env.cmd()
        .args(["backup", "--file", &archive])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    env.add_site("Dupont", "8 allée des Roses");

    env.cmd()
        .args(["restore", "--file", &archive, "--yes"])
        .assert()
        .success();

    env.cmd()
        .args(["site", "list"])
        .assert()
        .success()
        .stdout(contains("Martin").and(contains("Dupont").not()));
}

#[test]
fn test_timer_start_and_stop_from_stdin() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    env.cmd()
        .args(["timer", "start", "--site", "1", "--type", "mow"])
        .write_stdin("\ntonte terminée\n")
        .assert()
        .success()
        .stdout(contains("Visit #1 completed"));

    env.cmd()
        .args(["timer", "status"])
        .assert()
        .success()
        .stdout(contains("No visit in progress"));

    env.cmd()
        .args(["visit", "list"])
        .assert()
        .success()
        .stdout(contains("tonte terminée"));
}

#[test]
fn test_timer_on_unknown_site_fails() {
    let env = TestEnv::initialized();

    env.cmd()
        .args(["timer", "start", "--site", "42", "--type", "mow"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn test_log_records_mutations() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    env.cmd()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(contains("site_add").and(contains("init")));
}

#[test]
fn test_db_check_and_info() {
    let env = TestEnv::initialized();
    env.add_site("Martin", "4 rue des Acacias");

    env.cmd()
        .args(["db", "--check", "--info"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_config_print_uses_defaults() {
    let env = TestEnv::initialized();

    env.cmd()
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(contains("thresholds").and(contains("green_max")));
}

#[test]
fn test_config_check_reports_bad_thresholds() {
    let env = TestEnv::initialized();
    env.write_config(
        "database: chantiers.sqlite\n\
         thresholds:\n  \
           residential:\n    \
             mow: {green_max: 30, orange_max: 20}\n    \
             trim: {green_max: 120, orange_max: 180}\n    \
             weed: {green_max: 30, orange_max: 45}\n",
    );

    // Ordinary commands refuse the file.
    env.cmd().args(["site", "list"]).assert().failure();

    env.cmd()
        .args(["config", "--check"])
        .assert()
        .failure()
        .stderr(
            contains("thresholds.residential.mow")
                .and(contains("Missing keys"))
                .and(contains("needs attention")),
        );
}

#[test]
fn test_config_migrate_repairs_missing_keys() {
    let env = TestEnv::initialized();
    env.write_config("thresholds: {}\n");

    env.cmd()
        .args(["config", "--migrate"])
        .assert()
        .success()
        .stdout(contains("Config migration performed").and(contains("database")));

    let content = fs::read_to_string(env.config_file()).unwrap();
    assert!(content.contains("database:"));
    assert!(content.contains("green_max"));

    env.cmd()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(contains("All configuration keys are present"));
}
