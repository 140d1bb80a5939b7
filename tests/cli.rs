use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `roulette` command isolated from the user's config and environment.
fn roulette(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("roulette").unwrap();
    cmd.env("ROULETTE_HOME", home.path())
        .env_remove("ROULETTE_BIND")
        .env_remove("ROULETTE_PORT")
        .env_remove("ROULETTE_UTC_OFFSET");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn help_flag_shows_usage() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("shuffle"))
        .stdout(predicate::str::contains("pick"));
}

#[test]
fn version_flag_works() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("roulette 0.1.0"));
}

#[test]
fn shuffle_prints_every_name() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout_of(roulette(&home).args(["shuffle", "klaus,linus;jonas"]));
    assert_eq!(out.lines().count(), 3);
    for name in ["klaus", "linus", "jonas"] {
        assert!(out.contains(name), "missing {} in {}", name, out);
    }
}

#[test]
fn pick_prints_one_of_the_names() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout_of(roulette(&home).args(["pick", "klaus,linus,jonas,julia"]));
    let picked = out.trim();
    let names = ["klaus", "linus", "jonas", "julia"];
    assert!(names.contains(&picked), "got {}", picked);
}

#[test]
fn pick_today_is_stable_within_the_day() {
    let home = tempfile::tempdir().unwrap();
    let pick_at = |at: &str| {
        let args = ["pick", "klaus,linus,jonas,julia", "--today", "--at", at];
        stdout_of(roulette(&home).args(args))
    };
    let morning = pick_at("2024-06-01T09:00:00Z");
    assert_eq!(morning, pick_at("2024-06-01T23:00:00Z"));
}

#[test]
fn shuffle_today_json_reports_midnight_seed() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout_of(roulette(&home).args([
        "shuffle",
        "a,b,c",
        "--today",
        "--json",
        "--at",
        "2024-06-01T15:30:00Z",
    ]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["mode"], "shuffle-today");
    assert_eq!(json["seed"], 1_717_200_000i64);
    assert_eq!(json["names"].as_array().unwrap().len(), 3);
}

#[test]
fn configured_offset_moves_the_day_boundary() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .args(["config", "set", "roulette.utc_offset", "+02:00"])
        .assert()
        .success();

    let out = stdout_of(roulette(&home).args([
        "pick",
        "a,b",
        "--today",
        "--json",
        "--at",
        "2024-06-01T23:00:00Z",
    ]));
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    // 01:00 on June 2nd at +02:00; midnight there is 22:00Z on June 1st.
    assert_eq!(json["seed"], 1_717_279_200i64);
}

#[test]
fn empty_names_fail() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .args(["pick", ",,;,"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no names provided"));
}

#[test]
fn bad_instant_fails() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .args(["shuffle", "a,b", "--at", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--at"));
}

#[test]
fn config_set_get_unset() {
    let home = tempfile::tempdir().unwrap();

    roulette(&home)
        .args(["config", "set", "roulette.port", "9090"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set roulette.port = 9090"));

    roulette(&home)
        .args(["config", "get", "roulette.port"])
        .assert()
        .success()
        .stdout("9090\n");

    roulette(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roulette.port = 9090"));

    roulette(&home)
        .args(["config", "unset", "roulette.port"])
        .assert()
        .success();

    roulette(&home)
        .args(["config", "get", "roulette.port"])
        .assert()
        .failure();
}

#[test]
fn config_list_empty_shows_hint() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No config values"));
}

#[test]
fn config_rejects_invalid_offset() {
    let home = tempfile::tempdir().unwrap();
    roulette(&home)
        .args(["config", "set", "roulette.utc_offset", "CEST"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("roulette.utc_offset"));

    assert!(!home.path().join("config.toml").exists());
}

#[test]
fn server_keys_do_not_affect_one_shot_commands() {
    let home = tempfile::tempdir().unwrap();
    let config = "[roulette]\nbind = \"nowhere\"\nport = \"eighty\"\n";
    std::fs::write(home.path().join("config.toml"), config).unwrap();

    let out = stdout_of(roulette(&home).args(["shuffle", "a,b"]));
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn invalid_offset_in_config_file_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let config = "[roulette]\nutc_offset = \"CEST\"\n";
    std::fs::write(home.path().join("config.toml"), config).unwrap();

    roulette(&home)
        .args(["pick", "a,b", "--today"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("roulette.utc_offset"));
}
