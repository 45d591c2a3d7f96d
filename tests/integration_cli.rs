use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn todotui(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todotui"))
        .args(args)
        .env("TODOTUI_CONFIG", config)
        .env_remove("TODOTUI_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("run todotui")
}

fn ok(config: &Path, args: &[&str]) -> String {
    let out = todotui(config, args);
    assert!(
        out.status.success(),
        "todotui {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("utf8 stdout")
}

fn setup(td: &Path) -> std::path::PathBuf {
    let config = td.join("config.toml");
    let data = td.join("data");
    std::fs::write(
        &config,
        format!(
            "[storage]\ndata_dir = {data:?}\n\n[notify]\nenabled = false\n\n[voice]\ncommand = \"printf 'call mom\\\\n'\"\n",
            data = data.to_string_lossy()
        ),
    )
    .expect("write config");
    config
}

fn ids(config: &Path, filter: &str) -> Vec<(u64, String, bool)> {
    let json = ok(config, &["list", "--filter", filter, "--json"]);
    let tasks: Vec<serde_json::Value> = serde_json::from_str(&json).expect("json list");
    tasks
        .iter()
        .map(|t| {
            (
                t["id"].as_u64().expect("id"),
                t["text"].as_str().expect("text").to_owned(),
                t["completed"].as_bool().expect("completed"),
            )
        })
        .collect()
}

#[test]
fn add_toggle_clear_scenario() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());

    let out = ok(&config, &["add", "Buy", "milk", "-p", "high", "-c", "errand"]);
    assert!(out.contains("Buy milk"));

    let tasks = ids(&config, "all");
    assert_eq!(tasks.len(), 1);
    let (id, text, done) = tasks[0].clone();
    assert_eq!(text, "Buy milk");
    assert!(!done);

    ok(&config, &["toggle", &id.to_string()]);
    assert!(ids(&config, "completed")[0].2);
    assert!(ids(&config, "active").is_empty());

    let out = ok(&config, &["clear"]);
    assert!(out.contains("Removed 1"));
    assert!(ids(&config, "all").is_empty());
}

#[test]
fn empty_text_and_unknown_ids_fail_without_changes() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());

    assert!(!todotui(&config, &["add", "   "]).status.success());
    assert!(!todotui(&config, &["toggle", "12345"]).status.success());
    assert!(!todotui(&config, &["rm", "12345"]).status.success());
    assert!(ids(&config, "all").is_empty());
}

#[test]
fn move_uses_one_based_positions() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());
    for t in ["c", "b", "a"] {
        ok(&config, &["add", t]);
    }
    ok(&config, &["mv", "1", "3"]);
    let texts: Vec<String> = ids(&config, "all").into_iter().map(|t| t.1).collect();
    assert_eq!(texts, ["b", "c", "a"]);

    assert!(!todotui(&config, &["mv", "0", "1"]).status.success());
    assert!(!todotui(&config, &["mv", "9", "1"]).status.success());
}

#[test]
fn add_reads_transcript_from_stdin() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());

    let mut child = Command::new(env!("CARGO_BIN_EXE_todotui"))
        .args(["add", "--stdin"])
        .env("TODOTUI_CONFIG", &config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"  water the plants \n")
        .expect("write stdin");
    assert!(child.wait().expect("wait").success());

    assert_eq!(ids(&config, "all")[0].1, "water the plants");
}

#[cfg(unix)]
#[test]
fn add_with_voice_command() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());
    ok(&config, &["add", "--voice"]);
    assert_eq!(ids(&config, "all")[0].1, "call mom");
}

#[test]
fn export_and_default_listing() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());
    ok(&config, &["add", "Pay rent", "-d", "2024-07-01"]);

    let csv_path = td.path().join("export.csv");
    let out = ok(&config, &["export", "csv", "-o", &csv_path.to_string_lossy()]);
    assert!(out.contains("Exported 1 task(s)"));
    let csv = std::fs::read_to_string(&csv_path).expect("csv");
    assert_eq!(
        csv,
        "Text,Priority,Date,Category,Done\nPay rent,Medium,2024-07-01,Work,false\n"
    );

    let pdf_path = td.path().join("export.pdf");
    ok(&config, &["export", "pdf", "-o", &pdf_path.to_string_lossy()]);
    assert!(std::fs::read(&pdf_path).expect("pdf").starts_with(b"%PDF-"));

    // Without a terminal, no subcommand prints the list.
    let listing = ok(&config, &[]);
    assert!(listing.contains("Pay rent"));
    assert!(listing.contains("2024-07-01"));
}

#[test]
fn config_get_and_set_via_cli() {
    let td = tempfile::tempdir().expect("tempdir");
    let config = setup(td.path());

    ok(&config, &["config", "set", "ui.default_filter", "active"]);
    assert_eq!(ok(&config, &["config", "get", "ui.filter"]).trim(), "active");
    assert!(!todotui(&config, &["config", "get", "no.such.key"]).status.success());
    assert!(ok(&config, &["config", "list"]).contains("[storage]"));
}
