use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argkit-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn argkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argkit-cli"))
}

const SCHEMA: &str = r#"{
  "name": "copy",
  "help": { "short": "h", "long": "help", "description": "Copy files around" },
  "args": [
    { "kind": "string", "long": "src", "description": "Source files", "positional": true, "minValues": 2 },
    { "kind": "int", "long": "jobs", "short": "j", "description": "Worker count", "default": 1 },
    { "kind": "bool", "long": "verbose", "short": "v", "description": "Print progress" }
  ]
}"#;

fn write_schema(dir: &Path) -> PathBuf {
    let path = dir.join("argkit.json");
    fs::write(&path, SCHEMA).expect("failed to write schema");
    path
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn help_works() {
    let out = argkit()
        .arg("--help")
        .output()
        .expect("failed to run argkit-cli --help");
    assert!(
        out.status.success(),
        "argkit-cli --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        stderr(&out),
    );
    let text = stdout(&out);
    assert!(
        text.contains("init") && text.contains("render") && text.contains("parse"),
        "unexpected help output:\n{text}"
    );
}

#[test]
fn init_writes_a_loadable_schema() {
    let dir = make_temp_dir("init");

    let out = argkit()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run argkit-cli init");
    assert!(out.status.success(), "init failed:\n{}", stderr(&out));
    assert!(dir.join("argkit.json").is_file(), "argkit.json not created");

    let again = argkit().arg("init").arg(&dir).output().unwrap();
    assert!(!again.status.success(), "init should refuse to overwrite");

    let forced = argkit().arg("init").arg(&dir).arg("--force").output().unwrap();
    assert!(forced.status.success(), "init --force failed:\n{}", stderr(&forced));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn render_prints_schema_help() {
    let dir = make_temp_dir("render");
    let schema = write_schema(&dir);

    let out = argkit()
        .arg("render")
        .arg("--schema")
        .arg(&schema)
        .output()
        .unwrap();
    assert!(out.status.success(), "render failed:\n{}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "copy\nCopy files around\n\n\
         -h, --help,  Copy files around\n\
         --src,  Source files [MultiValue, min args = 2] [Positional]\n\
         -j, --jobs,  Worker count [default = 1]\n\
         -v, --verbose,  Print progress\n"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_reports_values_as_json() {
    let dir = make_temp_dir("parse-json");
    let schema = write_schema(&dir);

    let out = argkit()
        .args(["parse", "--json", "--schema"])
        .arg(&schema)
        .args(["--", "a.txt", "-vj", "4", "b.txt"])
        .output()
        .unwrap();
    assert!(out.status.success(), "parse failed:\n{}", stderr(&out));

    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["outcome"], "valid");
    assert_eq!(report["values"]["src"]["value"], serde_json::json!(["a.txt", "b.txt"]));
    assert_eq!(report["values"]["jobs"]["value"], 4);
    assert_eq!(report["values"]["verbose"]["value"], true);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_fails_on_too_few_values() {
    let dir = make_temp_dir("parse-invalid");
    let schema = write_schema(&dir);

    let out = argkit()
        .args(["parse", "--json", "--schema"])
        .arg(&schema)
        .args(["--", "only.txt"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["outcome"], "invalid");
    assert_eq!(
        report["failures"][0],
        "argument '--src' expects at least 2 values, got 1"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_rejects_unknown_argument() {
    let dir = make_temp_dir("parse-unknown");
    let schema = write_schema(&dir);

    let out = argkit()
        .args(["parse", "--schema"])
        .arg(&schema)
        .args(["--", "--nope"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(
        stderr(&out).contains("unknown argument: --nope"),
        "unexpected stderr:\n{}",
        stderr(&out)
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_with_help_trigger_prints_help() {
    let dir = make_temp_dir("parse-help");
    let schema = write_schema(&dir);

    let out = argkit()
        .args(["parse", "--schema"])
        .arg(&schema)
        .args(["--", "-h"])
        .output()
        .unwrap();
    assert!(out.status.success(), "parse -h failed:\n{}", stderr(&out));
    assert!(stdout(&out).starts_with("copy\nCopy files around\n"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn schema_defaults_to_argkit_json_in_current_dir() {
    let dir = make_temp_dir("default-schema");
    write_schema(&dir);

    let out = argkit().arg("render").current_dir(&dir).output().unwrap();
    assert!(out.status.success(), "render failed:\n{}", stderr(&out));
    assert!(stdout(&out).starts_with("copy\nCopy files around\n"));

    let out = argkit()
        .args(["parse", "--json", "--", "a.txt", "b.txt"])
        .current_dir(&dir)
        .output()
        .unwrap();
    assert!(out.status.success(), "parse failed:\n{}", stderr(&out));
    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["outcome"], "valid");

    let empty = make_temp_dir("no-schema");
    let out = argkit().arg("render").current_dir(&empty).output().unwrap();
    assert!(!out.status.success());
    assert!(stderr(&out).contains("schema not found: argkit.json"));

    let _ = fs::remove_dir_all(&dir);
    let _ = fs::remove_dir_all(&empty);
}
