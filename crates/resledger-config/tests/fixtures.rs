//! Loading declaration files from disk.

use std::path::PathBuf;
use std::sync::Once;

use resledger_config::config::load_resources;
use resledger_config::LedgerConfig;
use resledger_core::{Resource, is_resource_error};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const AGENT_TOML: &str = r#"
[agent]
default_role = "*"

[[resources]]
name = "cpus"
scalar = 16.0

[[resources]]
name = "mem"
scalar = 65536.0

[[resources]]
name = "ports"
ranges = [[31000, 32000]]

[[resources]]
name = "cpus"
role = "batch"
scalar = 4.0
revocable = true
"#;

#[test]
fn loads_toml_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "agent.toml", AGENT_TOML);

    let ledger = load_resources(&path).unwrap();
    assert_eq!(
        ledger.to_string(),
        "cpus(*):16;mem(*):65536;ports(*):[31000-32000];cpus(batch):4"
    );

    let task = [Resource::scalar("cpus", 2.0), Resource::ranges("ports", [(31000, 31009)])];
    let remaining = ledger.minus(&task);
    assert_eq!(remaining.scalar_sum("cpus"), Some(18.0));
    assert_eq!(
        remaining.iter().find(|r| r.name == "ports").unwrap().to_string(),
        "ports(*):[31010-32000]"
    );
}

#[test]
fn loads_json_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "agent.json",
        r#"{"resources": [{"name": "gpus", "set": ["gpu0", "gpu1"], "role": "ml"}]}"#,
    );

    let config = LedgerConfig::from_file(&path).unwrap();
    assert_eq!(config.to_resources().unwrap().to_string(), "gpus(ml):{gpu0,gpu1}");
}

#[test]
fn invalid_declaration_is_recognizable_through_context() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "bad.toml",
        r#"
[[resources]]
name = "cpus"
scalar = 1.0
disk = { persistence_id = "v1" }
"#,
    );

    let err = load_resources(&path).unwrap_err();
    let source: &(dyn std::error::Error + 'static) = err.as_ref();
    assert!(is_resource_error(source));
    assert!(format!("{err:#}").contains("illegal disk resource"));
}

#[test]
fn malformed_file_is_not_a_resource_error() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "broken.toml", "[[resources]\nname = ");

    let err = load_resources(&path).unwrap_err();
    let source: &(dyn std::error::Error + 'static) = err.as_ref();
    assert!(!is_resource_error(source));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = LedgerConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
