//! Settings loading from TOML files

use devtel::Settings;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_toml_file() {
    let file = toml_file(
        r#"
        workflow_port = 9101
        backend_url = "http://backend.internal:8080/"
        ollama_model = "qwen2.5:7b"
        agent_timeout = 45
        max_iterations = 3
        "#,
    );

    let settings = Settings::load(Some(file.path())).unwrap();
    assert_eq!(settings.workflow_port, 9101);
    assert_eq!(settings.ollama_model, "qwen2.5:7b");
    assert_eq!(settings.agent_timeout(), Duration::from_secs(45));
    assert_eq!(settings.max_iterations, 3);
    assert_eq!(
        settings.agent_bridge_url(),
        "http://backend.internal:8080/agent-bridge"
    );
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(Settings::load(Some(&missing)).is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    let file = toml_file("max_iterations = 0\n");
    assert!(Settings::load(Some(file.path())).is_err());

    let file = toml_file("chat_port = \"not a port\"\n");
    assert!(Settings::load(Some(file.path())).is_err());
}
