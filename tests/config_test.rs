//! Tests for loading gateway configuration from disk.

use std::fs;

use heimdall::GatewayConfig;

#[test]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [[providers]]
        id = "openai"
        display_name = "OpenAI"

        [[providers.models]]
        id = "gpt-4o-mini"
        type = "chat"

        [providers.models.pricing]
        input_cost = 0.00000015
        output_cost = 0.0000006

        [[providers]]
        id = "gemini"
        display_name = "Google Gemini"
        enabled = false

        [[providers.models]]
        id = "gemini-1.5-flash"
        type = "chat"
        "#,
    )
    .unwrap();

    let config = GatewayConfig::load(Some(&path)).unwrap();
    assert_eq!(config.providers.len(), 2);
    assert!(config.providers[0].enabled);
    assert!(!config.providers[1].enabled);
    assert_eq!(config.providers[0].models[0].id, "gpt-4o-mini");
    config.validate().unwrap();
}

#[test]
fn malformed_toml_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "providers = 42").unwrap();

    let err = GatewayConfig::load(Some(&path)).unwrap_err().to_string();
    assert!(err.contains("Failed to parse"));
}

#[test]
fn missing_explicit_path_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");
    let err = GatewayConfig::load(Some(&path)).unwrap_err().to_string();
    assert!(err.contains("Config file not found"));
}
