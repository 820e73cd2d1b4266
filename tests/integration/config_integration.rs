//! Integration tests for configuration-driven runs of the CLI route table

use crate::integration::test_utils::{chunks, spawn_server, ScriptedProvider};
use flowdoc::cli::{Commands, RunContext};
use flowdoc::config::{ConfigLoader, ProviderType};
use flowdoc::provider::demo::demo_content;
use flowdoc::provider::DemoClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const DEMO_CONFIG: &str = r#"
[provider]
provider_type = "demo"
model = "demo"
demo_chunk_delay_ms = 0

[document]
title = "测试计划"
sections = ["项目背景", "市场分析"]
"#;

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("flowdoc.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_config_file_shapes_document_outline() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(temp_dir.path(), DEMO_CONFIG);

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.provider.provider_type, ProviderType::Demo);

    let document = config.document.to_document();
    assert_eq!(document.title, "测试计划");
    let titles: Vec<&str> = document.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["项目背景", "市场分析"]);
    assert!(document.sections.iter().all(|s| s.content.is_empty()));
}

#[test]
fn test_invalid_config_is_rejected_by_run_context() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        temp_dir.path(),
        r#"
[document]
sections = ["A", " "]

[server]
bind = "nowhere"
"#,
    );

    let err = RunContext::new(temp_dir.path().to_path_buf(), Some(path))
        .err()
        .expect("invalid config must be rejected");
    let message = err.to_string();
    assert!(message.contains("Server:"), "{}", message);
    assert!(message.contains("Section 1 has an empty title"), "{}", message);
}

#[tokio::test]
async fn test_generate_command_writes_document() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), DEMO_CONFIG);
    let output = temp_dir.path().join("plan.md");

    let context = RunContext::new(temp_dir.path().to_path_buf(), Some(config_path)).unwrap();
    context
        .execute(&Commands::Generate {
            server: None,
            output: Some(output.clone()),
        })
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("# 测试计划"));
    assert!(written.contains("## 项目背景"));
    assert!(written.contains(demo_content("市场分析")));
    assert!(written.contains("数据来源: IMF 2024 报告 (https://www.imf.org/reports)"));
}

#[tokio::test]
async fn test_generate_command_through_server() {
    let base_url = spawn_server(Arc::new(DemoClient::new(Duration::ZERO))).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), DEMO_CONFIG);
    let output = temp_dir.path().join("plan.md");

    let context = RunContext::new(temp_dir.path().to_path_buf(), Some(config_path)).unwrap();
    context
        .execute(&Commands::Generate {
            server: Some(base_url),
            output: Some(output.clone()),
        })
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains(demo_content("项目背景")));
    assert!(written.contains(demo_content("市场分析")));
}

#[tokio::test]
async fn test_generate_command_defaults_to_configured_public_url() {
    let provider = Arc::new(ScriptedProvider::with_scripts(vec![
        chunks(&["served ", "A"]),
        chunks(&["served ", "B"]),
    ]));
    let base_url = spawn_server(provider.clone()).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        &format!("{}\n[server]\npublic_url = \"{}/\"\n", DEMO_CONFIG, base_url),
    );
    let output = temp_dir.path().join("plan.md");

    let context = RunContext::new(temp_dir.path().to_path_buf(), Some(config_path)).unwrap();
    context
        .execute(&Commands::Generate {
            server: None,
            output: Some(output.clone()),
        })
        .await
        .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("served A"));
    assert!(written.contains("served B"));
    assert!(!written.contains(demo_content("项目背景")));
    assert_eq!(provider.seen().len(), 2);
}

#[tokio::test]
async fn test_sections_command_reflects_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), DEMO_CONFIG);
    let context = RunContext::new(temp_dir.path().to_path_buf(), Some(config_path)).unwrap();

    let listing = context
        .execute(&Commands::Sections {
            format: "json".to_string(),
        })
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&listing).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(listing.contains("市场分析"));
    assert!(!listing.contains("财务预测"));
}
