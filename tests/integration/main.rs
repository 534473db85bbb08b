use bundle_assembler::core::{ConfigSource, ProductionProfile};
use bundle_assembler::infrastructure::JsonFileSource;
use bundle_assembler::utils::config_loader::{CliOptions, ConfigLoader};
use bundle_assembler::{
    assemble, build_environment_injection, BaseConfiguration, BuildMode, Plugin,
    ProductionOverrides, ProjectRoot,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/webapp")
}

#[tokio::test]
async fn test_webapp_production_assembly() {
    let root = ProjectRoot::new(fixture_root()).unwrap();
    let file_settings = ConfigLoader::load_from_file(root.path()).unwrap();
    let resolved = ConfigLoader::resolve(root.path(), file_settings, &CliOptions::default()).unwrap();

    let base = JsonFileSource::new(&resolved.common_config).load().await.unwrap();
    let overrides = ProductionOverrides::standard(&root, &resolved.profile);
    let merged = assemble(&base, &overrides).unwrap();

    let kinds: Vec<_> = merged.plugins().iter().map(Plugin::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "loaderOptions",
            "noEmitOnErrors",
            "minify",
            "extractCss",
            "define",
            "loaderOptions",
            "compression"
        ]
    );

    assert_eq!(merged.mode(), BuildMode::Production);
    assert_eq!(merged.devtool(), Some("source-map"));
    assert_eq!(merged.output().path, root.resolve("dist"));
    assert_eq!(merged.output().public_path.as_deref(), Some("web/"));
    assert_eq!(merged.output().filename.as_deref(), Some("[name].js"));
    assert_eq!(merged.output().chunk_filename.as_deref(), Some("[id].chunk.js"));
    assert_eq!(
        merged.output().extra.get("crossOriginLoading"),
        Some(&json!("anonymous"))
    );
    assert_eq!(
        merged.setting("resolve"),
        Some(&json!({ "extensions": [".ts", ".js"] }))
    );

    match &merged.plugins()[4] {
        Plugin::Define { definitions } => {
            assert_eq!(definitions.get("ENV"), Some("\"production\""));
            assert_eq!(definitions.get("API_URL"), Some("\"\""));
        }
        other => panic!("expected define plugin, got {:?}", other),
    }
}

#[tokio::test]
async fn test_engine_document_shape() {
    let root = ProjectRoot::new(fixture_root()).unwrap();
    let base = JsonFileSource::new(root.resolve("config/bundle.common.json"))
        .load()
        .await
        .unwrap();
    let merged = assemble(
        &base,
        &ProductionOverrides::standard(&root, &ProductionProfile::default()),
    )
    .unwrap();

    let document = merged.to_engine_document().unwrap();
    assert_eq!(document["mode"], "production");
    assert_eq!(document["processEnv"], json!({ "ENV": "production", "NODE_ENV": "production" }));
    assert_eq!(document["plugins"][1], json!({ "kind": "noEmitOnErrors" }));
    assert_eq!(
        document["plugins"][2],
        json!({ "kind": "minify", "mangle": { "keepFnames": true } })
    );
    assert_eq!(
        document["plugins"][5],
        json!({ "kind": "loaderOptions", "options": { "htmlLoader": { "minimize": false } } })
    );
    assert_eq!(document["entry"]["app"], "./src/main.ts");

    // The emitted plugins decode back into the same sequence
    let reassembled = assemble(
        &BaseConfiguration::from_value(json!({
            "output": { "path": "/out" },
            "plugins": document["plugins"].clone()
        }))
        .unwrap(),
        &ProductionOverrides::default(),
    )
    .unwrap();
    assert_eq!(reassembled.plugins(), merged.plugins());
}

#[test]
fn test_documented_examples() {
    let merged = assemble(
        &BaseConfiguration::from_value(json!({
            "output": { "path": "/out", "filename": "[name].js" }
        }))
        .unwrap(),
        &serde_json::from_value(json!({ "plugins": ["extractCss"] })).unwrap(),
    )
    .unwrap();
    assert_eq!(merged.output().path, PathBuf::from("/out"));
    assert_eq!(merged.output().filename.as_deref(), Some("[name].js"));
    assert_eq!(merged.plugins(), &[Plugin::extract_css("[name].css")]);

    let injection = build_environment_injection("production", &BTreeMap::new());
    assert_eq!(injection.len(), 2);
    assert_eq!(injection.get("ENV"), Some("\"production\""));
    assert_eq!(injection.get("API_URL"), Some("\"\""));

    let err = assemble(
        &BaseConfiguration::from_value(json!({})).unwrap(),
        &serde_json::from_value(json!({ "plugins": [] })).unwrap(),
    )
    .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.field(), Some("output.path"));
}

#[test]
fn test_cli_assemble_writes_document() {
    let temp_dir = tempfile::tempdir().unwrap();
    let out = temp_dir.path().join("build/merged.json");

    let output = Command::new(env!("CARGO_BIN_EXE_bundle-assembler"))
        .args(["assemble", "--root"])
        .arg(fixture_root())
        .args(["--api-url", "https://api.example.com", "--out"])
        .arg(&out)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let document: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(document["processEnv"]["NODE_ENV"], "production");
    assert_eq!(
        document["plugins"][4]["definitions"]["API_URL"],
        "\"https://api.example.com\""
    );
    assert_eq!(document["plugins"][6]["kind"], "compression");
}

#[test]
fn test_cli_missing_common_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_bundle-assembler"))
        .args(["assemble", "--root"])
        .arg(temp_dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("commonConfig"), "stderr: {}", stderr);
}

#[test]
fn test_cli_malformed_plugin_fails() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/broken-plugin");
    let temp_dir = tempfile::tempdir().unwrap();
    let out = temp_dir.path().join("bundle.prod.json");

    let output = Command::new(env!("CARGO_BIN_EXE_bundle-assembler"))
        .args(["assemble", "--root"])
        .arg(&root)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!out.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("plugins[0]"), "stderr: {}", stderr);
    assert!(stderr.contains("options"), "stderr: {}", stderr);
}

#[test]
fn test_cli_env_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_bundle-assembler"))
        .args(["env", "--root"])
        .arg(fixture_root())
        .args(["--env", "RELEASE=42"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("process.env.ENV = \"production\""));
    assert!(stdout.contains("process.env.API_URL = \"\""));
    assert!(stdout.contains("process.env.RELEASE = \"42\""));
}
