use crate::core::models::{BuildMode, ProductionProfile};
use crate::utils::env_vars::{EnvVarsManager, API_URL_KEY};
use crate::utils::{AssemblerError, ErrorContext, Logger, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "assembler.config.json";
pub const DEFAULT_COMMON_CONFIG: &str = "config/bundle.common.json";

/// Settings file format (assembler.config.json)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssemblerSettings {
    /// Common configuration path, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_config: Option<String>,

    /// Output directory name under the project root (default: "dist")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdir: Option<String>,

    /// Public URL prefix of emitted assets (default: "web/")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    /// Injected as `API_URL` (default: empty)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Extra raw values to inject under `process.env`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Source map style (default: "source-map")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,

    /// Keep function names when mangling (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_fnames: Option<bool>,

    /// Append a compression plugin (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<bool>,
}

/// Values given on the command line; `None` falls back to the settings file
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub common_config: Option<PathBuf>,
    pub outdir: Option<String>,
    pub public_path: Option<String>,
    pub api_url: Option<String>,
    /// `KEY=VALUE` assignments
    pub env: Vec<String>,
    pub keep_fnames: Option<bool>,
    pub compression: Option<bool>,
}

/// Everything needed to run one assembly
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub common_config: PathBuf,
    pub profile: ProductionProfile,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load assembler.config.json from the project root, if present
    pub fn load_from_file(root: &Path) -> Result<Option<AssemblerSettings>> {
        let settings_path = root.join(SETTINGS_FILE);

        if !settings_path.exists() {
            Logger::debug(&format!("No {} found, using defaults", SETTINGS_FILE));
            return Ok(None);
        }

        Logger::debug(&format!("Loading settings from {}", settings_path.display()));

        let content = std::fs::read_to_string(&settings_path)?;
        let settings: AssemblerSettings = serde_json::from_str(&content).map_err(|e| {
            AssemblerError::parse_with_context(
                format!("Failed to parse {}: {}", SETTINGS_FILE, e),
                ErrorContext::new().with_file(settings_path.clone()),
            )
        })?;

        Ok(Some(settings))
    }

    /// Merge settings file, `.env` files and CLI values (CLI > .env > file > default)
    pub fn resolve(
        root: &Path,
        file_settings: Option<AssemblerSettings>,
        cli: &CliOptions,
    ) -> Result<ResolvedSettings> {
        let file = file_settings.unwrap_or_default();
        let defaults = ProductionProfile::default();

        let mut env: BTreeMap<String, String> = file.env.clone();
        if let Some(api_url) = &file.api_url {
            env.insert(API_URL_KEY.to_string(), api_url.clone());
        }

        let mut env_files = EnvVarsManager::load_from_files(root, BuildMode::Production.as_str())?;
        for assignment in &cli.env {
            env_files.set_assignment(assignment)?;
        }
        if let Some(api_url) = &cli.api_url {
            env_files.set(API_URL_KEY.to_string(), api_url.clone());
        }
        env.extend(env_files.get_all().clone());

        let common_config = match &cli.common_config {
            Some(path) => path.clone(),
            None => PathBuf::from(
                file.common_config
                    .as_deref()
                    .unwrap_or(DEFAULT_COMMON_CONFIG),
            ),
        };
        let common_config = if common_config.is_absolute() {
            common_config
        } else {
            root.join(common_config)
        };

        let profile = ProductionProfile {
            outdir: cli
                .outdir
                .clone()
                .or(file.outdir)
                .unwrap_or(defaults.outdir),
            public_path: cli
                .public_path
                .clone()
                .or(file.public_path)
                .unwrap_or(defaults.public_path),
            devtool: file.devtool.unwrap_or(defaults.devtool),
            css_filename: defaults.css_filename,
            keep_fnames: cli
                .keep_fnames
                .or(file.keep_fnames)
                .unwrap_or(defaults.keep_fnames),
            compression: cli
                .compression
                .or(file.compression)
                .unwrap_or(defaults.compression),
            env,
        };

        Ok(ResolvedSettings {
            common_config,
            profile,
        })
    }

    /// Example settings file for `init`-style scaffolding
    pub fn generate_example() -> Result<String> {
        let example = AssemblerSettings {
            common_config: Some(DEFAULT_COMMON_CONFIG.to_string()),
            outdir: Some("dist".to_string()),
            public_path: Some("web/".to_string()),
            api_url: Some(String::new()),
            env: BTreeMap::new(),
            devtool: Some("source-map".to_string()),
            keep_fnames: Some(true),
            compression: Some(false),
        };
        Ok(serde_json::to_string_pretty(&example)?)
    }
}
