use crate::core::output::OutputRule;
use crate::core::plugin::Plugin;
use crate::utils::{AssemblerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Build mode selected once per build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Production,
    /// Engine defaults only, no mode-specific optimizations
    None,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Production => "production",
            BuildMode::None => "none",
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = AssemblerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(BuildMode::Production),
            "none" => Ok(BuildMode::None),
            other => Err(AssemblerError::config(
                "mode",
                format!("unsupported build mode {:?}, expected \"production\" or \"none\"", other),
            )),
        }
    }
}

/// Shared configuration produced by the common configuration source.
///
/// Opaque to the assembler apart from `output` and `plugins`; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseConfiguration {
    value: Map<String, Value>,
}

impl BaseConfiguration {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(value) => Ok(Self { value }),
            _ => Err(AssemblerError::config(
                "<root>",
                "base configuration must be a mapping",
            )),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(content)?)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.value
    }
}

/// A plugin as declared in overrides: typed, or raw JSON checked at assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginDeclaration {
    Plugin(Plugin),
    Raw(Value),
}

impl From<Plugin> for PluginDeclaration {
    fn from(plugin: Plugin) -> Self {
        PluginDeclaration::Plugin(plugin)
    }
}

/// Production-only settings layered over the base configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionOverrides {
    #[serde(default)]
    pub mode: BuildMode,
    /// Source map style, e.g. `source-map`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRule>,
    #[serde(default)]
    pub plugins: Vec<PluginDeclaration>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ProductionOverrides {
    pub fn with_plugin(mut self, plugin: impl Into<PluginDeclaration>) -> Self {
        self.plugins.push(plugin.into());
        self
    }
}

/// Resolved production settings the stock overrides are built from
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionProfile {
    pub outdir: String,
    pub public_path: String,
    pub devtool: String,
    pub css_filename: String,
    pub keep_fnames: bool,
    pub compression: bool,
    /// Raw values for injection; quoted at assembly
    pub env: BTreeMap<String, String>,
}

impl Default for ProductionProfile {
    fn default() -> Self {
        Self {
            outdir: "dist".to_string(),
            public_path: "web/".to_string(),
            devtool: "source-map".to_string(),
            css_filename: "[name].css".to_string(),
            keep_fnames: true,
            compression: false,
            env: BTreeMap::new(),
        }
    }
}

/// Final configuration handed to the build engine. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedConfiguration {
    mode: BuildMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    devtool: Option<String>,
    output: OutputRule,
    plugins: Vec<Plugin>,
    #[serde(flatten)]
    settings: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EngineDocument<'a> {
    #[serde(flatten)]
    configuration: &'a MergedConfiguration,
    process_env: BTreeMap<&'static str, &'static str>,
}

impl MergedConfiguration {
    pub(crate) fn new(
        mode: BuildMode,
        devtool: Option<String>,
        output: OutputRule,
        plugins: Vec<Plugin>,
        settings: Map<String, Value>,
    ) -> Self {
        Self {
            mode,
            devtool,
            output,
            plugins,
            settings,
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn devtool(&self) -> Option<&str> {
        self.devtool.as_deref()
    }

    pub fn output(&self) -> &OutputRule {
        &self.output
    }

    pub fn output_path(&self) -> &Path {
        &self.output.path
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Keys the assembler passes through untouched
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Environment for the engine process. Derived from the same mode as the
    /// injected `ENV` literal, so the two cannot disagree.
    pub fn process_env(&self) -> Vec<(&'static str, &'static str)> {
        let mode = self.mode.as_str();
        vec![("NODE_ENV", mode), ("ENV", mode)]
    }

    /// Hand the mode to an engine process explicitly instead of through our own environment
    pub fn apply_to(&self, command: &mut std::process::Command) {
        command.envs(self.process_env());
    }

    /// JSON document for the engine, with the process environment under `processEnv`
    pub fn to_engine_document(&self) -> Result<Value> {
        let document = EngineDocument {
            configuration: self,
            process_env: self.process_env().into_iter().collect(),
        };
        Ok(serde_json::to_value(document)?)
    }
}
