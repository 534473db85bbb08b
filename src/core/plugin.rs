// Plugin declarations for the production pass
//
// Plugins are plain tagged variants applied by the engine in declaration
// order. A declaration is either a bare kind string ("extractCss") or a
// mapping with a `kind` tag and that kind's fields.

use crate::utils::env_vars::EnvironmentValueSet;
use crate::utils::{AssemblerError, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn default_css_filename() -> String {
    "[name].css".to_string()
}

fn default_algorithm() -> String {
    "gzip".to_string()
}

fn default_compression_test() -> String {
    r"\.(js|css|html)$".to_string()
}

fn default_threshold() -> u64 {
    10_240
}

fn default_min_ratio() -> f64 {
    0.8
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangleOptions {
    /// Keep function names intact; frameworks that read `Function.name` need this
    #[serde(default)]
    pub keep_fnames: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Plugin {
    /// Skip emitting assets when compilation reported errors
    NoEmitOnErrors,
    Minify {
        #[serde(default)]
        mangle: MangleOptions,
    },
    /// Pull imported stylesheets into separate files
    ExtractCss {
        #[serde(default = "default_css_filename")]
        filename: String,
    },
    /// Literal replacements under `process.env`
    Define { definitions: EnvironmentValueSet },
    LoaderOptions { options: Map<String, Value> },
    Compression {
        #[serde(default = "default_algorithm")]
        algorithm: String,
        #[serde(default = "default_compression_test")]
        test: String,
        #[serde(default = "default_threshold")]
        threshold: u64,
        #[serde(default = "default_min_ratio", rename = "minRatio")]
        min_ratio: f64,
    },
}

impl Plugin {
    pub fn kind(&self) -> &'static str {
        match self {
            Plugin::NoEmitOnErrors => "noEmitOnErrors",
            Plugin::Minify { .. } => "minify",
            Plugin::ExtractCss { .. } => "extractCss",
            Plugin::Define { .. } => "define",
            Plugin::LoaderOptions { .. } => "loaderOptions",
            Plugin::Compression { .. } => "compression",
        }
    }

    pub fn extract_css(filename: impl Into<String>) -> Self {
        Plugin::ExtractCss {
            filename: filename.into(),
        }
    }

    pub fn compression() -> Self {
        Plugin::Compression {
            algorithm: default_algorithm(),
            test: default_compression_test(),
            threshold: default_threshold(),
            min_ratio: default_min_ratio(),
        }
    }

    /// Decode the declaration at `plugins[index]`
    pub fn from_declaration(index: usize, declaration: &Value) -> Result<Self> {
        let field = format!("plugins[{}]", index);
        let snippet = || ErrorContext::new().with_snippet(declaration.to_string());

        let tagged = match declaration {
            Value::String(kind) => json!({ "kind": kind }),
            Value::Object(map) => match map.get("kind") {
                Some(Value::String(_)) => declaration.clone(),
                Some(_) => {
                    return Err(AssemblerError::config_with_context(
                        format!("{}.kind", field),
                        "expected a string",
                        snippet(),
                    ));
                }
                None => {
                    return Err(AssemblerError::config_with_context(
                        format!("{}.kind", field),
                        "missing plugin kind",
                        snippet(),
                    ));
                }
            },
            _ => {
                return Err(AssemblerError::config_with_context(
                    field,
                    "expected a plugin kind or a mapping with a `kind` field",
                    snippet(),
                ));
            }
        };

        let plugin: Plugin = serde_json::from_value(tagged)
            .map_err(|e| AssemblerError::config_with_context(field.clone(), e.to_string(), snippet()))?;
        plugin.validate(&field)?;
        Ok(plugin)
    }

    fn validate(&self, field: &str) -> Result<()> {
        match self {
            Plugin::ExtractCss { filename } => {
                crate::core::output::check_template(&format!("{}.filename", field), Some(filename.as_str()))
            }
            Plugin::Define { definitions } => {
                for (key, literal) in definitions.iter() {
                    if serde_json::from_str::<String>(literal).is_err() {
                        return Err(AssemblerError::config(
                            format!("{}.definitions.{}", field, key),
                            format!("expected a quoted string literal, got {}", literal),
                        ));
                    }
                }
                Ok(())
            }
            Plugin::Compression { min_ratio, .. } if !(0.0..=1.0).contains(min_ratio) => {
                Err(AssemblerError::config(
                    format!("{}.minRatio", field),
                    format!("expected a ratio between 0 and 1, got {}", min_ratio),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Decode an ordered plugin sequence. `None` means no plugins were declared.
pub fn decode_plugins(value: Option<&Value>) -> Result<Vec<Plugin>> {
    let declarations = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(AssemblerError::config("plugins", "expected a sequence")),
    };

    declarations
        .iter()
        .enumerate()
        .map(|(index, declaration)| Plugin::from_declaration(index, declaration))
        .collect()
}
