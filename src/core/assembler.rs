// Production configuration assembly
//
// Merge rules, applied recursively:
//   mapping + mapping   -> key-by-key merge, override wins on conflict
//   sequence + sequence -> base items first, override items appended
//   anything else       -> override replaces base

use crate::core::models::{
    BaseConfiguration, BuildMode, MergedConfiguration, ProductionOverrides, ProductionProfile,
};
use crate::core::output::{build_output_rule, OutputRule, ProjectRoot};
use crate::core::plugin::{decode_plugins, Plugin};
use crate::utils::env_vars::{build_environment_injection, quote_literal, MODE_KEY};
use crate::utils::{AssemblerError, Logger, Result, Timer};
use serde_json::{json, Map, Value};

/// Merge `overrides` onto `base` without touching either
pub fn merge_values(base: &Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            let mut merged = base.clone();
            for (key, value) in overrides {
                let entry = match merged.get(key) {
                    Some(existing) => merge_values(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        (Value::Array(base), Value::Array(overrides)) => {
            Value::Array(base.iter().chain(overrides).cloned().collect())
        }
        (_, overrides) => overrides.clone(),
    }
}

/// Combine the base configuration with production overrides.
///
/// Deterministic: identical inputs always give equal results.
pub fn assemble(
    base: &BaseConfiguration,
    overrides: &ProductionOverrides,
) -> Result<MergedConfiguration> {
    let timer = Timer::start("assemble");

    let overrides_value = serde_json::to_value(overrides)?;
    let merged = merge_values(&Value::Object(base.as_map().clone()), &overrides_value);
    let Value::Object(mut merged) = merged else {
        return Err(AssemblerError::config("<root>", "merged configuration is not a mapping"));
    };

    let mode = match merged.remove("mode") {
        Some(Value::String(mode)) => mode.parse::<BuildMode>()?,
        None => BuildMode::default(),
        Some(_) => return Err(AssemblerError::config("mode", "expected a string")),
    };

    let devtool = match merged.remove("devtool") {
        Some(Value::String(devtool)) => Some(devtool),
        None | Some(Value::Null) => None,
        Some(_) => return Err(AssemblerError::config("devtool", "expected a string")),
    };

    let output = OutputRule::from_value(merged.get("output"))?;
    merged.remove("output");

    let plugins = decode_plugins(merged.get("plugins"))?;
    merged.remove("plugins");

    check_mode_consistency(mode, &plugins)?;

    for (index, plugin) in plugins.iter().enumerate() {
        Logger::plugin_declared(index, plugin.kind());
    }

    let configuration = MergedConfiguration::new(mode, devtool, output, plugins, merged);
    Logger::assembled(
        configuration.plugins().len(),
        configuration.output_path(),
        timer.elapsed(),
    );

    Ok(configuration)
}

/// Injected `ENV` literals must match the build mode
fn check_mode_consistency(mode: BuildMode, plugins: &[Plugin]) -> Result<()> {
    let expected = quote_literal(mode.as_str());

    for (index, plugin) in plugins.iter().enumerate() {
        if let Plugin::Define { definitions } = plugin {
            if let Some(literal) = definitions.get(MODE_KEY) {
                if literal != expected {
                    return Err(AssemblerError::config(
                        format!("plugins[{}].definitions.{}", index, MODE_KEY),
                        format!("injected {} does not match build mode {}", literal, expected),
                    ));
                }
            }
        }
    }

    Ok(())
}

impl ProductionOverrides {
    /// Stock production overrides: source maps, output under the project
    /// root, and the ordered plugin sequence. Compression, when enabled,
    /// comes after CSS extraction.
    pub fn standard(root: &ProjectRoot, profile: &ProductionProfile) -> Self {
        let mode = BuildMode::Production;

        let mut overrides = ProductionOverrides {
            mode,
            devtool: Some(profile.devtool.clone()),
            output: Some(build_output_rule(
                root.resolve(&profile.outdir),
                &profile.public_path,
            )),
            ..Default::default()
        }
        .with_plugin(Plugin::NoEmitOnErrors)
        .with_plugin(Plugin::Minify {
            mangle: crate::core::plugin::MangleOptions {
                keep_fnames: profile.keep_fnames,
            },
        })
        .with_plugin(Plugin::extract_css(profile.css_filename.clone()))
        .with_plugin(Plugin::Define {
            definitions: build_environment_injection(mode.as_str(), &profile.env),
        })
        .with_plugin(Plugin::LoaderOptions {
            options: loader_options(),
        });

        if profile.compression {
            overrides = overrides.with_plugin(Plugin::compression());
        }

        overrides
    }
}

fn loader_options() -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("htmlLoader".to_string(), json!({ "minimize": false }));
    options
}
