use crate::utils::{AssemblerError, Logger, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Key that always carries the build mode
pub const MODE_KEY: &str = "ENV";
/// Key that is always declared, empty unless supplied
pub const API_URL_KEY: &str = "API_URL";

// `process.env.KEY` as a whole member expression; the leading character
// (if any) is captured so it can be written back.
static PROCESS_ENV_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\w$.])process\.env\.([A-Za-z_][A-Za-z0-9_]*)").expect("static regex")
});

/// Compile-time values injected under `process.env`.
///
/// Every value is stored pre-serialized as a JSON string literal, so the
/// engine substitutes text without any lookup or fallback of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentValueSet {
    values: BTreeMap<String, String>,
}

impl EnvironmentValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote `raw` and store it under `key`
    pub fn insert(&mut self, key: impl Into<String>, raw: &str) {
        self.values.insert(key.into(), quote_literal(raw));
    }

    /// Already-quoted literal for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `process.env.KEY` reference with its literal.
    /// Unknown keys are left untouched.
    pub fn substitute(&self, code: &str) -> String {
        PROCESS_ENV_REF
            .replace_all(code, |caps: &Captures| match self.values.get(&caps[2]) {
                Some(literal) => format!("{}{}", &caps[1], literal),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// JSON string literal for `raw`, quotes included
pub fn quote_literal(raw: &str) -> String {
    serde_json::Value::String(raw.to_string()).to_string()
}

/// Build the injection set for one build.
///
/// `ENV` always comes from `mode`; `API_URL` defaults to an empty literal.
/// Extra entries are added, and may supply `API_URL`.
pub fn build_environment_injection(
    mode: &str,
    extra: &BTreeMap<String, String>,
) -> EnvironmentValueSet {
    let mut set = EnvironmentValueSet::new();
    set.insert(API_URL_KEY, "");

    for (key, value) in extra {
        if key == MODE_KEY {
            Logger::warn(&format!(
                "Ignoring extra {} value {:?}: the build mode is {:?}",
                MODE_KEY, value, mode
            ));
            continue;
        }
        set.insert(key.clone(), value);
    }

    set.insert(MODE_KEY, mode);
    set
}

/// Raw (unquoted) variables collected from `.env` files and the command line
pub struct EnvVarsManager {
    variables: BTreeMap<String, String>,
}

impl EnvVarsManager {
    pub fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
        }
    }

    /// Load `.env`, `.env.local`, `.env.{mode}`, `.env.{mode}.local`.
    /// Later files override earlier ones.
    pub fn load_from_files(root: &Path, mode: &str) -> Result<Self> {
        let mut manager = Self::new();

        let env_files = [
            root.join(".env"),
            root.join(".env.local"),
            root.join(format!(".env.{}", mode)),
            root.join(format!(".env.{}.local", mode)),
        ];

        for env_file in env_files.iter().filter(|p| p.exists()) {
            manager.load_env_file(env_file)?;
        }

        Logger::debug(&format!(
            "Loaded {} environment variables",
            manager.variables.len()
        ));

        Ok(manager)
    }

    fn load_env_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;

        Logger::debug(&format!("Loading env file: {}", path.display()));

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_env_line(line) {
                Some((key, value)) => {
                    self.variables.insert(key, value);
                }
                None => Logger::warn(&format!(
                    "Invalid env line in {} at line {}: {}",
                    path.display(),
                    line_num + 1,
                    line
                )),
            }
        }

        Ok(())
    }

    /// Apply a `KEY=VALUE` assignment from the command line
    pub fn set_assignment(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = parse_env_line(assignment).ok_or_else(|| {
            AssemblerError::config(
                "env",
                format!("expected KEY=VALUE with an identifier key, got {:?}", assignment),
            )
        })?;
        self.variables.insert(key, value);
        Ok(())
    }

    pub fn set(&mut self, key: String, value: String) {
        self.variables.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.variables.get(key)
    }

    pub fn get_all(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

impl Default for EnvVarsManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `KEY=VALUE`, stripping one level of matching quotes from the value
fn parse_env_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    let first = key.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let value = if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    };

    Some((key.to_string(), value.to_string()))
}
