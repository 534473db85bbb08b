// Output location rules and project root resolution

use crate::utils::{AssemblerError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME: &str = "[name].js";
pub const DEFAULT_CHUNK_FILENAME: &str = "[id].chunk.js";

/// Template placeholders of webpack 5 filenames. Matching is case-sensitive.
const KNOWN_PLACEHOLDERS: &[&str] = &[
    "file",
    "query",
    "fragment",
    "base",
    "path",
    "name",
    "ext",
    "id",
    "runtime",
    "url",
    "hash",
    "fullhash",
    "chunkhash",
    "contenthash",
    "modulehash",
];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Za-z]+)(?::\d+)?\]").expect("static regex"));

/// Where and under which names the engine emits assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRule {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_filename: Option<String>,
    /// Output keys the assembler does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputRule {
    /// Decode the merged `output` mapping, naming the offending field on failure
    pub fn from_value(value: Option<&Value>) -> Result<Self> {
        let output = match value {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(AssemblerError::config("output", "expected a mapping"));
            }
            None => {
                return Err(AssemblerError::config(
                    "output.path",
                    "missing required output path",
                ));
            }
        };

        match output.get("path") {
            Some(Value::String(path)) if !path.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(AssemblerError::config("output.path", "output path is empty"));
            }
            Some(_) => {
                return Err(AssemblerError::config("output.path", "expected a string"));
            }
            None => {
                return Err(AssemblerError::config(
                    "output.path",
                    "missing required output path",
                ));
            }
        }

        let rule: OutputRule = serde_json::from_value(Value::Object(output.clone()))
            .map_err(|e| AssemblerError::config("output", e.to_string()))?;
        rule.validate()?;
        Ok(rule)
    }

    /// Reject filename templates with placeholders the engine would not expand
    pub fn validate(&self) -> Result<()> {
        check_template("output.filename", self.filename.as_deref())?;
        check_template("output.chunkFilename", self.chunk_filename.as_deref())
    }
}

pub(crate) fn check_template(field: &str, template: Option<&str>) -> Result<()> {
    let Some(template) = template else {
        return Ok(());
    };

    if template.trim().is_empty() {
        return Err(AssemblerError::config(field, "template is empty"));
    }

    for caps in PLACEHOLDER.captures_iter(template) {
        if !KNOWN_PLACEHOLDERS.contains(&&caps[1]) {
            return Err(AssemblerError::config(
                field,
                format!("unknown placeholder [{}] in {:?}", &caps[1], template),
            ));
        }
    }

    Ok(())
}

/// Production output rule rooted at `root_dir`
pub fn build_output_rule(root_dir: impl Into<PathBuf>, public_path: &str) -> OutputRule {
    OutputRule {
        path: root_dir.into(),
        public_path: Some(public_path.to_string()),
        filename: Some(DEFAULT_FILENAME.to_string()),
        chunk_filename: Some(DEFAULT_CHUNK_FILENAME.to_string()),
        extra: Map::new(),
    }
}

/// Absolute project root used to resolve named directories such as `dist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    root: PathBuf,
}

impl ProjectRoot {
    /// Anchor relative roots at the current working directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `name` under the project root
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_output_rule() {
        let rule = build_output_rule("/srv/app/dist", "web/");
        assert_eq!(rule.path, PathBuf::from("/srv/app/dist"));
        assert_eq!(rule.public_path.as_deref(), Some("web/"));
        assert_eq!(rule.filename.as_deref(), Some("[name].js"));
        assert_eq!(rule.chunk_filename.as_deref(), Some("[id].chunk.js"));
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(build_output_rule("/out", "web/")).unwrap();
        assert_eq!(
            value,
            json!({
                "path": "/out",
                "publicPath": "web/",
                "filename": "[name].js",
                "chunkFilename": "[id].chunk.js"
            })
        );
    }

    #[test]
    fn test_from_value_missing_path() {
        let err = OutputRule::from_value(Some(&json!({ "filename": "[name].js" }))).unwrap_err();
        assert_eq!(err.field(), Some("output.path"));

        let err = OutputRule::from_value(None).unwrap_err();
        assert_eq!(err.field(), Some("output.path"));

        let err = OutputRule::from_value(Some(&json!({ "path": "  " }))).unwrap_err();
        assert_eq!(err.field(), Some("output.path"));
    }

    #[test]
    fn test_from_value_keeps_unknown_keys() {
        let rule = OutputRule::from_value(Some(&json!({
            "path": "/out",
            "library": "app"
        })))
        .unwrap();
        assert_eq!(rule.extra.get("library"), Some(&json!("app")));
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let err = OutputRule::from_value(Some(&json!({
            "path": "/out",
            "chunkFilename": "[idd].chunk.js"
        })))
        .unwrap_err();
        assert_eq!(err.field(), Some("output.chunkFilename"));

        assert!(check_template("output.filename", Some("[name].[contenthash:8].js")).is_ok());
    }

    #[test]
    fn test_placeholder_set() {
        assert!(check_template("output.filename", Some("[name].[runtime].js")).is_ok());
        assert!(check_template("output.filename", Some("[path][name].[fullhash].js")).is_ok());

        let err = check_template("output.filename", Some("[name].[Hash].js")).unwrap_err();
        assert_eq!(err.field(), Some("output.filename"));
        assert!(err.to_string().contains("[Hash]"));
    }

    #[test]
    fn test_project_root_resolve() {
        let root = ProjectRoot::new("/srv/app").unwrap();
        assert_eq!(root.resolve("dist"), PathBuf::from("/srv/app/dist"));

        let relative = ProjectRoot::new("web").unwrap();
        assert!(relative.path().is_absolute());
        assert!(relative.resolve("dist").ends_with("web/dist"));
    }
}
