use std::path::PathBuf;
use thiserror::Error;

/// Where a bad configuration value came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub snippet: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.snippet = Some(snippet);
        self
    }
}

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        context: Option<ErrorContext>,
    },

    #[error("Configuration error in `{field}`: {message}")]
    Configuration {
        field: String,
        message: String,
        context: Option<ErrorContext>,
    },
}

impl AssemblerError {
    /// Configuration error for a named field
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn config_with_context(
        field: impl Into<String>,
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
            context: Some(context),
        }
    }

    pub fn parse(message: String) -> Self {
        Self::Parse {
            message,
            context: None,
        }
    }

    pub fn parse_with_context(message: String, context: ErrorContext) -> Self {
        Self::Parse {
            message,
            context: Some(context),
        }
    }

    /// Field named by a configuration error, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            AssemblerError::Configuration { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, AssemblerError::Configuration { .. })
    }

    /// Format error with file and snippet context for terminal output
    pub fn format_detailed(&self) -> String {
        match self {
            AssemblerError::Parse { message, context } => {
                Self::format_with_context("Parse Error", message, context)
            }
            AssemblerError::Configuration {
                field,
                message,
                context,
            } => Self::format_with_context(
                "Configuration Error",
                &format!("{} ({})", message, field),
                context,
            ),
            _ => format!("❌ {}", self),
        }
    }

    fn format_with_context(
        error_type: &str,
        message: &str,
        context: &Option<ErrorContext>,
    ) -> String {
        let mut output = format!("❌ {}: {}", error_type, message);

        if let Some(ctx) = context {
            if let Some(ref file_path) = ctx.file_path {
                output.push_str(&format!("\n📁 File: {}", file_path.display()));
            }

            if let Some(ref snippet) = ctx.snippet {
                output.push_str("\n📝 Value:");
                for line in snippet.lines() {
                    output.push_str(&format!("\n   │ {}", line));
                }
            }
        }

        output
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;

impl From<serde_json::Error> for AssemblerError {
    fn from(err: serde_json::Error) -> Self {
        AssemblerError::parse(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_field() {
        let err = AssemblerError::config("output.path", "missing required output path");
        assert!(err.is_configuration());
        assert_eq!(err.field(), Some("output.path"));
        assert!(err.to_string().contains("output.path"));
    }

    #[test]
    fn test_format_detailed_with_context() {
        let context = ErrorContext::new()
            .with_file(PathBuf::from("config/bundle.common.json"))
            .with_snippet("{ \"kind\": \"define\" }".to_string());
        let err = AssemblerError::config_with_context(
            "plugins[3]",
            "missing field `definitions`",
            context,
        );

        let detailed = err.format_detailed();
        assert!(detailed.contains("Configuration Error"));
        assert!(detailed.contains("plugins[3]"));
        assert!(detailed.contains("bundle.common.json"));
        assert!(detailed.contains("\"kind\": \"define\""));
    }

    #[test]
    fn test_json_error_becomes_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AssemblerError = json_err.into();
        assert!(!err.is_configuration());
        assert!(err.to_string().starts_with("Parse error"));
    }
}
