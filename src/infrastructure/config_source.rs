use crate::core::interfaces::ConfigSource;
use crate::core::models::BaseConfiguration;
use crate::utils::{AssemblerError, ErrorContext, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Common configuration stored as a JSON file
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for JsonFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<BaseConfiguration> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AssemblerError::config_with_context(
                    "commonConfig",
                    "common configuration file not found",
                    ErrorContext::new().with_file(self.path.clone()),
                )
            } else {
                AssemblerError::Io(e)
            }
        })?;

        let value = serde_json::from_str(&content).map_err(|e| {
            AssemblerError::parse_with_context(
                format!("Failed to parse common configuration: {}", e),
                ErrorContext::new().with_file(self.path.clone()),
            )
        })?;

        BaseConfiguration::from_value(value)
    }
}
