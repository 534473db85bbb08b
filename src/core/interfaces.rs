use crate::core::models::BaseConfiguration;
use crate::utils::Result;
use async_trait::async_trait;

/// Source of the shared ("common") base configuration
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Human-readable origin, used in logs and error context
    fn name(&self) -> String;

    async fn load(&self) -> Result<BaseConfiguration>;
}
