// Shared utilities module
pub mod config_loader;
pub mod env_vars;
pub mod errors;
pub mod logging;

pub use errors::*;
pub use logging::*;
