// Production build configuration assembler
// Merges a shared base configuration with production overrides for an external bundling engine

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;

pub use crate::core::{
    assemble, build_output_rule, merge_values, BaseConfiguration, BuildMode,
    MergedConfiguration, OutputRule, Plugin, ProductionOverrides, ProjectRoot,
};
pub use crate::utils::env_vars::{build_environment_injection, EnvironmentValueSet};
pub use crate::utils::{AssemblerError, Result};
