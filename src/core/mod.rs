// Core domain layer
pub mod assembler;
pub mod interfaces;
pub mod models;
pub mod output;
pub mod plugin;

pub use assembler::*;
pub use interfaces::*;
pub use models::*;
pub use output::*;
pub use plugin::*;
