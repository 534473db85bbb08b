use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// Install the global subscriber. `RUST_LOG` wins over the default filter.
    pub fn init() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bundle_assembler=info"));

        // Logs go to stderr; stdout carries the merged configuration.
        // A subscriber may already be installed when embedded.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    pub fn assemble_start(root: &Path, mode: &str) {
        info!("🔨 Production configuration");
        info!("═══════════════════════════════════════");
        info!("📁 Root: {}", root.display());
        info!("🎯 Mode: {}", mode);
    }

    pub fn loading_common(source: &str) {
        info!("📄 Common configuration: {}", source);
    }

    pub fn plugin_declared(index: usize, kind: &str) {
        debug!("🔌 plugins[{}]: {}", index, kind);
    }

    pub fn assembled(plugin_count: usize, output_path: &Path, elapsed: std::time::Duration) {
        info!("");
        info!("📊 Merged configuration:");
        info!("  • Plugins: {}", plugin_count);
        info!("  • Output path: {}", output_path.display());
        info!("  • Assembled in {:.2?}", elapsed);
        info!("✅ Configuration ready for the build engine");
    }

    pub fn process_env(pairs: &[(&str, &str)]) {
        for (key, value) in pairs {
            info!("🌍 {}={}", key, value);
        }
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
