use crate::core::{assemble, BuildMode, ConfigSource, ProductionOverrides, ProjectRoot};
use crate::infrastructure::JsonFileSource;
use crate::utils::config_loader::{CliOptions, ConfigLoader};
use crate::utils::env_vars::build_environment_injection;
use crate::utils::{AssemblerError, Logger, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bundle-assembler")]
#[command(about = "Assemble the production configuration for a front-end bundling pass")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Project root directory
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
    /// Inject KEY=VALUE under process.env (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,
    /// Value injected as API_URL
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge the common configuration with production overrides
    Assemble {
        #[command(flatten)]
        settings: SettingsArgs,
        /// Common configuration file (default: config/bundle.common.json)
        #[arg(short, long)]
        common: Option<PathBuf>,
        /// Write the merged configuration here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Output directory name under the root
        #[arg(long)]
        outdir: Option<String>,
        /// Public URL prefix of emitted assets
        #[arg(long)]
        public_path: Option<String>,
        /// Append a gzip compression plugin
        #[arg(long)]
        compress: bool,
        /// Let the minifier mangle function names
        #[arg(long)]
        mangle_fnames: bool,
    },
    /// Print the values injected under process.env
    Env {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Print an example assembler.config.json
    Init,
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Assemble {
                settings,
                common,
                out,
                outdir,
                public_path,
                compress,
                mangle_fnames,
            } => {
                let options = CliOptions {
                    common_config: common,
                    outdir,
                    public_path,
                    api_url: settings.api_url.clone(),
                    env: settings.env.clone(),
                    keep_fnames: mangle_fnames.then_some(false),
                    compression: compress.then_some(true),
                };
                self.handle_assemble_command(&settings.root, &options, out)
                    .await
            }
            Commands::Env { settings } => {
                let options = CliOptions {
                    api_url: settings.api_url.clone(),
                    env: settings.env.clone(),
                    ..Default::default()
                };
                self.handle_env_command(&settings.root, &options)
            }
            Commands::Init => {
                println!("{}", ConfigLoader::generate_example()?);
                Ok(())
            }
        }
    }

    async fn handle_assemble_command(
        &self,
        root: &Path,
        options: &CliOptions,
        out: Option<PathBuf>,
    ) -> Result<()> {
        let root = ProjectRoot::new(root)?;
        let file_settings = ConfigLoader::load_from_file(root.path())?;
        let resolved = ConfigLoader::resolve(root.path(), file_settings, options)?;

        let overrides = ProductionOverrides::standard(&root, &resolved.profile);
        Logger::assemble_start(root.path(), overrides.mode.as_str());

        let source = JsonFileSource::new(&resolved.common_config);
        Logger::loading_common(&source.name());
        let base = source.load().await?;
        let merged = assemble(&base, &overrides)?;
        Logger::process_env(&merged.process_env());

        let document = serde_json::to_string_pretty(&merged.to_engine_document()?)?;

        match out {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(AssemblerError::Io)?;
                }
                tokio::fs::write(&path, document)
                    .await
                    .map_err(AssemblerError::Io)?;
                Logger::info(&format!("📦 Wrote {}", path.display()));
            }
            None => println!("{}", document),
        }

        Ok(())
    }

    fn handle_env_command(&self, root: &Path, options: &CliOptions) -> Result<()> {
        let root = ProjectRoot::new(root)?;
        let file_settings = ConfigLoader::load_from_file(root.path())?;
        let resolved = ConfigLoader::resolve(root.path(), file_settings, options)?;

        let injection = build_environment_injection(BuildMode::Production.as_str(), &resolved.profile.env);
        for (key, literal) in injection.iter() {
            println!("process.env.{} = {}", key, literal);
        }

        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
