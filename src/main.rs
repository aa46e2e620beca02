use anyhow::{Context, Result};
use clap::Parser;
use listening_stats::{assemble, load_export, normalize_export, Config, FileConfig};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory containing the exported source files.
    #[clap(long)]
    pub input_dir: Option<PathBuf>,

    /// Path the summary document is written to.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Optional TOML config file overriding the defaults.
    #[clap(long, default_value = "listening-stats.toml")]
    pub config: PathBuf,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = if cli_args.config.exists() {
        FileConfig::load(&cli_args.config)?
    } else {
        FileConfig::default()
    };
    let config = Config::resolve(cli_args.input_dir, cli_args.output, file_config)?;

    info!("Reading export from {:?}...", config.input_dir);
    let raw = load_export(&config.input_dir)?;

    info!("Normalizing events to {}...", config.timezone);
    let tables = normalize_export(raw, config.timezone);
    tables.diagnostics.log_summary();

    info!("Computing metrics...");
    let stats = assemble(&tables);

    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }
    let document = serde_json::to_string(&stats)?;
    std::fs::write(&config.output_path, &document)
        .with_context(|| format!("Failed to write {:?}", config.output_path))?;

    info!(
        "Wrote {:?} ({:.1} KiB)",
        config.output_path,
        document.len() as f64 / 1024.0
    );
    Ok(())
}
