mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use gifsmith_channels::{ChannelAdapter, DiscordAdapter};
use gifsmith_config::{config_file_path, load_with_report};
use gifsmith_core::PipelineOutcome;
use gifsmith_logging::init_logger;
use gifsmith_media::MediaPipeline;

use config::RuntimeConfig;

#[derive(Parser)]
#[command(name = "gifsmith")]
#[command(about = "gifsmith: Discord bot that turns images and videos into GIFs")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $GIFSMITH_CONFIG, then ./gifsmith.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve slash commands
    Run,
    /// Convert an image or video URL to a GIF
    Convert {
        url: String,
        #[arg(short, long, default_value = "output.gif")]
        output: PathBuf,
    },
    /// Caption the GIF at a URL
    Caption {
        url: String,
        text: String,
        #[arg(short, long, default_value = "output.gif")]
        output: PathBuf,
    },
    /// Validate the config file and print any problems
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let path = config_file_path(cli.config.as_deref());

    if let Commands::CheckConfig = cli.command {
        return check_config(&path).await;
    }

    let (config, report) = load_with_report(&path).await?;
    let runtime = RuntimeConfig::from_config(&config);
    init_logger(&runtime.log_dir, &runtime.log_level)?;
    report.log();
    report.ensure_valid(&path)?;
    info!(config = %path.display(), "Starting gifsmith");

    let pipeline = MediaPipeline::new(runtime.media.clone())?;

    match cli.command {
        Commands::Run => {
            let token = runtime.discord_token()?;
            let adapter = DiscordAdapter::new(token, runtime.guild_id, Arc::new(pipeline));
            info!(adapter = adapter.name(), "Connecting");
            adapter.start().await?;
        }
        Commands::Convert { url, output } => {
            let outcome = pipeline.to_gif(&url).await;
            write_outcome(outcome, &output).await?;
        }
        Commands::Caption { url, text, output } => {
            let outcome = pipeline.caption_gif(&url, &text).await;
            write_outcome(outcome, &output).await?;
        }
        Commands::CheckConfig => {}
    }

    Ok(())
}

async fn write_outcome(outcome: PipelineOutcome, output: &Path) -> Result<()> {
    match outcome {
        PipelineOutcome::Gif(bytes) => {
            tokio::fs::write(output, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {} ({} bytes)", output.display(), bytes.len());
            Ok(())
        }
        PipelineOutcome::Disabled(message) => {
            println!("{message}");
            Ok(())
        }
        PipelineOutcome::Failed => bail!("conversion failed; see the log for details"),
    }
}

async fn check_config(path: &Path) -> Result<()> {
    println!("Checking {}", path.display());
    let (_, report) = load_with_report(path).await?;

    for warning in &report.warnings {
        println!("  warning  {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  error    {}: {}", error.path, error.message);
    }

    if report.is_valid() {
        println!("Config OK ({} warnings)", report.warnings.len());
        Ok(())
    } else {
        bail!("{} config errors", report.errors.len())
    }
}
