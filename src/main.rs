//! Packport - Resource-pack model to entity-geometry converter
//!
//! This is the command-line entry point: it loads settings, sets up
//! logging, and drives conversion sessions.

mod icon;
mod package;
mod pipeline;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use packport_core::AssetKind;

use crate::package::PackageWriter;
use crate::pipeline::ConversionSession;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "packport")]
#[command(about = "Convert resource-pack models into entity geometry")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding `content/` and `output/`
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Namespace for bare model names
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert models and write geometry, attachables and textures
    Convert {
        /// Models as `namespace:path` or bare paths
        #[arg(required = true)]
        models: Vec<String>,

        /// Output directory (overrides settings)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve one reference and print where it lives
    Resolve {
        reference: String,

        #[arg(long, value_enum, default_value_t = KindArg::Model)]
        kind: KindArg,
    },
    /// Print the merged texture slots of a model
    Slots { model: String },
    /// Write the current settings to the config file
    InitConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Model,
    Texture,
    Other,
}

impl From<KindArg> for AssetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Model => AssetKind::Model,
            KindArg::Texture => AssetKind::Texture,
            KindArg::Other => AssetKind::Other,
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut settings = match (&cli.command, cli.config.as_deref()) {
        (Commands::InitConfig, Some(path)) if !path.exists() => Settings::default(),
        (_, explicit) => Settings::load(explicit)?,
    };
    if let Some(root) = cli.root {
        settings.paths.content_root = root;
    }
    if let Some(namespace) = cli.namespace {
        settings.conversion.default_namespace = namespace;
    }

    match cli.command {
        Commands::Convert { models, output } => {
            if let Some(output) = output {
                settings.paths.output_dir = output;
            }
            convert(&settings, &models)
        }
        Commands::Resolve { reference, kind } => {
            let session = ConversionSession::new(&settings);
            let resolved = session
                .resolve_reference(&reference, kind.into())
                .map_err(anyhow::Error::new)?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            Ok(())
        }
        Commands::Slots { model } => {
            let session = ConversionSession::new(&settings);
            let slots = session.resolve_slots(&session.model_reference(&model));
            println!("{}", serde_json::to_string_pretty(&slots)?);
            Ok(())
        }
        Commands::InitConfig => {
            let path = match &cli.config {
                Some(path) => {
                    settings.save_to(path)?;
                    path.clone()
                }
                None => settings.save()?,
            };
            info!("Settings written to {}", path.display());
            Ok(())
        }
    }
}

fn convert(settings: &Settings, models: &[String]) -> Result<()> {
    info!("Starting packport conversion of {} models...", models.len());

    let writer = PackageWriter::create(&settings.paths.output_dir)?;
    let session = ConversionSession::new(settings);

    let mut reports = session.convert_all(models);
    for report in &mut reports {
        writer.write_model(report);
        for note in &report.notes {
            warn!("{}: {}", report.model, note);
        }
    }

    let report_path = writer.write_report(&reports)?;
    let failed = reports.iter().filter(|r| !r.is_converted()).count();
    info!(
        "Done: {} converted, {} failed, {} archive extractions; output in {}, report at {}",
        reports.len() - failed,
        failed,
        session.resolver().cache().extraction_count(),
        writer.output_dir().display(),
        report_path.display()
    );
    Ok(())
}
