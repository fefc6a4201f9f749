//! Proposal CLI
//!
//! Prints the pricing catalog, composes quotes, estimates ROI, runs the
//! live price ticker and exports proposals to DOCX or PDF.

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use proposal_core::{AppConfig, InvestmentTier, Locale, Preset, RoiInputs, Variant};
use proposal_render::DocumentFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "proposal")]
#[command(version, about = "Pricing, ROI and commercial proposal generator")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Display locale (ru-RU or en-US), overrides the config file
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Fixed RNG seed for reproducible price drift
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog items with current prices and trends
    Catalog {
        /// Simulated price updates to apply before listing
        #[arg(long, default_value_t = 0)]
        ticks: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compose a quote for one variant
    Quote {
        #[arg(short = 'V', long, default_value = "optimal")]
        variant: Variant,

        #[arg(short, long, default_value = "full")]
        preset: Preset,

        /// Item ids whose inclusion is flipped after the preset is applied
        #[arg(short, long)]
        toggle: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Estimate savings, payback and three-year ROI
    Roi {
        /// Documents processed per month
        #[arg(long, default_value_t = 5000.0, allow_negative_numbers = true)]
        doc_volume: f64,

        /// Processing cost of one document
        #[arg(long, default_value_t = 150.0, allow_negative_numbers = true)]
        avg_doc_cost: f64,

        /// Share of documents with errors, in percent
        #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
        error_rate: f64,

        #[arg(long, default_value_t = 5000.0, allow_negative_numbers = true)]
        avg_error_cost: f64,

        /// Share of documents with fraud risk, in percent
        #[arg(long, default_value_t = 0.5, allow_negative_numbers = true)]
        fraud_risk: f64,

        #[arg(long, default_value_t = 500_000.0, allow_negative_numbers = true)]
        avg_fraud_loss: f64,

        #[arg(long, default_value = "optimal")]
        tier: InvestmentTier,

        #[arg(long)]
        json: bool,
    },

    /// Recommend a variant from volume and availability needs
    Recommend {
        /// Documents processed per month
        #[arg(long)]
        documents: u32,

        #[arg(long)]
        high_availability: bool,
    },

    /// Run the live price simulation
    Live {
        /// Stop after this many updates (runs until Ctrl-C otherwise)
        #[arg(long)]
        ticks: Option<u32>,

        /// Update period in milliseconds, overrides the config file
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Export a proposal document
    Export {
        #[arg(short, long, default_value = "pdf")]
        format: DocumentFormat,

        /// Variants to include; repeat for a combined proposal
        #[arg(short = 'V', long = "variant", default_value = "optimal")]
        variants: Vec<Variant>,

        #[arg(short, long, default_value = "full")]
        preset: Preset,

        /// Item ids whose inclusion is flipped in every variant containing them
        #[arg(short, long)]
        toggle: Vec<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        subtitle: Option<String>,

        /// File name instead of the generated one
        #[arg(short, long)]
        output: Option<String>,

        /// Directory to write into, overrides the config file
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Regular font to fetch before rendering the PDF
        #[arg(long)]
        font_url: Option<String>,

        #[arg(long)]
        bold_font_url: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Results go to stdout; keep logs on stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(locale) = args.locale {
        config.export.locale = locale;
    }
    if let Some(seed) = args.seed {
        config.pricing.seed = Some(seed);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    tracing::debug!(?config, "Configuration loaded");

    match args.command {
        Command::Catalog { ticks, json } => commands::catalog(&config, ticks, json),
        Command::Quote {
            variant,
            preset,
            toggle,
            json,
        } => commands::quote(&config, variant, preset, &toggle, json),
        Command::Roi {
            doc_volume,
            avg_doc_cost,
            error_rate,
            avg_error_cost,
            fraud_risk,
            avg_fraud_loss,
            tier,
            json,
        } => {
            let inputs = RoiInputs {
                doc_volume,
                avg_doc_cost,
                error_rate,
                avg_error_cost,
                fraud_risk,
                avg_fraud_loss,
                tier,
            };
            commands::roi(&config, &inputs, json)
        }
        Command::Recommend {
            documents,
            high_availability,
        } => {
            commands::recommend(documents, high_availability);
            Ok(())
        }
        Command::Live { ticks, interval_ms } => {
            let mut config = config;
            if let Some(ms) = interval_ms {
                config.pricing.tick_interval = std::time::Duration::from_millis(ms);
            }
            commands::live(&config, ticks).await
        }
        Command::Export {
            format,
            variants,
            preset,
            toggle,
            title,
            subtitle,
            output,
            output_dir,
            font_url,
            bold_font_url,
        } => {
            let mut config = config;
            if let Some(dir) = output_dir {
                config.export.output_dir = dir;
            }
            if font_url.is_some() {
                config.export.font_url = font_url;
            }
            if bold_font_url.is_some() {
                config.export.bold_font_url = bold_font_url;
            }
            if title.is_some() {
                config.export.title = title;
            }
            if subtitle.is_some() {
                config.export.subtitle = subtitle;
            }

            let request = commands::ExportRequest {
                format,
                variants,
                preset,
                toggles: toggle,
                file_name: output,
            };
            commands::export(&config, request).await
        }
    }
}
