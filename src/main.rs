//! # QReative CLI
//!
//! Command-line interface for styled QR code generation.
//!
//! ## Usage
//!
//! ```bash
//! # Generate qrcode.png in the current directory
//! qreative generate --url https://example.com
//!
//! # Generate from an options file, as SVG, into ./out
//! qreative generate --config options.json --format svg --out out
//!
//! # Also print the PNG data URL (clipboard text)
//! qreative generate --text "hello" --copy
//!
//! # Show the string a payload encodes to
//! qreative payload --config options.json
//!
//! # Check a color pair
//! qreative contrast "#777777" "#ffffff"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use qreative::{
    Color, ContrastReport, Logo, PayloadConfig, Pipeline, QrOptions, QreativeError,
    contrast::MIN_CONTRAST_RATIO,
    export::{self, ExportFormat, NoShareTarget, ShareOutcome, StdoutClipboard},
    logging,
};

/// QReative - Styled QR code generator
#[derive(Parser, Debug)]
#[command(name = "qreative")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a QR code and save it
    Generate {
        /// JSON options file (payload, style, logo)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Encode this URL instead of the configured payload
        #[arg(long, conflicts_with = "text")]
        url: Option<String>,

        /// Encode this text instead of the configured payload
        #[arg(long)]
        text: Option<String>,

        /// Logo image to place in the center
        #[arg(long, value_name = "FILE")]
        logo: Option<PathBuf>,

        /// Output format (png or svg)
        #[arg(long, default_value = "png")]
        format: ExportFormat,

        /// Output directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Print the PNG data URL to stdout
        #[arg(long)]
        copy: bool,

        /// Share the PNG (falls back to --copy behavior without a share sheet)
        #[arg(long)]
        share: bool,
    },

    /// Print the string a payload encodes to
    Payload {
        /// JSON options file
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
    },

    /// Print the contrast ratio of two colors
    Contrast {
        /// Foreground color (#rrggbb or #rgb)
        foreground: Color,

        /// Background color (#rrggbb or #rgb)
        background: Color,
    },
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), QreativeError> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Generate {
                config,
                url,
                text,
                logo,
                format,
                out,
                copy,
                share,
            } => {
                let mut options = load_options(config.as_ref()).await?;
                if let Some(target) = url {
                    options.payload = PayloadConfig::Url { target };
                } else if let Some(body) = text {
                    options.payload = PayloadConfig::Text { body };
                }
                if let Some(path) = logo {
                    options.logo = Some(Logo::load(&path).await?);
                }

                println!("Generating QR code for {:?}...", options.data());
                let code = Pipeline::default().generate(&options).await?;
                if let Some(warning) = code.contrast.warning() {
                    eprintln!("Warning: {}", warning);
                }

                let payload = export::export(&code, format)?;
                let path = export::save(&payload, &out).await?;
                println!("Saved to {}", path.display());

                if copy {
                    export::copy_to_clipboard(&code, &StdoutClipboard).await?;
                }
                if share {
                    match export::share(&code, &NoShareTarget, &StdoutClipboard).await? {
                        ShareOutcome::Shared => println!("Shared."),
                        ShareOutcome::CopiedToClipboard => {
                            eprintln!("No share sheet available; printed the data URL instead.")
                        }
                    }
                }
            }

            Commands::Payload { config } => {
                let options = QrOptions::load(&config).await?;
                println!("{}", options.data());
            }

            Commands::Contrast {
                foreground,
                background,
            } => {
                let report = ContrastReport::between(foreground, background);
                let verdict = if report.passes { "good" } else { "low" };
                println!(
                    "{} on {}: {:.2}:1 ({}, minimum {}:1)",
                    foreground, background, report.ratio, verdict, MIN_CONTRAST_RATIO
                );
            }
        }

        Ok(())
    })
}

async fn load_options(path: Option<&PathBuf>) -> Result<QrOptions, QreativeError> {
    match path {
        Some(path) => QrOptions::load(path).await,
        None => Ok(QrOptions::default()),
    }
}
