use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use validator::{EncoderValidator, ValidatorConfig};

/// Check an installed ffmpeg binary's version and capabilities
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (JSON or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ffmpeg binary to probe, overriding the configuration
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exit 0 if the binary's version is supported, 1 otherwise
    Validate,
    /// Print the effective engine version
    Version,
    /// Run every capability query and print the results
    Report {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check whether a filter supports an option
    Filter { name: String, option: String },
    /// Check whether a VA-API render node uses the given driver
    Device { driver: String, render_node: String },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    let mut cfg = ValidatorConfig::load_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(path) = args.ffmpeg {
        cfg.encoder_path = path;
    }

    info!("Encoder path: {}", cfg.encoder_path.display());
    info!("Supported versions: {} .. {}",
          cfg.minimum_version,
          cfg.maximum_version.map(|v| v.to_string()).unwrap_or_else(|| "any".to_string()));

    let validator = EncoderValidator::new(cfg);

    let ok = match args.command {
        Command::Validate => validator.validate_version(),
        Command::Version => match validator.get_engine_version() {
            Some(version) => {
                println!("{}", version);
                true
            }
            None => {
                println!("unknown");
                false
            }
        },
        Command::Report { json } => {
            let report = validator.report();
            if json {
                let text = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize capability report")?;
                println!("{}", text);
            } else {
                print!("{}", report);
            }
            report.version_ok
        }
        Command::Filter { name, option } => {
            let supported = validator.check_filter_with_option(&name, &option);
            println!("{}", supported);
            supported
        }
        Command::Device { driver, render_node } => {
            let matches = validator.check_device_by_driver_name(&driver, &render_node);
            println!("{}", matches);
            matches
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
