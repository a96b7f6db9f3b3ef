//! Operator tool for the tape archive catalogue.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use prometheus::{Encoder, TextEncoder};
use std::collections::BTreeSet;
use std::path::Path;
use tapecat_catalogue::RetryingCatalogue;
use tapecat_core::config::AppConfig;
use tapecat_disk::{DiskError, DiskSystemFreeSpaceList};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "tapecat")]
#[command(about = "Operator tool for the tape archive catalogue")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, env = "TAPECAT_CONFIG", default_value = "tapecat.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the catalogue carries the expected schema version
    VerifySchema,
    /// Check that the catalogue database answers
    Ping,
    /// Fetch and show the free space of disk systems
    FreeSpace {
        /// Disk systems to probe (default: all)
        names: Vec<String>,
        /// Bytes a retrieve batch would need, checked against each disk system
        #[arg(long)]
        bytes: Option<u64>,
    },
    /// Print catalogue and free-space metrics in Prometheus text format
    Metrics,
}

/// Merge the optional config file with `TAPECAT_` environment variables.
fn load_config(path: &Path) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if path.exists() {
        tracing::debug!(config_path = %path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path.display());
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("TAPECAT_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    Ok(config)
}

async fn open_catalogue(config: &AppConfig) -> Result<RetryingCatalogue> {
    tapecat_catalogue::open_with_retry(&config.catalogue)
        .await
        .with_context(|| {
            format!(
                "failed to open catalogue at {}",
                config.catalogue.path.display()
            )
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(Path::new(&cli.config))?;
    tapecat_catalogue::metrics::register_metrics();
    tapecat_disk::metrics::register_metrics();

    match cli.command {
        Commands::VerifySchema => {
            let catalogue = open_catalogue(&config).await?;
            let version = catalogue
                .get_schema_version()
                .await
                .context("failed to read schema version")?;
            println!("Catalogue schema version {version} OK");
        }
        Commands::Ping => {
            let catalogue = open_catalogue(&config).await?;
            catalogue.ping().await.context("catalogue ping failed")?;
            println!(
                "Catalogue at {} is reachable",
                config.catalogue.path.display()
            );
        }
        Commands::FreeSpace { names, bytes } => {
            let catalogue = open_catalogue(&config).await?;
            free_space(catalogue, &config, names, bytes).await?;
        }
        Commands::Metrics => {
            print!("{}", render_metrics()?);
        }
    }

    Ok(())
}

async fn free_space(
    catalogue: RetryingCatalogue,
    config: &AppConfig,
    names: Vec<String>,
    bytes: Option<u64>,
) -> Result<()> {
    let mut list =
        DiskSystemFreeSpaceList::with_default_prober(catalogue.clone(), &config.disk_space)
            .context("failed to set up free space probing")?;

    let names: BTreeSet<String> = if names.is_empty() {
        catalogue
            .run(|c| async move { c.disk_systems().get_all_disk_systems().await })
            .await
            .context("failed to list disk systems")?
            .iter()
            .map(|system| system.name.clone())
            .collect()
    } else {
        names.into_iter().collect()
    };
    if names.is_empty() {
        println!("No disk systems defined");
        return Ok(());
    }

    let fetched = list.fetch_disk_system_free_space(&names).await;
    let reservations = list
        .existing_reservations()
        .await
        .context("failed to read disk space reservations")?;

    println!(
        "{:<24} {:>16} {:>16} {:>8}",
        "DISK SYSTEM", "FREE", "TARGETED", "ENOUGH"
    );
    for name in &names {
        let Some(known) = list.get(name) else {
            continue;
        };
        let enough = match bytes {
            Some(bytes) if list.has_enough_space(name, bytes, reservations)? => "yes",
            Some(_) => "no",
            None => "-",
        };
        println!(
            "{:<24} {:>16} {:>16} {:>8}",
            name, known.free_space, known.targeted_free_space, enough
        );
    }

    match fetched {
        Ok(()) => Ok(()),
        Err(DiskError::FreeSpaceFetch(err)) => {
            for (name, failure) in &err.failures {
                eprintln!("{name}: {failure}");
            }
            anyhow::bail!(
                "free space of {} of {} disk system(s) could not be fetched",
                err.failures.len(),
                names.len()
            )
        }
        Err(err) => Err(err).context("failed to fetch free space"),
    }
}

fn render_metrics() -> Result<String> {
    let mut families = tapecat_catalogue::metrics::REGISTRY.gather();
    families.extend(tapecat_disk::metrics::REGISTRY.gather());

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buffer)
        .context("failed to encode metrics")?;
    String::from_utf8(buffer).context("metrics are not valid UTF-8")
}
