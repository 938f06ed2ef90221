//! Command-line front end for the renovation catalogs.
//!
//! # Responsibility
//! - Expose list / set-price over each category's catalog document.
//! - Print the same JSON bodies the web API returns.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use renocost_core::{
    catalog_response, init_from_config, update_price_response, ApiResponse, AppConfig,
    CatalogService, Category, UpdatePricePayload,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "renocost")]
#[command(author, version, about = "Renovation cost catalogs: list and update item prices")]
struct Cli {
    /// Directory holding `<category>.xml` documents [env: RENOCOST_DATA_DIR]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error [env: RENOCOST_LOG_LEVEL]
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files [env: RENOCOST_LOG_DIR]
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage.
    Ping,
    /// List supported categories with their slugs and aliases.
    Categories,
    /// Print the catalog of one category as JSON.
    List {
        /// Category slug or route alias (e.g. `painting`, `plakakia`)
        category: Category,
    },
    /// Update the price of one catalog item.
    SetPrice {
        category: Category,
        key: String,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Create and heal every category document.
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env()
        .with_data_dir(cli.data_dir)
        .with_log_level(cli.log_level)
        .with_log_dir(cli.log_dir);
    config.validate().context("invalid configuration")?;
    init_from_config(&config).context("failed to initialize logging")?;

    match cli.command {
        Commands::Ping => {
            println!("renocost_core ping={}", renocost_core::ping());
            println!("renocost_core version={}", renocost_core::core_version());
            Ok(())
        }
        Commands::Categories => {
            let rows: Vec<_> = Category::ALL
                .iter()
                .map(|category| {
                    json!({
                        "slug": category.slug(),
                        "alias": category.route_alias(),
                        "name": category.display_name(),
                        "path": config.catalog_path(*category).display().to_string(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
        Commands::List { category } => {
            let service = CatalogService::open(category, &config.data_dir);
            emit(catalog_response(&service))
        }
        Commands::SetPrice {
            category,
            key,
            price,
        } => {
            let service = CatalogService::open(category, &config.data_dir);
            let payload = UpdatePricePayload {
                key,
                latest_price: price,
            };
            emit(update_price_response(&service, &payload))
        }
        Commands::Init => {
            for category in Category::ALL {
                CatalogService::open(category, &config.data_dir)
                    .prepare()
                    .with_context(|| format!("failed to prepare `{category}` catalog"))?;
                info!("event=catalog_init module=cli status=ok category={category}");
                println!("{}", config.catalog_path(category).display());
            }
            Ok(())
        }
    }
}

fn emit(response: ApiResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if !response.is_success() {
        bail!("request failed with status {}", response.status);
    }
    Ok(())
}
