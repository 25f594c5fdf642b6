use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod api;
mod cli;
mod config;
mod controller;
mod models;
mod tui;

use api::client::DrugsClient;
use cli::{Cli, Commands};
use config::Config;
use models::{derive_distinct_companies, format_launch_date, DisplayRow, QueryState};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "drugview=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "drugview.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::List {
            page,
            page_size,
            company,
            api_url,
        } => {
            let page_size = Commands::parse_page_size(*page_size)?;
            let config = load_config(api_url)?;
            let client = DrugsClient::new(&config)?;

            let query = QueryState {
                page: *page,
                page_size,
                company: company.clone(),
            };

            info!("Fetching drugs page {} from {}", query.page + 1, config.api_url);

            match client.fetch_page(&query).await {
                Ok(result) => {
                    println!(
                        "Page {} ({} rows, {} total):",
                        query.page + 1,
                        result.records.len(),
                        result.total
                    );
                    for (index, record) in result.records.iter().enumerate() {
                        let row = DisplayRow::from_record(record, &query, index);
                        println!(
                            "{:>5}  {:<8}  {:<32}  {:<22}  {}",
                            row.id,
                            row.code,
                            row.name,
                            row.company,
                            format_launch_date(&row.launch_date)
                        );
                    }
                }
                Err(e) => error!("Failed to fetch drugs page: {}", e),
            }
        }

        Commands::Companies { api_url } => {
            let config = load_config(api_url)?;
            let client = DrugsClient::new(&config)?;

            info!("Fetching company list from {}", config.api_url);

            match client.fetch_catalog(config.company_scan_limit).await {
                Ok(result) => {
                    let companies = derive_distinct_companies(&result.records);
                    println!("Found {} companies:", companies.len());
                    for company in companies {
                        println!("{}", company);
                    }
                }
                Err(e) => error!("Failed to fetch companies: {}", e),
            }
        }

        Commands::Tui { api_url } => {
            let config = load_config(api_url)?;

            match tui::run_tui(config).await {
                Ok(_) => info!("TUI exited successfully"),
                Err(e) => error!("TUI failed: {}", e),
            }
        }
    }

    Ok(())
}

fn load_config(api_url: &Option<String>) -> Result<Config> {
    let config = Config::from_env()?.with_api_url(api_url.clone());
    config.validate()?;
    Ok(config)
}
