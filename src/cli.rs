use clap::{Parser, Subcommand};

use crate::models::PAGE_SIZES;

#[derive(Parser)]
#[command(name = "drugview")]
#[command(about = "Terminal client for browsing a paginated, filterable drug catalog API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one page of drug records
    List {
        /// Zero-based page number
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Rows per page (25, 50 or 100)
        #[arg(long, default_value = "25")]
        page_size: usize,

        /// Only show records from this company
        #[arg(short, long)]
        company: Option<String>,

        /// API base URL (overrides DRUGVIEW_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Print the distinct company names found in the catalog
    Companies {
        /// API base URL (overrides DRUGVIEW_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Launch the interactive table browser
    Tui {
        /// API base URL (overrides DRUGVIEW_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}

impl Commands {
    pub fn parse_page_size(size: usize) -> Result<usize, anyhow::Error> {
        if PAGE_SIZES.contains(&size) {
            Ok(size)
        } else {
            Err(anyhow::anyhow!(
                "Unsupported page size: {}. Supported sizes: 25, 50, 100",
                size
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_size() {
        assert_eq!(Commands::parse_page_size(25).unwrap(), 25);
        assert_eq!(Commands::parse_page_size(100).unwrap(), 100);
        assert!(Commands::parse_page_size(0).is_err());
        assert!(Commands::parse_page_size(33).is_err());
    }
}
