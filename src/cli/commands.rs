//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Call undocumented web APIs found in browser network traffic
#[derive(Parser, Debug)]
#[command(name = "apitrail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all pages of an endpoint for a search term
    Fetch(FetchArgs),

    /// List built-in endpoints
    List,

    /// Print an endpoint definition as YAML
    Show {
        /// Built-in endpoint name or YAML file
        endpoint: String,
    },

    /// Validate an endpoint definition
    Validate {
        /// Endpoint YAML file
        file: PathBuf,
    },

    /// Inspect a HAR capture
    #[command(subcommand)]
    Har(HarCommands),
}

/// Arguments of `fetch`
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Built-in endpoint name or YAML file
    #[arg(short, long)]
    pub endpoint: String,

    /// Search term
    pub term: String,

    /// Location to search in
    pub location: Option<String>,

    /// Items per page (defaults to the endpoint's page size)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Maximum number of pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Maximum number of items
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Overall deadline in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Template variable, available as `{{ vars.KEY }}` (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Directory to save results to (prints to stdout otherwise)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Exit successfully when paging stopped on an error after some pages
    #[arg(long)]
    pub allow_partial: bool,
}

/// `har` subcommands
#[derive(Subcommand, Debug)]
pub enum HarCommands {
    /// List calls whose URL contains a pattern
    Calls {
        /// HAR file
        file: PathBuf,

        /// URL substring to match
        #[arg(short, long)]
        pattern: String,
    },

    /// Print the request cookies sent to a domain
    Cookies {
        /// HAR file
        file: PathBuf,

        /// Domain substring to match
        #[arg(short, long)]
        domain: String,
    },

    /// Print an endpoint skeleton (YAML) for a matching call
    Endpoint {
        /// HAR file
        file: PathBuf,

        /// URL substring to match
        #[arg(short, long)]
        pattern: String,

        /// Name of the new endpoint
        #[arg(short, long)]
        name: String,

        /// Which matching call to use (in start order)
        #[arg(long, default_value = "0")]
        index: usize,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
