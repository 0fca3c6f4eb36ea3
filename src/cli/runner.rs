//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs, HarCommands};
use crate::endpoint::{load_endpoint, validate_endpoint, EndpointConfig};
use crate::fetcher::{FetchOutcome, FetchStatus, Fetcher};
use crate::har::Har;
use crate::output::{result_filename, save_json, to_json_string};
use crate::presets;
use crate::query::{Query, DEFAULT_PAGE_SIZE};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch(args) => self.fetch(args).await,
            Commands::List => self.list(),
            Commands::Show { endpoint } => self.show(endpoint),
            Commands::Validate { file } => self.validate(file),
            Commands::Har(command) => self.har(command),
        }
    }

    /// Fetch all pages and print or save the items
    async fn fetch(&self, args: &FetchArgs) -> Result<()> {
        let endpoint = endpoint_with_overrides(args)?;
        let query = build_query(args, &endpoint);
        let name = endpoint.name.clone();

        let fetcher = Fetcher::new(endpoint)?;
        let FetchOutcome {
            items,
            status,
            stats,
        } = fetcher.fetch_all(&query).await;

        let early_stop = match status {
            FetchStatus::Complete => None,
            FetchStatus::Partial(e) => Some(e),
            FetchStatus::Failed(e) => {
                return Err(anyhow::Error::new(e).context(format!("{name} fetch failed")));
            }
        };

        info!(
            "Retrieved a total of {} items in {} pages ({} ms)",
            stats.items, stats.pages, stats.duration_ms
        );

        match args.output_dir {
            Some(ref dir) => {
                let filename = result_filename(&name, &query, items.len());
                save_json(&items, &filename, Some(dir.as_path()))?;
            }
            None => println!("{}", to_json_string(&items)?),
        }

        match early_stop {
            None => Ok(()),
            Some(e) if args.allow_partial => {
                warn!("{name} fetch stopped early, results are partial: {e}");
                Ok(())
            }
            Some(e) => Err(anyhow::Error::new(e).context(format!(
                "{name} fetch stopped after {} pages; {} partial items were kept",
                stats.pages, stats.items
            ))),
        }
    }

    /// List built-in endpoints
    fn list(&self) -> Result<()> {
        for name in presets::list_builtin() {
            let endpoint = load_endpoint(name)?;
            println!(
                "{:<10} {}",
                name,
                endpoint.description.as_deref().unwrap_or_default()
            );
        }
        Ok(())
    }

    /// Print an endpoint definition
    fn show(&self, endpoint: &str) -> Result<()> {
        let endpoint = load_endpoint(endpoint)?;
        print!("{}", serde_yaml::to_string(&endpoint)?);
        Ok(())
    }

    /// Validate an endpoint file
    fn validate(&self, file: &Path) -> Result<()> {
        let endpoint =
            load_endpoint(file).with_context(|| format!("invalid endpoint {}", file.display()))?;

        println!("Endpoint '{}' is valid", endpoint.name);
        println!("  {} {}", endpoint.method, endpoint.base_url);
        println!("  items: {}", endpoint.items_path);
        println!("  pagination: {:?}", endpoint.pagination);
        if !endpoint.auth.is_empty() {
            println!("  bootstrap steps: {}", endpoint.auth.len());
        }
        Ok(())
    }

    /// HAR inspection commands
    fn har(&self, command: &HarCommands) -> Result<()> {
        match command {
            HarCommands::Calls { file, pattern } => {
                let calls = load_har(file)?.api_calls(pattern);
                info!("Found {} calls matching '{pattern}'", calls.len());
                println!("{}", to_json_string(&calls)?);
            }
            HarCommands::Cookies { file, domain } => {
                let cookies = load_har(file)?.cookies_for(domain);
                println!("{}", to_json_string(&cookies)?);
            }
            HarCommands::Endpoint {
                file,
                pattern,
                name,
                index,
            } => {
                let calls = load_har(file)?.api_calls(pattern);
                let call = calls.get(*index).ok_or_else(|| {
                    anyhow!(
                        "no call #{index} matching '{pattern}' ({} matches)",
                        calls.len()
                    )
                })?;
                let endpoint = call.to_endpoint(name)?;
                print!("{}", serde_yaml::to_string(&endpoint)?);
            }
        }
        Ok(())
    }
}

fn load_har(file: &Path) -> Result<Har> {
    Har::load(file).with_context(|| format!("reading HAR file {}", file.display()))
}

/// Load the endpoint and apply command-line overrides
fn endpoint_with_overrides(args: &FetchArgs) -> Result<EndpointConfig> {
    let mut endpoint = load_endpoint(&args.endpoint)
        .with_context(|| format!("loading endpoint '{}'", args.endpoint))?;

    if args.page_size.is_some() {
        endpoint.page_size = args.page_size;
    }
    if args.max_pages.is_some() {
        endpoint.max_pages = args.max_pages;
    }
    if args.max_items.is_some() {
        endpoint.max_items = args.max_items;
    }
    if args.timeout_secs.is_some() {
        endpoint.timeout_secs = args.timeout_secs;
    }
    for (key, value) in &args.vars {
        endpoint
            .vars
            .insert(key.clone(), Value::String(value.clone()));
    }

    validate_endpoint(&endpoint).context("invalid command-line override")?;
    Ok(endpoint)
}

fn build_query(args: &FetchArgs, endpoint: &EndpointConfig) -> Query {
    let page_size = args
        .page_size
        .or(endpoint.page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let query = Query::new(args.term.clone()).with_page_size(page_size);
    match args.location {
        Some(ref location) => query.with_location(location.clone()),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn fetch_args(argv: &[&str]) -> FetchArgs {
        let mut full = vec!["apitrail", "fetch"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Fetch(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_overrides_applied() {
        let args = fetch_args(&[
            "-e",
            "yelp",
            "tacos",
            "Austin",
            "--max-items",
            "5",
            "--var",
            "sort_by=rating",
        ]);
        let endpoint = endpoint_with_overrides(&args).unwrap();

        assert_eq!(endpoint.max_items, Some(5));
        assert_eq!(endpoint.vars["sort_by"], Value::String("rating".into()));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = fetch_args(&["-e", "yelp", "tacos", "--max-pages", "0"]);
        assert!(endpoint_with_overrides(&args).is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let args = fetch_args(&["-e", "yelp", "tacos", "--page-size", "0"]);
        let err = endpoint_with_overrides(&args).unwrap_err();
        assert!(format!("{err:#}").contains("page_size"));
    }

    #[test]
    fn test_query_page_size_precedence() {
        let args = fetch_args(&["-e", "yelp", "tacos", "Austin"]);
        let endpoint = endpoint_with_overrides(&args).unwrap();
        let query = build_query(&args, &endpoint);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.location.as_deref(), Some("Austin"));

        let args = fetch_args(&["-e", "yelp", "tacos", "--page-size", "5"]);
        assert_eq!(build_query(&args, &endpoint).page_size, 5);

        let mut endpoint = endpoint;
        endpoint.page_size = None;
        let args = fetch_args(&["-e", "yelp", "tacos"]);
        assert_eq!(build_query(&args, &endpoint).page_size, DEFAULT_PAGE_SIZE);
    }
}
