//! Command-line client for the NoteHub notes service.
//!
//! This CLI tool provides commands for all note operations:
//! - list: List one page of notes, optionally filtered by a search
//! - read: Show a single note
//! - create: Validate and create a note
//! - delete: Delete a note
//! - browse: Interactive notes screen with debounced search and paging
//!
//! Configuration via environment:
//! - NOTEHUB_URL: Base URL of the notes API (default: the public NoteHub API)
//! - NOTEHUB_TOKEN: Bearer token for authentication
//! - NOTEHUB_LOG: Log filter when RUST_LOG is unset (default: warn)

mod commands;

use clap::{Parser, Subcommand};
use notehub_client::{ClientConfig, DEFAULT_BASE_URL, HttpNotesApi};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::{
    browse::BrowseArgs, create::CreateArgs, delete::DeleteArgs, list::ListArgs, read::ReadArgs,
};

/// NoteHub CLI
///
/// Search, page through and create notes from the command line. Prints
/// JSON by default; pass --human for formatted output.
#[derive(Parser)]
#[command(name = "notehub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Notes API base URL
    #[arg(long, env = "NOTEHUB_URL", default_value = DEFAULT_BASE_URL, global = true)]
    url: String,

    /// Bearer token for authentication (default: $NOTEHUB_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "NOTEHUB_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of notes
    List(ListArgs),

    /// Show a single note
    Read(ReadArgs),

    /// Create a new note
    Create(CreateArgs),

    /// Delete a note
    Delete(DeleteArgs),

    /// Browse notes interactively
    Browse(BrowseArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.log_level);

    let api = match build_api(&cli) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(&api, cli.human, args).await,
        Commands::Read(args) => commands::read::execute(&api, cli.human, args).await,
        Commands::Create(args) => commands::create::execute(&api, cli.human, args).await,
        Commands::Delete(args) => commands::delete::execute(&api, cli.human, args).await,
        Commands::Browse(args) => commands::browse::execute(api, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Build the API client from the global flags, falling back to the
/// environment when no token is passed.
fn build_api(cli: &Cli) -> anyhow::Result<HttpNotesApi> {
    let config = match cli.token.as_deref() {
        Some(token) => ClientConfig::new(cli.url.as_str(), token)?,
        None => ClientConfig::from_env()?,
    };
    tracing::debug!(?config, "client configured");
    Ok(HttpNotesApi::new(config)?)
}

/// Initialize the tracing subscriber on stderr so stdout stays parseable.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_parse() {
        let cli = Cli::try_parse_from([
            "notehub", "--token", "t", "list", "--search", "work", "--page", "2",
        ])
        .unwrap();
        assert_eq!(cli.url, DEFAULT_BASE_URL);
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.search, "work");
                assert_eq!(args.page, 2);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn explicit_token_overrides_environment() {
        let cli = Cli::try_parse_from([
            "notehub",
            "--url",
            "http://localhost:9/",
            "--token",
            "Bearer flag",
            "list",
        ])
        .unwrap();
        let api = build_api(&cli).unwrap();
        assert_eq!(api.config().base_url(), "http://localhost:9");
        assert_eq!(api.config().authorization(), "Bearer flag");
    }
}
