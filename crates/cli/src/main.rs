use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use listpeek_api::{JsonSource, SiteClient, SiteConfig};
use listpeek_engine::{DataSourceCatalog, RecordFetcher};
use listpeek_tui::WidgetConfig;
use listpeek_types::FetchError;
use listpeek_util::{WidgetPreferences, config_file_path};
use tracing::{info, warn};

const LOG_PATH_ENV: &str = "LISTPEEK_LOG_PATH";
const LOG_FILE_NAME: &str = "listpeek.log";

/// Show the items of a site list in a terminal popup.
#[derive(Debug, Parser)]
#[command(name = "listpeek", version, about)]
struct Cli {
    /// Base URL of the site hosting the lists
    #[arg(long, env = "LISTPEEK_SITE_URL")]
    site_url: String,

    /// Heading rendered at the top of the popup
    #[arg(long, default_value = "Popup Title")]
    title: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Preferences file holding the selected list
    #[arg(long)]
    preferences: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the lists the site offers as JSON
    Lists,
    /// Print the items of a list as JSON
    Items {
        /// List title; defaults to the persisted selection
        #[arg(long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // No subcommand => TUI, which owns the terminal; log to a file instead.
    init_tracing(cli.command.is_none());

    let config = SiteConfig::new(&cli.site_url).with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = SiteClient::new(config).with_context(|| format!("configure client for {}", cli.site_url))?;
    let source: Arc<dyn JsonSource> = Arc::new(client);
    let preferences = Arc::new(open_preferences(cli.preferences.as_ref()));

    match cli.command {
        None => {
            let widget = WidgetConfig {
                title: cli.title,
                ..WidgetConfig::default()
            };
            listpeek_tui::run(widget, source, preferences).await
        }
        Some(Command::Lists) => print_lists(source).await,
        Some(Command::Items { source: identifier }) => {
            let identifier = identifier.or_else(|| preferences.selected_source()).unwrap_or_default();
            print_items(source, &identifier).await
        }
    }
}

fn init_tracing(to_file: bool) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if !to_file {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    }

    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    // Without a log file, stay silent rather than write over the TUI.
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        Err(_) => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }
}

fn log_file_path() -> PathBuf {
    config_file_path(LOG_PATH_ENV, LOG_FILE_NAME)
}

fn open_preferences(path: Option<&PathBuf>) -> WidgetPreferences {
    let opened = match path {
        Some(path) => WidgetPreferences::at_path(path),
        None => WidgetPreferences::new(),
    };
    opened.unwrap_or_else(|error| {
        warn!(error = %error, "preferences unavailable; selection will not be saved");
        WidgetPreferences::ephemeral()
    })
}

async fn print_lists(source: Arc<dyn JsonSource>) -> Result<()> {
    let catalog = DataSourceCatalog::new(source);
    let descriptors = catalog.discover().await.context("discover lists")?;
    info!(count = descriptors.len(), "discovered lists");
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

async fn print_items(source: Arc<dyn JsonSource>, identifier: &str) -> Result<()> {
    let fetcher = RecordFetcher::new(source);
    let records = match fetcher.fetch(identifier).await {
        Err(FetchError::MissingSource) => anyhow::bail!("no list selected; pass --source <title>"),
        other => other.with_context(|| format!("fetch items of '{identifier}'"))?,
    };
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_subcommands() {
        let cli = Cli::try_parse_from(["listpeek", "--site-url", "https://contoso.example"]).expect("parse");
        assert_eq!(cli.title, "Popup Title");
        assert_eq!(cli.timeout_secs, 30);
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["listpeek", "--site-url", "https://contoso.example", "items", "--source", "FAQ"]).expect("parse");
        assert!(matches!(cli.command, Some(Command::Items { source: Some(ref id) }) if id == "FAQ"));
    }

    #[test]
    fn site_url_falls_back_to_environment() {
        temp_env::with_var("LISTPEEK_SITE_URL", Some("https://env.example"), || {
            let cli = Cli::try_parse_from(["listpeek", "lists"]).expect("parse");
            assert_eq!(cli.site_url, "https://env.example");
            assert!(matches!(cli.command, Some(Command::Lists)));
        });
    }

    #[test]
    fn log_path_honors_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("custom.log");
        temp_env::with_var(LOG_PATH_ENV, Some(target.to_str().expect("utf8")), || {
            assert_eq!(log_file_path(), target);
        });
    }

    #[test]
    fn unreadable_preferences_degrade_to_ephemeral() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory cannot be read as a preferences file.
        let preferences = open_preferences(Some(&dir.path().to_path_buf()));
        assert!(!preferences.is_persistent());
    }
}
