//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use datafetch_boxoffice::{BoxOfficeConfig, BoxOfficeScraper};
use datafetch_countries::CountryCollector;
use datafetch_shared::{
    AppConfig, HttpFetcher, ProgressReporter, Table, init_config, load_config, load_config_from,
};
use datafetch_sitemap::SitemapWalker;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// datafetch: pull web data into tables.
#[derive(Parser)]
#[command(
    name = "datafetch",
    version,
    about = "Scrape box-office tables, walk sitemaps, and collect country data.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.datafetch/datafetch.toml.
    #[arg(long, global = true, env = "DATAFETCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Table output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Csv,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape the worldwide box-office table for a range of years.
    BoxOffice {
        /// First year (inclusive).
        #[arg(long)]
        start: Option<i32>,

        /// Last year (inclusive).
        #[arg(long)]
        end: Option<i32>,

        /// Write the table here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Walk a site's sitemaps and export one CSV per sitemap.
    Sitemap {
        /// Site base URL, e.g. https://www.nfl.com.
        site: String,

        /// Directory for the exported CSV files.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Skip splitting URLs into path segments.
        #[arg(long)]
        no_refine: bool,
    },

    /// Fetch country metadata from the REST endpoint.
    Countries {
        /// Write the table here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "datafetch=info",
        1 => "datafetch=debug",
        _ => "datafetch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so tables on stdout stay clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::BoxOffice {
            start,
            end,
            out,
            format,
        } => cmd_box_office(&config, start, end, out.as_deref(), format).await,
        Command::Sitemap {
            site,
            out_dir,
            no_refine,
        } => cmd_sitemap(&config, &site, out_dir, !no_refine).await,
        Command::Countries { out, format } => {
            cmd_countries(&config, out.as_deref(), format).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_box_office(
    config: &AppConfig,
    start: Option<i32>,
    end: Option<i32>,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    config.box_office.validate()?;

    let mut scrape_config = BoxOfficeConfig::from(&config.box_office);
    if let Some(start) = start {
        scrape_config.start_year = start;
    }
    if let Some(end) = end {
        scrape_config.end_year = end;
    }
    if scrape_config.start_year > scrape_config.end_year {
        return Err(eyre!(
            "start year {} is after end year {}",
            scrape_config.start_year,
            scrape_config.end_year
        ));
    }

    info!(
        start = scrape_config.start_year,
        end = scrape_config.end_year,
        "scraping box office tables"
    );

    let fetcher = HttpFetcher::new(&config.http)?;
    let scraper = BoxOfficeScraper::new(fetcher, scrape_config)?;

    let reporter = CliProgress::new();
    let table = scraper.fetch_all_years_with_progress(&reporter).await;

    emit_table(&table, out, format)
}

async fn cmd_sitemap(
    config: &AppConfig,
    site: &str,
    out_dir: Option<PathBuf>,
    refine: bool,
) -> Result<()> {
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from(&config.sitemap.output_dir));

    info!(site, out_dir = %out_dir.display(), refine, "walking sitemaps");

    let fetcher = HttpFetcher::with_user_agent(&config.http, &config.sitemap.user_agent)?;
    let walker = SitemapWalker::new(fetcher, site)?;

    let reporter = CliProgress::new();
    let mut index = walker.gather_sitemaps_with_progress(&reporter).await;
    if refine {
        walker.refine_urls(&mut index);
    }

    let written = datafetch_sitemap::export(&index, &out_dir)?;

    println!();
    println!("  Sitemaps: {}", index.len());
    println!("  URLs:     {}", index.total_urls());
    println!("  Files:    {}", written.len());
    println!("  Path:     {}", out_dir.display());
    println!();

    Ok(())
}

async fn cmd_countries(config: &AppConfig, out: Option<&Path>, format: OutputFormat) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let collector = CountryCollector::with_settings(fetcher, &config.countries);

    info!(endpoint = collector.endpoint(), "collecting country data");

    let table = collector.collect().await?;
    emit_table(&table, out, format)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Write a table to a file, or to stdout when no path is given.
fn emit_table(table: &Table, out: Option<&Path>, format: OutputFormat) -> Result<()> {
    match (out, format) {
        (Some(path), OutputFormat::Csv) => table.save_csv(path)?,
        (Some(path), OutputFormat::Json) => {
            std::fs::write(path, table.to_json_string()?)
                .map_err(|e| eyre!("failed to write {}: {e}", path.display()))?;
        }
        (None, OutputFormat::Csv) => table.write_csv(std::io::stdout().lock())?,
        (None, OutputFormat::Json) => println!("{}", table.to_json_string()?),
    }

    if let Some(path) = out {
        eprintln!("  Wrote {} rows to {}", table.len(), path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn step(&self, detail: &str, current: usize, total: Option<usize>) {
        let message = match total {
            Some(total) => format!("[{current}/{total}] {detail}"),
            None => format!("[{current}] {detail}"),
        };
        self.spinner.set_message(message);
    }

    fn done(&self, summary: &str) {
        self.spinner.finish_and_clear();
        eprintln!("  {summary}");
    }
}
