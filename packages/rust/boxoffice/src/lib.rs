//! Year-by-year box-office table scraper.
//!
//! For every year in an inclusive range, fetches one page, extracts the
//! revenue table found inside a configured container, tags each row with its
//! `Year`, and concatenates the years into one [`Table`]. A year whose fetch
//! or extraction fails contributes no rows; the run always completes.

mod extract;

use datafetch_shared::{
    BoxOfficeSettings, DataFetchError, Fetcher, ProgressReporter, Result, SilentProgress, Table,
    YEAR_PLACEHOLDER,
};
use scraper::Selector;
use serde_json::Value;
use tracing::{info, instrument, warn};

pub use extract::extract_table;

/// Column injected into every row with the source year.
pub const YEAR_COLUMN: &str = "Year";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Runtime scraper configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BoxOfficeConfig {
    /// First year, inclusive.
    pub start_year: i32,
    /// Last year, inclusive.
    pub end_year: i32,
    /// Page URL per year; `{year}` is replaced with the year.
    pub url_template: String,
    /// CSS selector of the element wrapping the table.
    pub container_selector: String,
}

impl From<&BoxOfficeSettings> for BoxOfficeConfig {
    fn from(settings: &BoxOfficeSettings) -> Self {
        Self {
            start_year: settings.start_year,
            end_year: settings.end_year,
            url_template: settings.url_template.clone(),
            container_selector: settings.container_selector.clone(),
        }
    }
}

impl BoxOfficeConfig {
    /// Config for `start_year..=end_year` with the default host and selector.
    pub fn for_years(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
            ..Self::from(&BoxOfficeSettings::default())
        }
    }

    /// Number of years in the range; zero when `start_year > end_year`.
    pub fn year_count(&self) -> usize {
        if self.start_year > self.end_year {
            return 0;
        }
        usize::try_from(self.start_year.abs_diff(self.end_year))
            .map_or(usize::MAX, |span| span.saturating_add(1))
    }

    /// The page URL for one year.
    pub fn year_url(&self, year: i32) -> String {
        self.url_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }
}

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

/// Scrapes one table per year through any [`Fetcher`].
pub struct BoxOfficeScraper<F> {
    fetcher: F,
    config: BoxOfficeConfig,
    container: Selector,
}

impl<F: Fetcher> BoxOfficeScraper<F> {
    /// Create a scraper. Fails if the URL template lacks `{year}` or the
    /// container selector does not parse.
    pub fn new(fetcher: F, config: BoxOfficeConfig) -> Result<Self> {
        if !config.url_template.contains(YEAR_PLACEHOLDER) {
            return Err(DataFetchError::config(format!(
                "url template must contain {YEAR_PLACEHOLDER}: {}",
                config.url_template
            )));
        }

        let container = Selector::parse(&config.container_selector).map_err(|e| {
            DataFetchError::config(format!(
                "invalid container selector '{}': {e}",
                config.container_selector
            ))
        })?;

        Ok(Self {
            fetcher,
            config,
            container,
        })
    }

    /// Fetch a page body. Failures are logged and yield `None`.
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        match self.fetcher.get_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(%url, error = %e, "failed to retrieve the webpage");
                None
            }
        }
    }

    /// Extract the configured container's table from a page.
    pub fn extract_table(&self, html: &str) -> Option<Table> {
        extract_table(html, &self.container)
    }

    /// Scrape every configured year and concatenate the results.
    pub async fn fetch_all_years(&self) -> Table {
        self.fetch_all_years_with_progress(&SilentProgress).await
    }

    /// Same as [`BoxOfficeScraper::fetch_all_years`], reporting each year.
    #[instrument(skip_all, fields(start = self.config.start_year, end = self.config.end_year))]
    pub async fn fetch_all_years_with_progress(&self, progress: &dyn ProgressReporter) -> Table {
        let mut all_data = Table::default();
        let (start, end) = (self.config.start_year, self.config.end_year);

        let total = self.config.year_count();
        if total == 0 {
            warn!("start year is after end year, nothing to fetch");
            return all_data;
        }

        let mut failed_years = Vec::new();
        progress.phase("Fetching box office tables");

        for (i, year) in (start..=end).enumerate() {
            let url = self.config.year_url(year);
            progress.step(&format!("{year}: {url}"), i + 1, Some(total));
            info!(year, %url, "fetching data for year");

            let Some(html) = self.fetch_page(&url).await else {
                failed_years.push(year);
                continue;
            };

            let Some(mut table) = self.extract_table(&html) else {
                warn!(year, "no table extracted");
                failed_years.push(year);
                continue;
            };

            table.add_constant_column(YEAR_COLUMN, Value::from(year));
            all_data.append(table);
        }

        info!(
            rows = all_data.len(),
            years = total,
            failed = failed_years.len(),
            "box office fetch completed"
        );
        progress.done(&format!(
            "{} rows from {} of {total} years",
            all_data.len(),
            total - failed_years.len()
        ));

        all_data
    }
}
