//! Application configuration for datafetch.
//!
//! User config lives at `~/.datafetch/datafetch.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DataFetchError, Result};
use crate::http::{BROWSER_USER_AGENT, DEFAULT_USER_AGENT};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "datafetch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".datafetch";

/// Placeholder substituted with the year in [`BoxOfficeSettings::url_template`].
pub const YEAR_PLACEHOLDER: &str = "{year}";

// ---------------------------------------------------------------------------
// Config structs (matching datafetch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Box-office scraper settings.
    #[serde(default)]
    pub box_office: BoxOfficeSettings,

    /// Sitemap walker settings.
    #[serde(default)]
    pub sitemap: SitemapSettings,

    /// Country collector settings.
    #[serde(default)]
    pub countries: CountriesSettings,
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[box_office]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxOfficeSettings {
    /// Page URL per year; `{year}` is replaced with the year.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// CSS selector of the element wrapping the revenue table.
    #[serde(default = "default_container_selector")]
    pub container_selector: String,

    /// First year scraped when the CLI gets no `--start`.
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last year scraped when the CLI gets no `--end`.
    #[serde(default = "default_end_year")]
    pub end_year: i32,
}

impl Default for BoxOfficeSettings {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            container_selector: default_container_selector(),
            start_year: default_start_year(),
            end_year: default_end_year(),
        }
    }
}

fn default_url_template() -> String {
    "https://www.boxofficemojo.com/year/world/{year}/".into()
}
fn default_container_selector() -> String {
    "div.a-section.imdb-scroll-table-inner".into()
}
fn default_start_year() -> i32 {
    1977
}
fn default_end_year() -> i32 {
    2023
}

/// `[sitemap]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapSettings {
    /// Directory receiving one CSV per sitemap.
    #[serde(default = "default_sitemap_output_dir")]
    pub output_dir: String,

    /// User-Agent for robots.txt and sitemap requests.
    #[serde(default = "default_sitemap_user_agent")]
    pub user_agent: String,
}

impl Default for SitemapSettings {
    fn default() -> Self {
        Self {
            output_dir: default_sitemap_output_dir(),
            user_agent: default_sitemap_user_agent(),
        }
    }
}

fn default_sitemap_output_dir() -> String {
    "sitemap_data".into()
}
fn default_sitemap_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

/// `[countries]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountriesSettings {
    /// REST endpoint returning a JSON array of countries.
    #[serde(default = "default_countries_endpoint")]
    pub endpoint: String,
}

impl Default for CountriesSettings {
    fn default() -> Self {
        Self {
            endpoint: default_countries_endpoint(),
        }
    }
}

fn default_countries_endpoint() -> String {
    "https://restcountries.com/v3.1/all?fields=name,capital,population,area,region,subregion,languages,currencies,timezones".into()
}

impl BoxOfficeSettings {
    /// Check that the template can produce a per-year URL.
    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains(YEAR_PLACEHOLDER) {
            return Err(DataFetchError::config(format!(
                "box_office.url_template must contain {YEAR_PLACEHOLDER}: {}",
                self.url_template
            )));
        }
        if self.container_selector.trim().is_empty() {
            return Err(DataFetchError::config(
                "box_office.container_selector must not be empty",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.datafetch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DataFetchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.datafetch/datafetch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DataFetchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        DataFetchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DataFetchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DataFetchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DataFetchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("url_template"));
        assert!(toml_str.contains("sitemap_data"));
        assert!(toml_str.contains("restcountries.com"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.http.timeout_secs, 30);
        assert_eq!(parsed.sitemap.user_agent, "Mozilla/5.0");
        assert_eq!(parsed.box_office.start_year, 1977);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[box_office]
start_year = 2000
end_year = 2002

[countries]
endpoint = "http://localhost:9000/all"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.box_office.start_year, 2000);
        assert_eq!(
            config.box_office.container_selector,
            "div.a-section.imdb-scroll-table-inner"
        );
        assert_eq!(config.countries.endpoint, "http://localhost:9000/all");
        assert_eq!(config.sitemap.output_dir, "sitemap_data");
    }

    #[test]
    fn url_template_requires_placeholder() {
        let mut settings = BoxOfficeSettings::default();
        assert!(settings.validate().is_ok());

        settings.url_template = "https://example.com/year/".into();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("{year}"));
    }

    #[test]
    fn load_config_from_missing_file_fails() {
        let result = load_config_from(Path::new("/nonexistent/datafetch.toml"));
        assert!(matches!(result, Err(DataFetchError::Io { .. })));
    }
}
