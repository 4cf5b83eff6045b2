//! Country metadata from a REST endpoint.
//!
//! One GET returns a JSON array of countries; each element is normalized into
//! a fixed-shape [`CountryRecord`] and the records are assembled into a
//! [`Table`]. Unlike the scrapers, a failed fetch is fatal: there is no
//! partial result.

mod record;

use datafetch_shared::{CountriesSettings, DataFetchError, Fetcher, Result, Table};
use serde_json::Value;
use tracing::{info, instrument};

pub use record::{COLUMNS, CountryRecord, UNKNOWN_NAME, normalize, to_table};

/// Fetches and normalizes the country dataset through any [`Fetcher`].
pub struct CountryCollector<F> {
    fetcher: F,
    endpoint: String,
}

impl<F: Fetcher> CountryCollector<F> {
    /// Collector for the default endpoint.
    pub fn new(fetcher: F) -> Self {
        Self::with_settings(fetcher, &CountriesSettings::default())
    }

    pub fn with_settings(fetcher: F, settings: &CountriesSettings) -> Self {
        Self {
            fetcher,
            endpoint: settings.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET the endpoint and return its array elements.
    pub async fn fetch(&self) -> Result<Vec<Value>> {
        let body = self.fetcher.get_text(&self.endpoint).await.map_err(|e| {
            DataFetchError::Network(format!("failed to fetch data from the API: {e}"))
        })?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| DataFetchError::parse(format!("{}: invalid JSON: {e}", self.endpoint)))?;

        match value {
            Value::Array(items) => Ok(items),
            other => Err(DataFetchError::parse(format!(
                "{}: expected a JSON array, got {}",
                self.endpoint,
                json_kind(&other)
            ))),
        }
    }

    /// Fetch, normalize, and tabulate in one step.
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn collect(&self) -> Result<Table> {
        let raw = self.fetch().await?;
        let records = normalize(&raw);
        info!(countries = records.len(), "country data normalized");
        Ok(to_table(&records))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafetch_shared::{HttpConfig, HttpFetcher, StaticFetcher};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/json/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn settings(endpoint: String) -> CountriesSettings {
        CountriesSettings { endpoint }
    }

    #[test]
    fn default_endpoint_requests_needed_fields() {
        let collector = CountryCollector::new(StaticFetcher::new());
        assert!(collector.endpoint().starts_with("https://restcountries.com/v3.1/all"));
        assert!(collector.endpoint().contains("timezones"));
    }

    #[tokio::test]
    async fn collects_fixture_over_http() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/v3.1/all"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(load_fixture("countries.json"))
                    .insert_header("content-type", "application/json"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let collector =
            CountryCollector::with_settings(fetcher, &settings(format!("{}/v3.1/all", server.uri())));
        let table = collector.collect().await.unwrap();

        assert_eq!(table.columns(), COLUMNS);
        assert_eq!(table.len(), 3);

        let names: Vec<_> = table.column_values("Country").cloned().collect();
        assert_eq!(names, [serde_json::json!("Peru"), serde_json::json!("Antarctica"), serde_json::json!("Unknown")]);

        let capitals: Vec<_> = table.column_values("Capital").cloned().collect();
        assert_eq!(capitals[0], serde_json::json!("Lima"));
        assert_eq!(capitals[1], Value::Null);
    }

    #[tokio::test]
    async fn error_status_fails_without_table() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let collector = CountryCollector::with_settings(fetcher, &settings(server.uri()));
        let err = collector.collect().await.unwrap_err();

        assert!(matches!(err, DataFetchError::Network(_)));
        assert!(err.to_string().contains("failed to fetch data from the API"));
    }

    #[tokio::test]
    async fn non_array_body_is_a_parse_error() {
        let endpoint = "https://countries.test/all";
        let fetcher = StaticFetcher::new().with_page(endpoint, r#"{"status":400,"message":"Bad Request"}"#);
        let collector = CountryCollector::with_settings(fetcher, &settings(endpoint.into()));

        let err = collector.fetch().await.unwrap_err();
        assert!(matches!(err, DataFetchError::Parse { .. }));
        assert!(err.to_string().contains("an object"));
    }

    #[tokio::test]
    async fn empty_array_gives_empty_table() {
        let endpoint = "https://countries.test/all";
        let fetcher = StaticFetcher::new().with_page(endpoint, "[]");
        let collector = CountryCollector::with_settings(fetcher, &settings(endpoint.into()));

        let table = collector.collect().await.unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), COLUMNS);
    }
}
