//! Fixed-shape country records and their permissive extraction.

use datafetch_shared::Table;
use serde::Serialize;
use serde_json::Value;

/// Name used when a country has no `name.common`.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Output columns, in order.
pub const COLUMNS: [&str; 9] = [
    "Country",
    "Capital",
    "Population",
    "Area",
    "Region",
    "Subregion",
    "Languages",
    "Currencies",
    "Timezones",
];

/// One normalized country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountryRecord {
    #[serde(rename = "Country")]
    pub name: String,
    pub capital: Option<String>,
    pub population: Option<u64>,
    pub area: Option<f64>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    /// Language code → language name, as returned by the API.
    pub languages: Option<Value>,
    /// Currency code → `{name, symbol}`, as returned by the API.
    pub currencies: Option<Value>,
    pub timezones: Option<Vec<String>>,
}

impl CountryRecord {
    /// Build a record from one raw API element. Never fails: missing or
    /// mistyped fields become `"Unknown"` (name) or `None` (everything else).
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            name: raw
                .pointer("/name/common")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
            capital: raw
                .get("capital")
                .and_then(|c| c.get(0))
                .and_then(Value::as_str)
                .map(str::to_string),
            population: raw.get("population").and_then(Value::as_u64),
            area: raw.get("area").and_then(Value::as_f64),
            region: string_field(raw, "region"),
            subregion: string_field(raw, "subregion"),
            languages: object_field(raw, "languages"),
            currencies: object_field(raw, "currencies"),
            timezones: raw.get("timezones").and_then(Value::as_array).map(|zones| {
                zones
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        }
    }

    /// Cells in [`COLUMNS`] order.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.clone()),
            self.capital.clone().map_or(Value::Null, Value::from),
            self.population.map_or(Value::Null, Value::from),
            self.area.map_or(Value::Null, Value::from),
            self.region.clone().map_or(Value::Null, Value::from),
            self.subregion.clone().map_or(Value::Null, Value::from),
            self.languages.clone().unwrap_or(Value::Null),
            self.currencies.clone().unwrap_or(Value::Null),
            self.timezones.clone().map_or(Value::Null, Value::from),
        ]
    }
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn object_field(raw: &Value, key: &str) -> Option<Value> {
    raw.get(key).filter(|v| v.is_object()).cloned()
}

/// Normalize every raw element, in order.
pub fn normalize(raw: &[Value]) -> Vec<CountryRecord> {
    raw.iter().map(CountryRecord::from_raw).collect()
}

/// One row per record; columns exactly [`COLUMNS`].
pub fn to_table(records: &[CountryRecord]) -> Table {
    let mut table = Table::new(COLUMNS);
    for record in records {
        if let Err(e) = table.push_row(record.to_row()) {
            tracing::warn!(country = %record.name, error = %e, "dropping country row");
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn peru() -> Value {
        json!({
            "name": {"common": "Peru", "official": "Republic of Peru"},
            "capital": ["Lima"],
            "population": 32971846,
            "area": 1285216.0,
            "region": "Americas",
            "subregion": "South America",
            "languages": {"aym": "Aymara", "que": "Quechua", "spa": "Spanish"},
            "currencies": {"PEN": {"name": "Peruvian sol", "symbol": "S/ "}},
            "timezones": ["UTC-05:00"]
        })
    }

    #[test]
    fn full_record() {
        let record = CountryRecord::from_raw(&peru());
        assert_eq!(record.name, "Peru");
        assert_eq!(record.capital.as_deref(), Some("Lima"));
        assert_eq!(record.population, Some(32_971_846));
        assert_eq!(record.area, Some(1_285_216.0));
        assert_eq!(record.subregion.as_deref(), Some("South America"));
        assert_eq!(record.languages.as_ref().unwrap()["que"], json!("Quechua"));
        assert_eq!(record.timezones, Some(vec!["UTC-05:00".to_string()]));
    }

    #[test]
    fn missing_capital_is_none() {
        let mut raw = peru();
        raw.as_object_mut().unwrap().remove("capital");
        assert_eq!(CountryRecord::from_raw(&raw).capital, None);

        // Antarctica ships an empty capital list
        raw["capital"] = json!([]);
        assert_eq!(CountryRecord::from_raw(&raw).capital, None);
    }

    #[test]
    fn empty_object_uses_sentinels() {
        let record = CountryRecord::from_raw(&json!({}));
        assert_eq!(record.name, UNKNOWN_NAME);
        assert_eq!(record.population, None);
        assert_eq!(record.languages, None);
        assert_eq!(record.timezones, None);
    }

    #[test]
    fn mistyped_fields_degrade() {
        let record = CountryRecord::from_raw(&json!({
            "name": "Atlantis",
            "population": "lots",
            "languages": ["Atlantean"]
        }));
        assert_eq!(record.name, UNKNOWN_NAME);
        assert_eq!(record.population, None);
        assert_eq!(record.languages, None);
    }

    #[test]
    fn table_has_fixed_columns() {
        let records = normalize(&[peru(), json!({})]);
        let table = to_table(&records);

        assert_eq!(table.columns(), COLUMNS);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][0], json!("Peru"));
        assert_eq!(table.rows()[0][8], json!(["UTC-05:00"]));
        assert_eq!(table.rows()[1][0], json!("Unknown"));
        assert_eq!(table.rows()[1][1], Value::Null);
    }

    #[test]
    fn serializes_with_column_names() {
        let record = CountryRecord::from_raw(&peru());
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, COLUMNS);
    }
}
