//! HTML table extraction.
//!
//! Reads the first `tr` under a container element as the header row (`th`
//! cells) and every following `tr` as one record (`td` cells).

use std::sync::LazyLock;

use datafetch_shared::Table;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));

static HEADER_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("th selector"));

static DATA_CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("td selector"));

/// Extract the table found inside `container` from an HTML document.
///
/// Returns `None` (after logging why) when the container, its rows, or its
/// header cells are missing. Data rows are aligned to the header:
/// - rows without any `td` are skipped
/// - short rows are padded with `null`
/// - rows with more cells than headers are rejected
pub fn extract_table(html: &str, container: &Selector) -> Option<Table> {
    let doc = Html::parse_document(html);

    let Some(root) = doc.select(container).next() else {
        warn!("container not found");
        return None;
    };

    let rows: Vec<ElementRef<'_>> = root.select(&ROW_SEL).collect();
    let Some((header_row, data_rows)) = rows.split_first() else {
        warn!("no table rows found");
        return None;
    };

    let headers: Vec<String> = header_row.select(&HEADER_CELL_SEL).map(cell_text).collect();
    if headers.is_empty() {
        warn!("first table row has no header cells");
        return None;
    }

    let width = headers.len();
    let mut table = Table::new(headers);
    let mut padded = 0usize;
    let mut rejected = 0usize;

    for (offset, row) in data_rows.iter().enumerate() {
        let row_number = offset + 1;
        let mut cells: Vec<Value> = row
            .select(&DATA_CELL_SEL)
            .map(|td| Value::String(cell_text(td)))
            .collect();

        if cells.is_empty() {
            debug!(row = row_number, "skipping row without data cells");
            continue;
        }

        if cells.len() > width {
            warn!(
                row = row_number,
                cells = cells.len(),
                expected = width,
                "rejecting row with more cells than headers"
            );
            rejected += 1;
            continue;
        }

        if cells.len() < width {
            warn!(
                row = row_number,
                cells = cells.len(),
                expected = width,
                "padding short row"
            );
            cells.resize(width, Value::Null);
            padded += 1;
        }

        if let Err(e) = table.push_row(cells) {
            warn!(row = row_number, error = %e, "dropping row");
            rejected += 1;
        }
    }

    debug!(rows = table.len(), padded, rejected, "table extracted");
    Some(table)
}

/// Text of a cell: every text node trimmed, then concatenated.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container() -> Selector {
        Selector::parse("div.a-section.imdb-scroll-table-inner").unwrap()
    }

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn extracts_headers_and_rows() {
        let html = load_fixture("boxoffice-2019.html");
        let table = extract_table(&html, &container()).expect("table");

        assert_eq!(
            table.columns(),
            ["Rank", "Release Group", "Worldwide", "Domestic", "Foreign"]
        );
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0][1], json!("Avengers: Endgame"));
        assert_eq!(table.rows()[2][2], json!("$1,450,026,933"));
    }

    #[test]
    fn missing_container_yields_none() {
        let html = load_fixture("no-container.html");
        assert!(extract_table(&html, &container()).is_none());
    }

    #[test]
    fn container_without_rows_yields_none() {
        let html = r#"<div class="a-section imdb-scroll-table-inner"><p>Loading…</p></div>"#;
        assert!(extract_table(html, &container()).is_none());
    }

    #[test]
    fn header_row_without_th_yields_none() {
        let html = r#"<div class="a-section imdb-scroll-table-inner">
            <table><tr><td>1</td></tr><tr><td>2</td></tr></table></div>"#;
        assert!(extract_table(html, &container()).is_none());
    }

    #[test]
    fn ragged_rows_are_aligned() {
        let html = load_fixture("boxoffice-ragged.html");
        let table = extract_table(&html, &container()).expect("table");

        // empty row skipped, four-cell row rejected
        assert_eq!(table.len(), 3);
        assert!(table.rows().iter().all(|r| r.len() == 3));

        let short = &table.rows()[1];
        assert_eq!(short[1], json!("Close Encounters of the Third Kind"));
        assert_eq!(short[2], Value::Null);

        assert_eq!(table.rows()[2][1], json!("Saturday Night Fever"));
    }

    #[test]
    fn cell_text_joins_trimmed_fragments() {
        let html = r#"<div class="a-section imdb-scroll-table-inner"><table>
            <tr><th> Title </th></tr>
            <tr><td> <b>Star</b> <i>Wars</i> </td></tr></table></div>"#;
        let table = extract_table(html, &container()).expect("table");
        assert_eq!(table.columns(), ["Title"]);
        assert_eq!(table.rows()[0][0], json!("StarWars"));
    }
}
