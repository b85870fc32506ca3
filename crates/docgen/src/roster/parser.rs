use super::RosterError;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Cells of an export exactly as read, before any header interpretation.
#[derive(Debug, Default)]
pub(crate) struct RawTable {
    pub(crate) rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub(crate) fn sniff(content: &str) -> Self {
        let leading = content.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
        if leading.starts_with('<') {
            Self::Html
        } else {
            Self::Csv
        }
    }
}

pub(crate) fn parse_table(content: &str) -> Result<RawTable, RosterError> {
    match ExportFormat::sniff(content) {
        ExportFormat::Csv => parse_csv(content),
        ExportFormat::Html => parse_html(content),
    }
}

fn parse_csv(content: &str) -> Result<RawTable, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut table = RawTable::default();
    for record in csv_reader.records() {
        let record = record?;
        table
            .rows
            .push(record.iter().map(|cell| cell.to_string()).collect());
    }

    debug!(rows = table.rows.len(), "parsed csv roster export");
    Ok(table)
}

/// Reads the first `<table>` of an HTML export, one row per `<tr>`.
fn parse_html(content: &str) -> Result<RawTable, RosterError> {
    let document = Html::parse_document(content);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;

    let Some(table_element) = document.select(&table_selector).next() else {
        return Ok(RawTable::default());
    };

    let mut table = RawTable::default();
    for row in table_element.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        table.rows.push(cells);
    }

    debug!(rows = table.rows.len(), "parsed html roster export");
    Ok(table)
}

fn selector(pattern: &str) -> Result<Selector, RosterError> {
    Selector::parse(pattern).map_err(|err| RosterError::Html(err.to_string()))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let text = cell.text().collect::<String>();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
