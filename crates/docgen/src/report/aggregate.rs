use super::document::{escape_html, DOCUMENT_STYLE};
use super::store::{DocumentError, DocumentStore};
use super::ManifestRow;
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const PAGE_BREAK: &str = "<div class=\"page-break\" style=\"page-break-before: always\"></div>";

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("unable to encode manifest: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to flush manifest: {0}")]
    Flush(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("document {} has no body to merge", .0.display())]
    MissingBody(PathBuf),
}

/// Writes the mailer manifest, one row per generated document in order.
pub fn write_manifest(
    store: &dyn DocumentStore,
    rows: &[ManifestRow],
    path: &Path,
) -> Result<(), AggregateError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(["Last Name", "First Name", "EMail", "Filename"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| AggregateError::Flush(err.to_string()))?;

    store.save(path, &bytes)?;
    Ok(())
}

pub fn read_manifest<R: Read>(reader: R) -> Result<Vec<ManifestRow>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

/// Concatenates the documents named by `rows` into one master document.
///
/// Every section after the first is preceded by a page break. Nothing is
/// saved unless every document was read.
pub fn write_composite(
    store: &dyn DocumentStore,
    rows: &[ManifestRow],
    title: &str,
    path: &Path,
) -> Result<(), AggregateError> {
    let html = compose(store, rows, title)?;
    store.save(path, html.as_bytes())?;
    Ok(())
}

pub(crate) fn compose(
    store: &dyn DocumentStore,
    rows: &[ManifestRow],
    title: &str,
) -> Result<String, AggregateError> {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>").map_err(DocumentError::from)?;
    writeln!(
        html,
        "<html>\n<head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\n<body>",
        escape_html(title),
        DOCUMENT_STYLE
    )
    .map_err(DocumentError::from)?;

    for (index, row) in rows.iter().enumerate() {
        let document = store.load(&row.document_path)?;
        let body = extract_body(&document)
            .ok_or_else(|| AggregateError::MissingBody(row.document_path.clone()))?;
        if index > 0 {
            html.push_str(PAGE_BREAK);
            html.push('\n');
        }
        html.push_str(body.trim_matches('\n'));
        html.push('\n');
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn extract_body(document: &str) -> Option<&str> {
    let start = document.find("<body>")? + "<body>".len();
    let end = document.rfind("</body>")?;
    document.get(start..end)
}
