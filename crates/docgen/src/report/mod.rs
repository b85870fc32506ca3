//! Per-official report documents, the master composite and the mailer
//! manifest.

pub mod aggregate;
pub mod document;
pub mod store;

pub use aggregate::{read_manifest, write_composite, write_manifest, AggregateError, PAGE_BREAK};
pub use document::{document_stem, render_document, slugify, DocumentBuilder};
pub use store::{DocumentError, DocumentStore, FsDocumentStore};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mailer manifest entry linking an official to their generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "EMail")]
    pub email: String,
    #[serde(rename = "Filename")]
    pub document_path: PathBuf,
}
