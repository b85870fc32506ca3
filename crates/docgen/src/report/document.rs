use super::store::{DocumentError, DocumentStore};
use super::ManifestRow;
use crate::pathway::RecommendationItem;
use crate::roster::{get_date, Clinic, OfficialRecord};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const DOCUMENT_EXTENSION: &str = "html";

pub(crate) const DOCUMENT_STYLE: &str = "body { font-family: Calibri, Arial, sans-serif; }\n\
table.clinics { border-collapse: collapse; }\n\
table.clinics th, table.clinics td { border: 1px solid #4bacc6; padding: 2px 8px; }\n\
table.clinics td.date { text-align: center; }\n\
.page-break { page-break-before: always; break-before: page; }";

/// Per-run writer of official reports.
///
/// Tracks the file names handed out so two officials whose names slug to the
/// same value do not overwrite each other.
#[derive(Debug)]
pub struct DocumentBuilder<'a> {
    store: &'a dyn DocumentStore,
    report_directory: PathBuf,
    title: String,
    issued: HashMap<String, usize>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(store: &'a dyn DocumentStore, report_directory: &Path, title: &str) -> Self {
        Self {
            store,
            report_directory: absolute(report_directory),
            title: title.to_string(),
            issued: HashMap::new(),
        }
    }

    /// Renders and saves one official's report, returning its manifest row.
    pub fn build(
        &mut self,
        official: &OfficialRecord,
        club_full_name: &str,
        report_date: &str,
        recommendations: &[RecommendationItem],
    ) -> Result<ManifestRow, DocumentError> {
        let html = render_document(
            &self.title,
            official,
            club_full_name,
            report_date,
            recommendations,
        )?;
        let path = self.next_path(official);
        self.store.save(&path, html.as_bytes())?;

        Ok(ManifestRow {
            last_name: official.last_name.clone(),
            first_name: official.first_name.clone(),
            email: official.email.clone(),
            document_path: path,
        })
    }

    fn next_path(&mut self, official: &OfficialRecord) -> PathBuf {
        let stem = document_stem(official);
        let count = self.issued.entry(stem.clone()).or_insert(0);
        *count += 1;
        let file_name = if *count == 1 {
            format!("{stem}.{DOCUMENT_EXTENSION}")
        } else {
            format!("{stem}-{count}.{DOCUMENT_EXTENSION}")
        };
        self.report_directory.join(file_name)
    }
}

pub fn document_stem(official: &OfficialRecord) -> String {
    let slug = slugify(&format!("{}_{}", official.last_name, official.first_name));
    if slug.is_empty() {
        "official".to_string()
    } else {
        slug
    }
}

/// Transliterates to ASCII, then keeps lowercase alphanumerics with every
/// other run collapsed to `-`.
pub fn slugify(value: &str) -> String {
    let ascii = deunicode::deunicode(value);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

pub fn render_document(
    title: &str,
    official: &OfficialRecord,
    club_full_name: &str,
    report_date: &str,
    recommendations: &[RecommendationItem],
) -> Result<String, std::fmt::Error> {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(
        html,
        "<head><meta charset=\"utf-8\"><title>{} - {}</title><style>{}</style></head>",
        escape_html(title),
        escape_html(&official.display_name()),
        DOCUMENT_STYLE
    )?;
    writeln!(html, "<body>")?;
    write_section(&mut html, title, official, club_full_name, report_date, recommendations)?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

fn write_section(
    html: &mut String,
    title: &str,
    official: &OfficialRecord,
    club_full_name: &str,
    report_date: &str,
    recommendations: &[RecommendationItem],
) -> std::fmt::Result {
    let level = official
        .certification
        .as_ref()
        .map(|level| level.label())
        .unwrap_or("NONE");

    writeln!(html, "<h1>{}</h1>", escape_html(title))?;
    writeln!(html, "<p>Report Date: {}</p>", escape_html(report_date))?;
    writeln!(
        html,
        "<p>Name: {} (SNC ID # {})</p>",
        escape_html(&official.display_name()),
        escape_html(&official.registration_id)
    )?;
    writeln!(
        html,
        "<p>Club: {} ({})</p>",
        escape_html(club_full_name),
        escape_html(&official.club_code)
    )?;
    writeln!(
        html,
        "<p>Current Certification Level: {}</p>",
        escape_html(level)
    )?;

    writeln!(html, "<table class=\"clinics\">")?;
    writeln!(
        html,
        "<thead><tr><th>Clinic</th><th>Clinic Date</th><th>Sign Off #1</th><th>Sign Off #2</th></tr></thead>"
    )?;
    writeln!(html, "<tbody>")?;
    for clinic in Clinic::ordered() {
        let status = official.clinic(clinic);
        let (signoff_1, signoff_2) = if clinic.has_signoffs() {
            (get_date(status.signoff_1), get_date(status.signoff_2))
        } else {
            ("N/A".to_string(), "N/A".to_string())
        };
        writeln!(
            html,
            "<tr><td>{}</td><td class=\"date\">{}</td><td class=\"date\">{}</td><td class=\"date\">{}</td></tr>",
            escape_html(clinic.label()),
            get_date(status.clinic_date),
            signoff_1,
            signoff_2
        )?;
    }
    writeln!(html, "</tbody>")?;
    writeln!(html, "</table>")?;

    writeln!(html, "<h2>Recommended Actions</h2>")?;
    writeln!(html, "<ul>")?;
    for item in recommendations {
        writeln!(html, "<li>{}</li>", escape_html(item.text()))?;
    }
    writeln!(html, "</ul>")
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
