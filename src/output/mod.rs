pub mod report;
pub mod terminal;

use serde::Serialize;
use thiserror::Error;

use crate::filter::{FilterQuery, FilteredView};
use crate::paginate::Page;
use crate::store::{Attribute, Record};

/// Column order of the table view.
pub const TABLE_COLUMNS: [Attribute; 7] = [
    Attribute::Name,
    Attribute::Category,
    Attribute::Country,
    Attribute::ShortDescription,
    Attribute::Website,
    Attribute::Email,
    Attribute::Phone,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "table" | "tabular" => Some(Self::Table),
            "cards" | "card" | "grid" => Some(Self::Cards),
            _ => None,
        }
    }

}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".csv") {
        return Some(OutputFormat::Csv);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to encode JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("failed to encode CSV: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("failed to flush CSV buffer: {source}")]
    Flush {
        #[source]
        source: std::io::Error,
    },
}

/// Everything a file renderer may need about the current listing.
#[derive(Clone, Copy, Debug)]
pub struct Listing<'a> {
    pub query: &'a FilterQuery,
    pub view: &'a FilteredView<'a>,
    pub page: Page<'a, &'a Record>,
    pub mode: ViewMode,
    /// Attributes the search term was matched against.
    pub search_fields: &'a [Attribute],
}

#[derive(Serialize)]
struct ListingDocument<'a> {
    query: &'a FilterQuery,
    total_items: usize,
    page: usize,
    page_size: usize,
    total_pages: usize,
    records: &'a [&'a Record],
}

pub fn render(
    format: OutputFormat,
    listing: &Listing<'_>,
    all: &[Record],
) -> Result<Vec<u8>, OutputError> {
    match format {
        OutputFormat::Text => Ok(render_text(listing.view.as_slice())),
        OutputFormat::Json => render_json(listing),
        OutputFormat::Csv => render_csv(listing.view.as_slice()),
        OutputFormat::Html => render_html(all, listing),
    }
}

/// One organisation name per line.
pub fn render_text(records: &[&Record]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(r.display(Attribute::Name));
        out.push('\n');
    }
    out.into_bytes()
}

/// The whole filtered view plus the pagination state it was browsed with.
pub fn render_json(listing: &Listing<'_>) -> Result<Vec<u8>, OutputError> {
    let doc = ListingDocument {
        query: listing.query,
        total_items: listing.view.len(),
        page: listing.page.page_number(),
        page_size: listing.page.page_size(),
        total_pages: listing.page.total_pages(),
        records: listing.view.as_slice(),
    };
    let mut out = serde_json::to_vec_pretty(&doc)?;
    out.push(b'\n');
    Ok(out)
}

pub fn render_csv(records: &[&Record]) -> Result<Vec<u8>, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(Attribute::ALL.iter().map(|attr| attr.label()))?;
    for r in records {
        writer.write_record(Attribute::ALL.iter().map(|attr| r.display(*attr)))?;
    }
    writer.into_inner().map_err(|e| OutputError::Flush {
        source: e.into_error(),
    })
}

pub fn render_html(all: &[Record], listing: &Listing<'_>) -> Result<Vec<u8>, OutputError> {
    report::render_html(all, listing)
}
