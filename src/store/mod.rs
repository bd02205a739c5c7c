//! Loading the charity directory from a delimited file.
//!
//! Source headers are normalized through an explicit alias table onto the
//! nine canonical [`Attribute`]s. Missing or empty values are stored as
//! `None` and only rendered as [`SENTINEL`] at display time.

pub mod cache;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use cache::{DatasetCache, SourceIdentity};

/// Placeholder shown for an absent attribute.
pub const SENTINEL: &str = "N/A";

/// Cell values treated as missing when [`LoadOptions::na_tokens`] is set.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Name,
    Category,
    Country,
    ShortDescription,
    CategoryFocus,
    Website,
    ContactName,
    Phone,
    Email,
}

/// Normalized header spelling -> canonical attribute.
const COLUMN_ALIASES: &[(&str, Attribute)] = &[
    ("organisation name", Attribute::Name),
    ("organization name", Attribute::Name),
    ("charity name", Attribute::Name),
    ("name", Attribute::Name),
    ("short description", Attribute::ShortDescription),
    ("description", Attribute::ShortDescription),
    ("category", Attribute::Category),
    ("category focus", Attribute::CategoryFocus),
    ("focus", Attribute::CategoryFocus),
    ("country", Attribute::Country),
    ("website url", Attribute::Website),
    ("website", Attribute::Website),
    ("url", Attribute::Website),
    ("contact name", Attribute::ContactName),
    ("contact", Attribute::ContactName),
    ("phone", Attribute::Phone),
    ("phone number", Attribute::Phone),
    ("telephone", Attribute::Phone),
    ("email", Attribute::Email),
    ("email address", Attribute::Email),
    ("e mail", Attribute::Email),
];

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Name,
        Attribute::Category,
        Attribute::Country,
        Attribute::ShortDescription,
        Attribute::CategoryFocus,
        Attribute::Website,
        Attribute::ContactName,
        Attribute::Phone,
        Attribute::Email,
    ];

    /// Canonical column header, also used for CSV export.
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Name => "Organisation Name",
            Attribute::Category => "Category",
            Attribute::Country => "Country",
            Attribute::ShortDescription => "Short Description",
            Attribute::CategoryFocus => "Category/Focus",
            Attribute::Website => "Website URL",
            Attribute::ContactName => "Contact Name",
            Attribute::Phone => "Phone",
            Attribute::Email => "Email",
        }
    }

    /// Snake-case key used in JSON documents.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::Name => "organisation_name",
            Attribute::Category => "category",
            Attribute::Country => "country",
            Attribute::ShortDescription => "short_description",
            Attribute::CategoryFocus => "category_focus",
            Attribute::Website => "website_url",
            Attribute::ContactName => "contact_name",
            Attribute::Phone => "phone",
            Attribute::Email => "email",
        }
    }

    /// Resolves a raw source header through the alias table.
    pub fn from_header(raw: &str) -> Option<Self> {
        let normalized = normalize_header(raw);
        COLUMN_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, attr)| *attr)
    }

    /// Accepts either a header spelling or a JSON key.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.key().eq_ignore_ascii_case(trimmed))
            .or_else(|| Attribute::from_header(trimmed))
    }
}

fn header_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_/\-.]+").expect("header separator pattern is valid"))
}

pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim_start_matches('\u{feff}').trim().to_lowercase();
    header_separators()
        .replace_all(&lowered, " ")
        .trim()
        .to_string()
}

/// True when `website` should be rendered as a hyperlink.
pub fn is_link(website: &str) -> bool {
    website
        .get(..4)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("http"))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub name: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub short_description: Option<String>,
    pub category_focus: Option<String>,
    pub website: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Record {
    pub fn get(&self, attr: Attribute) -> Option<&str> {
        match attr {
            Attribute::Name => self.name.as_deref(),
            Attribute::Category => self.category.as_deref(),
            Attribute::Country => self.country.as_deref(),
            Attribute::ShortDescription => self.short_description.as_deref(),
            Attribute::CategoryFocus => self.category_focus.as_deref(),
            Attribute::Website => self.website.as_deref(),
            Attribute::ContactName => self.contact_name.as_deref(),
            Attribute::Phone => self.phone.as_deref(),
            Attribute::Email => self.email.as_deref(),
        }
    }

    /// The attribute value, or [`SENTINEL`] when absent.
    pub fn display(&self, attr: Attribute) -> &str {
        self.get(attr).unwrap_or(SENTINEL)
    }

    pub fn set(&mut self, attr: Attribute, value: Option<String>) {
        *self.slot_mut(attr) = value;
    }

    fn slot_mut(&mut self, attr: Attribute) -> &mut Option<String> {
        match attr {
            Attribute::Name => &mut self.name,
            Attribute::Category => &mut self.category,
            Attribute::Country => &mut self.country,
            Attribute::ShortDescription => &mut self.short_description,
            Attribute::CategoryFocus => &mut self.category_focus,
            Attribute::Website => &mut self.website,
            Attribute::ContactName => &mut self.contact_name,
            Attribute::Phone => &mut self.phone,
            Attribute::Email => &mut self.email,
        }
    }

    /// The website, only when it qualifies as a hyperlink.
    pub fn website_link(&self) -> Option<&str> {
        self.website.as_deref().filter(|w| is_link(w))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Attribute::ALL.len()))?;
        for attr in Attribute::ALL {
            map.serialize_entry(attr.key(), self.display(attr))?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    source: Option<PathBuf>,
    columns: Vec<Attribute>,
    records: Vec<Record>,
}

impl Dataset {
    /// An in-memory dataset with every canonical column.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            source: None,
            columns: Attribute::ALL.to_vec(),
            records,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Canonical attributes that were present as source columns, in source order.
    pub fn columns(&self) -> &[Attribute] {
        &self.columns
    }

    pub fn has_column(&self, attr: Attribute) -> bool {
        self.columns.contains(&attr)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted unique display values of `attr`, sentinel included.
    pub fn distinct(&self, attr: Attribute) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.display(attr))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub na_tokens: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_tokens: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {path}")]
    NotFound { path: String },

    #[error("failed to parse {path} (line {line}): {reason}")]
    Parse {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.display().to_string();
        match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound { path },
            _ => LoadError::Io { path, source },
        }
    }
}

pub fn load(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    let label = path.display().to_string();
    let mut dataset = load_from_reader(BufReader::new(file), &label, options)?;
    dataset.source = Some(path.to_path_buf());
    info!(
        path = %label,
        records = dataset.len(),
        columns = dataset.columns.len(),
        "loaded charity directory"
    );
    Ok(dataset)
}

/// Parses delimited text from any reader. `label` names the source in errors.
pub fn load_from_reader<R: Read>(
    reader: R,
    label: &str,
    options: &LoadOptions,
) -> Result<Dataset, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| map_csv_error(label, e))?
        .clone();
    if headers.iter().all(|h| h.trim_start_matches('\u{feff}').trim().is_empty()) {
        return Err(LoadError::Parse {
            path: label.to_string(),
            line: 1,
            reason: "missing header row".to_string(),
        });
    }

    let mut columns: Vec<Attribute> = Vec::new();
    let mut mapping: Vec<Option<Attribute>> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        match Attribute::from_header(header) {
            Some(attr) if columns.contains(&attr) => {
                warn!(column = header, attribute = attr.label(), "duplicate column ignored");
                mapping.push(None);
            }
            Some(attr) => {
                columns.push(attr);
                mapping.push(Some(attr));
            }
            None => {
                debug!(column = header, "dropping unrecognised column");
                mapping.push(None);
            }
        }
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| map_csv_error(label, e))?;
        let mut record = Record::default();
        for (field, attr) in row.iter().zip(mapping.iter()) {
            if let Some(attr) = attr {
                record.set(*attr, normalize_value(field, options));
            }
        }
        records.push(record);
    }

    Ok(Dataset {
        source: None,
        columns,
        records,
    })
}

fn normalize_value(field: &str, options: &LoadOptions) -> Option<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() || (options.na_tokens && NA_TOKENS.contains(&trimmed)) {
        return None;
    }
    Some(trimmed.to_string())
}

fn map_csv_error(label: &str, err: csv::Error) -> LoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let path = label.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Io { path, source },
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => LoadError::Parse {
            path,
            line,
            reason: format!("inconsistent row width: expected {expected_len} fields, found {len}"),
        },
        csv::ErrorKind::Utf8 { err, .. } => LoadError::Parse {
            path,
            line,
            reason: format!("invalid UTF-8 in field {}: {err}", err.field() + 1),
        },
        other => LoadError::Parse {
            path,
            line,
            reason: format!("{other:?}"),
        },
    }
}
