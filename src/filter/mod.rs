use std::collections::BTreeSet;

use serde::Serialize;

use crate::store::{Attribute, Record};

/// Attributes searched by the free-text term unless configured otherwise.
pub const DEFAULT_SEARCH_FIELDS: [Attribute; 3] = [
    Attribute::Name,
    Attribute::ShortDescription,
    Attribute::CategoryFocus,
];

/// The user's current search term and category/country selections.
///
/// Empty fields are inactive; an all-empty query keeps every record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterQuery {
    pub term: String,
    pub categories: BTreeSet<String>,
    pub countries: BTreeSet<String>,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.term.trim().is_empty() && self.categories.is_empty() && self.countries.is_empty()
    }

    fn needle(&self) -> Option<String> {
        let term = self.term.trim();
        if term.is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        }
    }
}

/// Borrowed, order-preserving subsequence of the records it was built from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }
}

impl<'a> FromIterator<&'a Record> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterEngine {
    searchable: Vec<Attribute>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_FIELDS.to_vec())
    }
}

impl FilterEngine {
    pub fn new(searchable: Vec<Attribute>) -> Self {
        Self { searchable }
    }

    pub fn searchable(&self) -> &[Attribute] {
        &self.searchable
    }

    pub fn matches(&self, record: &Record, query: &FilterQuery) -> bool {
        self.matches_with(record, query, query.needle().as_deref())
    }

    pub fn apply<'a, I>(&self, records: I, query: &FilterQuery) -> FilteredView<'a>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let needle = query.needle();
        records
            .into_iter()
            .filter(|record| self.matches_with(record, query, needle.as_deref()))
            .collect()
    }

    fn matches_with(&self, record: &Record, query: &FilterQuery, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            let hit = self
                .searchable
                .iter()
                .any(|attr| record.display(*attr).to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }
        if !query.categories.is_empty()
            && !query.categories.contains(record.display(Attribute::Category))
        {
            return false;
        }
        if !query.countries.is_empty()
            && !query.countries.contains(record.display(Attribute::Country))
        {
            return false;
        }
        true
    }
}
