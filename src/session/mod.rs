//! Per-user browsing state over a shared, read-only dataset.
//!
//! A `Session` owns its query, page cursor and view mode. Any change to the
//! query puts the cursor back on page 1; explicit page moves are clamped to
//! the pages the current view actually has.

pub mod commands;

use std::sync::Arc;

use tracing::warn;

pub use commands::{CommandError, SessionCommand, HELP};

use crate::filter::{FilterEngine, FilterQuery, FilteredView};
use crate::output::terminal;
use crate::output::{Listing, ViewMode};
use crate::paginate::{PaginateError, Paginator};
use crate::store::{Attribute, Dataset};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facet {
    Categories,
    Countries,
}

impl Facet {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "categories" | "category" => Some(Self::Categories),
            "countries" | "country" => Some(Self::Countries),
            _ => None,
        }
    }

    pub fn attribute(self) -> Attribute {
        match self {
            Self::Categories => Attribute::Category,
            Self::Countries => Attribute::Country,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Categories => "Categories",
            Self::Countries => "Countries",
        }
    }
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Render,
    Text(String),
    Reload,
    Quit,
}

#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<Dataset>,
    engine: FilterEngine,
    paginator: Paginator,
    query: FilterQuery,
    page: usize,
    view: ViewMode,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, engine: FilterEngine, paginator: Paginator) -> Self {
        Self {
            dataset,
            engine,
            paginator,
            query: FilterQuery::default(),
            page: 1,
            view: ViewMode::default(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: FilterQuery) -> Self {
        self.set_query(query);
        self
    }

    #[must_use]
    pub fn with_view(mut self, view: ViewMode) -> Self {
        self.view = view;
        self
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn page_number(&self) -> usize {
        self.page
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn set_query(&mut self, query: FilterQuery) {
        self.query = query;
        self.page = 1;
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        let query = FilterQuery {
            term: term.into(),
            ..self.query.clone()
        };
        self.set_query(query);
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        let query = self.query.clone().with_categories(categories);
        self.set_query(query);
    }

    pub fn set_countries(&mut self, countries: Vec<String>) {
        let query = self.query.clone().with_countries(countries);
        self.set_query(query);
    }

    pub fn clear_filters(&mut self) {
        self.set_query(FilterQuery::default());
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn filtered(&self) -> FilteredView<'_> {
        self.engine.apply(self.dataset.iter(), &self.query)
    }

    /// Moves to `requested`, clamped to the current view; returns the page landed on.
    pub fn set_page(&mut self, requested: usize) -> usize {
        let total = self.filtered().len();
        self.page = self.paginator.clamp(requested, total);
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Swaps in a reloaded dataset, keeping the query and re-clamping the cursor.
    pub fn replace_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = dataset;
        let page = self.page;
        self.set_page(page);
    }

    pub fn facet_values(&self, facet: Facet) -> Vec<String> {
        self.dataset.distinct(facet.attribute())
    }

    pub fn execute(&mut self, command: SessionCommand) -> Reply {
        match command {
            SessionCommand::Search(term) => self.set_term(term),
            SessionCommand::ClearSearch => self.set_term(String::new()),
            SessionCommand::Category(values) => self.set_categories(values),
            SessionCommand::Country(values) => self.set_countries(values),
            SessionCommand::Clear => self.clear_filters(),
            SessionCommand::Page(n) => {
                self.set_page(n);
            }
            SessionCommand::Next => {
                self.next_page();
            }
            SessionCommand::Prev => {
                self.prev_page();
            }
            SessionCommand::View(mode) => self.set_view(mode),
            SessionCommand::List(facet) => {
                return Reply::Text(terminal::render_facets(
                    facet.title(),
                    &self.facet_values(facet),
                ))
            }
            SessionCommand::Show => {}
            SessionCommand::Reload => return Reply::Reload,
            SessionCommand::Help => return Reply::Text(HELP.to_string()),
            SessionCommand::Quit => return Reply::Quit,
        }
        Reply::Render
    }

    /// Runs `f` over the current page. A cursor the paginator rejects falls
    /// back to page 1 with a warning.
    pub fn with_listing<R>(
        &self,
        f: impl FnOnce(&Listing<'_>, Option<PaginateError>) -> R,
    ) -> R {
        let view = self.filtered();
        let (page, err) = self.paginator.paginate_or_first(view.as_slice(), self.page);
        if let Some(err) = err.as_ref() {
            warn!(%err, "showing page 1 instead");
        }
        let listing = Listing {
            query: &self.query,
            view: &view,
            page,
            mode: self.view,
            search_fields: self.engine.searchable(),
        };
        f(&listing, err)
    }

    /// The current page as terminal text.
    pub fn render(&self, max_width: usize) -> String {
        self.with_listing(|listing, err| {
            let mut out = String::new();
            if let Some(err) = err {
                out.push_str(&format!("{err}; showing page 1\n"));
            }
            out.push_str(&terminal::render_listing(listing, max_width));
            out
        })
    }
}
