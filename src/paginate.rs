use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PaginateError {
    #[error("page {page} is out of range, expected 1..={total_pages}")]
    OutOfRange { page: usize, total_pages: usize },

    #[error("invalid page size {page_size}, expected a positive integer")]
    InvalidConfiguration { page_size: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Result<Self, PaginateError> {
        if page_size == 0 {
            return Err(PaginateError::InvalidConfiguration { page_size });
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Never less than 1, so an empty view still has a valid page.
    pub fn total_pages(&self, total_items: usize) -> usize {
        let full = total_items / self.page_size;
        let partial = usize::from(total_items % self.page_size != 0);
        (full + partial).max(1)
    }

    pub fn clamp(&self, page_number: usize, total_items: usize) -> usize {
        page_number.clamp(1, self.total_pages(total_items))
    }

    pub fn paginate<'a, T>(
        &self,
        items: &'a [T],
        page_number: usize,
    ) -> Result<Page<'a, T>, PaginateError> {
        let total_pages = self.total_pages(items.len());
        if page_number < 1 || page_number > total_pages {
            return Err(PaginateError::OutOfRange {
                page: page_number,
                total_pages,
            });
        }
        let start = (page_number - 1) * self.page_size;
        let end = items.len().min(start.saturating_add(self.page_size));
        Ok(Page {
            items: &items[start..end],
            offset: start,
            page_number,
            page_size: self.page_size,
            total_items: items.len(),
            total_pages,
        })
    }

    /// Like [`Paginator::paginate`], but an out-of-range page falls back to
    /// page 1 and the error is handed back for the caller to report.
    pub fn paginate_or_first<'a, T>(
        &self,
        items: &'a [T],
        page_number: usize,
    ) -> (Page<'a, T>, Option<PaginateError>) {
        match self.paginate(items, page_number) {
            Ok(page) => (page, None),
            Err(err) => {
                let end = items.len().min(self.page_size);
                let page = Page {
                    items: &items[..end],
                    offset: 0,
                    page_number: 1,
                    page_size: self.page_size,
                    total_items: items.len(),
                    total_pages: self.total_pages(items.len()),
                };
                (page, Some(err))
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    items: &'a [T],
    offset: usize,
    page_number: usize,
    page_size: usize,
    total_items: usize,
    total_pages: usize,
}

impl<'a, T> Clone for Page<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Page<'a, T> {}

impl<'a, T> Page<'a, T> {
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based inclusive bounds of the items on this page, `None` when empty.
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            None
        } else {
            Some((self.offset + 1, self.offset + self.items.len()))
        }
    }

    pub fn range_label(&self) -> String {
        match self.display_range() {
            Some((first, last)) => format!("Showing {first}-{last} of {}", self.total_items),
            None => "Showing 0-0".to_string(),
        }
    }
}
