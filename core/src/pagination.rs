//! Offset-cursor pagination over list endpoints.
//!
//! # Design
//! List endpoints return one page plus an optional `next_page` cursor. The
//! `Pager` drives a page-fetch closure from the first page until a page comes
//! back without a cursor, threading each cursor's offset into the next call.
//!
//! Pages are fetched strictly one after another: the offset of page N+1 is
//! only known once page N has arrived. Every walk starts from the first page;
//! no cursor survives between walks.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page size used when walking a whole collection.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Cursor returned by the API when more results are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPage {
    pub offset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Parameters for fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    /// `None` for the first page.
    pub offset: Option<String>,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            offset: None,
        }
    }
}

/// One page of results and the cursor for the next one, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<NextPage>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page: Option<NextPage>) -> Self {
        Self { items, next_page }
    }

    /// A page with no cursor.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Walks a paginated collection through a page-fetch closure.
#[derive(Debug, Clone)]
pub struct Pager<F> {
    fetch: F,
    page_size: u32,
}

impl<F> Pager<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Lazily fetch pages from the start of the collection.
    ///
    /// The iterator stops after the page with no cursor, or right after the
    /// first error.
    pub fn pages<T, E>(&mut self) -> Pages<'_, F, T, E>
    where
        F: FnMut(&PageRequest) -> Result<Page<T>, E>,
    {
        Pages {
            fetch: &mut self.fetch,
            next: Some(PageRequest::first(self.page_size)),
            fetched: 0,
            _marker: PhantomData,
        }
    }

    /// Fetch every page and concatenate the items in page order.
    ///
    /// The first error is returned as-is and items from earlier pages are
    /// dropped.
    pub fn fetch_all<T, E>(&mut self) -> Result<Vec<T>, E>
    where
        F: FnMut(&PageRequest) -> Result<Page<T>, E>,
    {
        self.pages().try_fold(Vec::new(), |mut all, page| {
            all.extend(page?);
            Ok(all)
        })
    }
}

/// Iterator returned by [`Pager::pages`].
pub struct Pages<'a, F, T, E> {
    fetch: &'a mut F,
    next: Option<PageRequest>,
    fetched: usize,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> Iterator for Pages<'_, F, T, E>
where
    F: FnMut(&PageRequest) -> Result<Page<T>, E>,
{
    type Item = Result<Vec<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let request = self.next.take()?;
        match (self.fetch)(&request) {
            Ok(page) => {
                self.fetched += 1;
                debug!(
                    page = self.fetched,
                    items = page.items.len(),
                    has_more = page.next_page.is_some(),
                    "fetched page"
                );
                self.next = page.next_page.map(|cursor| PageRequest {
                    limit: request.limit,
                    offset: Some(cursor.offset),
                });
                Some(Ok(page.items))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl<F, T, E> std::iter::FusedIterator for Pages<'_, F, T, E> where
    F: FnMut(&PageRequest) -> Result<Page<T>, E>
{
}
