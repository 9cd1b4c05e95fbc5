//! Page-request and paged-result envelope shared by the backend handlers and
//! the client list synchronizer.
//!
//! Pages are 1-based. The envelope mirrors what list endpoints return:
//! the requested window of items plus enough bookkeeping (`currentPage`,
//! `totalPages`, `totalCount`) for a caller to drive incremental loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when a caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Validated request for one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

/// Validation errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers are 1-based; zero is never a valid page.
    #[error("page number must be at least 1")]
    ZeroPageNumber,
    /// A zero page size would make every total-page computation divide by zero.
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

impl PageRequest {
    /// Construct a page request, rejecting zero page numbers or sizes.
    ///
    /// # Examples
    /// ```
    /// use paging::PageRequest;
    ///
    /// let page = PageRequest::new(1, 10).expect("valid page");
    /// assert_eq!(page.page_number(), 1);
    /// ```
    pub fn new(page_number: u32, page_size: u32) -> Result<Self, PageRequestError> {
        if page_number == 0 {
            return Err(PageRequestError::ZeroPageNumber);
        }
        if page_size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    /// First page with the default page size.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Request for the page following this one, keeping the page size.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            page_number: self.page_number + 1,
            page_size: self.page_size,
        }
    }

    /// Zero-based item offset of the first item on this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page_number as u64 - 1) * self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Number of pages needed to hold `total_count` items at `page_size` per page.
///
/// Returns zero when the collection is empty. `page_size` must be non-zero;
/// [`PageRequest`] guarantees that for requests it produced.
#[must_use]
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX)
}

/// One page of results plus the paging bookkeeping callers need to fetch more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PagedResult<T> {
    /// Items on the requested page, in collection order.
    pub items: Vec<T>,
    /// The 1-based page these items came from.
    pub current_page: u32,
    /// Total page count at the time of the query.
    pub total_pages: u32,
    /// Total item count at the time of the query.
    pub total_count: u64,
}

impl<T> PagedResult<T> {
    /// Assemble a page envelope, computing `total_pages` from the count.
    #[must_use]
    pub fn new(items: Vec<T>, page: PageRequest, total_count: u64) -> Self {
        Self {
            items,
            current_page: page.page_number(),
            total_pages: total_pages(total_count, page.page_size()),
            total_count,
        }
    }

    /// Whether pages beyond `current_page` exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Map the item type while keeping the paging bookkeeping.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_count: self.total_count,
        }
    }
}
