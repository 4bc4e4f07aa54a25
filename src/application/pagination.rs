//! Offset pagination requests.
//!
//! Pages are addressed by a 1-based index and a size. The store is asked for
//! `limit` rows after skipping `(page - 1) * limit`, which costs O(offset) on
//! deep pages; a keyset cursor over `id` is the way out if that ever matters.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be at least 1, got {0}")]
    InvalidPage(i64),
    #[error("page {page} is beyond the last addressable page {max}")]
    PageTooLarge { page: i64, max: u32 },
    #[error("limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: i64, max: u32 },
    #[error("page {page} with limit {limit} overflows the row offset")]
    OffsetOverflow { page: i64, limit: i64 },
}

/// A validated `(page, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
    offset: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64, max_limit: u32) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPage(page));
        }
        let page_u32 = u32::try_from(page).map_err(|_| PaginationError::PageTooLarge {
            page,
            max: u32::MAX,
        })?;

        let limit_u32 = u32::try_from(limit)
            .ok()
            .filter(|value| (1..=max_limit).contains(value))
            .ok_or(PaginationError::InvalidLimit {
                limit,
                max: max_limit,
            })?;

        let offset = i64::from(page_u32 - 1)
            .checked_mul(i64::from(limit_u32))
            .ok_or(PaginationError::OffsetOverflow { page, limit })?;

        Ok(Self {
            page: page_u32,
            limit: limit_u32,
            offset,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page starts.
    pub fn offset(&self) -> i64 {
        self.offset
    }
}
