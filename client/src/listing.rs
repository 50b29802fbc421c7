//! Paginated recording listing.

use dashcam_common::protocol::{FileListResponse, FolderListing, FILE_LIST_ENDPOINT};
use dashcam_common::Category;
use tracing::debug;

use crate::error::Result;
use crate::transport::Query;
use crate::Dashcam;

/// Which page of which category to list.
///
/// Pages are 1-indexed.  Neither `page` nor `page_size` is validated;
/// non-positive values produce whatever window the device makes of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Category,
    pub page: i64,
    pub page_size: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            category: Category::Looping,
            page: 1,
            page_size: 100,
        }
    }
}

impl ListQuery {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn window(&self) -> Window {
        Window::for_page(self.page, self.page_size)
    }
}

/// Index range sent to the device.  Both ends are inclusive, which is the
/// device's convention: page 1 of 100 is `0..=99`.
///
/// Page and page size are not validated.  Out-of-range input wraps instead
/// of panicking, and the device decides what such a window means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    pub fn for_page(page: i64, page_size: i64) -> Self {
        let start = page.wrapping_sub(1).wrapping_mul(page_size);
        Self {
            start,
            end: start.wrapping_add(page_size).wrapping_sub(1),
        }
    }
}

impl Dashcam {
    /// List one page of recordings, newest first.
    ///
    /// Returns `None` when the device sends no folder block, which is what
    /// it does for an empty folder or a page past the end.  A `Some` listing
    /// with no videos is possible too; both mean there is nothing here.
    pub async fn list(&self, query: ListQuery) -> Result<Option<FolderListing>> {
        let window = query.window();
        let start = window.start.to_string();
        let end = window.end.to_string();

        let resp: FileListResponse = self
            .transport
            .get_json(
                FILE_LIST_ENDPOINT,
                Query::Pairs(&[
                    ("folder", query.category.device_code()),
                    ("start", start.as_str()),
                    ("end", end.as_str()),
                ]),
            )
            .await?;

        let listing = resp.info.into_iter().next();
        debug!(
            "Listed {} [{}..={}]: {}",
            query.category,
            window.start,
            window.end,
            listing
                .as_ref()
                .map(|l| format!("{} of {}", l.videos.len(), l.total_count))
                .unwrap_or_else(|| "no block".into())
        );
        Ok(listing)
    }
}
