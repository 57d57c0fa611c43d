//! Paginated request history.
//!
//! Each listing is fetched one page at a time; every page change goes back
//! to the backend. The total page count comes from the `total_count`
//! repeated on every row.

use likeboost_api::rpc::{GetAutoLikeHistoryPaginated, GetLikeHistoryPaginated, PageQuery, PagedRow};
use likeboost_common::error::ClientResult;

use crate::client::ApiClient;

/// Rows per page, fixed
pub const HISTORY_PAGE_SIZE: u32 = 20;

/// Above this many pages the page list collapses with ellipses
pub const FULL_WINDOW_PAGES: u32 = 7;

/// Entry of the page-number bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// `ceil(total_count / page_size)`, never below 1.
pub fn total_pages(total_count: i64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total_count.max(0).unsigned_abs().div_ceil(size);
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Page numbers to show for `current` of `total` pages.
///
/// Empty when there is a single page.
pub fn page_numbers(current: u32, total: u32) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total <= 1 {
        return Vec::new();
    }
    if total <= FULL_WINDOW_PAGES {
        return (1..=total).map(Page).collect();
    }
    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total)]
    } else if current >= total - 2 {
        vec![
            Page(1),
            Ellipsis,
            Page(total - 3),
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(total),
        ]
    }
}

/// One paginated listing.
#[derive(Debug)]
pub struct HistoryView<Q: PageQuery> {
    current_page: u32,
    total_pages: u32,
    rows: Vec<Q::Row>,
    loading: bool,
}

/// Manual like requests
pub type LikeHistoryView = HistoryView<GetLikeHistoryPaginated>;
/// Scheduled (auto-like) executions
pub type AutoLikeHistoryView = HistoryView<GetAutoLikeHistoryPaginated>;

impl<Q: PageQuery> Default for HistoryView<Q> {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            rows: Vec::new(),
            loading: false,
        }
    }
}

impl<Q: PageQuery + Sync> HistoryView<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn rows(&self) -> &[Q::Row] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn page_numbers(&self) -> Vec<PageItem> {
        page_numbers(self.current_page, self.total_pages)
    }

    /// Whether navigating to `page` would do anything.
    pub fn can_go_to(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages && page != self.current_page && !self.loading
    }

    /// Fetch the current page.
    ///
    /// On failure the error is logged, the view is left empty and the page
    /// count is kept.
    pub async fn load<C: ApiClient>(&mut self, client: &C) -> ClientResult<()> {
        self.loading = true;
        let result = client
            .send(&Q::page(self.current_page, HISTORY_PAGE_SIZE))
            .await
            .and_then(|resp| resp.into_output());
        self.loading = false;

        match result {
            Ok(output) => {
                let rows = Q::rows(output);
                self.total_pages = match rows.first() {
                    Some(first) => total_pages(first.total_count().unwrap_or(0), HISTORY_PAGE_SIZE),
                    None => 1,
                };
                self.rows = rows;
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = Q::PATH, page = self.current_page, error = %e, "Error fetching history");
                self.rows.clear();
                Err(e)
            }
        }
    }

    /// Jump to `page` and fetch it. Returns `Ok(false)` without a request
    /// when the move is out of range, to the current page, or mid-load.
    pub async fn go_to<C: ApiClient>(&mut self, client: &C, page: u32) -> ClientResult<bool> {
        if !self.can_go_to(page) {
            return Ok(false);
        }
        self.current_page = page;
        self.load(client).await?;
        Ok(true)
    }

    pub async fn next<C: ApiClient>(&mut self, client: &C) -> ClientResult<bool> {
        self.go_to(client, self.current_page.saturating_add(1)).await
    }

    pub async fn previous<C: ApiClient>(&mut self, client: &C) -> ClientResult<bool> {
        self.go_to(client, self.current_page.saturating_sub(1)).await
    }

    fn reset(&mut self) {
        self.current_page = 1;
    }
}

/// Tab of the combined history page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryKind {
    #[default]
    Manual,
    Automated,
}

/// Combined history page: manual and automated listings behind one tab bar.
#[derive(Debug, Default)]
pub struct HistoryTabs {
    active: HistoryKind,
    pub manual: LikeHistoryView,
    pub automated: AutoLikeHistoryView,
}

impl HistoryTabs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> HistoryKind {
        self.active
    }

    /// Switch tabs. The newly selected listing restarts at page 1.
    pub fn select(&mut self, kind: HistoryKind) -> bool {
        if self.active == kind {
            return false;
        }
        self.active = kind;
        match kind {
            HistoryKind::Manual => self.manual.reset(),
            HistoryKind::Automated => self.automated.reset(),
        }
        true
    }

    pub fn current_page(&self) -> u32 {
        match self.active {
            HistoryKind::Manual => self.manual.current_page(),
            HistoryKind::Automated => self.automated.current_page(),
        }
    }

    pub fn total_pages(&self) -> u32 {
        match self.active {
            HistoryKind::Manual => self.manual.total_pages(),
            HistoryKind::Automated => self.automated.total_pages(),
        }
    }

    /// Fetch the active listing's current page.
    pub async fn load<C: ApiClient>(&mut self, client: &C) -> ClientResult<()> {
        match self.active {
            HistoryKind::Manual => self.manual.load(client).await,
            HistoryKind::Automated => self.automated.load(client).await,
        }
    }

    pub async fn go_to<C: ApiClient>(&mut self, client: &C, page: u32) -> ClientResult<bool> {
        match self.active {
            HistoryKind::Manual => self.manual.go_to(client, page).await,
            HistoryKind::Automated => self.automated.go_to(client, page).await,
        }
    }
}
