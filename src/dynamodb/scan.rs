use tracing::debug;

use super::backend::TableBackend;
use super::types::{Item, Key, ScanPage};
use crate::errors::AwsSampleResult;

/// Paginated, restartable full-table scan.
///
/// Each call to [`ScanPager::next_page`] issues one scan request starting after the
/// previous page's last evaluated key. The current [`cursor`](ScanPager::cursor) can be
/// persisted and handed to [`ScanPager::resume`] to continue later.
pub struct ScanPager<'a, B: TableBackend + ?Sized> {
    backend: &'a B,
    table_name: String,
    cursor: Option<Key>,
    finished: bool,
    pages: usize,
}

impl<'a, B: TableBackend + ?Sized> ScanPager<'a, B> {
    pub fn new(backend: &'a B, table_name: impl Into<String>) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
            cursor: None,
            finished: false,
            pages: 0,
        }
    }

    /// Continues a scan after `start_key`.
    pub fn resume(backend: &'a B, table_name: impl Into<String>, start_key: Key) -> Self {
        Self {
            cursor: Some(start_key),
            ..Self::new(backend, table_name)
        }
    }

    /// The key to resume from, or `None` before the first page and after the last one.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Key> {
        self.cursor.as_ref()
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetches the next page, or `None` once the table is exhausted.
    pub async fn next_page(&mut self) -> AwsSampleResult<Option<ScanPage>> {
        if self.finished {
            return Ok(None);
        }

        let page = self
            .backend
            .scan_page(&self.table_name, self.cursor.clone())
            .await?;
        self.pages += 1;

        self.cursor.clone_from(&page.last_evaluated_key);
        self.finished = self.cursor.is_none();

        debug!(
            table = %self.table_name,
            page = self.pages,
            items = page.items.len(),
            more = !self.finished,
            "Scanned page"
        );
        Ok(Some(page))
    }

    /// Drains the remaining pages into one list.
    pub async fn collect_items(mut self) -> AwsSampleResult<Vec<Item>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page.items);
        }
        Ok(items)
    }
}
