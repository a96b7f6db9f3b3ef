//! Keyset-paged cursors over the listing pool.

use crate::cursor::CatalogueCursor;
use crate::error::{CatalogueError, CatalogueResult};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, Sqlite};
use std::collections::VecDeque;

/// One listing query, fetched a page at a time in ascending key order.
#[async_trait]
pub(crate) trait PageQuery: Send + Sync + 'static {
    type Item: Send + 'static;

    /// Fetch at most `limit` items whose key is strictly greater than `after`.
    async fn fetch_page(
        &self,
        conn: &mut SqliteConnection,
        after: i64,
        limit: u32,
    ) -> CatalogueResult<Vec<Self::Item>>;

    /// The paging key of an item.
    fn key(item: &Self::Item) -> i64;
}

/// A cursor holding one listing connection while it has rows left.
///
/// The connection is returned to the pool when the last page has been read or
/// the cursor is dropped, and discarded after any error so that the next call
/// resumes after the last delivered key on a fresh connection.
pub(crate) struct PagedCursor<Q: PageQuery> {
    pool: Pool<Sqlite>,
    conn: Option<PoolConnection<Sqlite>>,
    query: Q,
    buffer: VecDeque<Q::Item>,
    after: i64,
    page_size: u32,
    exhausted: bool,
}

impl<Q: PageQuery> PagedCursor<Q> {
    pub(crate) fn new(pool: Pool<Sqlite>, query: Q, page_size: u32) -> Self {
        Self {
            pool,
            conn: None,
            query,
            buffer: VecDeque::new(),
            after: i64::MIN,
            page_size: page_size.max(1),
            exhausted: false,
        }
    }

    async fn fill(&mut self) -> CatalogueResult<()> {
        if !self.buffer.is_empty() || self.exhausted {
            return Ok(());
        }
        if self.conn.is_none() {
            self.conn = Some(self.pool.acquire().await?);
        }
        let Some(conn) = self.conn.as_mut() else {
            return Err(CatalogueError::Internal(
                "listing connection missing".to_string(),
            ));
        };

        let page = match self.query.fetch_page(&mut **conn, self.after, self.page_size).await {
            Ok(page) => page,
            Err(err) => {
                self.conn = None;
                return Err(err);
            }
        };

        if page.len() < self.page_size as usize {
            self.exhausted = true;
            self.conn = None;
        }
        if let Some(last) = page.last() {
            self.after = Q::key(last);
        }
        self.buffer.extend(page);
        Ok(())
    }
}

#[async_trait]
impl<Q: PageQuery> CatalogueCursor for PagedCursor<Q> {
    type Item = Q::Item;

    async fn has_more(&mut self) -> CatalogueResult<bool> {
        self.fill().await?;
        Ok(!self.buffer.is_empty())
    }

    async fn next(&mut self) -> CatalogueResult<Q::Item> {
        self.fill().await?;
        self.buffer
            .pop_front()
            .ok_or_else(|| CatalogueError::Internal("cursor exhausted".to_string()))
    }
}
