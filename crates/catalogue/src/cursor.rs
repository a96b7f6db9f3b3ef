//! Lazy, forward-only iteration over large result sets.

use crate::error::CatalogueResult;
use async_trait::async_trait;

/// A forward-only cursor with "has more / take next" semantics.
///
/// Implementations own whatever database resource backs them and release it
/// when exhausted or dropped.
#[async_trait]
pub trait CatalogueCursor: Send {
    type Item: Send;

    /// Whether a further item is available; may fetch the next page.
    async fn has_more(&mut self) -> CatalogueResult<bool>;

    /// Take the next item. Fails once the cursor is exhausted.
    async fn next(&mut self) -> CatalogueResult<Self::Item>;
}

/// A type-erased cursor.
pub type BoxCursor<T> = Box<dyn CatalogueCursor<Item = T>>;

#[async_trait]
impl<T: Send + 'static> CatalogueCursor for BoxCursor<T> {
    type Item = T;

    async fn has_more(&mut self) -> CatalogueResult<bool> {
        (**self).has_more().await
    }

    async fn next(&mut self) -> CatalogueResult<T> {
        (**self).next().await
    }
}

/// Drain every remaining item of a cursor into a vector.
pub async fn collect<C>(cursor: &mut C) -> CatalogueResult<Vec<C::Item>>
where
    C: CatalogueCursor + ?Sized,
{
    let mut items = Vec::new();
    while cursor.has_more().await? {
        items.push(cursor.next().await?);
    }
    Ok(items)
}
