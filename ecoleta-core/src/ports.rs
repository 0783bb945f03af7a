//! Traits describing the persistence interface and shared error types.

use async_trait::async_trait;

use crate::model::{Item, ItemId, NewPoint, Point, PointDetails, PointId, SearchQuery};

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by store implementations.
pub enum StoreError {
    /// A submitted item id does not exist in the catalog.
    #[error("Unknown item id: {0}")]
    UnknownItem(ItemId),
    /// The underlying storage backend failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Wrap a backend driver error.
    ///
    /// Adapters cannot implement `From` for their driver errors without
    /// violating the orphan rule, so they map through this constructor.
    #[must_use]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
/// Persistence interface for the item catalog and collection points.
///
/// Implementations must make `create_point` atomic: either the point row and
/// every association row become visible together, or none of them do.
pub trait PointStore: Send + Sync {
    /// List the full item catalog, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn items(&self) -> Result<Vec<Item>, StoreError>;

    /// Insert a point plus one association row per item id, atomically.
    ///
    /// Returns the stored point including its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownItem`] when an id is not in the catalog;
    /// in that case no partial state may remain visible. Backend failures
    /// roll the whole write back as well.
    async fn create_point(&self, draft: NewPoint, items: &[ItemId]) -> Result<Point, StoreError>;

    /// Fetch a point together with its associated items.
    ///
    /// Returns `Ok(None)` when no point has the given id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn point(&self, id: PointId) -> Result<Option<PointDetails>, StoreError>;

    /// List distinct points matching the filter.
    ///
    /// City and state are compared by exact, case-sensitive equality; a point
    /// matches when it offers at least one of the requested items, and it
    /// appears at most once regardless of how many items match.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Point>, StoreError>;
}
