//! High-level service facade for registration and queries.

use std::sync::Arc;

use crate::model::{Item, ItemId, NewPoint, Point, PointDetails, PointId, SearchQuery};
use crate::ports::{PointStore, StoreError};

#[derive(thiserror::Error, Debug)]
/// Errors returned by the service facade.
pub enum ServiceError {
    /// A required registration field is missing or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// Registration was submitted without any item ids.
    #[error("At least one item must be selected")]
    NoItems,
    /// No point exists with the requested identifier.
    #[error("Point not found")]
    NotFound,
    /// A submitted item id does not exist in the catalog.
    #[error("Unknown item id: {0}")]
    UnknownItem(ItemId),
    /// The store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownItem(id) => Self::UnknownItem(id),
            other => Self::Store(other),
        }
    }
}

/// Public entry point for registering and browsing collection points.
///
/// The store is injected explicitly so the service stays testable against an
/// in-memory implementation.
pub struct EcoletaService {
    store: Arc<dyn PointStore>,
}

impl EcoletaService {
    /// Create a new service bound to the provided store.
    #[must_use]
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self { store }
    }

    /// List the seeded item catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the store fails.
    pub async fn items(&self) -> Result<Vec<Item>, ServiceError> {
        Ok(self.store.items().await?)
    }

    /// Validate and atomically register a new collection point.
    ///
    /// All contact and location fields must be non-blank and at least one
    /// item id must be supplied. Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] on validation failure, unknown item ids,
    /// or a store failure. In every failure case no partial state persists.
    pub async fn register_point(
        &self,
        draft: NewPoint,
        items: &[ItemId],
    ) -> Result<Point, ServiceError> {
        validate_draft(&draft)?;
        if items.is_empty() {
            return Err(ServiceError::NoItems);
        }
        Ok(self.store.create_point(draft, items).await?)
    }

    /// Fetch a point and its associated items.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] when the id is not registered,
    /// which is distinct from any empty-but-successful result.
    pub async fn point_details(&self, id: PointId) -> Result<PointDetails, ServiceError> {
        self.store
            .point(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// List distinct points matching state, city, and item filter.
    ///
    /// `raw_items` is the delimited id list from the request; malformed
    /// tokens are dropped. An empty parsed set matches nothing, so the store
    /// is not consulted at all in that case.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the store fails.
    pub async fn search_points(
        &self,
        uf: &str,
        city: &str,
        raw_items: &str,
    ) -> Result<Vec<Point>, ServiceError> {
        let query = SearchQuery::parse(uf, city, raw_items);
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.search(&query).await?)
    }
}

fn validate_draft(draft: &NewPoint) -> Result<(), ServiceError> {
    let required: [(&'static str, &str); 6] = [
        ("name", &draft.name),
        ("email", &draft.email),
        ("whatsapp", &draft.whatsapp),
        ("city", &draft.city),
        ("uf", &draft.uf),
        ("image", &draft.image),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ServiceError::MissingField(field));
        }
    }
    if !draft.latitude.is_finite() {
        return Err(ServiceError::MissingField("latitude"));
    }
    if !draft.longitude.is_finite() {
        return Err(ServiceError::MissingField("longitude"));
    }
    Ok(())
}
