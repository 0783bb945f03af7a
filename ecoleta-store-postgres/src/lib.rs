//! PostgreSQL implementation of the Ecoleta store port using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;

use ecoleta_core::{
    model::{Item, ItemId, NewPoint, Point, PointDetails, PointId, SearchQuery},
    ports::{PointStore, StoreError},
};

/// Row shape read from the `items` table. Never exposed to the domain.
#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    title: String,
    image: String,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId(row.id),
            title: row.title,
            image: row.image,
        }
    }
}

/// Row shape read from the `points` table. Never exposed to the domain.
#[derive(Debug, FromRow)]
struct PointRow {
    id: i64,
    name: String,
    email: String,
    whatsapp: String,
    latitude: f64,
    longitude: f64,
    city: String,
    uf: String,
    image: String,
    created_at: DateTime<Utc>,
}

impl From<PointRow> for Point {
    fn from(row: PointRow) -> Self {
        Self {
            id: PointId(row.id),
            name: row.name,
            email: row.email,
            whatsapp: row.whatsapp,
            latitude: row.latitude,
            longitude: row.longitude,
            city: row.city,
            uf: row.uf,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

const POINT_COLUMNS: &str =
    "id, name, email, whatsapp, latitude, longitude, city, uf, image, created_at";

/// Store adapter backed by a `PgPool`.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create an adapter bound to the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded schema and seed migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StoreError::backend)
    }

    /// Access the underlying pool, mainly for health checks.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn id_values(items: &[ItemId]) -> Vec<i64> {
    items.iter().map(|id| id.0).collect()
}

/// Find the first requested id that is missing from the known set.
fn first_unknown(requested: &[ItemId], known: &[i64]) -> Option<ItemId> {
    requested.iter().copied().find(|id| !known.contains(&id.0))
}

#[async_trait]
impl PointStore for PostgresStore {
    async fn items(&self) -> Result<Vec<Item>, StoreError> {
        let rows: Vec<ItemRow> = sqlx::query_as("SELECT id, title, image FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn create_point(&self, draft: NewPoint, items: &[ItemId]) -> Result<Point, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        // Check referential validity inside the transaction so the caller
        // gets a domain error instead of a raw FK violation.
        let known: Vec<i64> = sqlx::query_scalar("SELECT id FROM items WHERE id = ANY($1)")
            .bind(id_values(items))
            .fetch_all(&mut *tx)
            .await
            .map_err(StoreError::backend)?;
        if let Some(missing) = first_unknown(items, &known) {
            // Dropping `tx` rolls the transaction back.
            return Err(StoreError::UnknownItem(missing));
        }

        let row: PointRow = sqlx::query_as(
            "INSERT INTO points (name, email, whatsapp, latitude, longitude, city, uf, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, name, email, whatsapp, latitude, longitude, city, uf, image, created_at",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.whatsapp)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(&draft.city)
        .bind(&draft.uf)
        .bind(&draft.image)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        for item_id in items {
            sqlx::query("INSERT INTO points_items (point_id, item_id) VALUES ($1, $2)")
                .bind(row.id)
                .bind(item_id.0)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::backend)?;
        }

        tx.commit().await.map_err(StoreError::backend)?;
        tracing::debug!(point_id = row.id, items = items.len(), "registered collection point");
        Ok(row.into())
    }

    async fn point(&self, id: PointId) -> Result<Option<PointDetails>, StoreError> {
        let row: Option<PointRow> = sqlx::query_as(&format!(
            "SELECT {POINT_COLUMNS} FROM points WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<ItemRow> = sqlx::query_as(
            "SELECT items.id, items.title, items.image FROM items \
             JOIN points_items ON items.id = points_items.item_id \
             WHERE points_items.point_id = $1",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Some(PointDetails {
            point: row.into(),
            items: items.into_iter().map(Item::from).collect(),
        }))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Point>, StoreError> {
        let rows: Vec<PointRow> = sqlx::query_as(
            "SELECT DISTINCT points.id, points.name, points.email, points.whatsapp, \
                points.latitude, points.longitude, points.city, points.uf, points.image, \
                points.created_at \
             FROM points \
             JOIN points_items ON points.id = points_items.point_id \
             WHERE points_items.item_id = ANY($1) AND points.city = $2 AND points.uf = $3",
        )
        .bind(id_values(&query.items))
        .bind(&query.city)
        .bind(&query.uf)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(Point::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_values_unwraps_newtypes() {
        assert_eq!(id_values(&[ItemId(1), ItemId(3)]), vec![1, 3]);
        assert!(id_values(&[]).is_empty());
    }

    #[test]
    fn first_unknown_reports_the_missing_id() {
        assert_eq!(
            first_unknown(&[ItemId(1), ItemId(99), ItemId(3)], &[1, 3]),
            Some(ItemId(99))
        );
        assert_eq!(first_unknown(&[ItemId(1)], &[1, 2, 3]), None);
    }
}
