//! In-memory [`PointStore`] used by unit tests and demos.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::model::{Item, ItemId, NewPoint, Point, PointDetails, PointId, SearchQuery};
use crate::ports::{PointStore, StoreError};

/// The production item catalog, mirrored by the PostgreSQL seed migration.
pub const CATALOG: [(&str, &str); 6] = [
    ("lampadas", "lampadas.svg"),
    ("Pilhas e baterias", "baterias.svg"),
    ("Papeis e Papelao", "papeis-papelao.svg"),
    ("Residuos eletronicos", "eletronicos.svg"),
    ("Residuos organicos", "organicos.svg"),
    ("Oleo de Cozinha", "oleo.svg"),
];

#[derive(Debug, Default)]
struct Tables {
    items: Vec<Item>,
    points: Vec<Point>,
    links: Vec<(PointId, ItemId)>,
    next_point_id: i64,
}

/// Mutex-guarded tables mirroring the relational schema.
///
/// `create_point` validates every item id before mutating anything, so a
/// failed registration leaves no partial state behind.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store with the given item catalog.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                items,
                points: Vec::new(),
                links: Vec::new(),
                next_point_id: 1,
            }),
        }
    }

    /// Create a store pre-seeded with the production catalog.
    #[must_use]
    pub fn with_catalog() -> Self {
        let items = CATALOG
            .iter()
            .enumerate()
            .map(|(index, (title, image))| Item {
                id: ItemId(index as i64 + 1),
                title: (*title).to_owned(),
                image: (*image).to_owned(),
            })
            .collect();
        Self::new(items)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(StoreError::backend)
    }
}

#[async_trait]
impl PointStore for MemoryStore {
    async fn items(&self) -> Result<Vec<Item>, StoreError> {
        let tables = self.lock()?;
        let mut items = tables.items.clone();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn create_point(&self, draft: NewPoint, items: &[ItemId]) -> Result<Point, StoreError> {
        let mut tables = self.lock()?;

        // Referential check up front so nothing is written on failure.
        for id in items {
            if !tables.items.iter().any(|item| item.id == *id) {
                return Err(StoreError::UnknownItem(*id));
            }
        }

        let id = PointId(tables.next_point_id);
        tables.next_point_id += 1;

        let point = Point {
            id,
            name: draft.name,
            email: draft.email,
            whatsapp: draft.whatsapp,
            latitude: draft.latitude,
            longitude: draft.longitude,
            city: draft.city,
            uf: draft.uf,
            image: draft.image,
            created_at: Utc::now(),
        };
        tables.points.push(point.clone());
        for item_id in items {
            tables.links.push((id, *item_id));
        }
        Ok(point)
    }

    async fn point(&self, id: PointId) -> Result<Option<PointDetails>, StoreError> {
        let tables = self.lock()?;
        let Some(point) = tables.points.iter().find(|point| point.id == id).cloned() else {
            return Ok(None);
        };
        let items = tables
            .links
            .iter()
            .filter(|(point_id, _)| *point_id == id)
            .filter_map(|(_, item_id)| tables.items.iter().find(|item| item.id == *item_id))
            .cloned()
            .collect();
        Ok(Some(PointDetails { point, items }))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Point>, StoreError> {
        let tables = self.lock()?;
        let mut matched: Vec<Point> = Vec::new();
        for (point_id, item_id) in &tables.links {
            if !query.items.contains(item_id) {
                continue;
            }
            if matched.iter().any(|point| point.id == *point_id) {
                // Distinct projection: one row per point.
                continue;
            }
            let point = tables
                .points
                .iter()
                .find(|point| point.id == *point_id)
                .filter(|point| point.city == query.city && point.uf == query.uf);
            if let Some(point) = point {
                matched.push(point.clone());
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_is_seeded_in_order() {
        let store = MemoryStore::with_catalog();
        let items = store.items().await.expect("catalog available");
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].id, ItemId(1));
        assert_eq!(items[0].title, "lampadas");
        assert_eq!(items[5].title, "Oleo de Cozinha");
    }

    #[tokio::test]
    async fn ids_are_generated_sequentially() {
        let store = MemoryStore::with_catalog();
        let draft = NewPoint {
            name: "Ecoponto".to_owned(),
            email: "a@b.c".to_owned(),
            whatsapp: "+55".to_owned(),
            latitude: 0.0,
            longitude: 0.0,
            city: "Diadema".to_owned(),
            uf: "SP".to_owned(),
            image: "x.jpg".to_owned(),
        };
        let first = store.create_point(draft.clone(), &[ItemId(1)]).await.expect("insert works");
        let second = store.create_point(draft, &[ItemId(2)]).await.expect("insert works");
        assert_eq!(first.id, PointId(1));
        assert_eq!(second.id, PointId(2));
    }
}
