//! The user's in-progress product selection.
//!
//! Insertion order is selection order and ids are unique. The whole list is
//! mirrored to the key-value store after each mutation by whoever drives the
//! store; persistence failures are logged and never surfaced.

use tracing::{debug, error, warn};

use crate::error::AdvisorError;
use crate::storage::{KeyValueStore, SELECTED_PRODUCTS_KEY};
use crate::types::Product;

/// Outcome of a selection mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
    Unchanged,
}

impl SelectionChange {
    pub fn is_mutation(self) -> bool {
        self != SelectionChange::Unchanged
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    items: Vec<Product>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the selection from storage. Absent or malformed data yields an
    /// empty selection.
    pub fn rehydrate(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(SELECTED_PRODUCTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                error!("Error loading selected products from storage: {}", e);
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<Product>>(&raw) {
            Ok(products) => {
                let mut selection = Self::new();
                for product in products {
                    if selection.contains(&product) {
                        warn!("Dropping duplicate stored selection {}", product.id);
                        continue;
                    }
                    selection.items.push(product);
                }
                debug!("Rehydrated {} selected products", selection.len());
                selection
            }
            Err(e) => {
                error!("Error loading selected products from storage: {}", e);
                Self::new()
            }
        }
    }

    /// Overwrite the stored selection with the current list.
    pub fn persist(&self, store: &mut dyn KeyValueStore) {
        let result = serde_json::to_string(&self.items)
            .map_err(AdvisorError::from)
            .and_then(|json| store.set(SELECTED_PRODUCTS_KEY, &json));
        if let Err(e) = result {
            error!("Error saving selected products to storage: {}", e);
        }
    }

    /// Add the catalog product named by `id`, or remove it if already
    /// selected. Ids absent from the catalog are ignored.
    pub fn toggle(&mut self, id: &str, catalog: &[Product]) -> SelectionChange {
        let Some(product) = catalog.iter().find(|p| p.id.matches(id)) else {
            debug!("Toggle ignored for unknown product {}", id);
            return SelectionChange::Unchanged;
        };

        match self.position(id) {
            Some(idx) => {
                self.items.remove(idx);
                SelectionChange::Removed
            }
            None => {
                self.items.push(product.clone());
                SelectionChange::Added
            }
        }
    }

    /// Remove by id if present.
    pub fn remove(&mut self, id: &str) -> SelectionChange {
        match self.position(id) {
            Some(idx) => {
                self.items.remove(idx);
                SelectionChange::Removed
            }
            None => SelectionChange::Unchanged,
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn contains(&self, product: &Product) -> bool {
        self.items.iter().any(|p| p.id == product.id)
    }

    pub fn products(&self) -> &[Product] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|p| p.id.matches(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::storage::MemoryStore;
    use crate::types::ProductId;
    use std::collections::BTreeSet;

    fn catalog() -> Vec<Product> {
        (1..=4i64)
            .map(|i| Product {
                id: ProductId::from(i),
                name: format!("Product {}", i),
                brand: "Brand".into(),
                category: if i % 2 == 0 { "haircare" } else { "skincare" }.into(),
                image: format!("{}.png", i),
                description: None,
            })
            .collect()
    }

    fn id_set(selection: &SelectionStore) -> BTreeSet<String> {
        selection.products().iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let catalog = catalog();
        let mut selection = SelectionStore::new();
        assert_eq!(selection.toggle("2", &catalog), SelectionChange::Added);
        assert!(selection.is_selected("2"));
        assert_eq!(selection.toggle("2", &catalog), SelectionChange::Removed);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut selection = SelectionStore::new();
        assert_eq!(selection.toggle("99", &catalog()), SelectionChange::Unchanged);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_insertion_order_is_selection_order() {
        let catalog = catalog();
        let mut selection = SelectionStore::new();
        for id in ["3", "1", "4"] {
            selection.toggle(id, &catalog);
        }
        let order: Vec<String> = selection.products().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(order, vec!["3", "1", "4"]);
    }

    #[test]
    fn test_double_toggle_restores_set() {
        let catalog = catalog();
        let mut selection = SelectionStore::new();
        selection.toggle("1", &catalog);
        selection.toggle("3", &catalog);
        let before = id_set(&selection);

        for id in ["1", "2", "3", "4"] {
            selection.toggle(id, &catalog);
            selection.toggle(id, &catalog);
            assert_eq!(id_set(&selection), before);
        }
    }

    #[test]
    fn test_never_holds_duplicate_ids() {
        let catalog = catalog();
        let mut selection = SelectionStore::new();
        let ops = ["1", "1", "2", "-2", "2", "3", "-1", "1", "4", "-9", "4", "4"];
        for op in ops {
            match op.strip_prefix('-') {
                Some(id) => {
                    selection.remove(id);
                }
                None => {
                    selection.toggle(op, &catalog);
                }
            }
            let ids: Vec<String> = selection.products().iter().map(|p| p.id.to_string()).collect();
            let unique: BTreeSet<&String> = ids.iter().collect();
            assert_eq!(ids.len(), unique.len());
        }
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut selection = SelectionStore::new();
        assert_eq!(selection.remove("1"), SelectionChange::Unchanged);
        assert!(!SelectionChange::Unchanged.is_mutation());
    }

    #[test]
    fn test_persist_then_rehydrate_round_trips() {
        let catalog = catalog();
        let mut store = MemoryStore::new();
        let mut selection = SelectionStore::new();
        selection.toggle("4", &catalog);
        selection.toggle("1", &catalog);
        selection.persist(&mut store);

        let restored = SelectionStore::rehydrate(&store);
        assert_eq!(id_set(&restored), id_set(&selection));
        assert_eq!(restored.products()[0].name, "Product 4");
    }

    #[test]
    fn test_rehydrate_absent_or_corrupt_is_empty() {
        let mut store = MemoryStore::new();
        assert!(SelectionStore::rehydrate(&store).is_empty());

        store.set(SELECTED_PRODUCTS_KEY, "not json").unwrap();
        assert!(SelectionStore::rehydrate(&store).is_empty());

        store.set(SELECTED_PRODUCTS_KEY, r#"{"id":1}"#).unwrap();
        assert!(SelectionStore::rehydrate(&store).is_empty());
    }

    #[test]
    fn test_rehydrate_drops_duplicates() {
        let mut store = MemoryStore::new();
        store
            .set(
                SELECTED_PRODUCTS_KEY,
                r#"[{"id":1,"name":"A","brand":"B","category":"c","image":"i"},
                    {"id":"1","name":"A","brand":"B","category":"c","image":"i"}]"#,
            )
            .unwrap();
        assert_eq!(SelectionStore::rehydrate(&store).len(), 1);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AdvisorError::Storage("unavailable".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(AdvisorError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut store = FailingStore;
        assert!(SelectionStore::rehydrate(&store).is_empty());

        let mut selection = SelectionStore::new();
        selection.toggle("1", &catalog());
        selection.persist(&mut store);
        // In-memory state stays authoritative.
        assert!(selection.is_selected("1"));
    }
}
