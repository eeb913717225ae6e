//! Read-only item catalog shared by the engine and the session.

pub mod normalize;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::{CatalogItem, ItemId};
use crate::errors::CatalogError;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Build a catalog from already-normalized items. Later duplicates of an id are dropped.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut kept = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());

        for item in items {
            if index.contains_key(&item.id) {
                warn!(
                    event_name = "catalog.duplicate_id",
                    item_id = %item.id,
                    "dropping duplicate catalog entry"
                );
                continue;
            }
            index.insert(item.id.clone(), kept.len());
            kept.push(item);
        }

        Self { items: kept, index }
    }

    /// Parse a JSON array of raw records and fill missing attributes.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let records: Vec<CatalogItem> = serde_json::from_str(raw)?;
        let items = records.into_iter().map(normalize::normalize_item).collect();
        Ok(Self::new(items))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let catalog = Self::from_json_str(&raw)?;

        info!(
            event_name = "catalog.loaded",
            path = %path.display(),
            item_count = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn get(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
