//! Attribute frequency model learned from the wishlist

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::domain::{Attribute, ItemId};

/// Occurrence counts of attribute values across wishlisted items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceModel {
    counts: HashMap<Attribute, HashMap<String, u32>>,
    source_items: usize,
}

impl PreferenceModel {
    /// Full recompute. Ids the catalog does not know are skipped.
    pub fn from_wishlist<'a>(
        catalog: &Catalog,
        wishlist: impl IntoIterator<Item = &'a ItemId>,
    ) -> Self {
        let mut model = Self::default();

        for id in wishlist {
            let Some(item) = catalog.get(id) else {
                continue;
            };
            model.source_items += 1;

            for attribute in Attribute::ALL {
                if let Some(value) = item.attribute(attribute) {
                    *model
                        .counts
                        .entry(attribute)
                        .or_default()
                        .entry(value.to_owned())
                        .or_insert(0) += 1;
                }
            }
        }

        model
    }

    pub fn count(&self, attribute: Attribute, value: &str) -> u32 {
        self.counts.get(&attribute).and_then(|values| values.get(value)).copied().unwrap_or(0)
    }

    /// Most frequent values for one dimension, ties broken alphabetically.
    pub fn top_values(&self, attribute: Attribute, limit: usize) -> Vec<(String, u32)> {
        let mut values: Vec<(String, u32)> = self
            .counts
            .get(&attribute)
            .map(|values| values.iter().map(|(value, count)| (value.clone(), *count)).collect())
            .unwrap_or_default();
        values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        values.truncate(limit);
        values
    }

    /// Number of wishlisted items that contributed to the counts.
    pub fn source_items(&self) -> usize {
        self.source_items
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(HashMap::is_empty)
    }
}
