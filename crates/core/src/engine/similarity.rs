//! Attribute overlap between a candidate and a disliked item

use crate::domain::{Attribute, CatalogItem};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub category: f64,
    pub subcategory: f64,
    pub brand: f64,
    pub style: f64,
    pub color: f64,
    pub price_range: f64,
}

impl SimilarityWeights {
    pub fn weight(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Category => self.category,
            Attribute::Subcategory => self.subcategory,
            Attribute::Brand => self.brand,
            Attribute::Style => self.style,
            Attribute::Color => self.color,
            Attribute::PriceRange => self.price_range,
        }
    }
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        super::DEFAULT_SIMILARITY_WEIGHTS
    }
}

/// Matched weight divided by the number of dimensions both items carry.
///
/// The denominator counts dimensions, not weights, so a full match on
/// lower-weighted dimensions alone stays well under 1.0.
pub fn similarity_ratio(weights: &SimilarityWeights, left: &CatalogItem, right: &CatalogItem) -> f64 {
    let mut matched = 0.0;
    let mut comparable = 0usize;

    for attribute in Attribute::ALL {
        let (Some(a), Some(b)) = (left.attribute(attribute), right.attribute(attribute)) else {
            continue;
        };
        comparable += 1;
        if a == b {
            matched += weights.weight(attribute);
        }
    }

    if comparable == 0 {
        0.0
    } else {
        matched / comparable as f64
    }
}
