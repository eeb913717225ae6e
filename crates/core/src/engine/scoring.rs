//! Preference scoring for catalog items

use rand::Rng;

use super::preference::PreferenceModel;
use crate::domain::{Attribute, CatalogItem};

/// Weights applied to preference counts per dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight for category matches (default: 3.0)
    pub category: f64,
    /// Weight for subcategory matches (default: 2.5)
    pub subcategory: f64,
    /// Weight for brand matches (default: 2.0)
    pub brand: f64,
    /// Weight for style matches (default: 1.5)
    pub style: f64,
    /// Weight for color matches (default: 1.0)
    pub color: f64,
    /// Weight for price range matches (default: 0.8)
    pub price_range: f64,
}

impl ScoringWeights {
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

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_SCORING_WEIGHTS
    }
}

/// Score calculator for swipe candidates
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
    jitter: f64,
}

impl ScoreCalculator {
    /// Create a new score calculator with default weights and jitter
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default(), jitter: 0.5 }
    }

    /// Create with custom weights and jitter span
    pub fn with_weights(weights: ScoringWeights, jitter: f64) -> Self {
        Self { weights, jitter }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Deterministic part of the score: weighted preference counts.
    pub fn preference_score(&self, preferences: &PreferenceModel, item: &CatalogItem) -> f64 {
        Attribute::ALL
            .iter()
            .filter_map(|&attribute| {
                item.attribute(attribute).map(|value| {
                    f64::from(preferences.count(attribute, value)) * self.weights.weight(attribute)
                })
            })
            .sum()
    }

    /// Ranking score. With no liked items yet the score is a uniform draw in
    /// `[0, 1)`; otherwise the preference score plus jitter in `[0, jitter)`.
    pub fn score<R: Rng + ?Sized>(
        &self,
        preferences: &PreferenceModel,
        item: &CatalogItem,
        cold_start: bool,
        rng: &mut R,
    ) -> f64 {
        if cold_start {
            return rng.gen::<f64>();
        }

        self.preference_score(preferences, item) + rng.gen::<f64>() * self.jitter
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}
