//! Types returned by the Recommendation Engine

use serde::{Deserialize, Serialize};

use crate::domain::CatalogItem;

/// One slot of a recommendation batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item: CatalogItem,
    pub source: RecommendationSource,
    /// Ranking score for personalized picks; exploration picks are unscored.
    pub score: Option<f64>,
}

impl Recommendation {
    pub fn exploration(item: CatalogItem) -> Self {
        Self { item, source: RecommendationSource::Exploration, score: None }
    }

    pub fn personalized(item: CatalogItem, score: f64) -> Self {
        Self { item, source: RecommendationSource::Personalized, score: Some(score) }
    }
}

/// Why an item was placed in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Uniform random pick injected on the exploration cadence
    Exploration,
    /// Drawn from the top of the preference ranking
    Personalized,
}

impl RecommendationSource {
    pub fn description(&self) -> &'static str {
        match self {
            RecommendationSource::Exploration => "Something different to explore",
            RecommendationSource::Personalized => "Matches your liked items",
        }
    }
}
