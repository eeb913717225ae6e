//! Swipe Recommendation Engine
//!
//! Tracks per-item like/dislike state, learns attribute preferences from the
//! wishlist, and ranks the catalog with a weighted-random shortlist draw plus
//! periodic exploration picks.

mod preference;
mod recommender;
mod scoring;
mod selection;
mod similarity;
mod snapshot;
mod status;
mod types;

pub use preference::PreferenceModel;
pub use recommender::RecommendationEngine;
pub use scoring::{ScoreCalculator, ScoringWeights};
pub use selection::{rank_weight, weighted_sample_without_replacement};
pub use similarity::{similarity_ratio, SimilarityWeights};
pub use snapshot::EngineSnapshot;
pub use status::{DislikeOutcome, ItemStatus, StatusLedger};
pub use types::{Recommendation, RecommendationSource};

/// Default preference scoring weights
pub const DEFAULT_SCORING_WEIGHTS: ScoringWeights = ScoringWeights {
    category: 3.0,
    subcategory: 2.5,
    brand: 2.0,
    style: 1.5,
    color: 1.0,
    price_range: 0.8,
};

/// Default per-dimension weights used when comparing a candidate with a dislike
pub const DEFAULT_SIMILARITY_WEIGHTS: SimilarityWeights = SimilarityWeights {
    category: 1.0,
    subcategory: 1.0,
    brand: 0.7,
    style: 0.7,
    color: 0.5,
    price_range: 0.3,
};
