pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod session;

pub use catalog::Catalog;
pub use config::{AppConfig, ConfigError, ConfigOverrides, EngineConfig, LoadOptions, LogFormat};
pub use domain::{Attribute, CatalogItem, ItemId};
pub use engine::{
    DislikeOutcome, EngineSnapshot, ItemStatus, PreferenceModel, Recommendation,
    RecommendationEngine, RecommendationSource, ScoringWeights,
};
pub use errors::{ApplicationError, CatalogError, SnapshotError, StoreError};
pub use session::{MemoryStore, SessionSnapshot, SnapshotStore, SwipeSession, WishlistEntry};
