//! Recommendation Engine implementation

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::preference::PreferenceModel;
use super::scoring::{ScoreCalculator, ScoringWeights};
use super::selection::weighted_sample_without_replacement;
use super::similarity::{similarity_ratio, SimilarityWeights};
use super::snapshot::EngineSnapshot;
use super::status::{DislikeOutcome, ItemStatus, StatusLedger};
use super::types::Recommendation;
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::domain::{CatalogItem, ItemId};

/// Suppression draws keyed by (candidate position, dislike position), kept for
/// one batch so a candidate is judged once per recent dislike.
type SuppressionCache = HashMap<(usize, usize), bool>;

/// Per-user ranking engine over a shared, read-only catalog.
///
/// All randomness flows through `R`, so a seeded generator makes every batch
/// reproducible.
#[derive(Debug, Clone)]
pub struct RecommendationEngine<R = StdRng> {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    calculator: ScoreCalculator,
    similarity: SimilarityWeights,
    ledger: StatusLedger,
    preferences: PreferenceModel,
    total_swipes: u64,
    shown: VecDeque<ItemId>,
    rng: R,
}

impl RecommendationEngine<StdRng> {
    /// Create an engine with default tuning and an entropy-seeded generator
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    /// Uses `config.seed` when set, entropy otherwise
    pub fn with_config(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(catalog, config, rng)
    }

    pub fn seeded(catalog: Arc<Catalog>, config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(catalog, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RecommendationEngine<R> {
    pub fn with_rng(catalog: Arc<Catalog>, config: EngineConfig, rng: R) -> Self {
        info!(
            event_name = "engine.initialized",
            item_count = catalog.len(),
            "recommendation engine initialized"
        );

        Self {
            calculator: ScoreCalculator::with_weights(ScoringWeights::default(), config.score_jitter),
            similarity: SimilarityWeights::default(),
            catalog,
            config,
            ledger: StatusLedger::default(),
            preferences: PreferenceModel::default(),
            total_swipes: 0,
            shown: VecDeque::new(),
            rng,
        }
    }

    /// Replace the preference scoring weights
    pub fn with_scoring_weights(mut self, weights: ScoringWeights) -> Self {
        self.calculator = ScoreCalculator::with_weights(weights, self.config.score_jitter);
        self
    }

    // -------------------------------------------------------------------------
    // Swipe handling
    // -------------------------------------------------------------------------

    /// Adds the item to the wishlist. Returns `false` for repeats and for ids
    /// the catalog does not know.
    pub fn like(&mut self, id: &ItemId) -> bool {
        if !self.catalog.contains(id) {
            debug!(event_name = "engine.like.unknown_item", item_id = %id, "ignoring like");
            return false;
        }

        let changed = self.ledger.like(id);
        if changed {
            self.rebuild_preferences();
            debug!(
                event_name = "engine.like.recorded",
                item_id = %id,
                wishlist_size = self.ledger.wishlist_len(),
                "item added to wishlist"
            );
        }
        changed
    }

    /// First dislike hides the item for the cooldown, a second one hides it
    /// for good.
    pub fn dislike(&mut self, id: &ItemId) -> DislikeOutcome {
        if !self.catalog.contains(id) {
            debug!(event_name = "engine.dislike.unknown_item", item_id = %id, "ignoring dislike");
            return DislikeOutcome::Ignored;
        }

        let outcome = self.ledger.dislike(id, self.total_swipes);
        debug!(
            event_name = "engine.dislike.recorded",
            item_id = %id,
            outcome = ?outcome,
            at_swipe = self.total_swipes,
            "dislike processed"
        );
        outcome
    }

    /// Counts one user swipe. Call once per like or dislike, after the action.
    pub fn process_swipe(&mut self) -> u64 {
        self.total_swipes = self.total_swipes.saturating_add(1);
        debug!(
            event_name = "engine.swipe.processed",
            total_swipes = self.total_swipes,
            "swipe processed"
        );
        self.total_swipes
    }

    pub fn remove_from_wishlist(&mut self, id: &ItemId) -> bool {
        let removed = self.ledger.unlike(id);
        if removed {
            self.rebuild_preferences();
            debug!(event_name = "engine.wishlist.removed", item_id = %id, "item removed");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Availability
    // -------------------------------------------------------------------------

    /// Catalog items eligible right now. Expired temp dislikes are returned to
    /// neutral and items resembling recent dislikes may be held back at random.
    pub fn available_items(&mut self) -> Vec<CatalogItem> {
        let mut suppression = SuppressionCache::new();
        let catalog = Arc::clone(&self.catalog);
        self.available_positions(&mut suppression)
            .into_iter()
            .map(|position| catalog.items()[position].clone())
            .collect()
    }

    /// State-only eligibility check: no eviction and no similarity draw.
    pub fn is_available(&self, id: &ItemId) -> bool {
        self.catalog.contains(id) && self.passes_status_rules(id)
    }

    fn passes_status_rules(&self, id: &ItemId) -> bool {
        match self.ledger.status(id) {
            ItemStatus::Neutral => true,
            ItemStatus::Wishlisted | ItemStatus::PermanentDisliked => false,
            ItemStatus::TempDisliked { at_swipe } => self.cooldown_elapsed(at_swipe),
        }
    }

    fn cooldown_elapsed(&self, at_swipe: u64) -> bool {
        self.total_swipes.saturating_sub(at_swipe) >= self.config.temp_dislike_cooldown
    }

    fn evict_expired_dislikes(&mut self) {
        let expired = self
            .ledger
            .temp_dislikes()
            .into_iter()
            .filter(|(id, at_swipe)| self.catalog.contains(id) && self.cooldown_elapsed(*at_swipe))
            .map(|(id, _)| id)
            .collect::<Vec<_>>();

        for id in expired {
            self.ledger.evict_temp(&id);
            debug!(
                event_name = "engine.dislike.cooldown_elapsed",
                item_id = %id,
                total_swipes = self.total_swipes,
                "temporary dislike expired"
            );
        }
    }

    fn available_positions(&mut self, suppression: &mut SuppressionCache) -> Vec<usize> {
        self.evict_expired_dislikes();

        let catalog = Arc::clone(&self.catalog);
        let temp_dislikes = self.ledger.temp_dislikes();
        let recent_dislikes = temp_dislikes
            .iter()
            .skip(temp_dislikes.len().saturating_sub(self.config.recent_dislike_window))
            .filter_map(|(id, _)| catalog.position(id))
            .collect::<Vec<_>>();

        let mut available = Vec::new();
        for (position, item) in catalog.items().iter().enumerate() {
            if !self.passes_status_rules(&item.id) {
                continue;
            }
            if self.is_suppressed(position, item, &recent_dislikes, &catalog, suppression) {
                continue;
            }
            available.push(position);
        }
        available
    }

    fn is_suppressed(
        &mut self,
        position: usize,
        item: &CatalogItem,
        recent_dislikes: &[usize],
        catalog: &Catalog,
        suppression: &mut SuppressionCache,
    ) -> bool {
        for &disliked in recent_dislikes {
            if disliked == position {
                continue;
            }
            let ratio = similarity_ratio(&self.similarity, item, &catalog.items()[disliked]);
            if ratio <= self.config.similarity_threshold {
                continue;
            }

            let key = (position, disliked);
            let suppressed = match suppression.get(&key) {
                Some(decision) => *decision,
                None => {
                    let decision =
                        self.rng.gen::<f64>() < self.config.similar_suppression_probability;
                    suppression.insert(key, decision);
                    decision
                }
            };
            if suppressed {
                return true;
            }
        }
        false
    }

    // -------------------------------------------------------------------------
    // Scoring and selection
    // -------------------------------------------------------------------------

    pub fn score(&mut self, item: &CatalogItem) -> f64 {
        let cold_start = self.ledger.wishlist_len() == 0;
        self.calculator.score(&self.preferences, item, cold_start, &mut self.rng)
    }

    /// Uniform random pick among the currently available items.
    pub fn exploration_item(&mut self) -> Option<CatalogItem> {
        let mut suppression = SuppressionCache::new();
        let candidates = self.available_positions(&mut suppression);
        let position = *candidates.choose(&mut self.rng)?;
        Some(self.catalog.items()[position].clone())
    }

    /// Up to `count` items drawn from the head of the preference ranking.
    pub fn personalized_recommendations(&mut self, count: usize) -> Vec<Recommendation> {
        let mut suppression = SuppressionCache::new();
        let candidates = self.available_positions(&mut suppression);
        self.personalize(candidates, count)
    }

    fn personalize(&mut self, candidates: Vec<usize>, count: usize) -> Vec<Recommendation> {
        if count == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let catalog = Arc::clone(&self.catalog);
        let cold_start = self.ledger.wishlist_len() == 0;
        let mut scored = Vec::with_capacity(candidates.len());
        for position in candidates {
            let score = self.calculator.score(
                &self.preferences,
                &catalog.items()[position],
                cold_start,
                &mut self.rng,
            );
            scored.push((position, score));
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        let shortlist = count.saturating_mul(self.config.shortlist_factor).min(scored.len());
        scored.truncate(shortlist);

        weighted_sample_without_replacement(scored, count, &mut self.rng)
            .into_iter()
            .map(|(position, score)| {
                Recommendation::personalized(catalog.items()[position].clone(), score)
            })
            .collect()
    }

    /// True when the swipe count lands on the exploration cadence. An interval
    /// of zero disables exploration.
    pub fn exploration_due(&self) -> bool {
        self.total_swipes > 0
            && self.total_swipes.checked_rem(self.config.exploration_interval) == Some(0)
    }

    /// Next batch of at most `count` items.
    ///
    /// Availability and similarity suppression are computed once for the whole
    /// batch. Items among the most recently shown ids are skipped, one slot is
    /// reserved for exploration on the cadence, and the rest is personalized.
    pub fn get_recommendations(&mut self, count: usize) -> Vec<Recommendation> {
        if count == 0 {
            return Vec::new();
        }

        let catalog = Arc::clone(&self.catalog);
        let mut suppression = SuppressionCache::new();
        let mut candidates = self.available_positions(&mut suppression);

        let recently_shown = self
            .shown
            .iter()
            .skip(self.shown.len().saturating_sub(self.config.recency_window))
            .collect::<HashSet<_>>();
        candidates.retain(|&position| !recently_shown.contains(&catalog.items()[position].id));

        let mut batch = Vec::with_capacity(count);
        if self.exploration_due() {
            if let Some(&position) = candidates.choose(&mut self.rng) {
                candidates.retain(|&candidate| candidate != position);
                let item = catalog.items()[position].clone();
                info!(
                    event_name = "engine.exploration.selected",
                    item_id = %item.id,
                    total_swipes = self.total_swipes,
                    "exploration item selected"
                );
                batch.push(Recommendation::exploration(item));
            }
        }

        let remaining = count - batch.len();
        batch.extend(self.personalize(candidates, remaining));

        for recommendation in &batch {
            self.record_shown(recommendation.item.id.clone());
        }

        info!(
            event_name = "engine.batch.generated",
            requested = count,
            returned = batch.len(),
            total_swipes = self.total_swipes,
            wishlist_size = self.ledger.wishlist_len(),
            "recommendation batch generated"
        );
        batch
    }

    fn record_shown(&mut self, id: ItemId) {
        self.shown.push_back(id);
        while self.shown.len() > self.config.shown_history_cap {
            self.shown.pop_front();
        }
    }

    // -------------------------------------------------------------------------
    // Session controls
    // -------------------------------------------------------------------------

    /// Forget recently shown items only.
    pub fn reset_shown(&mut self) {
        self.shown.clear();
        info!(event_name = "engine.shown.reset", "shown history cleared");
    }

    /// Back to a cold start.
    pub fn clear_all(&mut self) {
        self.ledger.clear();
        self.preferences = PreferenceModel::default();
        self.shown.clear();
        self.total_swipes = 0;
        info!(event_name = "engine.state.cleared", "engine state cleared");
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    pub fn state_for_saving(&self) -> EngineSnapshot {
        EngineSnapshot {
            wishlist: Some(self.ledger.wishlist()),
            temp_dislikes: Some(self.ledger.temp_dislikes().into_iter().collect()),
            permanent_dislikes: Some(self.ledger.permanent_dislikes()),
            total_swipes: Some(self.total_swipes),
            shown: Some(self.shown.iter().cloned().collect()),
        }
    }

    /// Applies a saved snapshot. Fields the snapshot lacks keep their current
    /// value. An id saved under several statuses resolves to wishlisted, then
    /// permanent dislike, then temp dislike.
    pub fn restore_state(&mut self, snapshot: EngineSnapshot) {
        let wishlist = snapshot.wishlist.unwrap_or_else(|| self.ledger.wishlist());
        let permanent =
            snapshot.permanent_dislikes.unwrap_or_else(|| self.ledger.permanent_dislikes());
        let temp = match snapshot.temp_dislikes {
            Some(saved) => {
                let mut entries = saved.into_iter().collect::<Vec<_>>();
                entries.sort_by_key(|(_, at_swipe)| *at_swipe);
                entries
            }
            None => self.ledger.temp_dislikes(),
        };

        let mut ledger = StatusLedger::default();
        let mut conflicts = 0usize;
        for (id, at_swipe) in temp {
            ledger.set(id, ItemStatus::TempDisliked { at_swipe });
        }
        for id in permanent {
            match ledger.status(&id) {
                ItemStatus::PermanentDisliked => continue,
                ItemStatus::Neutral => {}
                _ => conflicts += 1,
            }
            ledger.set(id, ItemStatus::PermanentDisliked);
        }
        for id in wishlist {
            match ledger.status(&id) {
                ItemStatus::Wishlisted => continue,
                ItemStatus::Neutral => {}
                _ => conflicts += 1,
            }
            ledger.set(id, ItemStatus::Wishlisted);
        }
        if conflicts > 0 {
            warn!(
                event_name = "engine.state.conflicting_ids",
                conflicts,
                "snapshot listed ids under more than one status"
            );
        }
        self.ledger = ledger;

        if let Some(total_swipes) = snapshot.total_swipes {
            self.total_swipes = total_swipes;
        }
        if let Some(shown) = snapshot.shown {
            self.shown = shown.into();
            while self.shown.len() > self.config.shown_history_cap {
                self.shown.pop_front();
            }
        }

        self.rebuild_preferences();
        info!(
            event_name = "engine.state.restored",
            wishlist_size = self.ledger.wishlist_len(),
            temp_dislikes = self.ledger.temp_dislikes().len(),
            permanent_dislikes = self.ledger.permanent_dislikes().len(),
            total_swipes = self.total_swipes,
            "engine state restored"
        );
    }

    fn rebuild_preferences(&mut self) {
        let wishlist = self.ledger.wishlist();
        self.preferences = PreferenceModel::from_wishlist(&self.catalog, wishlist.iter());
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn total_swipes(&self) -> u64 {
        self.total_swipes
    }

    pub fn wishlist(&self) -> Vec<ItemId> {
        self.ledger.wishlist()
    }

    pub fn temp_dislikes(&self) -> Vec<(ItemId, u64)> {
        self.ledger.temp_dislikes()
    }

    pub fn permanent_dislikes(&self) -> Vec<ItemId> {
        self.ledger.permanent_dislikes()
    }

    pub fn shown_items(&self) -> Vec<ItemId> {
        self.shown.iter().cloned().collect()
    }

    pub fn status_of(&self, id: &ItemId) -> ItemStatus {
        self.ledger.status(id)
    }

    pub fn preferences(&self) -> &PreferenceModel {
        &self.preferences
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
