//! Swipe session state
//!
//! Wraps a [`RecommendationEngine`] with the feed the user is swiping through
//! and the dated wishlist shown back to them, and tracks when the combined
//! state needs saving.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::domain::{CatalogItem, ItemId};
use crate::engine::{DislikeOutcome, EngineSnapshot, Recommendation, RecommendationEngine};
use crate::errors::{SnapshotError, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub item: CatalogItem,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

/// Everything a session persists between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub wishlist: Vec<WishlistEntry>,
    #[serde(default)]
    pub engine: EngineSnapshot,
}

impl SessionSnapshot {
    /// Lenient decode: malformed wishlist entries are skipped and the engine
    /// part goes through [`EngineSnapshot::from_value`].
    pub fn from_value(value: &Value) -> Self {
        let wishlist = value
            .get("wishlist")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                        Ok(entry) => Some(entry),
                        Err(error) => {
                            warn!(
                                event_name = "session.snapshot.entry_dropped",
                                error = %error,
                                "dropping malformed wishlist entry"
                            );
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let engine = value.get("engine").map(EngineSnapshot::from_value).unwrap_or_default();

        Self { wishlist, engine }
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw).map_err(SnapshotError::Decode)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Encode)
    }
}

/// Storage medium for session snapshots.
pub trait SnapshotStore {
    fn load(&self) -> Result<Option<SessionSnapshot>, StoreError>;
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<SessionSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self { slot: Mutex::new(Some(snapshot)) }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_owned()))?;
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_owned()))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_owned()))?;
        *slot = None;
        Ok(())
    }
}

pub struct SwipeSession<R = StdRng> {
    engine: RecommendationEngine<R>,
    config: SessionConfig,
    feed: Vec<Recommendation>,
    wishlist: Vec<WishlistEntry>,
    dirty: bool,
}

impl<R: Rng> SwipeSession<R> {
    pub fn new(engine: RecommendationEngine<R>, config: SessionConfig) -> Self {
        Self { engine, config, feed: Vec::new(), wishlist: Vec::new(), dirty: false }
    }

    /// Fills an empty feed with the first batch.
    pub fn start(&mut self) -> usize {
        self.feed = self.next_batch();
        info!(
            event_name = "session.started",
            feed_len = self.feed.len(),
            wishlist_size = self.wishlist.len(),
            "swipe session started"
        );
        self.feed.len()
    }

    pub fn like(&mut self, id: &ItemId) -> bool {
        let Some(item) = self.engine.catalog().get(id).cloned() else {
            debug!(event_name = "session.swipe.unknown_item", item_id = %id, "ignoring like");
            return false;
        };

        let added = self.engine.like(id);
        self.engine.process_swipe();
        if !self.wishlist.iter().any(|entry| entry.item.id == *id) {
            self.wishlist.push(WishlistEntry { item, added_at: Utc::now() });
        }
        self.dirty = true;
        added
    }

    pub fn dislike(&mut self, id: &ItemId) -> DislikeOutcome {
        if !self.engine.catalog().contains(id) {
            debug!(event_name = "session.swipe.unknown_item", item_id = %id, "ignoring dislike");
            return DislikeOutcome::Ignored;
        }

        let outcome = self.engine.dislike(id);
        self.engine.process_swipe();
        self.dirty = true;
        outcome
    }

    pub fn remove_from_wishlist(&mut self, id: &ItemId) -> bool {
        let before = self.wishlist.len();
        self.wishlist.retain(|entry| entry.item.id != *id);
        let removed = self.engine.remove_from_wishlist(id) || self.wishlist.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Appends a batch once the user is within the low-water mark of the end
    /// of the feed. Returns how many items were appended.
    pub fn load_more_if_needed(&mut self, current_index: usize) -> usize {
        let remaining = self.feed.len().saturating_sub(current_index).saturating_sub(1);
        let threshold = self.config.min_low_water_mark.max(self.config.batch_size / 2);
        if remaining > threshold {
            return 0;
        }

        let batch = self.next_batch();
        let appended = batch.len();
        self.feed.extend(batch);
        info!(
            event_name = "session.feed.extended",
            current_index,
            remaining,
            appended,
            feed_len = self.feed.len(),
            "feed extended"
        );
        appended
    }

    /// Forgets what was shown and replaces the feed.
    pub fn load_fresh(&mut self) -> usize {
        self.engine.reset_shown();
        self.feed = self.next_batch();
        self.dirty = true;
        self.feed.len()
    }

    pub fn clear_all(&mut self) -> usize {
        self.engine.clear_all();
        self.wishlist.clear();
        self.feed = self.next_batch();
        self.dirty = true;
        info!(event_name = "session.cleared", feed_len = self.feed.len(), "session cleared");
        self.feed.len()
    }

    /// One batch outside the feed. Shown history changes, so the session is
    /// marked dirty.
    pub fn recommend(&mut self, count: usize) -> Vec<Recommendation> {
        self.dirty = true;
        self.engine.get_recommendations(count)
    }

    pub fn reset_shown(&mut self) {
        self.engine.reset_shown();
        self.dirty = true;
    }

    fn next_batch(&mut self) -> Vec<Recommendation> {
        self.engine.get_recommendations(self.config.batch_size)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { wishlist: self.wishlist.clone(), engine: self.engine.state_for_saving() }
    }

    /// Applies a saved snapshot. The engine's wishlist decides membership and
    /// order; saved entries contribute their timestamps.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.engine.restore_state(snapshot.engine);

        let mut saved = snapshot.wishlist;
        let mut wishlist = Vec::new();
        for id in self.engine.wishlist() {
            if let Some(position) = saved.iter().position(|entry| entry.item.id == id) {
                wishlist.push(saved.swap_remove(position));
            } else if let Some(item) = self.engine.catalog().get(&id) {
                wishlist.push(WishlistEntry { item: item.clone(), added_at: Utc::now() });
            }
        }
        if !saved.is_empty() {
            warn!(
                event_name = "session.wishlist.reconciled",
                dropped = saved.len(),
                "dropping wishlist entries the engine does not hold"
            );
        }

        self.wishlist = wishlist;
        self.dirty = false;
    }

    /// Restores from `store`. A failing store leaves the session fresh.
    pub fn restore_from(&mut self, store: &dyn SnapshotStore) {
        match store.load() {
            Ok(Some(snapshot)) => self.restore(snapshot),
            Ok(None) => {
                debug!(event_name = "session.restore.empty", "no saved session; starting fresh")
            }
            Err(error) => warn!(
                event_name = "session.restore.failed",
                error = %error,
                "could not load saved session; starting fresh"
            ),
        }
    }

    /// Saves when something changed since the last save or restore.
    pub fn save_if_dirty(&mut self, store: &dyn SnapshotStore) -> Result<bool, StoreError> {
        if !self.take_dirty() {
            return Ok(false);
        }
        if let Err(error) = store.save(&self.snapshot()) {
            self.dirty = true;
            return Err(error);
        }
        Ok(true)
    }

    /// Returns the dirty flag and resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn feed(&self) -> &[Recommendation] {
        &self.feed
    }

    pub fn wishlist(&self) -> &[WishlistEntry] {
        &self.wishlist
    }

    pub fn engine(&self) -> &RecommendationEngine<R> {
        &self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::EngineConfig;
    use crate::domain::Attribute;

    fn session(size: usize, batch_size: usize) -> SwipeSession {
        let categories = ["tops", "bottoms", "dresses", "shoes"];
        let catalog = Catalog::new(
            (0..size)
                .map(|n| {
                    CatalogItem::new(format!("p{n}"), format!("Piece {n}"))
                        .with_attribute(Attribute::Category, categories[n % 4])
                })
                .collect(),
        );
        let config = EngineConfig { similar_suppression_probability: 0.0, ..EngineConfig::default() };
        let engine =
            RecommendationEngine::with_rng(Arc::new(catalog), config, StdRng::seed_from_u64(11));
        SwipeSession::new(engine, SessionConfig { batch_size, min_low_water_mark: 3 })
    }

    fn id(value: &str) -> ItemId {
        ItemId::new(value)
    }

    #[test]
    fn start_fills_one_batch() {
        let mut session = session(40, 10);
        assert_eq!(session.start(), 10);
        assert_eq!(session.feed().len(), 10);
        assert!(!session.take_dirty());
    }

    #[test]
    fn swipes_count_after_the_action() {
        let mut session = session(40, 10);

        session.dislike(&id("p1"));
        assert_eq!(session.engine().temp_dislikes(), vec![(id("p1"), 0)]);
        assert_eq!(session.engine().total_swipes(), 1);

        assert!(session.like(&id("p2")));
        assert_eq!(session.engine().total_swipes(), 2);
        assert_eq!(session.wishlist().len(), 1);
        assert!(session.take_dirty());
        assert!(!session.take_dirty());
    }

    #[test]
    fn unknown_ids_do_not_count_as_swipes() {
        let mut session = session(10, 5);

        assert!(!session.like(&id("nope")));
        assert_eq!(session.dislike(&id("nope")), DislikeOutcome::Ignored);
        assert_eq!(session.engine().total_swipes(), 0);
        assert!(!session.take_dirty());
    }

    #[test]
    fn repeated_like_keeps_one_wishlist_entry() {
        let mut session = session(10, 5);

        session.like(&id("p3"));
        assert!(!session.like(&id("p3")));
        assert_eq!(session.wishlist().len(), 1);
        assert_eq!(session.engine().total_swipes(), 2);
    }

    #[test]
    fn feed_extends_near_the_end() {
        let mut session = session(100, 10);
        session.start();

        // 10 items, threshold max(3, 5) = 5: index 3 leaves 6 remaining.
        assert_eq!(session.load_more_if_needed(3), 0);
        assert_eq!(session.load_more_if_needed(4), 10);
        assert_eq!(session.feed().len(), 20);
    }

    #[test]
    fn load_fresh_replaces_feed_and_forgets_shown() {
        let mut session = session(40, 6);
        session.start();
        assert_eq!(session.load_more_if_needed(3), 6);
        assert_eq!(session.feed().len(), 12);
        assert_eq!(session.engine().shown_items().len(), 12);
        session.take_dirty();

        assert_eq!(session.load_fresh(), 6);
        assert_eq!(session.feed().len(), 6);
        let fresh = session.feed().iter().map(|rec| rec.item.id.clone()).collect::<Vec<_>>();
        assert_eq!(session.engine().shown_items(), fresh);
        assert!(session.take_dirty());
    }

    #[test]
    fn restore_from_seeded_store() {
        let snapshot = SessionSnapshot {
            wishlist: Vec::new(),
            engine: EngineSnapshot {
                wishlist: Some(vec![id("p2")]),
                total_swipes: Some(4),
                ..EngineSnapshot::default()
            },
        };
        let store = MemoryStore::with_snapshot(snapshot);
        let mut session = session(10, 5);

        session.restore_from(&store);

        assert_eq!(session.engine().total_swipes(), 4);
        let ids = session.wishlist().iter().map(|entry| entry.item.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids, vec![id("p2")]);
        assert!(!session.take_dirty());
    }

    #[test]
    fn remove_from_wishlist_updates_engine() {
        let mut session = session(10, 5);
        session.like(&id("p0"));

        assert!(session.remove_from_wishlist(&id("p0")));
        assert!(session.wishlist().is_empty());
        assert!(session.engine().wishlist().is_empty());
        assert!(!session.remove_from_wishlist(&id("p0")));
    }

    #[test]
    fn clear_all_starts_over() {
        let mut session = session(30, 5);
        session.start();
        session.like(&id("p0"));
        session.dislike(&id("p1"));

        assert_eq!(session.clear_all(), 5);
        assert!(session.wishlist().is_empty());
        assert_eq!(session.engine().total_swipes(), 0);
        assert!(session.engine().temp_dislikes().is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_memory_store() {
        let store = MemoryStore::new();
        let mut original = session(30, 5);
        original.like(&id("p4"));
        original.like(&id("p8"));
        original.dislike(&id("p5"));
        assert!(original.save_if_dirty(&store).expect("save"));
        assert!(!original.save_if_dirty(&store).expect("second save"));

        let mut restored = session(30, 5);
        restored.restore_from(&store);

        assert_eq!(restored.wishlist(), original.wishlist());
        assert_eq!(restored.engine().wishlist(), vec![id("p4"), id("p8")]);
        assert_eq!(restored.engine().temp_dislikes(), vec![(id("p5"), 2)]);
        assert_eq!(restored.engine().total_swipes(), 3);
    }

    #[test]
    fn restore_reconciles_wishlist_with_engine() {
        let mut session = session(10, 5);
        let stale = WishlistEntry {
            item: CatalogItem::new("p9", "Piece 9"),
            added_at: Utc::now(),
        };

        session.restore(SessionSnapshot {
            wishlist: vec![stale],
            engine: EngineSnapshot {
                wishlist: Some(vec![id("p1")]),
                ..EngineSnapshot::default()
            },
        });

        let ids = session.wishlist().iter().map(|entry| entry.item.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids, vec![id("p1")]);
    }

    #[test]
    fn lenient_decode_skips_bad_entries() {
        let raw = r#"{
            "wishlist": [
                {"item": {"id": "p1", "name": "Piece 1"}, "addedAt": "2024-03-01T10:00:00Z"},
                {"item": "broken"}
            ],
            "engine": {"wishlistItems": ["p1"], "totalSwipes": "many"}
        }"#;

        let snapshot = SessionSnapshot::from_json(raw).expect("decode");

        assert_eq!(snapshot.wishlist.len(), 1);
        assert_eq!(snapshot.engine.wishlist, Some(vec![id("p1")]));
        assert_eq!(snapshot.engine.total_swipes, None);
    }

    #[test]
    fn out_of_feed_batches_are_remembered_as_shown() {
        let mut session = session(12, 4);

        let first = session.recommend(6);
        assert_eq!(first.len(), 6);
        assert!(session.take_dirty());
        assert_eq!(session.engine().shown_items().len(), 6);

        session.reset_shown();
        assert!(session.engine().shown_items().is_empty());
        assert!(session.take_dirty());
    }

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn load(&self) -> Result<Option<SessionSnapshot>, StoreError> {
            Err(StoreError::Unavailable("offline".to_owned()))
        }

        fn save(&self, _: &SessionSnapshot) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_owned()))
        }

        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn failing_store_leaves_session_fresh_and_dirty() {
        let mut session = session(10, 5);
        session.restore_from(&FailingStore);
        assert!(session.engine().wishlist().is_empty());

        session.like(&id("p0"));
        assert!(session.save_if_dirty(&FailingStore).is_err());
        assert!(session.take_dirty());
    }
}
