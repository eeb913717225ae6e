//! Per-item interaction status
//!
//! A single id → status map is the only record of likes and dislikes, so an
//! id can never be wishlisted and disliked at the same time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ItemId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ItemStatus {
    Neutral,
    Wishlisted,
    /// Disliked once at the given swipe index.
    TempDisliked { at_swipe: u64 },
    PermanentDisliked,
}

/// What a dislike did to an item's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DislikeOutcome {
    Temporary,
    Permanent,
    /// Wishlisted, already permanent, or not in the catalog.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LedgerEntry {
    status: ItemStatus,
    seq: u64,
}

#[derive(Clone, Debug, Default)]
pub struct StatusLedger {
    entries: HashMap<ItemId, LedgerEntry>,
    next_seq: u64,
}

impl StatusLedger {
    pub fn status(&self, id: &ItemId) -> ItemStatus {
        self.entries.get(id).map(|entry| entry.status).unwrap_or(ItemStatus::Neutral)
    }

    /// Returns `true` when the id was not already wishlisted.
    pub fn like(&mut self, id: &ItemId) -> bool {
        if self.status(id) == ItemStatus::Wishlisted {
            return false;
        }
        self.set(id.clone(), ItemStatus::Wishlisted);
        true
    }

    pub fn dislike(&mut self, id: &ItemId, at_swipe: u64) -> DislikeOutcome {
        match self.status(id) {
            ItemStatus::Neutral => {
                self.set(id.clone(), ItemStatus::TempDisliked { at_swipe });
                DislikeOutcome::Temporary
            }
            ItemStatus::TempDisliked { .. } => {
                self.set(id.clone(), ItemStatus::PermanentDisliked);
                DislikeOutcome::Permanent
            }
            ItemStatus::Wishlisted | ItemStatus::PermanentDisliked => DislikeOutcome::Ignored,
        }
    }

    /// Returns `true` when the id was wishlisted.
    pub fn unlike(&mut self, id: &ItemId) -> bool {
        if self.status(id) != ItemStatus::Wishlisted {
            return false;
        }
        self.entries.remove(id);
        true
    }

    /// Returns a temp-disliked id to neutral. Other statuses are left alone.
    pub fn evict_temp(&mut self, id: &ItemId) -> bool {
        if matches!(self.status(id), ItemStatus::TempDisliked { .. }) {
            self.entries.remove(id);
            true
        } else {
            false
        }
    }

    /// Overwrites the status, moving the id to the end of its group's order.
    pub fn set(&mut self, id: ItemId, status: ItemStatus) {
        if status == ItemStatus::Neutral {
            self.entries.remove(&id);
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(id, LedgerEntry { status, seq });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_seq = 0;
    }

    /// Wishlisted ids in the order they were liked.
    pub fn wishlist(&self) -> Vec<ItemId> {
        self.ordered(|status| matches!(status, ItemStatus::Wishlisted))
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// Temp dislikes with their swipe index, oldest first.
    pub fn temp_dislikes(&self) -> Vec<(ItemId, u64)> {
        self.ordered(|status| matches!(status, ItemStatus::TempDisliked { .. }))
            .into_iter()
            .filter_map(|(id, status)| match status {
                ItemStatus::TempDisliked { at_swipe } => Some((id, at_swipe)),
                _ => None,
            })
            .collect()
    }

    pub fn permanent_dislikes(&self) -> Vec<ItemId> {
        self.ordered(|status| matches!(status, ItemStatus::PermanentDisliked))
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    pub fn wishlist_len(&self) -> usize {
        self.entries.values().filter(|entry| entry.status == ItemStatus::Wishlisted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ordered(&self, keep: impl Fn(ItemStatus) -> bool) -> Vec<(ItemId, ItemStatus)> {
        let mut selected = self
            .entries
            .iter()
            .filter(|(_, entry)| keep(entry.status))
            .map(|(id, entry)| (entry.seq, id.clone(), entry.status))
            .collect::<Vec<_>>();
        selected.sort_by_key(|(seq, _, _)| *seq);
        selected.into_iter().map(|(_, id, status)| (id, status)).collect()
    }
}
