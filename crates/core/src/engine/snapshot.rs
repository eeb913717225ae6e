//! Serializable engine state
//!
//! Field names follow the persisted layout written by earlier app releases,
//! so existing saved state keeps restoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::ItemId;
use crate::errors::SnapshotError;

const WISHLIST_KEY: &str = "wishlistItems";
const TEMP_DISLIKES_KEY: &str = "firstTimeDislikes";
const PERMANENT_DISLIKES_KEY: &str = "permanentDislikes";
const TOTAL_SWIPES_KEY: &str = "totalSwipes";
const SHOWN_KEY: &str = "shownItems";

/// Plain snapshot of the engine's mutable state. Every field is optional so a
/// partial snapshot restores only what it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    #[serde(rename = "wishlistItems", default, skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<Vec<ItemId>>,
    #[serde(rename = "firstTimeDislikes", default, skip_serializing_if = "Option::is_none")]
    pub temp_dislikes: Option<BTreeMap<ItemId, u64>>,
    #[serde(rename = "permanentDislikes", default, skip_serializing_if = "Option::is_none")]
    pub permanent_dislikes: Option<Vec<ItemId>>,
    #[serde(rename = "totalSwipes", default, skip_serializing_if = "Option::is_none")]
    pub total_swipes: Option<u64>,
    #[serde(rename = "shownItems", default, skip_serializing_if = "Option::is_none")]
    pub shown: Option<Vec<ItemId>>,
}

impl EngineSnapshot {
    /// Lenient decode: each field is read on its own and malformed fields or
    /// entries are dropped instead of failing the whole snapshot.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            warn!(
                event_name = "engine.snapshot.not_an_object",
                "engine snapshot is not a JSON object; ignoring it"
            );
            return Self::default();
        };

        Self {
            wishlist: field(object, WISHLIST_KEY, id_list),
            temp_dislikes: field(object, TEMP_DISLIKES_KEY, swipe_index_map),
            permanent_dislikes: field(object, PERMANENT_DISLIKES_KEY, id_list),
            total_swipes: field(object, TOTAL_SWIPES_KEY, swipe_index),
            shown: field(object, SHOWN_KEY, id_list),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw).map_err(SnapshotError::Decode)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn field<T>(
    object: &Map<String, Value>,
    key: &'static str,
    decode: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let raw = object.get(key)?;
    if raw.is_null() {
        return None;
    }
    let decoded = decode(raw);
    if decoded.is_none() {
        warn!(event_name = "engine.snapshot.field_ignored", field = key, "malformed snapshot field");
    }
    decoded
}

fn id_list(value: &Value) -> Option<Vec<ItemId>> {
    let entries = value.as_array()?;
    Some(entries.iter().filter_map(item_id).collect())
}

fn swipe_index_map(value: &Value) -> Option<BTreeMap<ItemId, u64>> {
    let entries = value.as_object()?;
    Some(
        entries
            .iter()
            .filter_map(|(id, at)| swipe_index(at).map(|at| (ItemId::new(id.clone()), at)))
            .collect(),
    )
}

fn item_id(value: &Value) -> Option<ItemId> {
    match value {
        Value::String(id) if !id.is_empty() => Some(ItemId::new(id.clone())),
        Value::Number(number) => Some(ItemId::new(number.to_string())),
        _ => None,
    }
}

fn swipe_index(value: &Value) -> Option<u64> {
    if let Some(index) = value.as_u64() {
        return Some(index);
    }
    match value.as_f64() {
        Some(index) if index.is_finite() && index >= 0.0 => Some(index.trunc() as u64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_with_persisted_key_names() {
        let snapshot = EngineSnapshot {
            wishlist: Some(vec![ItemId::new("a")]),
            temp_dislikes: Some(BTreeMap::from([(ItemId::new("b"), 4)])),
            permanent_dislikes: Some(vec![ItemId::new("c")]),
            total_swipes: Some(9),
            shown: Some(vec![ItemId::new("a"), ItemId::new("d")]),
        };

        let value = serde_json::to_value(&snapshot).expect("encode");
        assert_eq!(
            value,
            json!({
                "wishlistItems": ["a"],
                "firstTimeDislikes": {"b": 4},
                "permanentDislikes": ["c"],
                "totalSwipes": 9,
                "shownItems": ["a", "d"]
            })
        );
    }

    #[test]
    fn malformed_fields_are_dropped_independently() {
        let snapshot = EngineSnapshot::from_value(&json!({
            "wishlistItems": "not-a-list",
            "firstTimeDislikes": {"b": 4, "c": "soon", "d": 7.9},
            "permanentDislikes": ["x", 42, null, {"id": "y"}],
            "totalSwipes": -3
        }));

        assert_eq!(snapshot.wishlist, None);
        assert_eq!(
            snapshot.temp_dislikes,
            Some(BTreeMap::from([(ItemId::new("b"), 4), (ItemId::new("d"), 7)]))
        );
        assert_eq!(snapshot.permanent_dislikes, Some(vec![ItemId::new("x"), ItemId::new("42")]));
        assert_eq!(snapshot.total_swipes, None);
        assert_eq!(snapshot.shown, None);
    }

    #[test]
    fn non_object_snapshot_decodes_to_empty() {
        assert!(EngineSnapshot::from_value(&json!([1, 2, 3])).is_empty());
        assert!(EngineSnapshot::from_value(&Value::Null).is_empty());
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let error = EngineSnapshot::from_json("{not json").expect_err("must fail");
        assert!(matches!(error, SnapshotError::Decode(_)));
    }

    #[test]
    fn json_text_round_trips() {
        let snapshot = EngineSnapshot {
            wishlist: Some(vec![ItemId::new("a"), ItemId::new("b")]),
            total_swipes: Some(0),
            ..EngineSnapshot::default()
        };

        let restored = EngineSnapshot::from_json(&snapshot.to_json().expect("encode"))
            .expect("decode");
        assert_eq!(restored, snapshot);
    }
}
