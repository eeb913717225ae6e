use serde_json::json;
use swipefit_core::config::{AppConfig, LoadOptions};
use swipefit_core::errors::ApplicationError;
use swipefit_core::session::SnapshotStore;

use crate::commands::CommandResult;
use crate::store::JsonFileStore;

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("state", &ApplicationError::from(error)),
    };

    let store = JsonFileStore::new(&config.state.path);
    let snapshot = match store.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            return CommandResult::success(
                "state",
                format!("no saved state at `{}`", config.state.path.display()),
            )
        }
        Err(error) => return CommandResult::from_error("state", &ApplicationError::from(error)),
    };

    let engine = &snapshot.engine;
    let count = |ids: &Option<Vec<_>>| ids.as_ref().map_or(0, Vec::len);
    CommandResult::success_with_data(
        "state",
        format!("saved state at `{}`", config.state.path.display()),
        json!({
            "wishlist": snapshot.wishlist.iter().map(|entry| json!({
                "id": entry.item.id,
                "name": entry.item.name,
                "added_at": entry.added_at,
            })).collect::<Vec<_>>(),
            "wishlist_size": count(&engine.wishlist),
            "temp_dislikes": engine.temp_dislikes.as_ref().map_or(0, |map| map.len()),
            "permanent_dislikes": count(&engine.permanent_dislikes),
            "shown_items": count(&engine.shown),
            "total_swipes": engine.total_swipes.unwrap_or(0),
        }),
    )
}
