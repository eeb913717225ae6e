use clap::ValueEnum;
use serde_json::json;
use swipefit_core::config::LoadOptions;
use swipefit_core::{DislikeOutcome, ItemId};

use crate::commands::{CommandResult, Workspace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SwipeAction {
    Like,
    Dislike,
}

pub fn run(options: LoadOptions, action: SwipeAction, item_id: &str) -> CommandResult {
    let mut workspace = match Workspace::open(options) {
        Ok(workspace) => workspace,
        Err(error) => return CommandResult::from_error("swipe", &error),
    };

    let id = ItemId::new(item_id);
    if !workspace.session.engine().catalog().contains(&id) {
        return CommandResult::failure(
            "swipe",
            "unknown_item",
            format!("item `{item_id}` is not in the catalog"),
            5,
        );
    }

    let (outcome, message) = match action {
        SwipeAction::Like => {
            let added = workspace.session.like(&id);
            let message = if added {
                format!("added `{item_id}` to the wishlist")
            } else {
                format!("`{item_id}` is already in the wishlist")
            };
            ("liked", message)
        }
        SwipeAction::Dislike => match workspace.session.dislike(&id) {
            DislikeOutcome::Temporary => {
                let cooldown = workspace.config.engine.temp_dislike_cooldown;
                ("temporary", format!("hid `{item_id}` for {cooldown} swipes"))
            }
            DislikeOutcome::Permanent => ("permanent", format!("hid `{item_id}` for good")),
            DislikeOutcome::Ignored => {
                ("ignored", format!("`{item_id}` is wishlisted or already hidden for good"))
            }
        },
    };

    if let Err(error) = workspace.save() {
        return CommandResult::from_error("swipe", &error);
    }

    let engine = workspace.session.engine();
    CommandResult::success_with_data(
        "swipe",
        message,
        json!({
            "item_id": id,
            "outcome": outcome,
            "total_swipes": engine.total_swipes(),
            "wishlist_size": engine.wishlist().len(),
        }),
    )
}
