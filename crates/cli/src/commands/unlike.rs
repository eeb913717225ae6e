use swipefit_core::config::LoadOptions;
use swipefit_core::ItemId;

use crate::commands::{CommandResult, Workspace};

pub fn run(options: LoadOptions, item_id: &str) -> CommandResult {
    let mut workspace = match Workspace::open(options) {
        Ok(workspace) => workspace,
        Err(error) => return CommandResult::from_error("unlike", &error),
    };

    if !workspace.session.remove_from_wishlist(&ItemId::new(item_id)) {
        return CommandResult::success("unlike", format!("`{item_id}` was not in the wishlist"));
    }
    if let Err(error) = workspace.save() {
        return CommandResult::from_error("unlike", &error);
    }

    CommandResult::success("unlike", format!("removed `{item_id}` from the wishlist"))
}
