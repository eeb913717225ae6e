use swipefit_core::config::{AppConfig, LoadOptions};
use swipefit_core::errors::ApplicationError;
use swipefit_core::session::SnapshotStore;

use crate::commands::{CommandResult, Workspace};
use crate::store::JsonFileStore;

/// `shown_only` forgets recently shown items; otherwise all saved state goes.
pub fn run(options: LoadOptions, shown_only: bool) -> CommandResult {
    let result = if shown_only { reset_shown(options) } else { reset_all(options) };

    match result {
        Ok(message) => CommandResult::success("reset", message),
        Err(error) => CommandResult::from_error("reset", &error),
    }
}

fn reset_shown(options: LoadOptions) -> Result<String, ApplicationError> {
    let mut workspace = Workspace::open(options)?;
    workspace.session.reset_shown();
    workspace.save()?;
    Ok("shown history cleared; wishlist and dislikes kept".to_string())
}

fn reset_all(options: LoadOptions) -> Result<String, ApplicationError> {
    let config = AppConfig::load(options)?;
    JsonFileStore::new(&config.state.path).clear()?;
    Ok(format!("cleared saved state at `{}`", config.state.path.display()))
}
