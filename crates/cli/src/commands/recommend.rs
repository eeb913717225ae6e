use serde_json::json;
use swipefit_core::config::LoadOptions;
use swipefit_core::engine::RecommendationSource;

use crate::commands::{recommendation_json, CommandResult, Workspace};

pub fn run(options: LoadOptions, count: Option<usize>) -> CommandResult {
    let mut workspace = match Workspace::open(options) {
        Ok(workspace) => workspace,
        Err(error) => return CommandResult::from_error("recommend", &error),
    };

    let count = count.unwrap_or(workspace.config.session.batch_size);
    let batch = workspace.session.recommend(count);
    if let Err(error) = workspace.save() {
        return CommandResult::from_error("recommend", &error);
    }

    let exploration =
        batch.iter().filter(|rec| rec.source == RecommendationSource::Exploration).count();
    let message = if batch.is_empty() {
        "no items available; try `reset --shown-only`".to_string()
    } else {
        format!("{} recommendation(s), {exploration} exploration", batch.len())
    };

    CommandResult::success_with_data(
        "recommend",
        message,
        json!({
            "requested": count,
            "total_swipes": workspace.session.engine().total_swipes(),
            "items": batch.iter().map(recommendation_json).collect::<Vec<_>>(),
        }),
    )
}
