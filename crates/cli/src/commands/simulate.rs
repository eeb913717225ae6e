use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use swipefit_core::config::{AppConfig, LoadOptions};
use swipefit_core::engine::RecommendationSource;
use swipefit_core::errors::ApplicationError;
use swipefit_core::session::SwipeSession;
use swipefit_core::{Attribute, Catalog, RecommendationEngine};

use crate::commands::CommandResult;

const DEFAULT_SEED: u64 = 42;

#[derive(Clone, Copy, Debug)]
pub struct SimulateArgs {
    pub swipes: usize,
    pub like_rate: f64,
}

#[derive(Debug, Default)]
struct Tally {
    swipes: usize,
    likes: usize,
    dislikes: usize,
    exploration_shown: usize,
    exploration_liked: usize,
    batches: usize,
}

/// Scripted in-memory session: swipes through the feed with a fixed like rate
/// and reports what the engine served. Nothing is written to the state file.
pub fn run(options: LoadOptions, args: SimulateArgs) -> CommandResult {
    if !(0.0..=1.0).contains(&args.like_rate) {
        return CommandResult::failure(
            "simulate",
            "invalid_argument",
            format!("--like-rate must be within 0.0..=1.0, got {}", args.like_rate),
            2,
        );
    }

    match simulate(options, args) {
        Ok(result) => result,
        Err(error) => CommandResult::from_error("simulate", &error),
    }
}

fn simulate(options: LoadOptions, args: SimulateArgs) -> Result<CommandResult, ApplicationError> {
    let config = AppConfig::load(options)?;
    let catalog = Arc::new(Catalog::load(&config.catalog.path)?);
    let seed = config.engine.seed.unwrap_or(DEFAULT_SEED);

    let engine = RecommendationEngine::seeded(catalog, config.engine.clone(), seed)
        .with_scoring_weights(config.scoring);
    let mut session = SwipeSession::new(engine, config.session.clone());
    let mut decisions = StdRng::seed_from_u64(seed.wrapping_add(1));

    let mut tally = Tally { batches: 1, ..Tally::default() };
    session.start();
    let mut index = 0;
    while tally.swipes < args.swipes {
        let Some(current) = session.feed().get(index).cloned() else {
            break;
        };

        let liked = decisions.gen_bool(args.like_rate);
        if current.source == RecommendationSource::Exploration {
            tally.exploration_shown += 1;
            if liked {
                tally.exploration_liked += 1;
            }
        }
        if liked {
            session.like(&current.item.id);
            tally.likes += 1;
        } else {
            session.dislike(&current.item.id);
            tally.dislikes += 1;
        }
        tally.swipes += 1;

        index += 1;
        if session.load_more_if_needed(index) > 0 {
            tally.batches += 1;
        }
    }

    let engine = session.engine();
    let top_categories = engine
        .preferences()
        .top_values(Attribute::Category, 3)
        .into_iter()
        .map(|(value, count)| json!({ "value": value, "count": count }))
        .collect::<Vec<_>>();
    let message = if tally.swipes < args.swipes {
        format!("feed ran dry after {} of {} swipes", tally.swipes, args.swipes)
    } else {
        format!("simulated {} swipes", tally.swipes)
    };

    Ok(CommandResult::success_with_data(
        "simulate",
        message,
        json!({
            "seed": seed,
            "swipes": tally.swipes,
            "likes": tally.likes,
            "dislikes": tally.dislikes,
            "batches": tally.batches,
            "exploration_shown": tally.exploration_shown,
            "exploration_liked": tally.exploration_liked,
            "total_swipes": engine.total_swipes(),
            "wishlist_size": engine.wishlist().len(),
            "temp_dislikes": engine.temp_dislikes().len(),
            "permanent_dislikes": engine.permanent_dislikes().len(),
            "top_categories": top_categories,
        }),
    ))
}
