pub mod commands;
pub mod logging;
pub mod store;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use swipefit_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use crate::commands::simulate::SimulateArgs;
use crate::commands::swipe::SwipeAction;

#[derive(Debug, Parser)]
#[command(
    name = "swipefit",
    about = "SwipeFit recommendation CLI",
    long_about = "Drive a swipe recommendation session from the terminal: fetch batches, record likes and dislikes, inspect saved state, and run seeded simulations.",
    after_help = "Examples:\n  swipefit recommend --count 5\n  swipefit swipe like sku-104\n  swipefit simulate --swipes 100 --seed 7"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Config file to load (must exist when given)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Catalog JSON file")]
    catalog: Option<PathBuf>,
    #[arg(long, global = true, help = "Session state file")]
    state: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Items per recommendation batch")]
    batch_size: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Print the next recommendation batch and remember it as shown")]
    Recommend {
        #[arg(long, help = "Batch size (defaults to session.batch_size)")]
        count: Option<usize>,
    },
    #[command(about = "Record a like or dislike for one catalog item")]
    Swipe {
        #[arg(value_enum)]
        action: SwipeAction,
        item_id: String,
    },
    #[command(about = "Remove an item from the wishlist")]
    Unlike { item_id: String },
    #[command(about = "Clear saved state, or only the shown history")]
    Reset {
        #[arg(long, help = "Keep wishlist and dislikes; forget recently shown items")]
        shown_only: bool,
    },
    #[command(about = "Summarize the saved session state")]
    State,
    #[command(about = "Run a seeded in-memory session and report what the engine served")]
    Simulate {
        #[arg(long, default_value_t = 50)]
        swipes: usize,
        #[arg(long, help = "RNG seed (defaults to engine.seed, then 42)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 0.3)]
        like_rate: f64,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                catalog_path: self.catalog.clone(),
                state_path: self.state.clone(),
                log_level: self.log_level.clone(),
                engine_seed: None,
                batch_size: self.batch_size,
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let mut options = cli.global.load_options();
    if let Command::Simulate { seed: Some(seed), .. } = &cli.command {
        options.overrides.engine_seed = Some(*seed);
    }

    // Config errors are reported by the command itself.
    if let Ok(config) = AppConfig::load(options.clone()) {
        if let Err(error) = logging::init_logging(&config.logging) {
            eprintln!("{error:#}");
        }
    }

    let result = match cli.command {
        Command::Recommend { count } => commands::recommend::run(options, count),
        Command::Swipe { action, item_id } => commands::swipe::run(options, action, &item_id),
        Command::Unlike { item_id } => commands::unlike::run(options, &item_id),
        Command::Reset { shown_only } => commands::reset::run(options, shown_only),
        Command::State => commands::state::run(options),
        Command::Simulate { swipes, like_rate, .. } => {
            commands::simulate::run(options, SimulateArgs { swipes, like_rate })
        }
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
