use std::env;
use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value as JsonValue};
use swipefit_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LoadOptions};
use swipefit_core::errors::ApplicationError;
use toml::Value;

use crate::commands::CommandResult;

/// One reported setting: dotted key, optional env var, rendered value.
struct Field<'a> {
    key: &'static str,
    env_keys: &'a [&'static str],
    value: JsonValue,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let flags = flag_overrides(&options.overrides);
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &ApplicationError::from(error)),
    };
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let engine = &config.engine;
    let scoring = &config.scoring;
    let fields = [
        Field {
            key: "catalog.path",
            env_keys: &["SWIPEFIT_CATALOG_PATH"],
            value: json!(config.catalog.path.display().to_string()),
        },
        Field {
            key: "state.path",
            env_keys: &["SWIPEFIT_STATE_PATH"],
            value: json!(config.state.path.display().to_string()),
        },
        Field {
            key: "engine.temp_dislike_cooldown",
            env_keys: &["SWIPEFIT_ENGINE_COOLDOWN_SWIPES"],
            value: json!(engine.temp_dislike_cooldown),
        },
        Field {
            key: "engine.exploration_interval",
            env_keys: &["SWIPEFIT_ENGINE_EXPLORATION_INTERVAL"],
            value: json!(engine.exploration_interval),
        },
        Field {
            key: "engine.recent_dislike_window",
            env_keys: &[],
            value: json!(engine.recent_dislike_window),
        },
        Field {
            key: "engine.similarity_threshold",
            env_keys: &[],
            value: json!(engine.similarity_threshold),
        },
        Field {
            key: "engine.similar_suppression_probability",
            env_keys: &[],
            value: json!(engine.similar_suppression_probability),
        },
        Field { key: "engine.recency_window", env_keys: &[], value: json!(engine.recency_window) },
        Field {
            key: "engine.shortlist_factor",
            env_keys: &[],
            value: json!(engine.shortlist_factor),
        },
        Field { key: "engine.score_jitter", env_keys: &[], value: json!(engine.score_jitter) },
        Field {
            key: "engine.shown_history_cap",
            env_keys: &[],
            value: json!(engine.shown_history_cap),
        },
        Field { key: "engine.seed", env_keys: &["SWIPEFIT_ENGINE_SEED"], value: json!(engine.seed) },
        Field { key: "scoring.category", env_keys: &[], value: json!(scoring.category) },
        Field { key: "scoring.subcategory", env_keys: &[], value: json!(scoring.subcategory) },
        Field { key: "scoring.brand", env_keys: &[], value: json!(scoring.brand) },
        Field { key: "scoring.style", env_keys: &[], value: json!(scoring.style) },
        Field { key: "scoring.color", env_keys: &[], value: json!(scoring.color) },
        Field { key: "scoring.price_range", env_keys: &[], value: json!(scoring.price_range) },
        Field {
            key: "session.batch_size",
            env_keys: &["SWIPEFIT_SESSION_BATCH_SIZE"],
            value: json!(config.session.batch_size),
        },
        Field {
            key: "session.min_low_water_mark",
            env_keys: &[],
            value: json!(config.session.min_low_water_mark),
        },
        Field {
            key: "logging.level",
            env_keys: &["SWIPEFIT_LOGGING_LEVEL", "SWIPEFIT_LOG_LEVEL"],
            value: json!(config.logging.level),
        },
        Field {
            key: "logging.format",
            env_keys: &["SWIPEFIT_LOGGING_FORMAT", "SWIPEFIT_LOG_FORMAT"],
            value: json!(config.logging.format),
        },
    ];

    let mut settings = Map::new();
    for field in fields {
        let source = match flags.iter().find(|(key, _)| *key == field.key) {
            Some((_, flag)) => format!("flag ({flag})"),
            None => field_source(
                field.key,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        };
        settings.insert(field.key.to_string(), json!({ "value": field.value, "source": source }));
    }

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: flag > env > file > default)",
        json!({
            "config_file": config_file_path.map(|path| path.display().to_string()),
            "settings": settings,
        }),
    )
}

fn flag_overrides(overrides: &ConfigOverrides) -> Vec<(&'static str, &'static str)> {
    let mut flags = Vec::new();
    if overrides.catalog_path.is_some() {
        flags.push(("catalog.path", "--catalog"));
    }
    if overrides.state_path.is_some() {
        flags.push(("state.path", "--state"));
    }
    if overrides.log_level.is_some() {
        flags.push(("logging.level", "--log-level"));
    }
    if overrides.batch_size.is_some() {
        flags.push(("session.batch_size", "--batch-size"));
    }
    flags
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        if env::var(env_key).is_ok_and(|value| !value.trim().is_empty()) {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
