use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::ScoringWeights;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub state: StateConfig,
    pub engine: EngineConfig,
    pub scoring: ScoringWeights,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct StateConfig {
    pub path: PathBuf,
}

/// Tunables for the recommendation engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Swipes a first-time dislike stays hidden.
    pub temp_dislike_cooldown: u64,
    /// Every this many swipes one batch slot goes to a random pick.
    pub exploration_interval: u64,
    /// How many of the latest temp dislikes feed similarity suppression.
    pub recent_dislike_window: usize,
    pub similarity_threshold: f64,
    pub similar_suppression_probability: f64,
    /// Ids among the latest this-many shown entries are not repeated.
    pub recency_window: usize,
    /// Shortlist size as a multiple of the requested count.
    pub shortlist_factor: usize,
    pub score_jitter: f64,
    pub shown_history_cap: usize,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub batch_size: usize,
    pub min_low_water_mark: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub state_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub engine_seed: Option<u64>,
    pub batch_size: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temp_dislike_cooldown: 25,
            exploration_interval: 10,
            recent_dislike_window: 5,
            similarity_threshold: 0.6,
            similar_suppression_probability: 0.7,
            recency_window: 20,
            shortlist_factor: 3,
            score_jitter: 0.5,
            shown_history_cap: 1000,
            seed: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { batch_size: 10, min_low_water_mark: 3 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig { path: PathBuf::from("data/catalog.json") },
            state: StateConfig { path: PathBuf::from("swipefit-state.json") },
            engine: EngineConfig::default(),
            scoring: ScoringWeights::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("swipefit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = path;
            }
        }

        if let Some(state) = patch.state {
            if let Some(path) = state.path {
                self.state.path = path;
            }
        }

        if let Some(engine) = patch.engine {
            let target = &mut self.engine;
            if let Some(value) = engine.temp_dislike_cooldown {
                target.temp_dislike_cooldown = value;
            }
            if let Some(value) = engine.exploration_interval {
                target.exploration_interval = value;
            }
            if let Some(value) = engine.recent_dislike_window {
                target.recent_dislike_window = value;
            }
            if let Some(value) = engine.similarity_threshold {
                target.similarity_threshold = value;
            }
            if let Some(value) = engine.similar_suppression_probability {
                target.similar_suppression_probability = value;
            }
            if let Some(value) = engine.recency_window {
                target.recency_window = value;
            }
            if let Some(value) = engine.shortlist_factor {
                target.shortlist_factor = value;
            }
            if let Some(value) = engine.score_jitter {
                target.score_jitter = value;
            }
            if let Some(value) = engine.shown_history_cap {
                target.shown_history_cap = value;
            }
            if let Some(value) = engine.seed {
                target.seed = Some(value);
            }
        }

        if let Some(scoring) = patch.scoring {
            let target = &mut self.scoring;
            if let Some(value) = scoring.category {
                target.category = value;
            }
            if let Some(value) = scoring.subcategory {
                target.subcategory = value;
            }
            if let Some(value) = scoring.brand {
                target.brand = value;
            }
            if let Some(value) = scoring.style {
                target.style = value;
            }
            if let Some(value) = scoring.color {
                target.color = value;
            }
            if let Some(value) = scoring.price_range {
                target.price_range = value;
            }
        }

        if let Some(session) = patch.session {
            if let Some(batch_size) = session.batch_size {
                self.session.batch_size = batch_size;
            }
            if let Some(min_low_water_mark) = session.min_low_water_mark {
                self.session.min_low_water_mark = min_low_water_mark;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SWIPEFIT_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("SWIPEFIT_STATE_PATH") {
            self.state.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("SWIPEFIT_ENGINE_COOLDOWN_SWIPES") {
            self.engine.temp_dislike_cooldown =
                parse_u64("SWIPEFIT_ENGINE_COOLDOWN_SWIPES", &value)?;
        }
        if let Some(value) = read_env("SWIPEFIT_ENGINE_EXPLORATION_INTERVAL") {
            self.engine.exploration_interval =
                parse_u64("SWIPEFIT_ENGINE_EXPLORATION_INTERVAL", &value)?;
        }
        if let Some(value) = read_env("SWIPEFIT_ENGINE_SEED") {
            self.engine.seed = Some(parse_u64("SWIPEFIT_ENGINE_SEED", &value)?);
        }

        if let Some(value) = read_env("SWIPEFIT_SESSION_BATCH_SIZE") {
            self.session.batch_size = parse_usize("SWIPEFIT_SESSION_BATCH_SIZE", &value)?;
        }

        let log_level =
            read_env("SWIPEFIT_LOGGING_LEVEL").or_else(|| read_env("SWIPEFIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SWIPEFIT_LOGGING_FORMAT").or_else(|| read_env("SWIPEFIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = catalog_path;
        }
        if let Some(state_path) = overrides.state_path {
            self.state.path = state_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(seed) = overrides.engine_seed {
            self.engine.seed = Some(seed);
        }
        if let Some(batch_size) = overrides.batch_size {
            self.session.batch_size = batch_size;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_engine(&self.engine)?;
        validate_scoring(&self.scoring)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("swipefit.toml"), PathBuf::from("config/swipefit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.temp_dislike_cooldown == 0 {
        return Err(ConfigError::Validation(
            "engine.temp_dislike_cooldown must be greater than zero".to_string(),
        ));
    }
    if engine.exploration_interval == 0 {
        return Err(ConfigError::Validation(
            "engine.exploration_interval must be greater than zero".to_string(),
        ));
    }
    if engine.shortlist_factor == 0 {
        return Err(ConfigError::Validation(
            "engine.shortlist_factor must be greater than zero".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&engine.similarity_threshold) {
        return Err(ConfigError::Validation(
            "engine.similarity_threshold must be in range 0.0..=1.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&engine.similar_suppression_probability) {
        return Err(ConfigError::Validation(
            "engine.similar_suppression_probability must be in range 0.0..=1.0".to_string(),
        ));
    }
    if !engine.score_jitter.is_finite() || engine.score_jitter < 0.0 {
        return Err(ConfigError::Validation(
            "engine.score_jitter must be a finite, non-negative number".to_string(),
        ));
    }
    if engine.shown_history_cap < engine.recency_window {
        return Err(ConfigError::Validation(
            "engine.shown_history_cap must be at least engine.recency_window".to_string(),
        ));
    }

    Ok(())
}

fn validate_scoring(scoring: &ScoringWeights) -> Result<(), ConfigError> {
    let weights = [
        ("category", scoring.category),
        ("subcategory", scoring.subcategory),
        ("brand", scoring.brand),
        ("style", scoring.style),
        ("color", scoring.color),
        ("price_range", scoring.price_range),
    ];

    for (name, weight) in weights {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "scoring.{name} must be a finite, non-negative weight"
            )));
        }
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.batch_size == 0 {
        return Err(ConfigError::Validation(
            "session.batch_size must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<PathPatch>,
    state: Option<PathPatch>,
    engine: Option<EnginePatch>,
    scoring: Option<ScoringPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PathPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    temp_dislike_cooldown: Option<u64>,
    exploration_interval: Option<u64>,
    recent_dislike_window: Option<usize>,
    similarity_threshold: Option<f64>,
    similar_suppression_probability: Option<f64>,
    recency_window: Option<usize>,
    shortlist_factor: Option<usize>,
    score_jitter: Option<f64>,
    shown_history_cap: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    category: Option<f64>,
    subcategory: Option<f64>,
    brand: Option<f64>,
    style: Option<f64>,
    color: Option<f64>,
    price_range: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    batch_size: Option<usize>,
    min_low_water_mark: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
