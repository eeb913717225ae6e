pub mod config;
pub mod recommend;
pub mod reset;
pub mod simulate;
pub mod state;
pub mod swipe;
pub mod unlike;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use swipefit_core::config::{AppConfig, LoadOptions};
use swipefit_core::engine::Recommendation;
use swipefit_core::errors::ApplicationError;
use swipefit_core::session::{SnapshotStore, SwipeSession};
use swipefit_core::{Catalog, RecommendationEngine};

use crate::store::JsonFileStore;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::ok(command, message.into(), None)
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: Value) -> Self {
        Self::ok(command, message.into(), Some(data))
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    fn ok(command: &str, message: String, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Config, catalog and the saved session, ready for one command.
pub(crate) struct Workspace {
    pub config: AppConfig,
    pub session: SwipeSession,
    pub store: JsonFileStore,
}

impl Workspace {
    pub(crate) fn open(options: LoadOptions) -> Result<Self, ApplicationError> {
        let config = AppConfig::load(options)?;
        let catalog = Arc::new(Catalog::load(&config.catalog.path)?);
        let engine = RecommendationEngine::with_config(catalog, config.engine.clone())
            .with_scoring_weights(config.scoring);
        let mut session = SwipeSession::new(engine, config.session.clone());

        let store = JsonFileStore::new(&config.state.path);
        if let Some(snapshot) = store.load()? {
            session.restore(snapshot);
        }

        Ok(Self { config, session, store })
    }

    pub(crate) fn save(&mut self) -> Result<bool, ApplicationError> {
        Ok(self.session.save_if_dirty(&self.store)?)
    }
}

pub(crate) fn recommendation_json(recommendation: &Recommendation) -> Value {
    let item = &recommendation.item;
    json!({
        "id": item.id,
        "name": item.name,
        "brand": item.brand,
        "category": item.category,
        "color": item.color,
        "price": item.price,
        "source": recommendation.source,
        "reason": recommendation.source.description(),
        "score": recommendation.score,
    })
}
