use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use serde_json::{json, Value};
use swipefit_cli::commands::simulate::SimulateArgs;
use swipefit_cli::commands::swipe::SwipeAction;
use swipefit_cli::commands::{config, recommend, reset, simulate, state, swipe, unlike};
use swipefit_core::config::{ConfigOverrides, LoadOptions};
use tempfile::TempDir;

const NAMES: [&str; 6] = [
    "Black Ribbed Tank Top",
    "White Linen Trousers",
    "Navy Slip Dress",
    "Beige Trench Coat",
    "Red Knit Sweater",
    "Green Cargo Pants",
];
const BRANDS: [&str; 3] = ["Edikted", "Aritzia", "Zara"];

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(size: usize) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = (0..size)
            .map(|n| {
                json!({
                    "id": format!("sku-{n}"),
                    "name": NAMES[n % NAMES.len()],
                    "brand": BRANDS[n % BRANDS.len()],
                    "price": 20.0 + (n % 7) as f64 * 25.0,
                })
            })
            .collect::<Vec<_>>();
        fs::write(dir.path().join("catalog.json"), Value::Array(records).to_string())
            .expect("write catalog");
        Self { dir }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("state").join("session.json")
    }

    fn options(&self) -> LoadOptions {
        options_for(&self.dir.path().join("catalog.json"), &self.state_path())
    }
}

fn options_for(catalog: &Path, state: &Path) -> LoadOptions {
    LoadOptions {
        overrides: ConfigOverrides {
            catalog_path: Some(catalog.to_path_buf()),
            state_path: Some(state.to_path_buf()),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    }
}

#[test]
fn recommend_returns_batch_and_saves_state() {
    with_env(&[], || {
        let fixture = Fixture::new(40);

        let result = recommend::run(fixture.options(), Some(5));
        assert_eq!(result.exit_code, 0, "expected successful recommend");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "ok");
        let items = payload["data"]["items"].as_array().expect("items array");
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|item| item["source"] == "personalized"));
        assert!(fixture.state_path().exists());

        let summary = parse_payload(&state::run(fixture.options()).output);
        assert_eq!(summary["data"]["shown_items"], 5);
        assert_eq!(summary["data"]["total_swipes"], 0);
    });
}

#[test]
fn consecutive_recommend_calls_do_not_repeat_items() {
    with_env(&[], || {
        let fixture = Fixture::new(40);

        let first = parse_payload(&recommend::run(fixture.options(), Some(6)).output);
        let second = parse_payload(&recommend::run(fixture.options(), Some(6)).output);

        let ids = |payload: &Value| {
            payload["data"]["items"]
                .as_array()
                .expect("items")
                .iter()
                .map(|item| item["id"].as_str().expect("id").to_string())
                .collect::<Vec<_>>()
        };
        let first_ids = ids(&first);
        assert!(ids(&second).iter().all(|id| !first_ids.contains(id)));
    });
}

#[test]
fn swipes_persist_between_invocations() {
    with_env(&[], || {
        let fixture = Fixture::new(20);

        let liked = swipe::run(fixture.options(), SwipeAction::Like, "sku-3");
        assert_eq!(liked.exit_code, 0);
        let first = swipe::run(fixture.options(), SwipeAction::Dislike, "sku-4");
        let second = swipe::run(fixture.options(), SwipeAction::Dislike, "sku-4");

        assert_eq!(parse_payload(&first.output)["data"]["outcome"], "temporary");
        assert_eq!(parse_payload(&second.output)["data"]["outcome"], "permanent");

        let summary = parse_payload(&state::run(fixture.options()).output);
        assert_eq!(summary["data"]["wishlist_size"], 1);
        assert_eq!(summary["data"]["wishlist"][0]["id"], "sku-3");
        assert_eq!(summary["data"]["temp_dislikes"], 0);
        assert_eq!(summary["data"]["permanent_dislikes"], 1);
        assert_eq!(summary["data"]["total_swipes"], 3);
    });
}

#[test]
fn swipe_rejects_unknown_item() {
    with_env(&[], || {
        let fixture = Fixture::new(10);

        let result = swipe::run(fixture.options(), SwipeAction::Like, "sku-404");
        assert_eq!(result.exit_code, 5);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "unknown_item");
        assert!(!fixture.state_path().exists(), "nothing should be saved");
    });
}

#[test]
fn unlike_removes_wishlisted_item() {
    with_env(&[], || {
        let fixture = Fixture::new(10);
        swipe::run(fixture.options(), SwipeAction::Like, "sku-1");

        let removed = parse_payload(&unlike::run(fixture.options(), "sku-1").output);
        assert_eq!(removed["status"], "ok");
        assert!(removed["message"].as_str().unwrap_or_default().contains("removed"));

        let summary = parse_payload(&state::run(fixture.options()).output);
        assert_eq!(summary["data"]["wishlist_size"], 0);
        assert_eq!(summary["data"]["wishlist"], json!([]));
    });
}

#[test]
fn reset_variants_clear_the_right_state() {
    with_env(&[], || {
        let fixture = Fixture::new(30);
        swipe::run(fixture.options(), SwipeAction::Like, "sku-2");
        recommend::run(fixture.options(), Some(4));

        let shown_only = reset::run(fixture.options(), true);
        assert_eq!(shown_only.exit_code, 0);
        let summary = parse_payload(&state::run(fixture.options()).output);
        assert_eq!(summary["data"]["shown_items"], 0);
        assert_eq!(summary["data"]["wishlist_size"], 1);

        let full = reset::run(fixture.options(), false);
        assert_eq!(full.exit_code, 0);
        assert!(!fixture.state_path().exists());
        let summary = parse_payload(&state::run(fixture.options()).output);
        assert!(summary["data"].is_null());
    });
}

#[test]
fn missing_catalog_reports_catalog_failure() {
    with_env(&[], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = options_for(&dir.path().join("absent.json"), &dir.path().join("state.json"));

        let result = recommend::run(options, None);
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["error_class"], "catalog_unreadable");
    });
}

#[test]
fn corrupt_state_file_reports_state_failure() {
    with_env(&[], || {
        let fixture = Fixture::new(10);
        fs::create_dir_all(fixture.state_path().parent().expect("parent")).expect("mkdir");
        fs::write(fixture.state_path(), "{ truncated").expect("write state");

        let result = recommend::run(fixture.options(), Some(3));
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "state_store");

        // A full reset recovers without reading the broken file.
        assert_eq!(reset::run(fixture.options(), false).exit_code, 0);
        assert_eq!(recommend::run(fixture.options(), Some(3)).exit_code, 0);
    });
}

#[test]
fn simulate_is_reproducible_for_a_seed() {
    with_env(&[("SWIPEFIT_ENGINE_SEED", "7")], || {
        let fixture = Fixture::new(200);
        let args = SimulateArgs { swipes: 30, like_rate: 0.4 };

        let first = parse_payload(&simulate::run(fixture.options(), args).output);
        let second = parse_payload(&simulate::run(fixture.options(), args).output);

        assert_eq!(first["status"], "ok");
        assert_eq!(first["data"], second["data"]);
        assert_eq!(first["data"]["seed"], 7);
        assert_eq!(first["data"]["swipes"], 30);
        assert_eq!(first["data"]["total_swipes"], 30);
        assert_eq!(
            first["data"]["likes"].as_u64().unwrap_or_default()
                + first["data"]["dislikes"].as_u64().unwrap_or_default(),
            30
        );
        assert!(!fixture.state_path().exists(), "simulation must not touch saved state");
    });
}

#[test]
fn simulate_rejects_out_of_range_like_rate() {
    with_env(&[], || {
        let fixture = Fixture::new(10);

        let result = simulate::run(fixture.options(), SimulateArgs { swipes: 5, like_rate: 1.5 });
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_argument");
    });
}

#[test]
fn config_reports_sources() {
    with_env(&[("SWIPEFIT_SESSION_BATCH_SIZE", "7")], || {
        let fixture = Fixture::new(5);

        let result = config::run(fixture.options());
        assert_eq!(result.exit_code, 0);

        let settings = &parse_payload(&result.output)["data"]["settings"];
        assert_eq!(settings["session.batch_size"]["value"], 7);
        assert_eq!(settings["session.batch_size"]["source"], "env (SWIPEFIT_SESSION_BATCH_SIZE)");
        assert_eq!(settings["catalog.path"]["source"], "flag (--catalog)");
        assert_eq!(settings["engine.temp_dislike_cooldown"]["value"], 25);
        assert_eq!(settings["engine.temp_dislike_cooldown"]["source"], "default");
    });
}

#[test]
fn invalid_env_override_is_a_config_failure() {
    with_env(&[("SWIPEFIT_SESSION_BATCH_SIZE", "0")], || {
        let fixture = Fixture::new(5);

        let result = recommend::run(fixture.options(), None);
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SWIPEFIT_CATALOG_PATH",
        "SWIPEFIT_STATE_PATH",
        "SWIPEFIT_ENGINE_COOLDOWN_SWIPES",
        "SWIPEFIT_ENGINE_EXPLORATION_INTERVAL",
        "SWIPEFIT_ENGINE_SEED",
        "SWIPEFIT_SESSION_BATCH_SIZE",
        "SWIPEFIT_LOGGING_LEVEL",
        "SWIPEFIT_LOGGING_FORMAT",
        "SWIPEFIT_LOG_LEVEL",
        "SWIPEFIT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
