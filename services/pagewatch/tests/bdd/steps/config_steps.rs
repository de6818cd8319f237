//! BDD step definitions for the configuration feature

use cucumber::{given, then, when};
use serde_json::{json, Value};

use pagewatch::config::RawConfig;
use pagewatch::{Config, DetectionMode};

use crate::world::PagewatchWorld;

#[given("a complete fingerprint configuration")]
fn complete_configuration(world: &mut PagewatchWorld) {
    let value = json!({
        "CHECK_URL": "https://example.com/news",
        "CHECK_INTERVAL_SECONDS": 60,
        "EMAIL_USERNAME": "watcher@example.com",
        "EMAIL_PASSWORD": "secret",
        "RECIPIENT_ADDRESS": "me@example.com"
    });
    let Value::Object(map) = value else {
        unreachable!()
    };
    world.config_json = Some(map);
}

#[given(expr = "the configuration omits {string}")]
fn omit_key(world: &mut PagewatchWorld, key: String) {
    world
        .config_json
        .as_mut()
        .expect("no configuration")
        .remove(&key);
}

#[given(expr = "the configuration sets {string} to null")]
fn null_key(world: &mut PagewatchWorld, key: String) {
    world
        .config_json
        .as_mut()
        .expect("no configuration")
        .insert(key, Value::Null);
}

#[given(expr = "the configuration sets {string} to {string}")]
fn set_key(world: &mut PagewatchWorld, key: String, value: String) {
    world
        .config_json
        .as_mut()
        .expect("no configuration")
        .insert(key, Value::String(value));
}

#[when("the configuration is validated")]
fn validate(world: &mut PagewatchWorld) {
    let value = Value::Object(world.config_json.clone().expect("no configuration"));
    let raw: RawConfig = serde_json::from_value(value).expect("configuration is not an object");
    world.config_result = Some(Config::from_raw(raw));
}

#[then(expr = "validation fails naming {string}")]
fn validation_fails(world: &mut PagewatchWorld, key: String) {
    let result = world.config_result.as_ref().expect("not validated");
    let err = result.as_ref().expect_err("validation unexpectedly passed");
    assert_eq!(err.category(), "ConfigError");
    assert!(err.to_string().contains(&key), "{err}");
}

#[then("the fingerprint mode is selected")]
fn fingerprint_selected(world: &mut PagewatchWorld) {
    let config = world
        .config_result
        .as_ref()
        .expect("not validated")
        .as_ref()
        .expect("validation failed");
    assert_eq!(config.mode, DetectionMode::Fingerprint);
}

#[then(expr = "the text-presence mode is selected for {string}")]
fn text_selected(world: &mut PagewatchWorld, text: String) {
    let config = world
        .config_result
        .as_ref()
        .expect("not validated")
        .as_ref()
        .expect("validation failed");
    match &config.mode {
        DetectionMode::TextPresence { search_text, .. } => assert_eq!(search_text, &text),
        other => panic!("expected text-presence mode, got {other:?}"),
    }
}
