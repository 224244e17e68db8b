//! End-to-end tests for the built-in module catalog: chat-driven
//! administration and console input handling.

mod common;

use chatter_api::Event;
use common::engine;

fn builtin_engine() -> (chatterd::Engine, std::sync::Arc<common::MockClient>) {
    let (mut engine, client) = engine();
    for provider in chatterd::modules::builtin() {
        engine.install(provider);
    }
    (engine, client)
}

#[tokio::test]
async fn commands_listing_hides_hidden_commands() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("log").unwrap();
    engine.load_module("admin").unwrap();

    engine
        .dispatch(Event::message("C1", "U1", "!commands"))
        .await;

    let sent = client.sent_texts();
    assert_eq!(sent.len(), 1);
    // The log module is hidden; only admin commands are listed.
    assert!(sent[0].contains("load_module"));
    assert!(sent[0].contains("unload_module"));
    assert!(sent[0].contains("module admin"));
    assert!(!sent[0].contains("log_message"));
}

#[tokio::test]
async fn chat_driven_reload_and_unload_reply_with_outcomes() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("admin").unwrap();

    engine
        .dispatch(Event::message("C1", "U1", "!load log"))
        .await;
    engine
        .dispatch(Event::message("C1", "U1", "!unload log"))
        .await;
    engine
        .dispatch(Event::message("C1", "U1", "!unload log"))
        .await;

    let sent = client.sent_texts();
    assert_eq!(sent[0], "module `log` loaded");
    assert_eq!(sent[1], "module `log` unloaded (6 commands)");
    assert_eq!(sent[2], "module `log` was not loaded");
}

#[tokio::test]
async fn module_listing_reports_installed_and_loaded_state() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("admin").unwrap();
    engine.load_module("log").unwrap();

    engine
        .dispatch(Event::message("C1", "U1", "!modules"))
        .await;

    let sent = client.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("admin (loaded)"));
    assert!(sent[0].contains("log (loaded): logs chat activity to the terminal"));
    assert!(sent[0].contains("console (installed)"));
}

#[tokio::test]
async fn load_failure_is_reported_to_the_requester() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("admin").unwrap();

    engine
        .dispatch(Event::message("C1", "U1", "!load ghost"))
        .await;

    let sent = client.sent_texts();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("failed"));
    assert!(sent[0].contains("unknown module: ghost"));
    // The dispatch loop survived the failed load.
    assert!(!engine.dispatcher().is_empty());
}

#[tokio::test]
async fn console_input_sends_to_the_configured_channel() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("console").unwrap();

    engine
        .dispatch(Event::of("console_input").with("text", "hello out there"))
        .await;

    let sent = client.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    // Default send_channel "general" resolves to C1 through the directory.
    assert_eq!(sent[0].channel, "C1");
    assert_eq!(sent[0].text, "hello out there");
}

#[tokio::test]
async fn console_directives_mutate_shared_settings() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("console").unwrap();

    engine
        .dispatch(Event::of("console_input").with("text", "/channel bot_test"))
        .await;
    engine
        .dispatch(Event::of("console_input").with("text", "/show_typing 1"))
        .await;

    assert_eq!(engine.settings().str("send_channel"), Some("bot_test"));
    assert_eq!(engine.settings().bool("show_typing"), Some(true));

    // Subsequent sends go to the new channel; no directory entry, so the
    // name is used as the raw id.
    engine
        .dispatch(Event::of("console_input").with("text", "redirected"))
        .await;
    let sent = client.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel, "bot_test");
}

#[tokio::test]
async fn typing_events_match_only_the_typing_logger() {
    let (mut engine, client) = builtin_engine();
    engine.load_module("log").unwrap();
    engine.load_module("admin").unwrap();

    engine
        .dispatch(Event::of("user_typing").with("channel", "C1").with("user", "U1"))
        .await;

    // Logging goes to the terminal, never into chat.
    assert!(client.sent.lock().unwrap().is_empty());
}
