use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), contents).expect("Writing temp config failed");
    config
}

#[test]
fn show_config_prints_effective_settings() {
    let config = config_file("default_subreddit: pics\nresponse_type: reply\n");
    let mut cmd = Command::cargo_bin("reddit-pick").expect("Binary exists");

    cmd.arg("show-config").arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("\"default_subreddit\": \"pics\"")
                .and(predicate::str::contains("\"response_type\": \"reply\""))
                .and(predicate::str::contains("\"retries\": 5")),
        );
}

#[test]
fn show_config_fails_on_invalid_retries() {
    let config = config_file("retries: 0\n");
    let mut cmd = Command::cargo_bin("reddit-pick").expect("Binary exists");

    cmd.arg("show-config").arg("--config").arg(config.path());

    cmd.assert().failure();
}

#[test]
fn pick_fails_cleanly_when_feed_is_unreachable() {
    // Port 9 (discard) on localhost is not expected to serve HTTP.
    let config = config_file(
        "default_subreddit: pics\nfeed:\n  api_base: \"http://127.0.0.1:9\"\n  timeout_secs: 2\n",
    );
    let mut cmd = Command::cargo_bin("reddit-pick").expect("Binary exists");

    cmd.arg("pick")
        .arg("--config")
        .arg(config.path())
        .env_remove("MATRIX_HOMESERVER")
        .env_remove("MATRIX_ACCESS_TOKEN");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Something went wrong"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use reddit_pick::cli::{run, Cli, Commands};

    // A missing config file fails fast, after the initial event.
    let cli = Cli {
        command: Commands::ShowConfig {
            config: std::path::PathBuf::from("dummy.yaml"),
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
