//! Tests for log filter construction

use super::*;
use serial_test::serial;
use sqs_mover_core::{LogReporter, ProgressReporter};
use std::io;
use std::sync::{Arc, Mutex};

#[test]
fn test_bare_level_applies_to_tool_crates() {
    let filter = build_filter(Some("debug")).unwrap().to_string();

    for target in CRATE_TARGETS {
        assert!(
            filter.contains(&format!("{}=debug", target)),
            "missing {} in {}",
            target,
            filter
        );
    }
}

#[test]
fn test_full_directive_is_used_as_given() {
    let filter = build_filter(Some("sqs_mover_runtime=trace,hyper=info"))
        .unwrap()
        .to_string();

    assert!(filter.contains("sqs_mover_runtime=trace"));
    assert!(filter.contains("hyper=info"));
    assert!(!filter.contains("sqs_mover_core"));
}

#[test]
fn test_invalid_level_is_a_configuration_error() {
    let error = build_filter(Some("loud")).unwrap_err();

    assert!(matches!(error, ConfigError::Invalid { ref key, .. } if key == "log_level"));
}

#[test]
fn test_default_filter_parses() {
    assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
}

/// Writer collecting formatted events in memory
#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn test_default_filter_shows_per_batch_progress() {
    std::env::remove_var("RUST_LOG");
    let output = CapturedOutput::default();
    let writer = output.clone();
    let subscriber = tracing_subscriber::registry()
        .with(build_filter(None).unwrap())
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );

    tracing::subscriber::with_default(subscriber, || {
        let mut reporter = LogReporter;
        reporter.start(30);
        reporter.update(10, 30);
        reporter.update(20, 30);
    });

    let logged = output.contents();
    assert!(logged.contains("Starting to move messages"), "{}", logged);
    assert_eq!(logged.matches("Moved batch").count(), 2, "{}", logged);
    assert!(logged.contains("moved=20"), "{}", logged);
}
