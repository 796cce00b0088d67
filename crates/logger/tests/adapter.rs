//! End-to-end tests for the logging adapter

use servicebase_logger::{
    AppIdentity, Level, LogAdapter, LogConfig, log_debug, log_error, log_info, log_warn,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn identity() -> AppIdentity {
    AppIdentity::new("servicebase", "servicebase-ms")
}

fn file_config(dir: &Path) -> LogConfig {
    LogConfig::builder()
        .console(false)
        .file(true)
        .directory(dir)
        .build()
}

fn active_file(dir: &Path) -> PathBuf {
    dir.join("servicebase.log")
}

fn read_lines(dir: &Path) -> Vec<String> {
    fs::read_to_string(active_file(dir))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn backups(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("servicebase-"))
        })
        .collect();
    paths.sort();
    paths
}

#[test]
fn console_only_adapter_creates_no_file() {
    let dir = tempdir().unwrap();
    let config = LogConfig::builder()
        .console(true)
        .file(false)
        .directory(dir.path())
        .build();

    let mut adapter = LogAdapter::new(config, identity()).unwrap();
    adapter.info("hello");
    adapter.shutdown();

    assert!(!active_file(dir.path()).exists());
}

#[test]
fn file_sink_appends_one_record_per_call() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    adapter.warn("x");
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("|WARN|"));
    assert!(lines[0].ends_with("|x"));
}

#[test]
fn below_threshold_levels_are_suppressed() {
    let dir = tempdir().unwrap();
    let config = LogConfig::builder()
        .level(Level::Warn)
        .console(false)
        .file(true)
        .directory(dir.path())
        .build();
    let mut adapter = LogAdapter::new(config, identity()).unwrap();

    adapter.debug("no");
    adapter.info("no");
    adapter.warn("yes");
    adapter.error("yes");
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("|WARN|"));
    assert!(lines[1].contains("|ERROR|"));
}

#[test]
fn min_level_error_emits_only_error() {
    let dir = tempdir().unwrap();
    let config = LogConfig::builder()
        .level(Level::Error)
        .console(false)
        .file(true)
        .directory(dir.path())
        .build();
    let mut adapter = LogAdapter::new(config, identity()).unwrap();

    adapter.debug("no");
    adapter.info("no");
    adapter.warn("no");
    adapter.error("yes");
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("|ERROR|"));
}

#[test]
fn records_carry_the_full_field_set() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    adapter.info("hello world");
    adapter.shutdown();

    let lines = read_lines(dir.path());
    let fields: Vec<&str> = lines[0].split('|').collect();

    assert_eq!(fields.len(), 9);
    assert!(fields[1].starts_with('[') && fields[1].ends_with(']'));
    assert_eq!(fields[3], "INFO");
    assert_eq!(fields[4], "application-log");
    assert_eq!(fields[5], "servicebase");
    assert_eq!(fields[6], "servicebase-ms");
    assert!(uuid::Uuid::parse_str(fields[7]).is_ok());
    assert_eq!(fields[8], "hello world");
}

#[test]
fn concurrent_writers_produce_whole_lines() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    thread::scope(|s| {
        for t in 0..2 {
            let adapter = &adapter;
            s.spawn(move || {
                for i in 0..1000 {
                    adapter.info(format!("thread {t} message {i}"));
                }
            });
        }
    });
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 2000);
    for line in &lines {
        assert_eq!(line.split('|').count(), 9, "malformed record: {line}");
        assert!(line.split('|').nth(8).unwrap().starts_with("thread "));
    }
}

#[test]
fn forced_rotation_preserves_previous_lines() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    adapter.info("first");
    adapter.info("second");
    adapter.rotate().unwrap();
    adapter.info("third");
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("|third"));

    let backups = backups(dir.path());
    assert_eq!(backups.len(), 1);
    let archived = fs::read_to_string(&backups[0]).unwrap();
    assert!(archived.contains("|first"));
    assert!(archived.contains("|second"));
}

#[test]
fn rotation_honors_max_backups() {
    let dir = tempdir().unwrap();
    let config = LogConfig::builder()
        .console(false)
        .file(true)
        .directory(dir.path())
        .max_backups(1)
        .build();
    let mut adapter = LogAdapter::new(config, identity()).unwrap();

    adapter.info("one");
    adapter.rotate().unwrap();
    thread::sleep(Duration::from_millis(5));
    adapter.info("two");
    adapter.rotate().unwrap();
    adapter.shutdown();

    let remaining = backups(dir.path());
    assert_eq!(remaining.len(), 1);
    assert!(fs::read_to_string(&remaining[0]).unwrap().contains("|two"));
}

#[test]
fn compressed_rotation_roundtrips() {
    let dir = tempdir().unwrap();
    let config = LogConfig::builder()
        .console(false)
        .file(true)
        .directory(dir.path())
        .compress(true)
        .build();
    let mut adapter = LogAdapter::new(config, identity()).unwrap();

    adapter.info("payload-line");
    adapter.rotate().unwrap();
    adapter.shutdown();

    let backups = backups(dir.path());
    assert_eq!(backups.len(), 1);
    assert!(backups[0].to_str().unwrap().ends_with(".log.gz"));

    let mut inflated = String::new();
    flate2::read::GzDecoder::new(fs::File::open(&backups[0]).unwrap())
        .read_to_string(&mut inflated)
        .unwrap();
    assert!(inflated.contains("|payload-line"));
}

#[test]
fn shutdown_on_console_only_adapter_is_a_noop() {
    let config = LogConfig::builder().console(true).file(false).build();
    let mut adapter = LogAdapter::new(config, identity()).unwrap();

    adapter.shutdown();
    adapter.shutdown();
    adapter.info("still prints");
}

#[test]
fn records_after_shutdown_are_dropped() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    adapter.warn("before");
    adapter.shutdown();
    adapter.warn("after");
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("|before"));
}

#[test]
fn scoped_records_carry_the_supplied_id() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    let scoped = adapter.scoped("req-123");
    scoped.info("accepted");
    scoped.info("completed");
    drop(scoped);
    adapter.shutdown();

    let lines = read_lines(dir.path());
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line.split('|').nth(7).unwrap(), "req-123");
    }
}

#[test]
fn macros_thread_arguments_uniformly() {
    let dir = tempdir().unwrap();
    let config = LogConfig::builder()
        .level(Level::Debug)
        .console(false)
        .file(true)
        .directory(dir.path())
        .build();
    let mut adapter = LogAdapter::new(config, identity()).unwrap();

    log_error!(adapter, "error {}", 1);
    log_warn!(adapter, "warn {}", 2);
    log_info!(adapter, "info {}", 3);
    log_debug!(adapter, "debug {}", 4);
    adapter.shutdown();

    let messages: Vec<String> = read_lines(dir.path())
        .iter()
        .map(|l| l.split('|').nth(8).unwrap().to_string())
        .collect();
    assert_eq!(messages, ["error 1", "warn 2", "info 3", "debug 4"]);
}

#[test]
fn unknown_level_names_fail_config_parse() {
    let result: Result<LogConfig, _> = serde_json::from_str(r#"{"level": "FATAL"}"#);
    assert!(result.is_err());

    assert!("FATAL".parse::<Level>().is_err());
    assert_eq!("error".parse::<Level>().unwrap(), Level::Error);
}

#[test]
fn rotation_error_handler_receives_failures() {
    let dir = tempdir().unwrap();
    let mut adapter = LogAdapter::new(file_config(dir.path()), identity()).unwrap();

    let failures = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = failures.clone();
    adapter.set_rotation_error_handler(Box::new(move |_| {
        seen.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }));

    // The daily cadence never fires inside a test; the handler wiring is
    // exercised at the scheduler level in unit tests. Here we only verify
    // installation is accepted and shutdown remains clean.
    adapter.info("still logging");
    adapter.shutdown();
    assert_eq!(failures.load(std::sync::atomic::Ordering::Relaxed), 0);
}
