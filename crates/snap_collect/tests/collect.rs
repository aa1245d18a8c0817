//! End-to-end collection against event files and `file://` tracker outputs.

use std::path::{Path, PathBuf};

use snap_cache::DelegatingCache;
use snap_collect::{CollectError, CollectOptions, Collector, EventSource};
use snap_common::Tracker;
use url::Url;

fn write_tracker(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    Url::from_file_path(&path).unwrap().to_string()
}

fn write_events(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("events.json");
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn named_set(id: &str, uris: &[&str], refs: &[&str]) -> String {
    let files: Vec<String> = uris
        .iter()
        .map(|u| format!(r#"{{"name":"tracker.json","uri":"{u}"}}"#))
        .collect();
    let sets: Vec<String> = refs.iter().map(|r| format!(r#"{{"id":"{r}"}}"#)).collect();
    format!(
        r#"{{"id":{{"namedSet":{{"id":"{id}"}}}},"namedSetOfFiles":{{"files":[{}],"fileSets":[{}]}}}}"#,
        files.join(","),
        sets.join(",")
    )
}

fn completed(label: &str, group: &str, sets: &[&str]) -> String {
    let sets: Vec<String> = sets.iter().map(|s| format!(r#"{{"id":"{s}"}}"#)).collect();
    format!(
        r#"{{"id":{{"targetCompleted":{{"label":"{label}"}}}},"completed":{{"success":true,"outputGroup":[{{"name":"{group}","fileSets":[{}]}}]}}}}"#,
        sets.join(",")
    )
}

fn collector() -> Collector<DelegatingCache> {
    Collector::new(DelegatingCache::new(false), CollectOptions::default())
}

#[tokio::test]
async fn replays_event_file_into_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let api = write_tracker(
        dir.path(),
        "api.json",
        r#"{"digest":"aaa","run":["//svc/api:push"],"tags":["backend"]}"#,
    );
    let web = write_tracker(dir.path(), "web.json", r#"{"digest":"bbb"}"#);

    let events = write_events(
        dir.path(),
        &[
            r#"{"id":{"started":{}},"started":{"command":"build"}}"#.to_string(),
            named_set("0", &[api.as_str()], &[]),
            named_set("1", &[], &["0"]),
            completed("//svc/api:tracker", "change_track_files", &["1"]),
            named_set("2", &[web.as_str()], &[]),
            completed("//web:tracker", "change_track_files", &["2"]),
            completed("//lib:lib", "default", &["2"]),
            r#"{"id":{"buildFinished":{}},"finished":{"exitCode":{"name":"SUCCESS"}}}"#
                .to_string(),
        ],
    );

    let snapshot = collector()
        .collect(&EventSource::File(events))
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(
        snapshot.get("//svc/api:tracker"),
        Some(&Tracker {
            digest: "aaa".to_string(),
            run: vec!["//svc/api:push".to_string()],
            tags: vec!["backend".to_string()],
        })
    );
    assert_eq!(snapshot.get("//web:tracker"), Some(&Tracker::new("bbb")));
    assert!(!snapshot.contains("//lib:lib"));
}

#[tokio::test]
async fn custom_output_group_and_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    let mut lines = Vec::new();
    for i in 0..10 {
        let uri = write_tracker(dir.path(), &format!("t{i}.json"), &format!(r#"{{"digest":"{i}"}}"#));
        lines.push(named_set(&i.to_string(), &[uri.as_str()], &[]));
        lines.push(completed(&format!("//pkg:t{i}"), "trackers", &[i.to_string().as_str()]));
    }
    let events = write_events(dir.path(), &lines);

    let options = CollectOptions {
        output_group: "trackers".to_string(),
        concurrency: 4,
        ..CollectOptions::default()
    };
    let snapshot = Collector::new(DelegatingCache::new(false), options)
        .collect(&EventSource::File(events))
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 10);
    assert_eq!(snapshot.get("//pkg:t7").unwrap().digest, "7");
}

#[tokio::test]
async fn missing_tracker_file_is_reported_with_label() {
    let dir = tempfile::tempdir().unwrap();
    let gone = Url::from_file_path(dir.path().join("gone.json")).unwrap().to_string();
    let events = write_events(
        dir.path(),
        &[
            named_set("0", &[gone.as_str()], &[]),
            completed("//gone:tracker", "change_track_files", &["0"]),
        ],
    );

    let err = collector()
        .collect(&EventSource::File(events))
        .await
        .unwrap_err();
    match err {
        CollectError::Cache { label, uri, source } => {
            assert_eq!(label, "//gone:tracker");
            assert_eq!(uri, gone);
            assert!(source.is_unavailable());
        }
        other => panic!("expected Cache error, got {other:?}"),
    }
}

#[tokio::test]
async fn corrupt_tracker_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_tracker(dir.path(), "bad.json", "digest=abc");
    let events = write_events(
        dir.path(),
        &[
            named_set("0", &[bad.as_str()], &[]),
            completed("//bad", "change_track_files", &["0"]),
        ],
    );

    let err = collector()
        .collect(&EventSource::File(events))
        .await
        .unwrap_err();
    assert!(matches!(err, CollectError::InvalidTracker { .. }), "got {err:?}");
}

#[tokio::test]
async fn unknown_scheme_in_event_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let events = write_events(
        dir.path(),
        &[
            named_set("0", &["https://example.com/t.json"], &[]),
            completed("//remote", "change_track_files", &["0"]),
        ],
    );

    let err = collector()
        .collect(&EventSource::File(events))
        .await
        .unwrap_err();
    match err {
        CollectError::Cache { source, .. } => assert!(matches!(
            source,
            snap_cache::CacheError::UnknownScheme { .. }
        )),
        other => panic!("expected Cache error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_event_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let events = write_events(dir.path(), &[r#"{"id": "#.to_string()]);

    let err = collector()
        .collect(&EventSource::File(events))
        .await
        .unwrap_err();
    assert!(matches!(err, CollectError::Events(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_event_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = collector()
        .collect(&EventSource::File(dir.path().join("nope.json")))
        .await
        .unwrap_err();
    assert!(matches!(err, CollectError::OpenEvents { .. }), "got {err:?}");
}

#[tokio::test]
async fn empty_event_file_gives_empty_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.json");
    std::fs::write(&events, "").unwrap();

    let snapshot = collector()
        .collect(&EventSource::File(events))
        .await
        .unwrap();
    assert!(snapshot.is_empty());
}

// `/bin/sh build ...` runs the workspace's `build` script in place of the
// build tool; the script copies a prepared event file to the requested path.
#[cfg(unix)]
#[tokio::test]
async fn live_build_collects_from_build_events() {
    let ws = tempfile::tempdir().unwrap();
    let uri = write_tracker(ws.path(), "t.json", r#"{"digest":"live"}"#);
    let prepared = write_events(
        ws.path(),
        &[
            named_set("0", &[uri.as_str()], &[]),
            completed("//app:tracker", "change_track_files", &["0"]),
        ],
    );
    std::fs::write(
        ws.path().join("build"),
        format!(
            r#"for arg in "$@"; do
  case "$arg" in
    --build_event_json_file=*) out="${{arg#--build_event_json_file=}}" ;;
  esac
done
cp "{}" "$out"
"#,
            prepared.display()
        ),
    )
    .unwrap();

    let bazel = snap_bazel::BazelClient::new("/bin/sh", ws.path());
    let snapshot = collector()
        .with_bazel(bazel)
        .collect(&EventSource::Build {
            expression: "//...".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(snapshot.get("//app:tracker"), Some(&Tracker::new("live")));
}

#[cfg(target_os = "linux")]
fn process_alive(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/status")) {
        Ok(status) => !status
            .lines()
            .any(|line| line.starts_with("State:") && line.contains('Z')),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn dropping_collection_kills_build() {
    let ws = tempfile::tempdir().unwrap();
    std::fs::write(ws.path().join("build"), "echo $$ > build.pid\nexec sleep 30\n").unwrap();

    let collector = collector().with_bazel(snap_bazel::BazelClient::new("/bin/sh", ws.path()));
    let source = EventSource::Build {
        expression: "//...".to_string(),
    };
    let result =
        tokio::time::timeout(std::time::Duration::from_secs(1), collector.collect(&source)).await;
    assert!(result.is_err(), "build finished before the timeout");

    let pid = std::fs::read_to_string(ws.path().join("build.pid")).unwrap();
    let pid = pid.trim();
    for _ in 0..50 {
        if !process_alive(pid) {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("build process {pid} still running");
}
