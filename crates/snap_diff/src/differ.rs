//! Label-by-label snapshot comparison.

use std::collections::BTreeSet;
use std::future::Future;

use snap_common::{ChangeType, Snapshot, TrackerChange};

/// Compares two snapshots over the union of their labels.
///
/// Returns exactly one change per label, ordered by label. Each change
/// carries the `to` tracker, or an empty tracker when the label was removed.
/// Only digests are compared; differing `run` or `tags` alone do not make a
/// label changed.
pub fn diff(from: &Snapshot, to: &Snapshot) -> Vec<TrackerChange> {
    let labels: BTreeSet<&str> = from.labels().chain(to.labels()).collect();

    labels
        .into_iter()
        .map(|label| {
            let to_tracker = to.get(label);
            let change_type = match (from.get(label), to_tracker) {
                (None, _) => ChangeType::Added,
                (Some(_), None) => ChangeType::Removed,
                (Some(f), Some(t)) if f.digest != t.digest => ChangeType::Changed,
                (Some(_), Some(_)) => ChangeType::Unchanged,
            };
            TrackerChange {
                tracker: to_tracker.cloned().unwrap_or_default(),
                label: label.to_string(),
                change_type,
            }
        })
        .collect()
}

/// Diffs `from` against `to`, collecting a fresh snapshot first when `to`
/// is not given.
///
/// `collect` runs only when `to` is `None`; its error is returned unchanged.
pub async fn diff_or_collect<F, Fut, E>(
    from: &Snapshot,
    to: Option<Snapshot>,
    collect: F,
) -> Result<Vec<TrackerChange>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Snapshot, E>>,
{
    let to = match to {
        Some(to) => to,
        None => collect().await?,
    };
    Ok(diff(from, &to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_common::Tracker;

    fn snapshot(json: &str) -> Snapshot {
        Snapshot::from_json(json.as_bytes()).unwrap()
    }

    fn change_of<'a>(changes: &'a [TrackerChange], label: &str) -> &'a TrackerChange {
        changes.iter().find(|c| c.label == label).unwrap()
    }

    #[test]
    fn changed_and_added() {
        let from = snapshot(r#"{"labels":{"//a":{"digest":"1"}}}"#);
        let to = snapshot(r#"{"labels":{"//a":{"digest":"2"},"//b":{"digest":"9"}}}"#);

        let changes = diff(&from, &to);
        assert_eq!(changes.len(), 2);
        assert_eq!(change_of(&changes, "//a").change_type, ChangeType::Changed);
        assert_eq!(change_of(&changes, "//a").tracker.digest, "2");
        assert_eq!(change_of(&changes, "//b").change_type, ChangeType::Added);
        assert_eq!(change_of(&changes, "//b").tracker.digest, "9");
    }

    #[test]
    fn removed_carries_empty_tracker() {
        let from = snapshot(r#"{"labels":{"//gone":{"digest":"1","tags":["x"]}}}"#);
        let to = snapshot(r#"{"labels":{}}"#);

        let changes = diff(&from, &to);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type, ChangeType::Removed);
        assert_eq!(changes[0].tracker, Tracker::default());
    }

    #[test]
    fn diff_with_itself_is_all_unchanged() {
        let s = snapshot(
            r#"{"labels":{"//a":{"digest":"1"},"//b":{"digest":"2","run":["r"]},"//c":{"digest":"3"}}}"#,
        );
        let changes = diff(&s, &s);
        assert_eq!(changes.len(), 3);
        assert!(changes
            .iter()
            .all(|c| c.change_type == ChangeType::Unchanged));
    }

    #[test]
    fn metadata_only_difference_is_unchanged() {
        let from = snapshot(r#"{"labels":{"//a":{"digest":"1","tags":["old"]}}}"#);
        let to = snapshot(r#"{"labels":{"//a":{"digest":"1","tags":["new"]}}}"#);

        let changes = diff(&from, &to);
        assert_eq!(changes[0].change_type, ChangeType::Unchanged);
        assert_eq!(changes[0].tracker.tags, vec!["new"]);
    }

    #[test]
    fn one_change_per_label_in_union() {
        let from = snapshot(r#"{"labels":{"//a":{"digest":"1"},"//b":{"digest":"1"}}}"#);
        let to = snapshot(r#"{"labels":{"//b":{"digest":"1"},"//c":{"digest":"1"}}}"#);

        let changes = diff(&from, &to);
        let labels: Vec<&str> = changes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["//a", "//b", "//c"]);
        assert_eq!(changes[0].change_type, ChangeType::Removed);
        assert_eq!(changes[1].change_type, ChangeType::Unchanged);
        assert_eq!(changes[2].change_type, ChangeType::Added);
    }

    #[test]
    fn both_empty() {
        assert!(diff(&Snapshot::default(), &Snapshot::default()).is_empty());
    }

    #[tokio::test]
    async fn given_to_skips_collection() {
        let from = snapshot(r#"{"labels":{"//a":{"digest":"1"}}}"#);
        let to = snapshot(r#"{"labels":{"//a":{"digest":"1"}}}"#);

        let changes = diff_or_collect(&from, Some(to), || async {
            Err::<Snapshot, String>("collect must not run".to_string())
        })
        .await
        .unwrap();
        assert_eq!(changes[0].change_type, ChangeType::Unchanged);
    }

    #[tokio::test]
    async fn missing_to_runs_collection() {
        let from = snapshot(r#"{"labels":{"//a":{"digest":"1"}}}"#);

        let changes = diff_or_collect(&from, None, || async {
            Ok::<_, String>(snapshot(r#"{"labels":{"//a":{"digest":"2"}}}"#))
        })
        .await
        .unwrap();
        assert_eq!(changes[0].change_type, ChangeType::Changed);
    }

    #[tokio::test]
    async fn collection_error_is_returned() {
        let err = diff_or_collect(&Snapshot::default(), None, || async {
            Err::<Snapshot, _>("bazel exploded")
        })
        .await
        .unwrap_err();
        assert_eq!(err, "bazel exploded");
    }
}
