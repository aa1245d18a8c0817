//! The collection pipeline: events, then file sets, then cache reads, then a snapshot.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use futures::StreamExt;
use snap_bazel::{parse_build_events, BazelClient, BuildEvent, EventError, FileSets};
use snap_cache::{CacheReader, RequestMetadata};
use snap_common::{Snapshot, Tracker};

use crate::error::CollectError;

/// Output group that carries tracker files unless configured otherwise.
pub const DEFAULT_OUTPUT_GROUP: &str = "change_track_files";

/// Where the build events for a collection come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// Build the expression and use the events of that build.
    Build {
        /// Target expression, e.g. `//...`.
        expression: String,
    },
    /// Replay a previously written `--build_event_json_file`.
    File(PathBuf),
}

/// Tunables for a collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Output group whose first file is each target's tracker.
    pub output_group: String,
    /// Metadata attached to every remote cache read.
    pub metadata: RequestMetadata,
    /// Maximum tracker reads in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            output_group: DEFAULT_OUTPUT_GROUP.to_string(),
            metadata: RequestMetadata::new(),
            concurrency: 1,
        }
    }
}

/// Builds snapshots from build events and cached tracker files.
pub struct Collector<R> {
    cache: R,
    bazel: Option<BazelClient>,
    options: CollectOptions,
}

impl<R: CacheReader> Collector<R> {
    /// Creates a collector reading trackers through `cache`.
    ///
    /// Without [`Collector::with_bazel`] only [`EventSource::File`] can be used.
    pub fn new(cache: R, options: CollectOptions) -> Self {
        Self {
            cache,
            bazel: None,
            options,
        }
    }

    /// Sets the client used for [`EventSource::Build`].
    pub fn with_bazel(mut self, bazel: BazelClient) -> Self {
        self.bazel = Some(bazel);
        self
    }

    /// Runs one collection.
    ///
    /// Dropping the returned future kills a running build and abandons any
    /// in-flight cache reads.
    pub async fn collect(&self, source: &EventSource) -> Result<Snapshot, CollectError> {
        let outputs = match source {
            EventSource::Build { expression } => {
                let bazel = self.bazel.as_ref().ok_or(CollectError::NoBuildTool)?;
                tracing::info!(expression = %expression, "collecting digests");
                let event_file = bazel
                    .build_events(expression, &self.options.output_group)
                    .await?;
                let file = event_file.reopen().map_err(|e| CollectError::OpenEvents {
                    path: event_file.path().to_path_buf(),
                    source: e,
                })?;
                self.scan_events(file).await?
            }
            EventSource::File(path) => {
                tracing::info!(path = %path.display(), "collecting digests from event file");
                let file = File::open(path).map_err(|e| CollectError::OpenEvents {
                    path: path.clone(),
                    source: e,
                })?;
                self.scan_events(file).await?
            }
        };

        tracing::info!("got {} change trackers", outputs.len());
        self.fetch_trackers(outputs).await
    }

    async fn scan_events(&self, file: File) -> Result<BTreeMap<String, String>, CollectError> {
        let output_group = self.options.output_group.clone();
        let outputs = tokio::task::spawn_blocking(move || {
            locate_outputs(parse_build_events(file), &output_group)
        })
        .await??;
        Ok(outputs)
    }

    async fn fetch_trackers(
        &self,
        outputs: BTreeMap<String, String>,
    ) -> Result<Snapshot, CollectError> {
        let cache = &self.cache;
        let metadata = &self.options.metadata;
        let mut reads = futures::stream::iter(outputs)
            .map(|(label, uri)| async move {
                let result = cache.read(&uri, metadata).await;
                (label, uri, result)
            })
            .buffer_unordered(self.options.concurrency.max(1));

        let mut labels = BTreeMap::new();
        while let Some((label, uri, result)) = reads.next().await {
            let bytes = match result {
                Ok(bytes) => bytes,
                Err(source) => return Err(CollectError::Cache { label, uri, source }),
            };
            let tracker = match serde_json::from_slice::<Tracker>(&bytes) {
                Ok(tracker) => tracker,
                Err(source) => return Err(CollectError::InvalidTracker { label, uri, source }),
            };
            tracing::debug!(label = %label, digest = %tracker.digest, "read tracker");
            labels.insert(label, tracker);
        }
        Ok(Snapshot::from(labels))
    }
}

/// Maps each completed target to the location of its tracker file.
///
/// Events are consumed once, in order: named sets are recorded as they
/// arrive and each target completion is resolved against the sets seen so
/// far. For a target, the first file across the matching output group's
/// sets is its tracker; any further files are logged and ignored. Targets
/// without such a file are left out. Stops at the first event error.
pub fn locate_outputs<I>(events: I, output_group: &str) -> Result<BTreeMap<String, String>, EventError>
where
    I: IntoIterator<Item = Result<BuildEvent, EventError>>,
{
    let mut sets = FileSets::new();
    let mut outputs = BTreeMap::new();

    for event in events {
        match event? {
            BuildEvent::NamedSet { id, files } => sets.put(id, files),
            completed @ BuildEvent::TargetCompleted { .. } => {
                if let Some((label, uri)) = first_output(&sets, &completed, output_group) {
                    outputs.insert(label, uri);
                }
            }
            BuildEvent::Other => {}
        }
    }
    Ok(outputs)
}

fn first_output(sets: &FileSets, event: &BuildEvent, output_group: &str) -> Option<(String, String)> {
    let BuildEvent::TargetCompleted { label, .. } = event else {
        return None;
    };
    if label.is_empty() {
        return None;
    }

    let mut files = event
        .output_group_sets(output_group)
        .flat_map(|set_id| sets.resolve_files(set_id))
        .filter(|uri| !uri.is_empty());
    let first = files.next()?;
    let ignored = files.count();
    if ignored > 0 {
        tracing::warn!(
            label = %label,
            chosen = first,
            ignored,
            "output group has more than one file, using the first"
        );
    }
    Some((label.clone(), first.to_string()))
}
