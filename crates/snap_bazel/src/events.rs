//! Decoding of newline-delimited JSON build event files.
//!
//! Bazel writes one JSON object per event when run with
//! `--build_event_json_file`. Two event kinds matter here: named file sets,
//! which describe output files and may reference other sets, and target
//! completions, which name the sets produced for each output group.

use std::io::{BufReader, Read};

use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::StreamDeserializer;

use crate::error::EventError;

/// A single output file entry within a named set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamedFile {
    /// Short name of the file, relative to its output root.
    #[serde(default)]
    pub name: String,
    /// Location of the file contents, e.g. `file:///...` or `bytestream://...`.
    #[serde(default)]
    pub uri: String,
}

/// Reference to a named file set by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileSetRef {
    /// Identifier of the referenced set.
    #[serde(default)]
    pub id: String,
}

/// Payload of a named set event: direct files plus references to other sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NamedSetOfFiles {
    /// Files directly contained in this set.
    #[serde(default)]
    pub files: Vec<NamedFile>,
    /// Other sets whose files belong to this set transitively.
    #[serde(default, rename = "fileSets")]
    pub file_sets: Vec<FileSetRef>,
}

/// One output group of a completed target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputGroup {
    /// Output group name, e.g. `change_track_files`.
    #[serde(default)]
    pub name: String,
    /// Root sets holding the group's files.
    #[serde(default, rename = "fileSets")]
    pub file_sets: Vec<FileSetRef>,
}

/// A decoded build event, reduced to the parts the collector uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A named set of files was announced.
    NamedSet {
        /// Set identifier, unique within the stream.
        id: String,
        /// The set's files and child references.
        files: NamedSetOfFiles,
    },
    /// A target finished building.
    ///
    /// Aborted targets carry no completion payload and surface here with no
    /// output groups and `success == false`.
    TargetCompleted {
        /// The target label, e.g. `//svc/api:tracker`.
        label: String,
        /// Whether the build reported success for the target.
        success: bool,
        /// Output groups produced by the target.
        output_groups: Vec<OutputGroup>,
    },
    /// Any other event kind.
    Other,
}

impl BuildEvent {
    /// Returns the root set identifiers for the output group named `group`.
    ///
    /// Empty for non-completion events and for targets lacking that group.
    pub fn output_group_sets<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let groups: &[OutputGroup] = match self {
            BuildEvent::TargetCompleted { output_groups, .. } => output_groups,
            _ => &[],
        };
        groups
            .iter()
            .filter(move |g| g.name == group)
            .flat_map(|g| g.file_sets.iter().map(|s| s.id.as_str()))
    }
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: RawEventId,
    #[serde(default, rename = "namedSetOfFiles")]
    named_set_of_files: Option<NamedSetOfFiles>,
    #[serde(default)]
    completed: Option<RawCompleted>,
}

#[derive(Deserialize, Default)]
struct RawEventId {
    #[serde(default, rename = "namedSet")]
    named_set: Option<RawNamedSetId>,
    #[serde(default, rename = "targetCompleted")]
    target_completed: Option<RawTargetCompletedId>,
}

#[derive(Deserialize)]
struct RawNamedSetId {
    #[serde(default)]
    id: String,
}

#[derive(Deserialize)]
struct RawTargetCompletedId {
    #[serde(default)]
    label: String,
}

#[derive(Deserialize)]
struct RawCompleted {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "outputGroup")]
    output_group: Vec<OutputGroup>,
}

impl From<RawEvent> for BuildEvent {
    fn from(raw: RawEvent) -> Self {
        if let Some(named) = raw.id.named_set {
            return BuildEvent::NamedSet {
                id: named.id,
                files: raw.named_set_of_files.unwrap_or_default(),
            };
        }
        if let Some(target) = raw.id.target_completed {
            let (success, output_groups) = match raw.completed {
                Some(c) => (c.success, c.output_group),
                None => (false, Vec::new()),
            };
            return BuildEvent::TargetCompleted {
                label: target.label,
                success,
                output_groups,
            };
        }
        BuildEvent::Other
    }
}

/// Lazy iterator over the events of a build event stream.
///
/// Yields events in stream order. The first decoding or read failure is
/// yielded once, after which the iterator is exhausted.
pub struct BuildEvents<R: Read> {
    inner: Option<StreamDeserializer<'static, IoRead<BufReader<R>>, RawEvent>>,
}

/// Starts decoding newline-delimited build events from `reader`.
///
/// Nothing is read until the iterator is advanced.
pub fn parse_build_events<R: Read>(reader: R) -> BuildEvents<R> {
    let stream = serde_json::Deserializer::from_reader(BufReader::new(reader)).into_iter();
    BuildEvents {
        inner: Some(stream),
    }
}

impl<R: Read> Iterator for BuildEvents<R> {
    type Item = Result<BuildEvent, EventError>;

    fn next(&mut self) -> Option<Self::Item> {
        let stream = self.inner.as_mut()?;
        match stream.next() {
            Some(Ok(raw)) => Some(Ok(raw.into())),
            Some(Err(e)) => {
                self.inner = None;
                Some(Err(EventError::from_json(e)))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for BuildEvents<R> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<Result<BuildEvent, EventError>> {
        parse_build_events(input.as_bytes()).collect()
    }

    #[test]
    fn named_set_and_target_completed() {
        let input = r#"{"id":{"namedSet":{"id":"0"}},"namedSetOfFiles":{"files":[{"name":"a.json","uri":"file:///out/a.json"}]}}
{"id":{"targetCompleted":{"label":"//svc:tracker"}},"completed":{"success":true,"outputGroup":[{"name":"change_track_files","fileSets":[{"id":"0"}]}]}}
"#;
        let events: Vec<BuildEvent> = collect(input).into_iter().map(Result::unwrap).collect();
        assert_eq!(events.len(), 2);

        assert_eq!(
            events[0],
            BuildEvent::NamedSet {
                id: "0".to_string(),
                files: NamedSetOfFiles {
                    files: vec![NamedFile {
                        name: "a.json".to_string(),
                        uri: "file:///out/a.json".to_string(),
                    }],
                    file_sets: Vec::new(),
                },
            }
        );

        match &events[1] {
            BuildEvent::TargetCompleted { label, success, .. } => {
                assert_eq!(label, "//svc:tracker");
                assert!(success);
            }
            other => panic!("expected TargetCompleted, got {other:?}"),
        }
        let sets: Vec<&str> = events[1].output_group_sets("change_track_files").collect();
        assert_eq!(sets, vec!["0"]);
    }

    #[test]
    fn aborted_target_has_no_output_groups() {
        let events = collect(r#"{"id":{"targetCompleted":{"label":"//foo:bar"}}}"#);
        assert_eq!(events.len(), 1);
        let event = events.into_iter().next().unwrap().unwrap();
        assert_eq!(
            event,
            BuildEvent::TargetCompleted {
                label: "//foo:bar".to_string(),
                success: false,
                output_groups: Vec::new(),
            }
        );
        assert_eq!(event.output_group_sets("change_track_files").count(), 0);
    }

    #[test]
    fn unknown_events_are_other() {
        let input = r#"{"id":{"started":{}},"started":{"uuid":"1234","command":"build"}}
{"id":{"progress":{"opaqueCount":1}},"progress":{"stderr":"Loading..."}}
"#;
        let events: Vec<BuildEvent> = collect(input).into_iter().map(Result::unwrap).collect();
        assert_eq!(events, vec![BuildEvent::Other, BuildEvent::Other]);
    }

    #[test]
    fn other_output_groups_are_filtered() {
        let input = r#"{"id":{"targetCompleted":{"label":"//a"}},"completed":{"success":true,"outputGroup":[{"name":"default","fileSets":[{"id":"1"}]},{"name":"change_track_files","fileSets":[{"id":"2"},{"id":"3"}]}]}}"#;
        let event = collect(input).into_iter().next().unwrap().unwrap();
        let sets: Vec<&str> = event.output_group_sets("change_track_files").collect();
        assert_eq!(sets, vec!["2", "3"]);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(collect("").is_empty());
        assert!(collect("\n\n").is_empty());
    }

    #[test]
    fn malformed_record_terminates_stream() {
        let input = r#"{"id":{"namedSet":{"id":"0"}}}
{"id": nope}
{"id":{"namedSet":{"id":"1"}}}
"#;
        let events = collect(input);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        match &events[1] {
            Err(EventError::Parse { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_is_a_parse_error() {
        let events = collect(r#"{"id":{"targetCompleted":"#);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(EventError::Parse { .. })));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn reader_failure_is_an_io_error() {
        let mut events = parse_build_events(FailingReader);
        match events.next() {
            Some(Err(EventError::Io(e))) => assert!(e.to_string().contains("disk on fire")),
            other => panic!("expected io error, got {other:?}"),
        }
        assert!(events.next().is_none());
    }
}
