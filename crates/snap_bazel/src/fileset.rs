//! Registry of named file sets and transitive resolution of their files.

use std::collections::{HashMap, HashSet};

use crate::events::{NamedFile, NamedSetOfFiles};

/// All named file sets seen so far in a build event stream, keyed by id.
///
/// Sets may reference each other freely, including cyclically; resolution
/// visits each set at most once.
#[derive(Debug, Default)]
pub struct FileSets {
    sets: HashMap<String, NamedSetOfFiles>,
}

impl FileSets {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a set. A later set with the same id replaces the earlier one.
    pub fn put(&mut self, id: impl Into<String>, set: NamedSetOfFiles) {
        self.sets.insert(id.into(), set);
    }

    /// Number of recorded sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when no sets are recorded.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Lazily yields the URIs of every file reachable from `root`.
    ///
    /// Unknown ids, whether the root or a child reference, contribute nothing.
    /// Order is unspecified but deterministic for a given registry.
    pub fn resolve_files<'a>(&'a self, root: &'a str) -> ResolveFiles<'a> {
        ResolveFiles {
            sets: &self.sets,
            pending: vec![root],
            seen: HashSet::new(),
            current: Default::default(),
        }
    }
}

/// Iterator returned by [`FileSets::resolve_files`].
pub struct ResolveFiles<'a> {
    sets: &'a HashMap<String, NamedSetOfFiles>,
    pending: Vec<&'a str>,
    seen: HashSet<&'a str>,
    current: std::slice::Iter<'a, NamedFile>,
}

impl<'a> Iterator for ResolveFiles<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            if let Some(file) = self.current.next() {
                return Some(file.uri.as_str());
            }

            let id = self.pending.pop()?;
            if !self.seen.insert(id) {
                continue;
            }
            let Some(set) = self.sets.get(id) else {
                continue;
            };
            self.current = set.files.iter();
            self.pending
                .extend(set.file_sets.iter().rev().map(|r| r.id.as_str()));
        }
    }
}

impl std::iter::FusedIterator for ResolveFiles<'_> {}
