//! Name -> remote identifier associations for segments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{SegmentId, SegmentSpec};

/// Maps a segment name to the identifier it was created under remotely.
///
/// Used to avoid creating a segment twice. Entries only change for remote
/// operations that succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityMap(BTreeMap<String, SegmentId>);

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from segments that already carry an identifier.
    ///
    /// When two segments share a name, the first one wins.
    pub fn from_segments(segments: &[SegmentSpec]) -> Self {
        let mut map = BTreeMap::new();
        for segment in segments {
            if let Some(id) = segment.id {
                map.entry(segment.name.clone()).or_insert(id);
            }
        }
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<SegmentId> {
        self.0.get(name).copied()
    }

    pub fn contains_id(&self, id: SegmentId) -> bool {
        self.0.values().any(|v| *v == id)
    }

    /// Associate `name` with `id`, dropping any other name that pointed at `id`.
    pub fn bind(&mut self, name: &str, id: SegmentId) {
        self.0.retain(|n, v| *v != id || n == name);
        self.0.insert(name.to_string(), id);
    }

    /// Carry the identifier of `old` forward under `new`.
    ///
    /// Returns `false` when `old` had no entry.
    pub fn rekey(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.0.contains_key(old);
        }
        match self.0.remove(old) {
            Some(id) => {
                self.0.insert(new.to_string(), id);
                true
            }
            None => false,
        }
    }

    pub fn remove_name(&mut self, name: &str) -> Option<SegmentId> {
        self.0.remove(name)
    }

    /// Drop every entry pointing at `id`; returns how many were removed.
    pub fn remove_id(&mut self, id: SegmentId) -> usize {
        let before = self.0.len();
        self.0.retain(|_, v| *v != id);
        before - self.0.len()
    }

    pub fn ids(&self) -> BTreeSet<SegmentId> {
        self.0.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SegmentId)> {
        self.0.iter().map(|(n, id)| (n.as_str(), *id))
    }
}

impl<S: Into<String>> FromIterator<(S, SegmentId)> for IdentityMap {
    fn from_iter<T: IntoIterator<Item = (S, SegmentId)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(n, id)| (n.into(), id)).collect())
    }
}
