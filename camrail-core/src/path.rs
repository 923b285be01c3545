//! Camera path: an ordered sequence of keyframes with a cursor

use crate::error::{Error, Result};
use crate::keyframe::Keyframe;
use crate::pose::{Point3f, Pose};
use crate::signal::{Signal, SubscriptionId};
use log::{debug, warn};

/// What kind of mutation produced a [`PathChange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathChangeKind {
    Appended,
    RemovedLast,
    Cleared,
    Replaced,
    CursorMoved,
}

/// Payload of the "path modified" notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathChange {
    pub kind: PathChangeKind,
    /// Number of keyframes after the change
    pub len: usize,
    /// Cursor after the change
    pub current: Option<usize>,
}

/// An ordered, mutable sequence of keyframes.
///
/// Keyframes are indexed `0..len()`. The cursor is `None` when the path is
/// empty or at rest and otherwise always a valid index. The revision counter
/// changes whenever the keyframe sequence changes (not on cursor moves) and
/// serves as a cache key for derived trajectories.
#[derive(Debug, Default)]
pub struct CameraPath {
    keyframes: Vec<Keyframe>,
    current: Option<usize>,
    revision: u64,
    path_modified: Signal<PathChange>,
}

impl CameraPath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from existing keyframes, with the cursor at rest
    pub fn from_keyframes(keyframes: Vec<Keyframe>) -> Self {
        Self {
            keyframes,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// All keyframes in index order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe> {
        self.keyframes.iter()
    }

    /// Keyframe positions in index order
    pub fn positions(&self) -> impl Iterator<Item = Point3f> + '_ {
        self.keyframes.iter().map(|k| k.position())
    }

    /// Current cursor, `None` when empty or at rest
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Revision of the keyframe sequence
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get the keyframe at `index`
    pub fn keyframe_at(&self, index: usize) -> Result<&Keyframe> {
        self.keyframes.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.keyframes.len(),
        })
    }

    /// Add a keyframe at the end and move the cursor onto it.
    /// Returns the index of the new keyframe.
    pub fn append(&mut self, pose: Pose) -> usize {
        self.keyframes.push(Keyframe::new(pose));
        let index = self.keyframes.len() - 1;
        self.current = Some(index);
        self.bump_revision(PathChangeKind::Appended);
        debug!("keyframe {} added", index);
        index
    }

    /// Remove the last keyframe. No-op when the path is empty.
    pub fn delete_last(&mut self) -> Option<Keyframe> {
        let Some(removed) = self.keyframes.pop() else {
            warn!("no keyframe can be removed (empty path)");
            return None;
        };
        self.current = self.keyframes.len().checked_sub(1);
        self.bump_revision(PathChangeKind::RemovedLast);
        Some(removed)
    }

    /// Remove every keyframe. Returns the number of removed keyframes.
    ///
    /// The path performs the clear unconditionally; confirming a destructive
    /// clear is up to the caller.
    pub fn clear(&mut self) -> usize {
        if self.keyframes.is_empty() {
            warn!("nothing to clear (empty path)");
            return 0;
        }
        let removed = self.keyframes.len();
        self.keyframes.clear();
        self.current = None;
        self.bump_revision(PathChangeKind::Cleared);
        removed
    }

    /// Replace the whole keyframe sequence; the cursor goes back to rest
    pub fn replace_all(&mut self, keyframes: Vec<Keyframe>) {
        self.keyframes = keyframes;
        self.current = None;
        self.bump_revision(PathChangeKind::Replaced);
    }

    /// Move the cursor to `index`, clamped to the valid range.
    /// Returns the new cursor, or `None` on an empty path.
    pub fn move_to(&mut self, index: usize) -> Option<usize> {
        if self.keyframes.is_empty() {
            warn!("cannot move to keyframe {} (empty path)", index);
            return None;
        }
        let clamped = index.min(self.keyframes.len() - 1);
        self.current = Some(clamped);
        self.notify(PathChangeKind::CursorMoved);
        Some(clamped)
    }

    /// Register a "path modified" listener
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PathChange) + Send + 'static,
    {
        self.path_modified.subscribe(listener)
    }

    /// Remove a "path modified" listener
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.path_modified.unsubscribe(id)
    }

    fn bump_revision(&mut self, kind: PathChangeKind) {
        self.revision += 1;
        self.notify(kind);
    }

    fn notify(&mut self, kind: PathChangeKind) {
        let change = PathChange {
            kind,
            len: self.keyframes.len(),
            current: self.current,
        };
        self.path_modified.emit(&change);
    }
}

impl PartialEq for CameraPath {
    fn eq(&self, other: &Self) -> bool {
        self.keyframes == other.keyframes && self.current == other.current
    }
}

impl<'a> IntoIterator for &'a CameraPath {
    type Item = &'a Keyframe;
    type IntoIter = std::slice::Iter<'a, Keyframe>;

    fn into_iter(self) -> Self::IntoIter {
        self.keyframes.iter()
    }
}
