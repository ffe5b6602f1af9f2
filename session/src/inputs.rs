//! The input list store.
//!
//! Edits are expressed as [`InputAction`]s and applied by
//! [`InputList::dispatch`]. Each successful edit publishes a fresh
//! [`InputSnapshot`]; earlier snapshots are never mutated.

use std::ops::Deref;
use std::sync::Arc;

use crate::error::{Result, SessionError};

/// Immutable view of the input list at one point in time.
///
/// Cloning is cheap. Two snapshots taken without an edit in between share
/// storage, which [`InputSnapshot::same_as`] can detect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputSnapshot(Arc<[String]>);

impl InputSnapshot {
    /// Whether both snapshots are the same allocation.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for InputSnapshot {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for InputSnapshot {
    fn from(items: Vec<String>) -> Self {
        Self(items.into())
    }
}

/// An edit to the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Append an empty string.
    Create,

    /// Replace the text at `index`.
    Update { index: usize, value: String },

    /// Remove the text at `index`.
    Delete(usize),
}

/// Ordered, position-addressed list of texts.
#[derive(Debug, Clone, Default)]
pub struct InputList {
    current: InputSnapshot,
}

impl InputList {
    /// Create a list holding `items`.
    pub fn new(items: Vec<String>) -> Self {
        Self {
            current: items.into(),
        }
    }

    /// Apply an edit and return the resulting snapshot.
    ///
    /// Out-of-range indices are rejected with
    /// [`SessionError::IndexOutOfRange`] and leave the list unchanged.
    pub fn dispatch(&mut self, action: InputAction) -> Result<InputSnapshot> {
        let len = self.current.len();
        let next: Vec<String> = match action {
            InputAction::Create => return Ok(self.create()),
            InputAction::Update { index, value } => {
                check_index(index, len)?;
                let mut items = self.current.to_vec();
                items[index] = value;
                items
            }
            InputAction::Delete(index) => {
                check_index(index, len)?;
                let mut items = self.current.to_vec();
                items.remove(index);
                items
            }
        };

        self.current = next.into();
        Ok(self.current.clone())
    }

    /// Append an empty string.
    pub fn create(&mut self) -> InputSnapshot {
        let mut items = Vec::with_capacity(self.current.len() + 1);
        items.extend_from_slice(&self.current);
        items.push(String::new());
        self.current = items.into();
        self.current.clone()
    }

    /// Replace the text at `index`.
    pub fn update(&mut self, index: usize, value: impl Into<String>) -> Result<InputSnapshot> {
        self.dispatch(InputAction::Update {
            index,
            value: value.into(),
        })
    }

    /// Remove the text at `index`.
    pub fn delete(&mut self, index: usize) -> Result<InputSnapshot> {
        self.dispatch(InputAction::Delete(index))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> InputSnapshot {
        self.current.clone()
    }

    /// Number of texts.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(SessionError::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(items: &[&str]) -> InputList {
        InputList::new(items.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_create_appends_empty() {
        let mut inputs = list(&["cat"]);
        let snapshot = inputs.create();
        assert_eq!(&*snapshot, &["cat".to_string(), String::new()]);
        assert_eq!(inputs.len(), 2);
    }

    #[test]
    fn test_update_replaces() {
        let mut inputs = list(&["cat", "dog"]);
        let snapshot = inputs.update(1, "wolf").unwrap();
        assert_eq!(snapshot.to_vec(), vec!["cat", "wolf"]);
    }

    #[test]
    fn test_delete_removes() {
        let mut inputs = list(&["a", "b", "c"]);
        let snapshot = inputs.delete(0).unwrap();
        assert_eq!(snapshot.to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn test_out_of_range_is_rejected_without_mutation() {
        let mut inputs = list(&["a", "b", "c"]);
        let before = inputs.snapshot();

        let err = inputs.update(5, "x").unwrap_err();
        assert!(matches!(err, SessionError::IndexOutOfRange { index: 5, len: 3 }));

        let err = inputs.delete(3).unwrap_err();
        assert!(matches!(err, SessionError::IndexOutOfRange { index: 3, len: 3 }));

        assert!(inputs.snapshot().same_as(&before));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut inputs = list(&["a"]);
        let first = inputs.snapshot();
        let second = inputs.update(0, "b").unwrap();

        assert_eq!(first.to_vec(), vec!["a"]);
        assert_eq!(second.to_vec(), vec!["b"]);
        assert!(!first.same_as(&second));
        assert!(second.same_as(&inputs.snapshot()));
    }

    #[test]
    fn test_dispatch_create_on_empty() {
        let mut inputs = InputList::default();
        assert!(inputs.is_empty());
        let snapshot = inputs.dispatch(InputAction::Create).unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}
