//! Change notifications for document renderers.

use crate::transport::Citation;

/// One mutation applied to the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentChange {
    Appended { index: usize, text: String },
    CitationSet { index: usize, citation: Citation },
    Replaced { index: usize, content: String },
    Cleared,
}

impl DocumentChange {
    /// Section touched by the change; `None` for whole-document changes.
    pub fn section_index(&self) -> Option<usize> {
        match self {
            DocumentChange::Appended { index, .. }
            | DocumentChange::CitationSet { index, .. }
            | DocumentChange::Replaced { index, .. } => Some(*index),
            DocumentChange::Cleared => None,
        }
    }
}

/// Render seam: notified after every store mutation, outside the store lock.
pub trait DocumentObserver: Send + Sync {
    fn on_change(&self, change: &DocumentChange);
}
