//! Document Store
//!
//! Holds the ordered sections of one document. Content only grows through [`DocumentStore::append`];
//! a citation is written at most once per section. Readers get clones, and observers are
//! told about every mutation so a renderer can show partial progress.

use crate::error::ApiError;
use crate::transport::Citation;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub mod observer;

pub use observer::{DocumentChange, DocumentObserver};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            citation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Document {
    pub fn new<I, S>(title: impl Into<String>, section_titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            sections: section_titles.into_iter().map(Section::new).collect(),
        }
    }

    /// Plain-text rendering with headings and source lines.
    pub fn render_text(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for section in &self.sections {
            out.push_str(&format!("\n## {}\n\n", section.title));
            if !section.content.is_empty() {
                out.push_str(&section.content);
                out.push('\n');
            }
            if let Some(citation) = &section.citation {
                out.push_str(&format!("\n数据来源: {} ({})\n", citation.text, citation.url));
            }
        }
        out
    }
}

pub struct DocumentStore {
    document: RwLock<Document>,
    observers: RwLock<Vec<Arc<dyn DocumentObserver>>>,
}

impl DocumentStore {
    pub fn new(document: Document) -> Self {
        Self {
            document: RwLock::new(document),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn shared(document: Document) -> Arc<Self> {
        Arc::new(Self::new(document))
    }

    pub fn subscribe(&self, observer: Arc<dyn DocumentObserver>) {
        self.observers.write().push(observer);
    }

    pub fn snapshot(&self) -> Document {
        self.document.read().clone()
    }

    pub fn len(&self) -> usize {
        self.document.read().sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn title(&self) -> String {
        self.document.read().title.clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.document
            .read()
            .sections
            .iter()
            .map(|s| s.title.clone())
            .collect()
    }

    pub fn section_title(&self, index: usize) -> Result<String, ApiError> {
        self.read_section(index, |s| s.title.clone())
    }

    pub fn content(&self, index: usize) -> Result<String, ApiError> {
        self.read_section(index, |s| s.content.clone())
    }

    pub fn citation(&self, index: usize) -> Result<Option<Citation>, ApiError> {
        self.read_section(index, |s| s.citation.clone())
    }

    /// Append `text` to section `index`. Empty text is a no-op.
    pub fn append(&self, index: usize, text: &str) -> Result<(), ApiError> {
        if text.is_empty() {
            self.check_index(index)?;
            return Ok(());
        }
        self.write_section(index, |s| s.content.push_str(text))?;
        self.notify(DocumentChange::Appended {
            index,
            text: text.to_string(),
        });
        Ok(())
    }

    /// Record the citation for `index`. Returns `Ok(false)` if one was already set.
    pub fn set_citation(&self, index: usize, citation: Citation) -> Result<bool, ApiError> {
        let stored = self.write_section(index, |s| {
            if s.citation.is_some() {
                false
            } else {
                s.citation = Some(citation.clone());
                true
            }
        })?;
        if stored {
            self.notify(DocumentChange::CitationSet { index, citation });
        } else {
            debug!(index, "Citation already set, keeping the first one");
        }
        Ok(stored)
    }

    /// Overwrite section content (manual edits only).
    pub fn replace_content(&self, index: usize, text: &str) -> Result<(), ApiError> {
        self.write_section(index, |s| s.content = text.to_string())?;
        self.notify(DocumentChange::Replaced {
            index,
            content: text.to_string(),
        });
        Ok(())
    }

    /// Drop all content and citations, keeping the section titles.
    pub fn clear(&self) {
        {
            let mut document = self.document.write();
            for section in &mut document.sections {
                section.content.clear();
                section.citation = None;
            }
        }
        self.notify(DocumentChange::Cleared);
    }

    fn check_index(&self, index: usize) -> Result<(), ApiError> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(ApiError::SectionOutOfRange { index, len })
        }
    }

    fn read_section<T>(&self, index: usize, f: impl FnOnce(&Section) -> T) -> Result<T, ApiError> {
        let document = self.document.read();
        let len = document.sections.len();
        document
            .sections
            .get(index)
            .map(f)
            .ok_or(ApiError::SectionOutOfRange { index, len })
    }

    fn write_section<T>(
        &self,
        index: usize,
        f: impl FnOnce(&mut Section) -> T,
    ) -> Result<T, ApiError> {
        let mut document = self.document.write();
        let len = document.sections.len();
        document
            .sections
            .get_mut(index)
            .map(f)
            .ok_or(ApiError::SectionOutOfRange { index, len })
    }

    fn notify(&self, change: DocumentChange) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.on_change(&change);
        }
    }
}
