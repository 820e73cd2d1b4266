//! Integration tests for the sequencer driving the in-process generator

use crate::integration::test_utils::{chunks, ScriptedProvider};
use flowdoc::config::FlowConfig;
use flowdoc::document::{Document, DocumentStore};
use flowdoc::generator::{citation_for, LocalSectionSource, SectionGenerator};
use flowdoc::provider::{ChatMessage, CompletionOptions, MessageRole};
use flowdoc::sequencer::{
    DocumentSequencer, GenerationState, SequencerSnapshot, StartOutcome, DEFAULT_FAILURE_MARKER,
};
use std::sync::Arc;

fn sequencer(provider: Arc<ScriptedProvider>, titles: &[&str]) -> DocumentSequencer {
    let generator = SectionGenerator::new(provider, CompletionOptions::default());
    let source = Arc::new(LocalSectionSource::new(Arc::new(generator)));
    let store = DocumentStore::shared(Document::new("商业计划书", titles.iter().copied()));
    DocumentSequencer::new(store, source)
}

#[tokio::test]
async fn test_generates_configured_outline_in_order() {
    let config = FlowConfig::default();
    let titles: Vec<&str> = config.document.sections.iter().map(String::as_str).collect();
    let scripts = titles
        .iter()
        .map(|title| chunks(&[*title, "-", "done"]))
        .collect();
    let provider = Arc::new(ScriptedProvider::with_scripts(scripts));
    let sequencer = sequencer(provider.clone(), &titles);

    assert_eq!(sequencer.start().await, StartOutcome::Completed);

    let document = sequencer.store().snapshot();
    for section in &document.sections {
        assert_eq!(section.content, format!("{}-done", section.title));
        assert_eq!(section.citation, citation_for(&section.title));
    }
    assert!(document.sections[1].citation.is_some());
    assert!(document.sections[3].citation.is_some());
    assert_eq!(
        sequencer.snapshot(),
        SequencerSnapshot {
            state: GenerationState::Idle,
            cursor: None
        }
    );

    let requested: Vec<String> = provider
        .seen()
        .iter()
        .map(|messages| messages[1].content.clone())
        .collect();
    assert!(requested[0].contains("\"项目背景\""));
    assert!(requested[6].contains("\"发展规划\""));
}

#[tokio::test]
async fn test_backend_failure_pauses_and_retry_continues_section() {
    let provider = Arc::new(ScriptedProvider::with_scripts(vec![
        chunks(&["A1"]),
        vec![Ok("B1".to_string()), Err("upstream reset".to_string())],
        chunks(&[" B2"]),
    ]));
    let sequencer = sequencer(provider.clone(), &["A", "B"]);

    match sequencer.start().await {
        StartOutcome::Failed { section, message } => {
            assert_eq!(section, 1);
            assert!(message.contains("upstream reset"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let failed = format!("B1{}", DEFAULT_FAILURE_MARKER);
    assert_eq!(sequencer.store().content(1).unwrap(), failed);
    assert_eq!(sequencer.snapshot().state, GenerationState::Paused);
    assert_eq!(sequencer.snapshot().cursor, Some(1));

    // Retry after a manual fix of the failed section.
    sequencer.edit_section(1, "B1").unwrap();
    assert_eq!(sequencer.start().await, StartOutcome::Completed);
    assert_eq!(sequencer.store().content(1).unwrap(), "B1 B2");

    let retry = provider.seen().pop().unwrap();
    assert_eq!(retry.len(), 4);
    assert_eq!(retry[2], ChatMessage::assistant("B1"));
    assert_eq!(retry[3].role, MessageRole::User);
    assert_eq!(retry[3].content, "Please continue from where you left off.");
}

#[tokio::test]
async fn test_backend_refusing_to_open_marks_section() {
    let provider = Arc::new(ScriptedProvider::with_scripts(vec![]));
    let sequencer = sequencer(provider, &["A"]).with_failure_marker(" [failed]");

    assert!(matches!(
        sequencer.start().await,
        StartOutcome::Failed { section: 0, .. }
    ));
    assert_eq!(sequencer.store().content(0).unwrap(), " [failed]");
}

#[tokio::test]
async fn test_regenerating_completed_document_starts_fresh() {
    let provider = Arc::new(ScriptedProvider::with_scripts(vec![
        chunks(&["first"]),
        chunks(&["second"]),
    ]));
    let sequencer = sequencer(provider.clone(), &["A"]);

    assert_eq!(sequencer.start().await, StartOutcome::Completed);
    assert_eq!(sequencer.store().content(0).unwrap(), "first");
    assert_eq!(sequencer.start().await, StartOutcome::Completed);
    assert_eq!(sequencer.store().content(0).unwrap(), "second");
    let seen = provider.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].len(), seen[0].len());
    assert!(!seen[1].contains(&ChatMessage::assistant("first")));

    sequencer.reset().unwrap();
    assert_eq!(sequencer.store().content(0).unwrap(), "");
}
