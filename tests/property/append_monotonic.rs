//! Property-based tests for document store growth

use flowdoc::document::{Document, DocumentStore};
use proptest::prelude::*;

/// Appends only ever extend a section; other sections are untouched
#[test]
fn test_appends_extend_content() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((0usize..3, "[a-z 数据]{0,8}"), 0..30),
            |appends| {
                let store = DocumentStore::new(Document::new("doc", ["A", "B", "C"]));
                let mut expected = vec![String::new(); 3];

                for (index, text) in appends {
                    let before: Vec<String> =
                        (0..3).map(|i| store.content(i).unwrap()).collect();
                    store.append(index, &text).unwrap();

                    for (i, prior) in before.iter().enumerate() {
                        let now = store.content(i).unwrap();
                        prop_assert!(now.starts_with(prior.as_str()));
                        if i != index {
                            prop_assert_eq!(&now, prior);
                        }
                    }
                    expected[index].push_str(&text);
                }

                let document = store.snapshot();
                for (section, expected) in document.sections.iter().zip(&expected) {
                    prop_assert_eq!(&section.content, expected);
                }
                prop_assert!(store.append(3, "x").is_err());
                Ok(())
            },
        )
        .unwrap();
}
