//! Property-based tests for section stream decoding

use flowdoc::transport::{Citation, EventStream, StreamEvent};
use futures::executor::block_on;
use futures::{stream, StreamExt};
use proptest::prelude::*;
use proptest::sample::Index;
use std::convert::Infallible;

fn encode(events: &[StreamEvent]) -> Vec<u8> {
    events
        .iter()
        .map(StreamEvent::to_sse_frame)
        .collect::<String>()
        .into_bytes()
}

fn split_at(bytes: &[u8], cuts: &[Index]) -> Vec<Vec<u8>> {
    let mut offsets: Vec<usize> = cuts.iter().map(|cut| cut.index(bytes.len() + 1)).collect();
    offsets.push(0);
    offsets.push(bytes.len());
    offsets.sort_unstable();
    offsets.dedup();
    offsets
        .windows(2)
        .map(|w| bytes[w[0]..w[1]].to_vec())
        .collect()
}

fn decode(chunks: Vec<Vec<u8>>) -> Vec<StreamEvent> {
    let bytes = stream::iter(chunks.into_iter().map(Ok::<Vec<u8>, Infallible>));
    block_on(
        EventStream::new(bytes)
            .map(|event| event.unwrap())
            .collect::<Vec<_>>(),
    )
}

fn deltas() -> impl Strategy<Value = Vec<StreamEvent>> {
    prop::collection::vec("[a-z 市场分析。\\n\"]{1,12}", 0..6)
        .prop_map(|texts| texts.into_iter().map(StreamEvent::delta).collect())
}

/// Decoded events do not depend on how the byte stream is chunked
#[test]
fn test_decoding_is_split_invariant() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(deltas(), prop::collection::vec(any::<Index>(), 0..10)),
            |(mut events, cuts)| {
                events.push(StreamEvent::Complete {
                    citation: Some(Citation::new("IMF 2024 报告", "https://www.imf.org/reports")),
                });
                let bytes = encode(&events);

                let whole = decode(vec![bytes.clone()]);
                let split = decode(split_at(&bytes, &cuts));

                prop_assert_eq!(&whole, &events);
                prop_assert_eq!(split, whole);
                Ok(())
            },
        )
        .unwrap();
}

/// Nothing after the first terminal event is ever yielded
#[test]
fn test_terminal_event_ends_stream() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(deltas(), deltas(), any::<bool>(), prop::collection::vec(any::<Index>(), 0..6)),
            |(before, after, failed, cuts)| {
                let terminal = if failed {
                    StreamEvent::Error {
                        message: "backend failed".to_string(),
                    }
                } else {
                    StreamEvent::Complete { citation: None }
                };
                let mut events = before.clone();
                events.push(terminal.clone());
                events.extend(after);

                let decoded = decode(split_at(&encode(&events), &cuts));

                let mut expected = before;
                expected.push(terminal);
                prop_assert_eq!(decoded, expected);
                Ok(())
            },
        )
        .unwrap();
}
