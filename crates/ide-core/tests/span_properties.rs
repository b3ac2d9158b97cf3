mod common;

use common::TestLanguage;
use ide_core::{
    CancellationToken, EditorSnapshot, HighlightRequest, Highlighter, LabelSet, RequestId,
    StyleSpanSet, StyleSpanSetBuilder,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[char] = &['1', '2', '9', ' ', '+', '"', '\\', 'a', 'é', '👋', '\n'];
const LABELS: &[&str] = &["number", "string", "keyword", "caret-word"];

fn random_text(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..64);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

fn random_spans(rng: &mut StdRng, total_len: usize) -> StyleSpanSet {
    let mut builder = StyleSpanSetBuilder::new();
    while builder.len() < total_len {
        let remaining = total_len - builder.len();
        let len = rng.gen_range(1..=remaining.min(8));
        let labels: LabelSet = LABELS
            .iter()
            .filter(|_| rng.gen_bool(0.3))
            .map(|label| label.to_string())
            .collect();
        builder.add(labels, len);
    }
    builder.build()
}

#[test]
fn test_highlighting_covers_every_char() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let language = TestLanguage::numbers_and_strings();
    let highlighter = Highlighter::new();

    for _ in 0..200 {
        let text = random_text(&mut rng);
        let request = HighlightRequest::new(RequestId(1), EditorSnapshot::new(text.as_str(), 0));
        let spans = highlighter
            .create_style_spans(&request, &language, &CancellationToken::new())
            .unwrap();

        let sum: usize = spans.runs().iter().map(|run| run.length).sum();
        assert_eq!(sum, text.chars().count(), "text: {text:?}");
        assert!(
            spans.runs().windows(2).all(|w| w[0].labels != w[1].labels),
            "not normalized for {text:?}"
        );
    }
}

#[test]
fn test_merge_is_commutative_per_offset() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let total_len = rng.gen_range(0..48);
        let a = random_spans(&mut rng, total_len);
        let b = random_spans(&mut rng, total_len);

        let ab = a.merge(&b);
        let ba = b.merge(&a);
        assert_eq!(ab.total_len(), total_len);
        assert_eq!(ba.total_len(), total_len);

        for offset in 0..total_len {
            let expected: LabelSet = a
                .labels_at(offset)
                .unwrap()
                .union(b.labels_at(offset).unwrap())
                .cloned()
                .collect();
            assert_eq!(ab.labels_at(offset), Some(&expected));
            assert_eq!(ba.labels_at(offset), Some(&expected));
        }
        // Both results are normalized, so equal coverage means equal runs.
        assert_eq!(ab, ba);
    }
}

#[test]
fn test_splice_keeps_length_in_sync() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let total_len = rng.gen_range(0..48);
        let mut spans = random_spans(&mut rng, total_len);
        let start = rng.gen_range(0..=total_len);
        let end = rng.gen_range(start..=total_len);
        let inserted = rng.gen_range(0..10);

        spans.splice(start..end, inserted).unwrap();
        assert_eq!(spans.total_len(), total_len - (end - start) + inserted);
    }
}
