use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ide_core::{
    CancellationToken, EditorSnapshot, HighlightRequest, Highlighter, LanguageSupport, RequestId,
    StyleLabel, StyleRun, StyleSpanSet, first_named_group,
};
use regex::{Captures, Regex};

struct Bench(Regex);

impl LanguageSupport for Bench {
    fn name(&self) -> &str {
        "bench"
    }

    fn pattern(&self) -> Option<&Regex> {
        Some(&self.0)
    }

    fn style_class_for(&self, captures: &Captures<'_>) -> Option<StyleLabel> {
        first_named_group(&self.0, captures)
    }
}

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 48);
    for i in 0..line_count {
        out.push_str(&format!("let value_{i} = {i} + \"line {i}\"; // ide-core\n"));
    }
    out.pop();
    out
}

fn bench_full_document(c: &mut Criterion) {
    let language = Bench(
        Regex::new(r#"(?P<keyword>\blet\b)|(?P<number>[0-9]+)|(?P<string>"([^"\\]|\\.)*")|(?P<comment>//[^\n]*)"#)
            .unwrap(),
    );
    let highlighter = Highlighter::new();
    let request = HighlightRequest::new(RequestId(1), EditorSnapshot::new(large_text(20_000), 0));
    let token = CancellationToken::new();

    c.bench_function("create_style_spans/20k_lines", |b| {
        b.iter(|| {
            let spans = highlighter
                .create_style_spans(black_box(&request), &language, &token)
                .unwrap();
            black_box(spans.runs().len());
        })
    });
}

fn bench_merge(c: &mut Criterion) {
    let a = StyleSpanSet::build((0..50_000).map(|i| {
        if i % 2 == 0 {
            StyleRun::labeled(5, "number")
        } else {
            StyleRun::plain(3)
        }
    }));
    let b = StyleSpanSet::build((0..40_000).map(|i| {
        if i % 3 == 0 {
            StyleRun::labeled(7, "caret-word")
        } else {
            StyleRun::plain(2)
        }
    }));

    c.bench_function("merge/90k_runs", |bench| {
        bench.iter(|| black_box(a.merge(black_box(&b))).total_len())
    });
}

criterion_group!(benches, bench_full_document, bench_merge);
criterion_main!(benches);
