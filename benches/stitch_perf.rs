//! Performance benchmarks for the post normalization pipeline.
//!
//! Run with: `cargo bench --bench stitch_perf`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::time::Duration;

use xstatic::{MediaIndex, RawPost, RenderOptions, TextSpan, Timeline, render_page, stitch};

/// Text of `words` words with every fourth one replaced by a span.
fn text_with_spans(words: usize) -> (String, Vec<TextSpan>) {
    let mut text = String::new();
    let mut spans = Vec::new();
    let mut pos = 0;
    for i in 0..words {
        let word = if i % 7 == 0 { "naïve" } else { "word" };
        if i % 4 == 0 {
            spans.push(TextSpan::new(
                pos,
                pos + word.chars().count(),
                format!("<span class=\"hashtag\">#{word}</span>"),
            ));
        }
        text.push_str(word);
        text.push(if i % 10 == 9 { '\n' } else { ' ' });
        pos += word.chars().count() + 1;
    }
    (text, spans)
}

fn synthetic_posts(count: usize) -> Vec<RawPost> {
    (0..count)
        .map(|i| {
            let day = i % 28 + 1;
            serde_json::from_value(serde_json::json!({
                "id_str": i.to_string(),
                "full_text": format!("post {i} about #rust with https://t.co/x{i}"),
                "created_at": format!("2021-02-{day:02}T10:00:00Z"),
                "entities": {
                    "hashtags": [{"text": "rust", "indices": [(i.to_string().len() + 12).to_string(), (i.to_string().len() + 17).to_string()]}],
                }
            }))
            .unwrap_or_else(|e| panic!("bad synthetic post: {e}"))
        })
        .collect()
}

fn bench_stitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitch");
    group.measurement_time(Duration::from_secs(5));

    for words in [10, 100, 1_000] {
        let (text, spans) = text_with_spans(words);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(words), &words, |b, _| {
            b.iter(|| {
                let out = stitch("bench", black_box(&text), spans.clone());
                black_box(out)
            });
        });
    }

    group.finish();
}

fn bench_timeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline");
    group.measurement_time(Duration::from_secs(8));
    group.sample_size(50);

    let media = MediaIndex::default();
    for count in [100, 10_000] {
        let posts = synthetic_posts(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("from_raw", count), &posts, |b, posts| {
            b.iter(|| black_box(Timeline::from_raw(posts, &media, "bench", None)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let timeline = Timeline::from_raw(&synthetic_posts(5_000), &MediaIndex::default(), "bench", None);
    let options = RenderOptions::default();

    let mut group = c.benchmark_group("render");
    group.measurement_time(Duration::from_secs(8));
    group.bench_function("index_5000", |b| {
        b.iter(|| black_box(render_page(&timeline.posts, &options)));
    });
    group.finish();
}

criterion_group!(
    name = pipeline_benches;
    config = Criterion::default().significance_level(0.05).noise_threshold(0.02);
    targets =
        bench_stitch,
        bench_timeline,
        bench_render
);

criterion_main!(pipeline_benches);
