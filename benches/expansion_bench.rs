//! Criterion benchmarks for query expansion.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rocchio::analysis::analyzer::{Analyzer, StandardAnalyzer};
use rocchio::backend::{FieldStatistics, MemoryBackend, MemoryIndex, TermVector};
use rocchio::expansion::{Bm25Params, Bm25Weighter, CorpusStatistics, RocchioConfig, RocchioExpander};

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let words = [
        "search", "engine", "query", "document", "term", "relevance", "feedback", "expansion",
        "retrieval", "ranking", "brain", "lesion", "myelin", "sclerosis", "glioma", "tumor",
        "cardiac", "heart", "rhythm", "therapy", "clinical", "trial", "dataset", "protein",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 50 + (i % 100); // Variable length documents
        let mut doc_words = Vec::with_capacity(doc_length);

        for j in 0..doc_length {
            let word_idx = (i * 7 + j * 13) % words.len(); // Pseudo-random distribution
            doc_words.push(words[word_idx]);
        }

        documents.push(doc_words.join(" "));
    }

    documents
}

fn build_backend(count: usize) -> Arc<MemoryBackend> {
    let mut index = MemoryIndex::default();
    for (i, text) in generate_test_documents(count).iter().enumerate() {
        index
            .add_document(&i.to_string(), [("body", text.as_str())])
            .unwrap();
    }
    Arc::new(MemoryBackend::new().with_index("bench", index))
}

/// Benchmark BM25 weighting of a single feedback document.
fn bench_weighting(c: &mut Criterion) {
    let mut group = c.benchmark_group("bm25_weighting");

    let mut vector = TermVector::new("doc", FieldStatistics::new(10_000, 1_000_000));
    for i in 0..200u64 {
        vector = vector.with_term(format!("term{i}"), 1 + i % 7, 1 + i * 13 % 5_000);
    }
    let raw = vector.raw_vector();
    let mut stats = CorpusStatistics::new();
    stats.observe(&vector);
    let weighter = Bm25Weighter::new(Bm25Params::default());

    group.throughput(Throughput::Elements(raw.len() as u64));
    group.bench_function("weight_200_terms", |b| {
        b.iter(|| black_box(weighter.weight(black_box(&raw), &stats)))
    });

    group.finish();
}

/// Benchmark full expansions against the in-memory backend.
fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");

    let analyzer = StandardAnalyzer::new();
    let texts = generate_test_documents(100);
    group.bench_function("analyze_document", |b| {
        b.iter(|| black_box(analyzer.terms(black_box(&texts[0]))))
    });

    let backend = build_backend(1_000);
    for fb_docs in [10, 50] {
        let config = RocchioConfig::default()
            .with_field("body")
            .with_fb_docs(fb_docs)
            .with_fb_terms(20);
        let expander = RocchioExpander::with_backend(backend.clone(), config).unwrap();

        group.bench_function(format!("expand_fb_docs_{fb_docs}"), |b| {
            b.iter(|| {
                let result =
                    tokio_test::block_on(expander.expand("bench", black_box("brain lesion")));
                black_box(result)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_weighting, bench_expansion);
criterion_main!(benches);
