//! # Gateway Benchmarks
//!
//! Hot paths of a read request: resolving the API path and reading a sorted collection from
//! the in-memory store.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use tokio::runtime::Runtime;

use aipma_gateway::core::types::{timestamp, Document};
use aipma_gateway::routing::ApiRouter;
use aipma_gateway::storage::{DocumentStore, MemoryStore};
use aipma_gateway::Resource;

fn news_document(i: usize) -> Document {
    let published = chrono::DateTime::from_timestamp(1_700_000_000 + (i as i64 * 7919) % 1_000_000, 0)
        .unwrap_or_default();
    let mut doc = Document::new();
    doc.insert("id".to_string(), json!(format!("n-{}", i)));
    doc.insert("titulo".to_string(), json!(format!("Noticia {}", i)));
    doc.insert("fecha".to_string(), json!(timestamp::format(&published)));
    doc
}

fn benchmark_path_resolution(c: &mut Criterion) {
    let router = ApiRouter::new("/api").unwrap();
    let mut group = c.benchmark_group("path_resolution");

    for path in ["/api", "/api/noticias", "/api/eventos/5f0c2b1e-7a0d-4a51-9d4e-1c2b3a4d5e6f", "/other"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), path, |b, path| {
            b.iter(|| {
                let route = router.resolve(black_box(path));
                black_box(route.and_then(|r| r.resource().and_then(Resource::from_segment)))
            })
        });
    }

    group.finish();
}

fn benchmark_sorted_reads(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("memory_find_all");

    for size in [10usize, 100, 1000] {
        let store = MemoryStore::new();
        rt.block_on(async {
            store
                .insert_many("noticias", (0..size).map(news_document).collect())
                .await
                .unwrap();
        });

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    let docs = store
                        .find_all("noticias", Resource::News.sort())
                        .await
                        .unwrap();
                    black_box(docs)
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_path_resolution, benchmark_sorted_reads);
criterion_main!(benches);
