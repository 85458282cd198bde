//! Benchmarks for the storyboard index.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sceneboard::{share, ContentIdea, SharedDocument, StoryboardConfig, StoryboardManager, TreeDocument};
use serde_json::json;

/// Root with `nodes` children; every other child hosts a scene.
fn build_document(nodes: i64) -> TreeDocument {
    let mut root = ContentIdea::new(0, "root").with_attr("storyboards", json!(["main", "alt"]));
    for i in 1..=nodes {
        let mut idea = ContentIdea::new(i, format!("idea {}", i));
        if i % 2 == 0 {
            idea = idea.with_attr(
                "storyboard-scenes",
                json!([{"storyboards": {"main": i, "alt": nodes - i}}]),
            );
        }
        root = root.with_idea(i.to_string(), idea);
    }
    TreeDocument::from_content(&root).unwrap()
}

fn manager_for(doc: SharedDocument<TreeDocument>) -> StoryboardManager<TreeDocument> {
    let mut manager = StoryboardManager::new(StoryboardConfig::default());
    manager.set_document(doc);
    manager
}

fn bench_get_scenes(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_scenes");
    for size in [100i64, 1000] {
        let manager = manager_for(share(build_document(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(manager.scenes()))
        });
    }
    group.finish();
}

fn bench_get_scenes_uncached(c: &mut Criterion) {
    c.bench_function("get_scenes_uncached_1000", |b| {
        let mut doc = build_document(1000);
        // A targeted write drops the hydrated cache.
        doc.set_title(1, "renamed").unwrap();
        let manager = manager_for(share(doc));
        b.iter(|| black_box(manager.scenes()))
    });
}

fn bench_insertion_index(c: &mut Criterion) {
    c.bench_function("insertion_index_after_1000", |b| {
        let manager = manager_for(share(build_document(1000)));
        b.iter(|| black_box(manager.insertion_index_after(Some(500))))
    });
}

fn bench_insert_chain(c: &mut Criterion) {
    c.bench_function("add_scene_chain_50", |b| {
        b.iter(|| {
            let manager = manager_for(share(build_document(50)));
            for _ in 0..50 {
                let index = manager.insertion_index_after(Some(2)).unwrap();
                manager.add_scene(1, index).unwrap();
            }
            black_box(manager.scenes().len())
        })
    });
}

fn bench_create_storyboard(c: &mut Criterion) {
    c.bench_function("create_storyboard", |b| {
        let mut manager = manager_for(share(build_document(10)));
        b.iter(|| black_box(manager.create_storyboard().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_get_scenes,
    bench_get_scenes_uncached,
    bench_insertion_index,
    bench_insert_chain,
    bench_create_storyboard,
);

criterion_main!(benches);
