mod common;

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use metrics_util::debugging::{DebuggingRecorder, Snapshotter};
use reelshelf::application::catalog::CatalogPolicy;
use reelshelf::domain::entities::NewRating;
use reelshelf::infra::telemetry;
use serial_test::serial;

use common::{CountingCache, FailingCache, InMemoryCatalog, numbered_items, service};

fn snapshotter() -> &'static Snapshotter {
    static SNAPSHOTTER: OnceLock<Snapshotter> = OnceLock::new();
    SNAPSHOTTER.get_or_init(|| {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        recorder
            .install()
            .expect("debug metrics recorder should install in this test process");
        telemetry::describe_metrics();
        snapshotter
    })
}

fn metric_names(snapshotter: &Snapshotter) -> HashSet<String> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect()
}

#[tokio::test]
#[serial]
async fn read_path_emits_hit_miss_and_latency() {
    let snapshotter = snapshotter();
    let repo = Arc::new(InMemoryCatalog::with_items(numbered_items(4)));
    let service = service(repo, Arc::new(CountingCache::default()), CatalogPolicy::default());

    service.list_items(1, 2).await.expect("miss");
    service.list_items(1, 2).await.expect("hit");

    let names = metric_names(snapshotter);
    for metric in [
        "reelshelf_cache_hit_total",
        "reelshelf_cache_miss_total",
        "reelshelf_store_query_ms",
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}

#[tokio::test]
#[serial]
async fn degraded_cache_calls_are_labelled_by_operation() {
    let snapshotter = snapshotter();
    let repo = Arc::new(InMemoryCatalog::with_items(numbered_items(4)));
    let service = service(repo, Arc::new(FailingCache), CatalogPolicy::default());

    service.list_items(1, 2).await.expect("falls back to store");

    let ops: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(composite_key, _, _, _)| {
            composite_key.key().name() == "reelshelf_cache_degraded_total"
        })
        .flat_map(|(composite_key, _, _, _)| {
            composite_key
                .key()
                .labels()
                .filter(|label| label.key() == "op")
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    assert!(ops.contains("get"), "ops seen: {ops:?}");
    assert!(ops.contains("set"), "ops seen: {ops:?}");
}

#[tokio::test]
#[serial]
async fn rating_invalidation_is_counted() {
    let snapshotter = snapshotter();
    let repo = Arc::new(InMemoryCatalog::with_items(numbered_items(4)));
    let policy = CatalogPolicy {
        invalidate_on_rating: true,
        ..CatalogPolicy::default()
    };
    let service = service(repo, Arc::new(CountingCache::default()), policy);

    service.list_items(1, 2).await.expect("cached");
    service
        .submit_rating(NewRating {
            item_id: 1,
            score: 4.0,
            comment: String::new(),
        })
        .await
        .expect("rating stored");

    let names = metric_names(snapshotter);
    assert!(names.contains("reelshelf_cache_invalidated_total"));
}

#[test]
#[serial]
fn metric_descriptions_are_registered() {
    let snapshotter = snapshotter();
    // Descriptions only show up once the metric has been touched.
    metrics::counter!("reelshelf_cache_hit_total").increment(0);

    let described = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .any(|(composite_key, unit, description, _)| {
            composite_key.key().name() == "reelshelf_cache_hit_total"
                && unit.is_some()
                && description.is_some()
        });
    assert!(described);
}
