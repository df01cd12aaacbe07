// Aggregation and cache performance benchmarks.
//
// Run with: cargo bench
//
// Performance Targets:
// | Operation              | Target   | Description                          |
// |------------------------|----------|--------------------------------------|
// | Aggregate (1k)         | < 1ms    | Full stats over 1000 issues          |
// | Aggregate (10k)        | < 10ms   | Full stats over 10000 issues         |
// | Timeline (10k, 365d)   | < 10ms   | Daily series over 10000 issues       |
// | Fetch all (10k)        | < 50ms   | 100 fixture batches, normalized      |
// | Cached list (10k)      | < 100ms  | Filtered read from SQLite            |

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;
use std::sync::Once;
use tempfile::TempDir;
use tracker_dash::fetch::fetch_all;
use tracker_dash::model::{FilterSet, Issue};
use tracker_dash::remote::{FixtureSource, RawIssue};
use tracker_dash::stats::{aggregate, filter_options, timeline};
use tracker_dash::storage::SqliteStorage;

const STATUSES: [&str; 5] = ["To Do", "In Progress", "In Review", "Done", "Closed"];
const TYPES: [&str; 4] = ["Bug", "Task", "Story", "Epic"];
const PRIORITIES: [&str; 5] = ["Highest", "High", "Medium", "Low", "Lowest"];

fn bench_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

/// Create a test issue with the given index.
fn create_test_issue(i: usize, now: DateTime<Utc>) -> Issue {
    let age = i64::try_from(i % 400).expect("age fits i64");
    Issue {
        key: format!("BENCH-{i}"),
        id: i.to_string(),
        summary: format!("Benchmark issue {i}"),
        status: STATUSES[i % STATUSES.len()].to_string(),
        issue_type: TYPES[i % TYPES.len()].to_string(),
        priority: (i % 7 != 0).then(|| PRIORITIES[i % PRIORITIES.len()].to_string()),
        assignee_name: (i % 3 != 0).then(|| format!("user{}", i % 25)),
        assignee_id: (i % 3 != 0).then(|| format!("acc-{}", i % 25)),
        reporter_name: Some(format!("user{}", i % 11)),
        reporter_id: Some(format!("acc-{}", i % 11)),
        created_at: Some(now - Duration::days(age)),
        updated_at: Some(now - Duration::days(age / 2)),
        resolved_at: (i % 4 == 0).then(|| now - Duration::days(age / 3)),
        fix_versions: (0..i % 3).map(|v| format!("v{}.0", (i + v) % 6)).collect(),
        ..Default::default()
    }
}

fn create_raw_issue(i: usize) -> RawIssue {
    serde_json::from_value(json!({
        "id": i.to_string(),
        "key": format!("BENCH-{i}"),
        "fields": {
            "summary": format!("Benchmark issue {i}"),
            "status": {"name": STATUSES[i % STATUSES.len()]},
            "issuetype": {"name": TYPES[i % TYPES.len()]},
            "priority": {"name": PRIORITIES[i % PRIORITIES.len()]},
            "created": "2024-03-01T10:00:00.123+0000",
            "fixVersions": [{"name": format!("v{}.0", i % 6)}]
        }
    }))
    .expect("valid raw issue")
}

fn init_bench_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracker_dash::logging::init_logging(0, false, None);
    });
}

fn bench_aggregate(c: &mut Criterion) {
    init_bench_logging();
    let now = bench_now();
    let mut group = c.benchmark_group("stats/aggregate");

    for size in [1_000usize, 10_000] {
        let issues: Vec<Issue> = (0..size).map(|i| create_test_issue(i, now)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &issues, |b, issues| {
            b.iter(|| aggregate(black_box(issues), now));
        });
    }

    group.finish();
}

fn bench_timeline_and_options(c: &mut Criterion) {
    init_bench_logging();
    let now = bench_now();
    let issues: Vec<Issue> = (0..10_000).map(|i| create_test_issue(i, now)).collect();
    let mut group = c.benchmark_group("stats/derived");

    group.bench_function("timeline_365d", |b| {
        b.iter(|| timeline(black_box(&issues), now.date_naive(), 365));
    });
    group.bench_function("filter_options", |b| {
        b.iter(|| filter_options(black_box(&issues)));
    });

    group.finish();
}

fn bench_fetch_all(c: &mut Criterion) {
    init_bench_logging();
    let source = FixtureSource::from_issues((0..10_000).map(create_raw_issue).collect());
    let filters = FilterSet {
        fix_version: Some("v2.0".to_string()),
        ..Default::default()
    };
    let mut group = c.benchmark_group("fetch/all");
    group.sample_size(20);

    group.bench_function("unfiltered_10k", |b| {
        b.iter(|| fetch_all(black_box(&source), None).expect("fetch"));
    });
    group.bench_function("fix_version_10k", |b| {
        b.iter(|| fetch_all(black_box(&source), Some(&filters)).expect("fetch"));
    });

    group.finish();
}

fn bench_cached_list(c: &mut Criterion) {
    init_bench_logging();
    let now = bench_now();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut storage = SqliteStorage::open(&dir.path().join("bench.db")).expect("Failed to open db");
    let issues: Vec<Issue> = (0..10_000).map(|i| create_test_issue(i, now)).collect();
    storage.upsert_issues(&issues).expect("Failed to seed db");

    let by_status = FilterSet {
        status: Some("In Progress".to_string()),
        ..Default::default()
    };
    let mut group = c.benchmark_group("storage/list");
    group.sample_size(20);

    group.bench_function("all_10k", |b| {
        b.iter(|| storage.list_issues(black_box(&FilterSet::default())).expect("list"));
    });
    group.bench_function("by_status_10k", |b| {
        b.iter(|| storage.list_issues(black_box(&by_status)).expect("list"));
    });

    group.finish();
}

criterion_group!(stats_benches, bench_aggregate, bench_timeline_and_options);
criterion_group!(io_benches, bench_fetch_all, bench_cached_list);
criterion_main!(stats_benches, io_benches);
