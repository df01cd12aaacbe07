//! Sync into a real `SQLite` file and read back through the cached paths.

mod common;

use chrono::Utc;
use common::fixtures::IssueBuilder;
use common::{sample_fixture, test_db};
use tempfile::TempDir;
use tracker_dash::dashboard::{Dashboard, sync_project, sync_projects};
use tracker_dash::model::{CreatedRange, FilterSet};
use tracker_dash::remote::{FixtureSource, IssueSource};
use tracker_dash::stats::aggregate;
use tracker_dash::storage::SqliteStorage;

fn sample_source() -> FixtureSource {
    FixtureSource::load(&sample_fixture()).expect("sample fixture loads")
}

#[test]
fn sync_mirrors_one_project_with_releases() {
    let _log = common::test_log("sync_mirrors_one_project_with_releases");
    let dir = TempDir::new().unwrap();
    let mut storage = SqliteStorage::open(&dir.path().join("dashboard.db")).unwrap();
    let source = sample_source();

    assert_eq!(sync_projects(&source, &mut storage).unwrap(), 2);
    let report = sync_project(&source, &mut storage, "SHOP").unwrap();

    assert_eq!(report.fetched, 4);
    assert_eq!(report.created, 4);
    assert_eq!(report.versions, 2);
    assert_eq!(storage.count_issues().unwrap(), 4);
    assert!(storage.get_issue("OPS-1").unwrap().is_none());

    let keys: Vec<String> = storage.list_projects().unwrap().into_iter().map(|p| p.key).collect();
    assert!(keys.contains(&"SHOP".to_string()) && keys.contains(&"OPS".to_string()));

    let versions = storage.list_versions("SHOP").unwrap();
    assert!(versions.iter().any(|v| v.name == "v1.0" && v.released));

    let synced = storage.last_sync("SHOP").unwrap().expect("last sync stamped");
    assert!(synced <= Utc::now());
}

#[test]
fn stored_issue_round_trips_normalized_fields() {
    let _log = common::test_log("stored_issue_round_trips_normalized_fields");
    let mut storage = test_db();
    let source = sample_source();
    sync_project(&source, &mut storage, "SHOP").unwrap();

    let issue = storage.get_issue("SHOP-1").unwrap().unwrap();
    assert_eq!(issue.summary, "Checkout button does nothing on Safari");
    assert_eq!(issue.description, "Clicking checkout has no effect.");
    assert_eq!(issue.assignee_id.as_deref(), Some("acc-ana"));
    assert_eq!(issue.fix_versions, vec!["v2.0".to_string()]);
    assert!(issue.resolved_at.is_none());

    let unparseable = storage.get_issue("SHOP-3").unwrap().unwrap();
    assert!(unparseable.updated_at.is_none());
    assert!(unparseable.assignee_name.is_none());
}

#[test]
fn cached_stats_match_live_stats() {
    let _log = common::test_log("cached_stats_match_live_stats");
    let mut storage = test_db();
    let source = sample_source();
    sync_project(&source, &mut storage, "SHOP").unwrap();
    sync_project(&source, &mut storage, "OPS").unwrap();

    let now = Utc::now();
    let filters = FilterSet::for_project("SHOP");
    let live = Dashboard::new(&source).stats_at(Some(&filters), now).unwrap();
    let cached = aggregate(&storage.list_issues(&filters).unwrap(), now);

    assert_eq!(live.total_issues, cached.total_issues);
    assert_eq!(live.backlog_aging, cached.backlog_aging);
    let mut live_status = live.status_distribution;
    let mut cached_status = cached.status_distribution;
    live_status.sort_by(|a, b| a.key.cmp(&b.key));
    cached_status.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(live_status, cached_status);
}

#[test]
fn cached_filters_use_the_same_vocabulary() {
    let _log = common::test_log("cached_filters_use_the_same_vocabulary");
    let mut storage = test_db();
    let source = sample_source();
    sync_project(&source, &mut storage, "SHOP").unwrap();

    let by_version = FilterSet {
        fix_version: Some(" v2.0".to_string()),
        ..Default::default()
    };
    let keys: Vec<String> = storage
        .list_issues(&by_version)
        .unwrap()
        .into_iter()
        .map(|i| i.key)
        .collect();
    assert_eq!(keys, vec!["SHOP-1", "SHOP-2"]);

    let by_assignee_name = FilterSet {
        assignee: Some("Ana Souza".to_string()),
        ..Default::default()
    };
    assert_eq!(storage.list_issues(&by_assignee_name).unwrap().len(), 2);

    let by_created = FilterSet {
        created: Some(CreatedRange {
            after: Some("2024-03-05".to_string()),
            before: None,
        }),
        ..Default::default()
    };
    assert_eq!(storage.list_issues(&by_created).unwrap().len(), 2);
}

#[test]
fn resync_overwrites_scalars_and_versions() {
    let _log = common::test_log("resync_overwrites_scalars_and_versions");
    let mut storage = test_db();
    storage
        .upsert_issues(&[IssueBuilder::new("SHOP-1")
            .status("Stale status")
            .fix_versions(&["v0.9", "v1.0"])
            .build()])
        .unwrap();

    let report = sync_project(&sample_source(), &mut storage, "SHOP").unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 3);
    let issue = storage.get_issue("SHOP-1").unwrap().unwrap();
    assert_eq!(issue.status, "To Do");
    assert_eq!(issue.fix_versions, vec!["v2.0".to_string()]);
}

#[test]
fn fixture_projects_and_versions() {
    let _log = common::test_log("fixture_projects_and_versions");
    let source = sample_source();

    let projects = source.projects().unwrap();
    let ops = projects.iter().find(|p| p.key == "OPS").unwrap();
    assert_eq!(ops.project_type, "software");
    assert_eq!(ops.lead_name.as_deref(), Some("Davi Rocha"));

    assert!(source.project_versions("OPS").unwrap().is_empty());
    assert_eq!(source.project_versions("SHOP").unwrap().len(), 2);
}
