//! End-to-end stack lifecycles against the in-memory client

use chrono::Utc;
use stackflow_cloud::testing::{FakeStackApi, event_at, stack};
use stackflow_cloud::{
    LifecycleTracker, ParameterSet, StackAction, StackError, StackManager, TrackerConfig,
    TrackerState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::test(start_paused = true)]
async fn test_create_wait_success() {
    let api = Arc::new(FakeStackApi::new());
    api.script_statuses(
        "web",
        &[
            "CREATE_IN_PROGRESS",
            "CREATE_IN_PROGRESS",
            "CREATE_IN_PROGRESS",
            "CREATE_COMPLETE",
        ],
    );
    let manager = StackManager::new(Arc::clone(&api));

    let options = ParameterSet::new()
        .with("InstanceType", "t3.small")
        .with("tag.team", "platform");
    let identity = manager.create("web", "{}", &options).await.unwrap();

    let started = Instant::now();
    let result = manager.wait(&identity.name, TIMEOUT).await;
    assert_eq!(TrackerState::of(&result), TrackerState::SuccessTerminal);
    assert_eq!(api.describe_calls(), 4);
    assert_eq!(started.elapsed(), Duration::from_secs(15));

    let request = &api.submitted()[0];
    assert_eq!(request.action(), StackAction::CreateStack);
    assert_eq!(
        request.tags(),
        vec![
            ("Name".to_string(), "web".to_string()),
            ("team".to_string(), "platform".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_rollback_reports_failures() {
    let api = Arc::new(FakeStackApi::new());
    api.script_statuses(
        "web",
        &["UPDATE_IN_PROGRESS", "UPDATE_ROLLBACK_IN_PROGRESS"],
    );
    let now = Utc::now();
    api.push_event(
        "web",
        event_at("OldQueue", "UPDATE_FAILED", "stale", now - chrono::Duration::hours(1)),
    );
    api.push_event(
        "web",
        event_at("WebInstance", "UPDATE_FAILED", "Instance type not supported", now),
    );
    api.push_event(
        "web",
        event_at("WebSecurityGroup", "UPDATE_FAILED", "Resource update cancelled", now),
    );
    let manager = StackManager::new(Arc::clone(&api));

    manager
        .update("web", "{}", &ParameterSet::new())
        .await
        .unwrap();
    let err = manager.wait("web", TIMEOUT).await.unwrap_err();

    let failures = err.failures().unwrap();
    assert_eq!(
        failures,
        [
            "UPDATE_FAILED: Instance type not supported",
            "UPDATE_FAILED: Resource update cancelled",
        ]
    );
    assert_eq!(err.to_string(), "UPDATE_FAILED: Resource update cancelled");
    assert_eq!(api.describe_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_trackers_run_concurrently() {
    let web = Arc::new(FakeStackApi::new());
    web.script_statuses(
        "web",
        &["CREATE_IN_PROGRESS", "CREATE_IN_PROGRESS", "CREATE_COMPLETE"],
    );
    let db = Arc::new(FakeStackApi::new());
    db.script_statuses("db", &["CREATE_IN_PROGRESS", "ROLLBACK_COMPLETE"]);

    let web_tracker = LifecycleTracker::new(Arc::clone(&web));
    let db_tracker = LifecycleTracker::new(Arc::clone(&db));

    let started = Instant::now();
    let (web_result, db_result) = tokio::join!(
        web_tracker.wait("web", TIMEOUT),
        db_tracker.wait("db", TIMEOUT)
    );

    assert!(web_result.is_ok());
    assert!(matches!(db_result, Err(StackError::Status { .. })));
    // Both waits share the clock: the longer one decides the elapsed time
    assert_eq!(started.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_shared_cancellation_stops_every_wait() {
    let api = Arc::new(FakeStackApi::new());
    api.add_stack(stack("web", "CREATE_IN_PROGRESS"));
    api.add_stack(stack("db", "UPDATE_IN_PROGRESS"));

    let manager = StackManager::new(Arc::clone(&api));
    let cancel = manager.tracker().cancellation_token();

    let canceller = async {
        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();
    };
    let (web, db, ()) = tokio::join!(
        manager.wait("web", TIMEOUT),
        manager.wait("db", TIMEOUT),
        canceller
    );

    assert!(web.unwrap_err().is_cancelled());
    assert!(db.unwrap_err().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_configured_interval_and_timeout() {
    let api = Arc::new(FakeStackApi::new());
    api.add_stack(stack("web", "CREATE_IN_PROGRESS"));

    let manager = StackManager::new(Arc::clone(&api)).with_tracker_config(TrackerConfig {
        poll_interval: Duration::from_secs(30),
        lookback: Duration::from_secs(2),
    });

    let err = manager
        .wait("web", Duration::from_secs(100))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    // Polls at 0, 30, 60, 90 and 120s; the deadline is checked after each
    assert_eq!(api.describe_calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_complete_after_delete_request() {
    let api = Arc::new(FakeStackApi::new());
    api.script_statuses(
        "old",
        &["UPDATE_ROLLBACK_IN_PROGRESS", "UPDATE_ROLLBACK_COMPLETE"],
    );
    let manager = StackManager::new(Arc::clone(&api));

    manager.wait_for_complete("old", TIMEOUT).await.unwrap();
    manager.delete("old").await.unwrap();

    assert_eq!(api.submitted()[0].action(), StackAction::DeleteStack);
    assert_eq!(api.event_calls(), 0);
}
