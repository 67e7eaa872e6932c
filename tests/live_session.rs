//! Live WebDriver integration tests.
//!
//! These drive a real Firefox through geckodriver and are ignored by
//! default. Run them manually with a driver listening on localhost:
//!
//! ```text
//! geckodriver --port 4444
//! cargo test --test live_session -- --ignored
//! ```

use std::time::Duration;

use isp_quota_checker::browser::{locate, wait_gone, SessionConfig, SessionManager, Strategy};
use isp_quota_checker::portal::selectors;
use isp_quota_checker::{AutomationError, SessionMode};

fn manager() -> SessionManager {
    let url = std::env::var("QUOTA_WEBDRIVER_URL")
        .unwrap_or_else(|_| "http://localhost:4444".to_string());
    SessionManager::new(SessionConfig::new(url))
}

#[tokio::test]
#[ignore] // requires a running geckodriver
async fn test_session_create_and_terminate() {
    let manager = manager();

    let client = manager
        .ensure(SessionMode::Headless)
        .await
        .expect("failed to create session; is geckodriver running on :4444?");
    assert_eq!(manager.current_mode().await, Some(SessionMode::Headless));

    client.goto("about:blank").await.expect("navigation failed");

    manager.terminate().await;
    assert_eq!(manager.current_mode().await, None);
    // Idempotent
    manager.terminate().await;
}

#[tokio::test]
#[ignore] // requires a running geckodriver
async fn test_same_mode_reuses_the_browser() {
    let manager = manager();

    let client = manager.ensure(SessionMode::Headless).await.unwrap();
    client.goto("about:blank").await.unwrap();
    // Mark the live page; a reused browser keeps window state (only
    // cookies are wiped)
    client
        .execute("window.__quota_marker = 'alive'; return null;", vec![])
        .await
        .unwrap();

    let client = manager.ensure(SessionMode::Headless).await.unwrap();
    let marker = client
        .execute("return window.__quota_marker || null;", vec![])
        .await
        .unwrap();
    assert_eq!(marker.as_str(), Some("alive"));

    manager.terminate().await;
}

#[tokio::test]
#[ignore] // requires a running geckodriver
async fn test_mode_switch_recreates_the_browser() {
    let manager = manager();

    let client = manager.ensure(SessionMode::Headless).await.unwrap();
    client.goto("about:blank").await.unwrap();
    client
        .execute("window.__quota_marker = 'alive'; return null;", vec![])
        .await
        .unwrap();

    // Different mode: a fresh browser, the marker is gone
    let client = manager.ensure(SessionMode::Visible).await.unwrap();
    assert_eq!(manager.current_mode().await, Some(SessionMode::Visible));
    client.goto("about:blank").await.unwrap();
    let marker = client
        .execute("return window.__quota_marker || null;", vec![])
        .await
        .unwrap();
    assert!(marker.is_null());

    manager.terminate().await;
}

#[tokio::test]
#[ignore] // requires a running geckodriver
async fn test_exhausted_candidates_report_the_target_and_keep_the_session() {
    let manager = manager();

    let client = manager.ensure(SessionMode::Headless).await.unwrap();
    client.goto("about:blank").await.unwrap();

    // about:blank has no login form, so every real username candidate runs
    // out its wait
    let candidates = selectors::username_field(Duration::from_millis(500));
    let err = locate(&client, "username field", &candidates)
        .await
        .unwrap_err();
    match err {
        AutomationError::ElementNotFound(target) => assert_eq!(target, "username field"),
        other => panic!("expected ElementNotFound, got {other:?}"),
    }

    // An ordinary miss leaves the browser alive for the next call
    assert_eq!(manager.current_mode().await, Some(SessionMode::Headless));
    client.goto("about:blank").await.unwrap();

    manager.terminate().await;
}

#[tokio::test]
#[ignore] // requires a running geckodriver
async fn test_wait_gone_distinguishes_absence_from_a_dead_session() {
    let manager = manager();

    let client = manager.ensure(SessionMode::Headless).await.unwrap();
    client.goto("about:blank").await.unwrap();

    let spinner = Strategy::css(".ant-spin-spinning");
    let gone = wait_gone(
        &client,
        &spinner,
        Duration::from_secs(2),
        Duration::from_millis(250),
    )
    .await
    .unwrap();
    assert!(gone);

    // Same query against a torn-down session must surface a fault, not
    // read as "element gone"
    manager.terminate().await;
    let err = wait_gone(
        &client,
        &spinner,
        Duration::from_secs(2),
        Duration::from_millis(250),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AutomationError::DriverFault(_)));
}
