mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use http::StatusCode;
use likeboost::config::DemoConfig;
use likeboost::orchestrator::{
    DEMO_CLAIMED_UID, DEMO_SUCCESS_UID, GENERIC_FAILURE, RequestError, RequestOrchestrator,
    RequestPhase,
};
use likeboost::quota::QuotaTracker;
use likeboost_api::functions::LikeOutcome;

#[tokio::test(start_paused = true)]
async fn demo_uid_resolves_after_fixed_delay_without_network() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = RequestOrchestrator::new(session, DemoConfig::default());

    let started = tokio::time::Instant::now();
    let outcome = orchestrator
        .submit(DEMO_SUCCESS_UID, Some(3))
        .await
        .expect("demo success");
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert!(started.elapsed() < Duration::from_millis(1600));

    let LikeOutcome::Success(success) = &outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(outcome.status(), 1);
    assert!(success.likes_after > success.likes_before);
    assert!(matches!(orchestrator.phase().await, RequestPhase::Success(_)));
    assert!(client.take_log().await.is_empty());

    assert!(orchestrator.acknowledge().await.is_terminal());
    assert_eq!(orchestrator.phase().await, RequestPhase::Idle);

    let outcome = orchestrator
        .submit(&format!(" {DEMO_CLAIMED_UID} "), Some(1))
        .await
        .expect("demo claimed");
    assert_eq!(outcome.status(), 0);
    assert!(matches!(
        orchestrator.phase().await,
        RequestPhase::AlreadyClaimed(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_in_flight_is_refused() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = Arc::new(RequestOrchestrator::new(session, DemoConfig::default()));

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit(DEMO_SUCCESS_UID, Some(3)).await }
    });
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(orchestrator.phase().await.is_submitting());
    assert!(matches!(
        orchestrator.submit("123456789", Some(3)).await,
        Err(RequestError::InFlight)
    ));

    first.await.unwrap().expect("first submit completes");
}

#[tokio::test(start_paused = true)]
async fn dropped_submit_is_recovered_by_acknowledge() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = RequestOrchestrator::new(session, DemoConfig::default());

    let abandoned = tokio::time::timeout(
        Duration::from_millis(10),
        orchestrator.submit(DEMO_SUCCESS_UID, Some(3)),
    )
    .await;
    assert!(abandoned.is_err());

    // Left wedged until someone clears it
    assert!(orchestrator.phase().await.is_submitting());
    assert!(matches!(
        orchestrator.submit("123456789", Some(3)).await,
        Err(RequestError::InFlight)
    ));

    assert!(orchestrator.acknowledge().await.is_submitting());
    assert_eq!(orchestrator.phase().await, RequestPhase::Idle);

    // `reset` clears the same way
    let abandoned = tokio::time::timeout(
        Duration::from_millis(10),
        orchestrator.submit(DEMO_CLAIMED_UID, Some(3)),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(orchestrator.reset().await.is_submitting());
    assert_eq!(orchestrator.phase().await, RequestPhase::Idle);

    orchestrator
        .submit(DEMO_SUCCESS_UID, Some(3))
        .await
        .expect("usable again after reset");
    assert!(client.take_log().await.is_empty());
}

#[tokio::test]
async fn gate_refuses_before_any_request() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = RequestOrchestrator::new(session, DemoConfig::default());

    assert!(matches!(
        orchestrator.submit("   ", Some(3)).await,
        Err(RequestError::EmptyUid(_))
    ));
    assert!(matches!(
        orchestrator.submit("123456789", Some(0)).await,
        Err(RequestError::QuotaExhausted)
    ));
    assert!(matches!(
        orchestrator.submit("123456789", None).await,
        Err(RequestError::NotSignedIn)
    ));
    assert_eq!(orchestrator.phase().await, RequestPhase::Idle);
    assert!(client.take_log().await.is_empty());
}

#[tokio::test]
async fn delivery_goes_to_process_likes_and_bumps_quota() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = RequestOrchestrator::new(session.clone(), DemoConfig::default());
    let mut quota = QuotaTracker::new(orchestrator.subscribe());

    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([{"daily_requests": 3, "extra_requests": 0, "requests_used_today": 1}]),
        )
        .await;
    assert_eq!(quota.sync(&*session).await, Some(2));
    // Nothing changed: no refetch
    assert_eq!(quota.sync(&*session).await, Some(2));
    assert_eq!(client.take_log().await.len(), 1);

    client
        .push_json(
            StatusCode::OK,
            serde_json::json!({
                "status": 1,
                "player": "Nova",
                "uid": "123456789",
                "likes_before": 1200,
                "likes_after": 1300,
                "likes_added": 100
            }),
        )
        .await;
    let outcome = orchestrator.submit("123456789", Some(2)).await.unwrap();
    assert!(outcome.is_success());

    let log = client.take_log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(path_and_query(&log[0]), "/functions/v1/process-likes");
    assert_eq!(body_json(&log[0]), serde_json::json!({"uid": "123456789"}));
    assert!(log[0].headers().get(http::header::AUTHORIZATION).is_some());

    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([{"daily_requests": 3, "extra_requests": 0, "requests_used_today": 2}]),
        )
        .await;
    assert!(quota.is_stale(Some(USER_ID)));
    assert_eq!(quota.sync(&*session).await, Some(1));
}

#[tokio::test]
async fn already_claimed_comes_back_on_error_status() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = RequestOrchestrator::new(
        session,
        DemoConfig {
            enabled: false,
            ..Default::default()
        },
    );
    let refresh = orchestrator.subscribe();

    client
        .push_json(
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({
                "status": 0,
                "message": "You have already requested likes for this UID today.",
                "next_available": "2025-03-02T12:00:00+00:00"
            }),
        )
        .await;
    // Demo mode off: the sentinel goes to the backend like any UID
    let outcome = orchestrator.submit(DEMO_CLAIMED_UID, Some(1)).await.unwrap();
    assert!(matches!(outcome, LikeOutcome::AlreadyClaimed(_)));
    assert_eq!(client.take_log().await.len(), 1);
    assert!(!refresh.has_changed().unwrap(), "no quota bump when claimed");
}

#[tokio::test]
async fn transport_garbage_is_generic_error() {
    let client = Arc::new(MockClient::default());
    let session = Arc::new(signed_in(client.clone()).await);
    let orchestrator = RequestOrchestrator::new(session, DemoConfig::default());

    client
        .push_json(StatusCode::BAD_GATEWAY, serde_json::json!({"error": "upstream down"}))
        .await;
    let err = orchestrator.submit("123456789", Some(3)).await.unwrap_err();
    assert!(matches!(err, RequestError::Delivery(_)));
    assert_eq!(err.to_string(), GENERIC_FAILURE);
    assert_eq!(
        orchestrator.phase().await,
        RequestPhase::Error(GENERIC_FAILURE.into())
    );
}
