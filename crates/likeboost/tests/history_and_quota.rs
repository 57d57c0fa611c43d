mod common;

use std::sync::Arc;

use common::*;
use http::StatusCode;
use likeboost::history::{HistoryKind, HistoryTabs, LikeHistoryView, PageItem};
use likeboost::quota::{DEFAULT_DAILY_REQUESTS, QuotaTracker, fetch_remaining};

fn like_rows(page: u32, n: usize, total: i64) -> serde_json::Value {
    let rows: Vec<_> = (0..n)
        .map(|i| {
            serde_json::json!({
                "id": format!("req-{page}-{i}"),
                "uid": "123456789",
                "player_name": "Nova",
                "likes_added": 100,
                "likes_before": 1200,
                "likes_after": 1300,
                "created_at": "2025-03-01T12:00:00+00:00",
                "total_count": total
            })
        })
        .collect();
    serde_json::Value::Array(rows)
}

#[tokio::test]
async fn quota_defaults_and_clamps() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;

    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    assert_eq!(
        fetch_remaining(&session, USER_ID).await.unwrap(),
        DEFAULT_DAILY_REQUESTS
    );

    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([{"daily_requests": 1, "extra_requests": 0, "requests_used_today": 4}]),
        )
        .await;
    assert_eq!(fetch_remaining(&session, USER_ID).await.unwrap(), 0);

    let log = client.take_log().await;
    assert_eq!(
        path_and_query(&log[0]),
        format!(
            "/rest/v1/user_request_limits?select=daily_requests%2Cextra_requests%2Crequests_used_today&user_id=eq.{USER_ID}"
        )
    );
}

#[tokio::test]
async fn quota_keeps_last_value_on_error() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;
    let (tx, rx) = tokio::sync::watch::channel(0u64);
    let mut quota = QuotaTracker::new(rx);

    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([{"daily_requests": 3, "extra_requests": 2, "requests_used_today": 0}]),
        )
        .await;
    assert_eq!(quota.sync(&session).await, Some(5));

    tx.send_modify(|n| *n += 1);
    client
        .push_json(StatusCode::SERVICE_UNAVAILABLE, serde_json::json!({"message": "down"}))
        .await;
    assert_eq!(quota.changed(&session).await, Some(5));
    assert!(!quota.is_stale(Some(USER_ID)));

    client.push_empty(StatusCode::NO_CONTENT).await;
    session.logout().await.unwrap();
    assert_eq!(quota.sync(&session).await, None);
}

#[tokio::test]
async fn history_pages_through_backend() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;
    let mut view = LikeHistoryView::new();

    client
        .push_json(StatusCode::OK, like_rows(1, 20, 45))
        .await;
    view.load(&session).await.unwrap();
    assert_eq!(view.total_pages(), 3);
    assert_eq!(view.rows().len(), 20);
    assert_eq!(
        view.page_numbers(),
        vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
    );

    // Out of range and same-page moves are no-ops
    assert!(!view.go_to(&session, 4).await.unwrap());
    assert!(!view.go_to(&session, 1).await.unwrap());
    assert!(!view.previous(&session).await.unwrap());

    client
        .push_json(StatusCode::OK, like_rows(3, 5, 45))
        .await;
    assert!(view.go_to(&session, 3).await.unwrap());
    assert_eq!(view.current_page(), 3);
    assert_eq!(view.rows().len(), 5);
    assert!(!view.next(&session).await.unwrap());

    let log = client.take_log().await;
    assert_eq!(log.len(), 2);
    assert_eq!(
        path_and_query(&log[0]),
        "/rest/v1/rpc/get_like_history_paginated"
    );
    assert_eq!(
        body_json(&log[0]),
        serde_json::json!({"p_page": 1, "p_page_size": 20})
    );
    assert_eq!(
        body_json(&log[1]),
        serde_json::json!({"p_page": 3, "p_page_size": 20})
    );
}

#[tokio::test]
async fn history_error_leaves_view_empty() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;
    let mut view = LikeHistoryView::new();

    client
        .push_json(StatusCode::OK, like_rows(1, 20, 30))
        .await;
    view.load(&session).await.unwrap();
    client
        .push_json(StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({"message": "boom"}))
        .await;
    assert!(view.next(&session).await.is_err());
    assert!(view.rows().is_empty());
    assert!(!view.is_loading());
    assert_eq!(view.total_pages(), 2);
}

#[tokio::test]
async fn switching_tabs_fetches_automated_from_first_page() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;
    let mut tabs = HistoryTabs::new();

    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    tabs.load(&session).await.unwrap();
    assert_eq!(tabs.total_pages(), 1);
    assert!(tabs.manual.page_numbers().is_empty());

    assert!(tabs.select(HistoryKind::Automated));
    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([{
                "id": "run-1",
                "uid": "123456789",
                "player_name": null,
                "likes_added": 0,
                "likes_before": 1300,
                "likes_after": 1300,
                "status": 0,
                "executed_at": "2025-03-02T05:00:03+00:00",
                "sent_at": "2025-03-02T05:00:01+00:00",
                "created_at": "2025-03-02T05:00:03+00:00",
                "total_count": 1
            }]),
        )
        .await;
    tabs.load(&session).await.unwrap();
    assert_eq!(tabs.current_page(), 1);
    assert_eq!(tabs.automated.rows().len(), 1);
    assert_eq!(tabs.automated.rows()[0].status, Some(0));

    let log = client.take_log().await;
    assert_eq!(
        path_and_query(&log[1]),
        "/rest/v1/rpc/get_auto_like_history_paginated"
    );
}
