mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::*;
use http::{HeaderValue, Method, StatusCode};
use likeboost::admin::{
    AdminError, AutoLikeAdmin, FormError, LimitsForm, NewAutoLikeForm, NewUserForm, UserAdmin,
    UserQuery, UserSort,
};
use likeboost_common::error::ClientError;

fn auto_like(id: &str, uid: &str, active: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "uid": uid,
        "is_active": active,
        "last_run_at": null,
        "next_run_at": "2025-03-02T05:00:00+00:00",
        "created_at": "2025-03-01T18:30:00+00:00",
        "created_by": USER_ID
    })
}

async fn push_admin_profile(client: &MockClient) {
    client
        .push_json(StatusCode::OK, profile_body(USER_ID, true))
        .await;
}

#[tokio::test]
async fn non_admin_is_denied() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;

    client
        .push_json(StatusCode::OK, profile_body(USER_ID, false))
        .await;
    assert!(matches!(
        AutoLikeAdmin::open(&session).await,
        Err(AdminError::AccessDenied)
    ));

    // No profile row at all
    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    let err = UserAdmin::open(&session).await.err().expect("denied");
    assert_eq!(err.to_string(), "Access Denied");

    // Only the profile reads went out
    assert_eq!(client.take_log().await.len(), 2);
}

#[tokio::test]
async fn adding_an_auto_like_schedules_it_for_five_utc() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;

    push_admin_profile(&client).await;
    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    let mut admin = AutoLikeAdmin::open(&session).await.unwrap();
    assert!(admin.auto_likes().is_empty());
    client.take_log().await;

    client.push_empty(StatusCode::CREATED).await;
    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([auto_like("a-1", "123456789", true)]),
        )
        .await;
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap();
    let listed = admin
        .add(&NewAutoLikeForm::new("  123456789 "), now)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].uid, "123456789");
    assert!(listed[0].is_active);
    assert_eq!(
        listed[0].next_run_at,
        Utc.with_ymd_and_hms(2025, 3, 2, 5, 0, 0).unwrap()
    );

    let log = client.take_log().await;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].method(), Method::POST);
    assert_eq!(path_and_query(&log[0]), "/rest/v1/auto_likes");
    assert_eq!(
        log[0].headers().get("prefer"),
        Some(&HeaderValue::from_static("return=minimal"))
    );
    let body = body_json(&log[0]);
    assert_eq!(body["uid"], "123456789");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["created_by"], USER_ID);
    let next_run: chrono::DateTime<Utc> =
        serde_json::from_value(body["next_run_at"].clone()).unwrap();
    assert_eq!(next_run, Utc.with_ymd_and_hms(2025, 3, 2, 5, 0, 0).unwrap());
    assert_eq!(
        path_and_query(&log[1]),
        "/rest/v1/auto_likes?select=*&order=created_at.desc"
    );

    // Blank UID never reaches the backend
    assert!(matches!(
        admin.add(&NewAutoLikeForm::new("   "), now).await,
        Err(AdminError::Form(FormError::Uid(_)))
    ));
    assert!(client.take_log().await.is_empty());
}

#[tokio::test]
async fn toggle_and_delete_refetch() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;

    push_admin_profile(&client).await;
    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([auto_like("a-1", "123456789", true)]),
        )
        .await;
    let mut admin = AutoLikeAdmin::open(&session).await.unwrap();
    client.take_log().await;

    client.push_empty(StatusCode::NO_CONTENT).await;
    client
        .push_json(
            StatusCode::OK,
            serde_json::json!([auto_like("a-1", "123456789", false)]),
        )
        .await;
    assert!(!admin.toggle("a-1").await.unwrap());
    assert!(!admin.auto_likes()[0].is_active);

    let log = client.take_log().await;
    assert_eq!(log[0].method(), Method::PATCH);
    assert_eq!(path_and_query(&log[0]), "/rest/v1/auto_likes?id=eq.a-1");
    assert_eq!(body_json(&log[0]), serde_json::json!({"is_active": false}));

    assert!(matches!(
        admin.toggle("missing").await,
        Err(AdminError::UnknownAutoLike(_))
    ));

    // Unconfirmed delete sends nothing
    assert!(!admin.delete("a-1", false).await.unwrap());
    assert!(client.take_log().await.is_empty());

    client.push_empty(StatusCode::NO_CONTENT).await;
    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    assert!(admin.delete("a-1", true).await.unwrap());
    assert!(admin.auto_likes().is_empty());
    let log = client.take_log().await;
    assert_eq!(log[0].method(), Method::DELETE);
    assert_eq!(path_and_query(&log[0]), "/rest/v1/auto_likes?id=eq.a-1");
}

#[tokio::test]
async fn users_join_limits_and_update() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;

    let profiles = serde_json::json!([
        {"id": "u-2", "email": "zed@example.com", "created_at": "2025-03-02T00:00:00+00:00"},
        {"id": "u-3", "email": "amy@example.com", "created_at": "2025-03-01T00:00:00+00:00"}
    ]);
    let limits = |used: i64| {
        serde_json::json!([{
            "user_id": "u-2",
            "daily_requests": 3,
            "extra_requests": 1,
            "requests_used_today": used,
            "last_reset_date": "2025-03-02"
        }])
    };

    push_admin_profile(&client).await;
    client.push_json(StatusCode::OK, profiles.clone()).await;
    client.push_json(StatusCode::OK, limits(0)).await;
    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    let mut users = UserAdmin::open(&session).await.unwrap();

    assert_eq!(users.users().len(), 2);
    assert!(users.find("u-2").unwrap().limits.is_some());
    assert!(users.find("u-3").unwrap().limits.is_none());

    let by_email = UserQuery {
        search: String::new(),
        sort: UserSort::Email,
    };
    let sorted: Vec<_> = by_email
        .apply(users.users())
        .into_iter()
        .map(|u| u.email())
        .collect();
    assert_eq!(sorted, ["amy@example.com", "zed@example.com"]);

    let log = client.take_log().await;
    assert_eq!(
        path_and_query(&log[1]),
        "/rest/v1/profiles?select=id%2Cemail%2Ccreated_at&order=created_at.desc"
    );
    assert_eq!(
        path_and_query(&log[2]),
        "/rest/v1/user_request_limits?select=*&user_id=eq.u-2"
    );

    // Prefilled from the current row, then edited
    let mut form = LimitsForm::for_user(users.find("u-2").unwrap());
    assert_eq!(form.daily_requests, "3");
    assert_eq!(form.extra_requests, "1");
    form.extra_requests = "5".into();

    client.push_empty(StatusCode::NO_CONTENT).await;
    client.push_json(StatusCode::OK, profiles).await;
    client.push_json(StatusCode::OK, limits(0)).await;
    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    users.update_limits(&form).await.unwrap();

    let log = client.take_log().await;
    assert_eq!(log[0].method(), Method::PATCH);
    assert_eq!(
        path_and_query(&log[0]),
        "/rest/v1/user_request_limits?user_id=eq.u-2"
    );
    assert_eq!(
        body_json(&log[0]),
        serde_json::json!({"daily_requests": 3, "extra_requests": 5})
    );

    // Bad numbers never reach the backend
    form.daily_requests = "three".into();
    assert!(matches!(
        users.update_limits(&form).await,
        Err(AdminError::Form(FormError::NotANumber { .. }))
    ));
    assert!(client.take_log().await.is_empty());
}

#[tokio::test]
async fn create_user_surfaces_backend_error() {
    let client = Arc::new(MockClient::default());
    let session = signed_in(client.clone()).await;

    push_admin_profile(&client).await;
    client.push_json(StatusCode::OK, serde_json::json!([])).await;
    let mut users = UserAdmin::open(&session).await.unwrap();
    client.take_log().await;

    assert!(matches!(
        users
            .create_user(&NewUserForm {
                email: "new@example.com".into(),
                password: String::new(),
            })
            .await,
        Err(AdminError::Form(FormError::MissingCredentials))
    ));

    client
        .push_json(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": "A user with this email address has already been registered"}),
        )
        .await;
    let err = users
        .create_user(&NewUserForm {
            email: "new@example.com".into(),
            password: "s3cret!".into(),
        })
        .await
        .unwrap_err();
    match err {
        AdminError::Client(ClientError::Api(remote)) => assert_eq!(
            remote.message,
            "A user with this email address has already been registered"
        ),
        other => panic!("expected remote error, got {other:?}"),
    }

    let log = client.take_log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(path_and_query(&log[0]), "/functions/v1/create-user");
    assert_eq!(
        log[0].headers().get(http::header::AUTHORIZATION),
        Some(&HeaderValue::from_static("Bearer acc1"))
    );
}
