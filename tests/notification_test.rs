mod common;

use serde_json::Value;

#[tokio::test]
async fn approval_notifies_the_owner() {
    let app = common::spawn_app().await;
    let (admin_id, admin_token) = common::create_test_user(&app, "notifier", "landlord").await;
    common::make_moderator(&app.db, admin_id).await;
    let (_id, token) = common::create_test_user(&app, "notified", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    app.client
        .post(app.url(&format!("/admin/listings/{}/approve", listing_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "listing_approved");
    assert_eq!(items[0]["listing_id"], listing_id);
    assert_eq!(items[0]["is_read"], false);
}

#[tokio::test]
async fn rejection_notification_carries_the_reason() {
    let app = common::spawn_app().await;
    let (admin_id, admin_token) = common::create_test_user(&app, "denier", "landlord").await;
    common::make_moderator(&app.db, admin_id).await;
    let (_id, token) = common::create_test_user(&app, "denied", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    app.client
        .post(app.url(&format!("/admin/listings/{}/reject", listing_id)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "reason": "Address could not be confirmed" }))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["kind"], "listing_rejected");
    assert!(items[0]["message"]
        .as_str()
        .unwrap()
        .contains("Address could not be confirmed"));
}

#[tokio::test]
async fn unread_count_and_mark_read() {
    let app = common::spawn_app().await;
    let (admin_id, admin_token) = common::create_test_user(&app, "counter", "landlord").await;
    common::make_moderator(&app.db, admin_id).await;
    let (_id, token) = common::create_test_user(&app, "reader", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    app.client
        .post(app.url(&format!("/admin/listings/{}/approve", listing_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/notifications/unread-count"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["unread"], 1);

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let notification_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/notifications/{}/read", notification_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/notifications/unread-count"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["unread"], 0);
}

#[tokio::test]
async fn cannot_read_someone_elses_notification() {
    let app = common::spawn_app().await;
    let (admin_id, admin_token) = common::create_test_user(&app, "postman", "landlord").await;
    common::make_moderator(&app.db, admin_id).await;
    let (_id, owner_token) = common::create_test_user(&app, "recipient", "landlord").await;
    let (_id2, other_token) = common::create_test_user(&app, "snoop", "tenant").await;

    let body = common::submit_listing(
        &app,
        &owner_token,
        common::CLEAN_TITLE,
        common::CLEAN_DESCRIPTION,
    )
    .await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    app.client
        .post(app.url(&format!("/admin/listings/{}/approve", listing_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/notifications"))
        .bearer_auth(&owner_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let notification_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/notifications/{}/read", notification_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}
