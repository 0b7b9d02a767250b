mod common;

use serde_json::Value;

#[tokio::test]
async fn create_and_list_saved_searches() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "saver", "tenant").await;

    let resp = app
        .client
        .post(app.url("/searches"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Tallinn 2-bedroom",
            "filters": {
                "city": "Tallinn",
                "bedrooms": 2,
                "price_max": 1000.0,
                "furnished": true
            }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Tallinn 2-bedroom");
    assert_eq!(body["data"]["notify_email"], true);
    assert_eq!(body["data"]["filters"]["city"], "Tallinn");

    let resp = app
        .client
        .get(app.url("/searches"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["filters"]["bedrooms"], 2);
}

#[tokio::test]
async fn short_name_is_rejected() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "terse", "tenant").await;

    let resp = app
        .client
        .post(app.url("/searches"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "ab",
            "filters": {}
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn delete_own_saved_search() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "dropper", "tenant").await;

    let resp = app
        .client
        .post(app.url("/searches"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "name": "Short-lived search",
            "filters": { "city": "Tartu" },
            "notify_email": false
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let search_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .delete(app.url(&format!("/searches/{}", search_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/searches"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn cannot_delete_someone_elses_search() {
    let app = common::spawn_app().await;
    let (_id, owner_token) = common::create_test_user(&app, "searchowner", "tenant").await;
    let (_id2, other_token) = common::create_test_user(&app, "thief", "tenant").await;

    let resp = app
        .client
        .post(app.url("/searches"))
        .bearer_auth(&owner_token)
        .json(&serde_json::json!({
            "name": "Private search",
            "filters": {}
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let search_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .delete(app.url(&format!("/searches/{}", search_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}
