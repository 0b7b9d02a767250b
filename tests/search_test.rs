mod common;

use serde_json::Value;

async fn seed_active_listing(
    app: &common::TestApp,
    token: &str,
    title: &str,
    city: &str,
    price: &str,
    bedrooms: &str,
    furnished: &str,
) -> i64 {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("description", common::CLEAN_DESCRIPTION)
        .text("address", format!("{} main street 1", city))
        .text("city", city.to_string())
        .text("latitude", "59.4370")
        .text("longitude", "24.7536")
        .text("price", price.to_string())
        .text("property_type", "apartment")
        .text("bedrooms", bedrooms.to_string())
        .text("bathrooms", "1")
        .text("area_sqm", "54.5")
        .text("furnished", furnished.to_string())
        .text("expat_friendly", "true");

    let resp = app
        .client
        .post(app.url("/listings"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap(), "body: {}", body);
    assert_eq!(body["data"]["status"], "active");
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn search_returns_only_active_listings() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "searchable", "landlord").await;

    // One pending (unverified submit), then one active (verified submit).
    common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    common::make_verified(&app.db, user_id).await;
    seed_active_listing(
        &app,
        &token,
        "Sunny loft with terrace",
        "Tallinn",
        "1200",
        "1",
        "true",
    )
    .await;

    let resp = app.client.get(app.url("/listings")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["status"], "active");
    assert_eq!(items[0]["title"], "Sunny loft with terrace");
}

#[tokio::test]
async fn search_filters_by_city() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "cities", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    seed_active_listing(&app, &token, "Tallinn city flat", "Tallinn", "900", "2", "true").await;
    seed_active_listing(&app, &token, "Tartu student flat", "Tartu", "500", "1", "false").await;

    let resp = app
        .client
        .get(app.url("/listings?city=Tartu"))
        .send()
        .await
        .unwrap();

    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["city"], "Tartu");
}

#[tokio::test]
async fn search_filters_by_price_range() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "pricey", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    seed_active_listing(&app, &token, "Budget room for rent", "Tallinn", "300", "1", "false").await;
    seed_active_listing(&app, &token, "Mid-range family home", "Tallinn", "900", "3", "true").await;
    seed_active_listing(&app, &token, "Penthouse with a view", "Tallinn", "2500", "4", "true")
        .await;

    let resp = app
        .client
        .get(app.url("/listings?price_min=500&price_max=1000"))
        .send()
        .await
        .unwrap();

    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Mid-range family home");
}

#[tokio::test]
async fn search_bedrooms_is_a_minimum() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "bedrooms", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    seed_active_listing(&app, &token, "Single studio downtown", "Tallinn", "400", "0", "true")
        .await;
    seed_active_listing(&app, &token, "Two bedroom apartment", "Tallinn", "800", "2", "true").await;
    seed_active_listing(&app, &token, "Four bedroom house big", "Tallinn", "1500", "4", "true")
        .await;

    let resp = app
        .client
        .get(app.url("/listings?bedrooms=2"))
        .send()
        .await
        .unwrap();

    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn search_filters_by_furnished() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "furniture", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    seed_active_listing(&app, &token, "Furnished cozy flat", "Tallinn", "700", "1", "true").await;
    seed_active_listing(&app, &token, "Empty shell apartment", "Tallinn", "600", "1", "false")
        .await;

    let resp = app
        .client
        .get(app.url("/listings?furnished=true"))
        .send()
        .await
        .unwrap();

    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["furnished"], true);
}

#[tokio::test]
async fn search_pagination() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "paginator", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    for i in 1..=7 {
        seed_active_listing(
            &app,
            &token,
            &format!("Numbered listing nr {}", i),
            "Tallinn",
            "800",
            "2",
            "true",
        )
        .await;
    }

    let resp = app
        .client
        .get(app.url("/listings?page=1&per_page=5"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"]["total"], 7);
    assert_eq!(body["data"]["total_pages"], 2);

    let resp = app
        .client
        .get(app.url("/listings?page=2&per_page=5"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_with_no_matches_is_empty() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/listings?city=Narva"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["total"], 0);
}
