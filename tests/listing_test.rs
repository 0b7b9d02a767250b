mod common;

use serde_json::Value;

#[tokio::test]
async fn unverified_landlord_lands_in_pending() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "landlord", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;

    assert!(body["success"].as_bool().unwrap(), "body: {}", body);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["flagged"], false);
}

#[tokio::test]
async fn verified_landlord_publishes_immediately() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "trusted", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;

    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["flagged"], false);
}

#[tokio::test]
async fn tenant_cannot_create_listing() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "tenant", "tenant").await;

    let form = reqwest::multipart::Form::new()
        .text("title", common::CLEAN_TITLE)
        .text("description", common::CLEAN_DESCRIPTION)
        .text("address", "Telliskivi 60a")
        .text("city", "Tallinn")
        .text("latitude", "59.4370")
        .text("longitude", "24.7536")
        .text("price", "950")
        .text("property_type", "apartment")
        .text("bedrooms", "2")
        .text("bathrooms", "1")
        .text("area_sqm", "54.5");

    let resp = app
        .client
        .post(app.url("/listings"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn create_listing_requires_auth() {
    let app = common::spawn_app().await;

    let form = reqwest::multipart::Form::new().text("title", common::CLEAN_TITLE);

    let resp = app
        .client
        .post(app.url("/listings"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn short_title_is_rejected() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "shorty", "landlord").await;

    let body = common::submit_listing(&app, &token, "Tiny", common::CLEAN_DESCRIPTION).await;
    assert_eq!(body["success"].as_bool(), Some(false));
}

#[tokio::test]
async fn pending_listing_is_not_public() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "hidden", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/listings/{}", listing_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn owner_sees_own_pending_listing() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "owner", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/my/listings/{}", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn owner_can_update_listing() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "editor", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/listings/{}", listing_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Renovated two-bedroom flat",
            "description": common::CLEAN_DESCRIPTION,
            "address": "Telliskivi 60a",
            "city": "Tallinn",
            "latitude": 59.4370,
            "longitude": 24.7536,
            "price": 1000.0,
            "property_type": "apartment",
            "bedrooms": 2,
            "bathrooms": 1,
            "area_sqm": 54.5,
            "furnished": true,
            "expat_friendly": true
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Renovated two-bedroom flat");
    assert!((body["data"]["price"].as_f64().unwrap() - 1000.0).abs() < 0.001);
    // Edits never change moderation state.
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn update_with_blocked_phrase_is_rejected() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "sneaky", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/listings/{}", listing_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Nice flat, locals only",
            "description": common::CLEAN_DESCRIPTION,
            "address": "Telliskivi 60a",
            "city": "Tallinn",
            "latitude": 59.4370,
            "longitude": 24.7536,
            "price": 950.0,
            "property_type": "apartment",
            "bedrooms": 2,
            "bathrooms": 1,
            "area_sqm": 54.5,
            "furnished": true,
            "expat_friendly": false
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("locals only"));
}

#[tokio::test]
async fn non_owner_cannot_update() {
    let app = common::spawn_app().await;
    let (_id, owner_token) = common::create_test_user(&app, "realowner", "landlord").await;
    let (_id2, other_token) = common::create_test_user(&app, "stranger", "landlord").await;

    let body = common::submit_listing(
        &app,
        &owner_token,
        common::CLEAN_TITLE,
        common::CLEAN_DESCRIPTION,
    )
    .await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/listings/{}", listing_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({
            "title": "Hijacked listing title",
            "description": common::CLEAN_DESCRIPTION,
            "address": "Telliskivi 60a",
            "city": "Tallinn",
            "latitude": 59.4370,
            "longitude": 24.7536,
            "price": 1.0,
            "property_type": "apartment",
            "bedrooms": 2,
            "bathrooms": 1,
            "area_sqm": 54.5,
            "furnished": true,
            "expat_friendly": true
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn owner_archives_active_listing() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "archiver", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "active");

    let resp = app
        .client
        .post(app.url(&format!("/listings/{}/archive", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "archived");
}

#[tokio::test]
async fn pending_listing_cannot_be_archived() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "impatient", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .post(app.url(&format!("/listings/{}/archive", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn archived_listing_disappears_from_public_view() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "vanish", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    app.client
        .post(app.url(&format!("/listings/{}/archive", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/listings/{}", listing_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn owner_deletes_own_listing() {
    let app = common::spawn_app().await;
    let (_id, token) = common::create_test_user(&app, "deleter", "landlord").await;

    let body =
        common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .delete(app.url(&format!("/listings/{}", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/my/listings/{}", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn uploaded_images_are_stored_in_order() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "photographer", "landlord").await;
    common::make_verified(&app.db, user_id).await;

    // Minimal valid PNG header followed by filler bytes.
    let png_bytes: Vec<u8> = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    let form = reqwest::multipart::Form::new()
        .text("title", common::CLEAN_TITLE)
        .text("description", common::CLEAN_DESCRIPTION)
        .text("address", "Telliskivi 60a")
        .text("city", "Tallinn")
        .text("latitude", "59.4370")
        .text("longitude", "24.7536")
        .text("price", "950")
        .text("property_type", "apartment")
        .text("bedrooms", "2")
        .text("bathrooms", "1")
        .text("area_sqm", "54.5")
        .text("furnished", "true")
        .text("expat_friendly", "true")
        .part(
            "images",
            reqwest::multipart::Part::bytes(png_bytes.clone())
                .file_name("one.png")
                .mime_str("image/png")
                .unwrap(),
        )
        .part(
            "images",
            reqwest::multipart::Part::bytes(png_bytes)
                .file_name("two.png")
                .mime_str("image/png")
                .unwrap(),
        );

    let resp = app
        .client
        .post(app.url("/listings"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let listing_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/my/listings/{}", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let images = body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["position"], 0);
    assert_eq!(images[1]["position"], 1);

    // The owner can drop a photo from the gallery.
    let image_id = images[0]["id"].as_i64().unwrap();
    let resp = app
        .client
        .delete(app.url(&format!("/listings/{}/images/{}", listing_id, image_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/my/listings/{}", listing_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn my_listings_shows_all_statuses() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "dashboard", "landlord").await;

    common::submit_listing(&app, &token, common::CLEAN_TITLE, common::CLEAN_DESCRIPTION).await;
    common::make_verified(&app.db, user_id).await;
    common::submit_listing(
        &app,
        &token,
        "Sunny loft with a roof terrace",
        common::CLEAN_DESCRIPTION,
    )
    .await;

    let resp = app
        .client
        .get(app.url("/my/listings"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    let statuses: Vec<&str> = items
        .iter()
        .map(|l| l["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"pending"));
    assert!(statuses.contains(&"active"));
}
