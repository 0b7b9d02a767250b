#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        // Rate limiting off so bursts of test requests don't 429.
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        let config = xpatly::config::jwt::JwtConfig::from_env().unwrap();
        let _ = xpatly::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"));

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        xpatly::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let upload_config = xpatly::services::upload::UploadConfig {
        upload_dir: "./test_uploads".to_string(),
    };
    let email_service = xpatly::services::email::EmailService::from_env();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(xpatly::routes::create_routes())
        .layer(axum::middleware::from_fn(
            xpatly::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config))
        .layer(axum::extract::Extension(email_service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    TestApp {
        addr: addr_str,
        db,
        client,
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = [
        "refresh_tokens",
        "saved_searches",
        "notifications",
        "admin_actions",
        "flagged_content",
        "listing_images",
        "listings",
        "users",
    ];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, email_prefix: &str, user_type: &str) -> (i32, String) {
    static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    let email = format!("{}_{}@test.com", email_prefix, counter);

    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&serde_json::json!({
            "email": email,
            "password": "Test_password_123",
            "user_type": user_type
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_else(|e| {
        panic!(
            "Failed to parse register response for '{}': status={}, error={}",
            email, status, e
        );
    });

    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to register user '{}': status={}, body={}",
            email, status, body
        );
    }

    let user_id = body["data"]["user_id"].as_i64().unwrap_or_else(|| {
        panic!("Response missing user_id for '{}': {:?}", email, body);
    }) as i32;
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Response missing token for '{}': {:?}", email, body))
        .to_string();
    (user_id, token)
}

/// Promote a user to moderator by directly updating the database.
pub async fn make_moderator(db: &DatabaseConnection, user_id: i32) {
    set_role(db, user_id, "moderator").await;
}

/// Promote a user to super_admin by directly updating the database.
pub async fn make_super_admin(db: &DatabaseConnection, user_id: i32) {
    set_role(db, user_id, "super_admin").await;
}

async fn set_role(db: &DatabaseConnection, user_id: i32, role: &str) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET role = $1 WHERE id = $2",
        vec![role.into(), user_id.into()],
    ))
    .await
    .expect("Failed to set user role");
}

/// Mark a user as a verified (trusted) landlord.
pub async fn make_verified(db: &DatabaseConnection, user_id: i32) {
    db.execute(Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Postgres,
        "UPDATE users SET is_verified = TRUE WHERE id = $1",
        vec![user_id.into()],
    ))
    .await
    .expect("Failed to verify user");
}

/// Submit a listing through the multipart endpoint with valid defaults.
/// Returns the parsed response body.
pub async fn submit_listing(
    app: &TestApp,
    token: &str,
    title: &str,
    description: &str,
) -> serde_json::Value {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("description", description.to_string())
        .text("address", "Telliskivi 60a")
        .text("city", "Tallinn")
        .text("district", "Põhja-Tallinn")
        .text("latitude", "59.4370")
        .text("longitude", "24.7536")
        .text("price", "950")
        .text("property_type", "apartment")
        .text("bedrooms", "2")
        .text("bathrooms", "1")
        .text("area_sqm", "54.5")
        .text("furnished", "true")
        .text("expat_friendly", "true");

    let resp = app
        .client
        .post(app.url("/listings"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to submit listing");

    let status = resp.status();
    let body: serde_json::Value = resp
        .json()
        .await
        .unwrap_or_else(|e| panic!("Failed to parse listing response: status={}, {}", status, e));
    body
}

pub const CLEAN_TITLE: &str = "Bright two-bedroom flat";
pub const CLEAN_DESCRIPTION: &str =
    "Spacious apartment near the old town with a balcony, fast internet and a fully fitted kitchen.";

/// Count audit rows written by a given admin.
pub async fn count_admin_actions(db: &DatabaseConnection, admin_id: i32) -> i64 {
    let row = db
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT COUNT(*) AS count FROM admin_actions WHERE admin_id = $1",
            vec![admin_id.into()],
        ))
        .await
        .expect("Failed to count admin actions")
        .expect("Count query returned no row");
    row.try_get_by_index::<i64>(0).unwrap()
}

/// Fetch a listing's status straight from the database.
pub async fn listing_status(db: &DatabaseConnection, listing_id: i32) -> String {
    let row = db
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT status FROM listings WHERE id = $1",
            vec![listing_id.into()],
        ))
        .await
        .expect("Failed to query listing status")
        .expect("Listing not found");
    row.try_get_by_index::<String>(0).unwrap()
}
