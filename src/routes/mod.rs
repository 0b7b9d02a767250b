use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::extract::DefaultBodyLimit;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

// Room for 40 five-megabyte photos plus the text fields.
const CREATE_LISTING_BODY_LIMIT: usize = 210 * 1024 * 1024;

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: register, login, refresh.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/refresh",
            routing::post(handlers::auth::refresh_token),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public read routes: listing search and active-listing details.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/listings",
            routing::get(handlers::listing::search_listings),
        )
        .route(
            "/listings/{id}",
            routing::get(handlers::listing::get_listing),
        );

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: all authenticated reads and writes.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Auth
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        .route(
            "/auth/profile",
            routing::put(handlers::auth::update_profile),
        )
        .route("/auth/password", routing::put(handlers::change_password))
        // Listings (owner side)
        .route(
            "/listings",
            routing::post(handlers::listing::create_listing)
                .layer(DefaultBodyLimit::max(CREATE_LISTING_BODY_LIMIT)),
        )
        .route(
            "/listings/validate",
            routing::post(handlers::listing::validate_listing),
        )
        .route(
            "/listings/{id}",
            routing::put(handlers::listing::update_listing)
                .delete(handlers::listing::delete_listing),
        )
        .route(
            "/listings/{id}/archive",
            routing::post(handlers::listing::archive_listing),
        )
        .route(
            "/listings/{id}/images/{image_id}",
            routing::delete(handlers::listing::delete_listing_image),
        )
        .route("/my/listings", routing::get(handlers::listing::my_listings))
        .route(
            "/my/listings/{id}",
            routing::get(handlers::listing::my_listing_detail),
        )
        // Saved searches
        .route(
            "/searches",
            routing::post(handlers::saved_search::create_saved_search)
                .get(handlers::saved_search::list_saved_searches),
        )
        .route(
            "/searches/{id}",
            routing::delete(handlers::saved_search::delete_saved_search),
        )
        // Notifications
        .route(
            "/notifications",
            routing::get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            routing::get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            routing::put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            routing::put(handlers::notification::mark_read),
        )
        // Admin: dashboard and audit trail
        .route("/admin/stats", routing::get(handlers::admin::get_stats))
        .route(
            "/admin/actions",
            routing::get(handlers::admin::list_admin_actions),
        )
        // Admin: user management
        .route("/admin/users", routing::get(handlers::admin::list_users))
        .route(
            "/admin/users/{id}/approve",
            routing::put(handlers::admin::approve_user),
        )
        .route(
            "/admin/users/{id}/reject",
            routing::post(handlers::admin::reject_user),
        )
        .route(
            "/admin/users/{id}/ban",
            routing::put(handlers::admin::ban_user),
        )
        .route(
            "/admin/users/{id}/verify",
            routing::put(handlers::admin::verify_user),
        )
        .route(
            "/admin/users/{id}/role",
            routing::put(handlers::admin::update_user_role),
        )
        // Admin: listing moderation
        .route(
            "/admin/listings",
            routing::get(handlers::admin::list_listings_for_moderation),
        )
        .route(
            "/admin/listings/{id}/approve",
            routing::post(handlers::admin::approve_listing),
        )
        .route(
            "/admin/listings/{id}/reject",
            routing::post(handlers::admin::reject_listing),
        )
        .route(
            "/admin/listings/{id}",
            routing::delete(handlers::admin::admin_delete_listing),
        )
        // Admin: flagged-content review
        .route(
            "/admin/flagged",
            routing::get(handlers::flagged::list_flagged),
        )
        .route(
            "/admin/flagged/{id}/review",
            routing::put(handlers::flagged::review_flagged),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
