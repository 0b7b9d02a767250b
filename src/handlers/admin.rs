use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_moderator, AuthUser};
use crate::models::{AdminActionModel, UserModel};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::admin::AdminService;
use crate::services::auth::AuthService;
use crate::services::email::EmailService;
use crate::services::listing::{ListingService, STATUS_PENDING};
use crate::services::notification::NotificationService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_listings: u64,
    pub pending_listings: u64,
    pub active_listings: u64,
    pub listings_today: u64,
    pub unreviewed_flags: u64,
    pub total_users: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub user_type: String,
    pub is_verified: bool,
    pub is_approved: bool,
    pub is_banned: bool,
    pub created_at: String,
}

impl From<UserModel> for AdminUserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            user_type: u.user_type,
            is_verified: u.is_verified,
            is_approved: u.is_approved,
            is_banned: u.is_banned,
            created_at: u.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminActionResponse {
    pub id: i32,
    pub admin_id: i32,
    pub action_type: String,
    pub target_id: i32,
    pub reason: Option<String>,
    pub created_at: String,
}

impl From<AdminActionModel> for AdminActionResponse {
    fn from(a: AdminActionModel) -> Self {
        Self {
            id: a.id,
            admin_id: a.admin_id,
            action_type: a.action_type,
            target_id: a.target_id,
            reason: a.reason,
            created_at: a.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Moderation dashboard statistics", body = StatsResponse),
        (status = 403, description = "Moderator only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let stats = service.get_stats().await?;

    Ok(ApiResponse::ok(StatsResponse {
        total_listings: stats.total_listings,
        pending_listings: stats.pending_listings,
        active_listings: stats.active_listings,
        listings_today: stats.listings_today,
        unreviewed_flags: stats.unreviewed_flags,
        total_users: stats.total_users,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<AdminUserResponse>),
        (status = 403, description = "Moderator only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_moderator(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = AdminService::new(db);
    let (users, total) = service.list_users(page, per_page).await?;
    let items = users.into_iter().map(AdminUserResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetApprovalRequest {
    /// New approval state
    pub is_approved: bool,
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/approve",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetApprovalRequest,
    responses(
        (status = 200, description = "Approval state updated", body = AdminUserResponse),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn approve_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SetApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let user = service
        .set_user_approval(id, admin.id, payload.is_approved)
        .await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/reject",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User registration rejected", body = AdminUserResponse),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn reject_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let user = service.reject_user(id, admin.id).await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetBanRequest {
    /// New ban state
    pub is_banned: bool,
    /// Optional reason, recorded in the audit trail
    pub reason: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/ban",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetBanRequest,
    responses(
        (status = 200, description = "Ban state updated", body = AdminUserResponse),
        (status = 403, description = "Moderator only, or target is a super admin", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn ban_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SetBanRequest>,
) -> AppResult<impl IntoResponse> {
    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let user = service
        .set_user_ban(id, &admin, payload.is_banned, payload.reason.as_deref())
        .await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVerifiedRequest {
    /// New verification state
    pub is_verified: bool,
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/verify",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetVerifiedRequest,
    responses(
        (status = 200, description = "Verification state updated", body = AdminUserResponse),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn verify_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<SetVerifiedRequest>,
) -> AppResult<impl IntoResponse> {
    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let user = service
        .set_user_verified(id, admin.id, payload.is_verified)
        .await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    /// New role (user, owner, moderator, super_admin)
    #[validate(length(min = 1, max = 20))]
    pub role: String,
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}/role",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "User role updated", body = AdminUserResponse),
        (status = 400, description = "Invalid role", body = AppError),
        (status = 403, description = "Insufficient privileges", body = AppError),
    ),
    tag = "admin"
)]
pub async fn update_user_role(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    let user = service.change_user_role(id, &admin, &payload.role).await?;

    Ok(ApiResponse::ok(AdminUserResponse::from(user)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ModerationQueueQuery {
    /// Listing status to list (defaults to pending)
    pub status: Option<String>,
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/listings",
    security(("jwt_token" = [])),
    params(
        ("status" = Option<String>, Query, description = "Listing status filter (default pending)"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Moderation queue", body = PaginatedResponse<crate::handlers::listing::ListingResponse>),
        (status = 403, description = "Moderator only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_listings_for_moderation(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ModerationQueueQuery>,
) -> AppResult<impl IntoResponse> {
    require_moderator(&db, &auth_user).await?;

    let status = params.status.as_deref().unwrap_or(STATUS_PENDING);
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ListingService::new(db);
    let (listings, total) = service.list_by_status(status, page, per_page).await?;

    let mut items = Vec::with_capacity(listings.len());
    for listing in listings {
        let images = service.get_images(listing.id).await?;
        items.push(crate::handlers::listing::ListingResponse::with_images(
            listing, images,
        ));
    }

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/listings/{id}/approve",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing approved", body = crate::handlers::listing::ListingResponse),
        (status = 400, description = "Listing is not pending", body = AppError),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn approve_listing(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db.clone());
    let listing = service.approve_listing(id, admin.id).await?;

    notify_owner_of_decision(&db, &email_service, &listing, true, None).await;

    Ok(ApiResponse::ok(
        crate::handlers::listing::ListingResponse::from(listing),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectListingRequest {
    /// Why the listing was rejected; shown to the owner
    #[validate(length(min = 1))]
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/listings/{id}/reject",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    request_body = RejectListingRequest,
    responses(
        (status = 200, description = "Listing rejected", body = crate::handlers::listing::ListingResponse),
        (status = 400, description = "Missing reason or listing is not pending", body = AppError),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn reject_listing(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<RejectListingRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db.clone());
    let listing = service.reject_listing(id, admin.id, &payload.reason).await?;

    notify_owner_of_decision(&db, &email_service, &listing, false, Some(&payload.reason)).await;

    Ok(ApiResponse::ok(
        crate::handlers::listing::ListingResponse::from(listing),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/listings/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing deleted", body = String),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn admin_delete_listing(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let admin = require_moderator(&db, &auth_user).await?;

    let service = AdminService::new(db);
    service.delete_listing(id, admin.id).await?;

    Ok(ApiResponse::ok("Listing deleted"))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActionLogQuery {
    /// Maximum rows to return (default 50)
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/actions",
    security(("jwt_token" = [])),
    params(("limit" = Option<u64>, Query, description = "Maximum rows (default 50)")),
    responses(
        (status = 200, description = "Recent audit trail", body = Vec<AdminActionResponse>),
        (status = 403, description = "Moderator only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_admin_actions(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ActionLogQuery>,
) -> AppResult<impl IntoResponse> {
    require_moderator(&db, &auth_user).await?;

    let limit = params.limit.unwrap_or(50).min(200);

    let service = AdminService::new(db);
    let actions = service.list_actions(limit).await?;
    let items: Vec<AdminActionResponse> =
        actions.into_iter().map(AdminActionResponse::from).collect();

    Ok(ApiResponse::ok(items))
}

/// Best-effort owner notification + email after a moderation decision.
/// Failures are logged, never surfaced: the decision itself already
/// committed.
pub(crate) async fn notify_owner_of_decision(
    db: &DatabaseConnection,
    email_service: &EmailService,
    listing: &crate::models::ListingModel,
    approved: bool,
    reason: Option<&str>,
) {
    let notifications = NotificationService::new(db.clone());
    if let Err(e) = notifications
        .notify_listing_decision(listing.user_id, listing.id, approved, &listing.title, reason)
        .await
    {
        tracing::warn!(listing_id = listing.id, "failed to store notification: {e}");
    }

    let auth = AuthService::new(db.clone());
    match auth.get_user_by_id(listing.user_id).await {
        Ok(owner) => {
            let result = if approved {
                email_service
                    .send_listing_approved_email(&owner.email, listing.id, &listing.title)
                    .await
            } else {
                email_service
                    .send_listing_rejected_email(
                        &owner.email,
                        &listing.title,
                        reason.unwrap_or("not specified"),
                    )
                    .await
            };
            if let Err(e) = result {
                tracing::warn!(listing_id = listing.id, "failed to send decision email: {e}");
            }
        }
        Err(e) => {
            tracing::warn!(listing_id = listing.id, "owner lookup failed: {e}");
        }
    }
}
