use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_moderator, AuthUser};
use crate::models::FlaggedContentModel;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::email::EmailService;
use crate::services::moderation::ModerationService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct FlaggedContentResponse {
    /// Flag ID
    pub id: i32,
    /// Listing routed to review
    pub listing_id: i32,
    /// Why it was flagged
    pub reason: String,
    /// The phrase that tripped the filter
    pub flagged_text: String,
    /// Whether a moderator has reviewed it
    pub reviewed: bool,
    /// Reviewer user ID
    pub reviewed_by: Option<i32>,
    /// Review timestamp
    pub reviewed_at: Option<String>,
    /// Outcome (approved or rejected)
    pub action_taken: Option<String>,
    /// Flag timestamp
    pub created_at: String,
}

impl From<FlaggedContentModel> for FlaggedContentResponse {
    fn from(f: FlaggedContentModel) -> Self {
        Self {
            id: f.id,
            listing_id: f.listing_id,
            reason: f.reason,
            flagged_text: f.flagged_text,
            reviewed: f.reviewed,
            reviewed_by: f.reviewed_by,
            reviewed_at: f.reviewed_at.map(|t| t.to_string()),
            action_taken: f.action_taken,
            created_at: f.created_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/flagged",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Unreviewed flagged content", body = PaginatedResponse<FlaggedContentResponse>),
        (status = 403, description = "Moderator only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_flagged(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    require_moderator(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ModerationService::new(db);
    let (items, total) = service.list_unreviewed(page, per_page).await?;
    let items: Vec<FlaggedContentResponse> =
        items.into_iter().map(FlaggedContentResponse::from).collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewFlaggedRequest {
    /// Review outcome: approved or rejected
    #[validate(length(min = 1, max = 20))]
    pub action: String,
    /// Required when rejecting; shown to the owner
    pub reason: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/flagged/{id}/review",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Flagged content ID")),
    request_body = ReviewFlaggedRequest,
    responses(
        (status = 200, description = "Flag reviewed and listing transitioned", body = FlaggedContentResponse),
        (status = 400, description = "Invalid action, missing reason, or already reviewed", body = AppError),
        (status = 403, description = "Moderator only", body = AppError),
        (status = 404, description = "Flag not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn review_flagged(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ReviewFlaggedRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let admin = require_moderator(&db, &auth_user).await?;

    let service = ModerationService::new(db.clone());
    let (flag, listing) = service
        .review(id, admin.id, &payload.action, payload.reason.as_deref())
        .await?;

    let approved = payload.action == "approved";
    crate::handlers::admin::notify_owner_of_decision(
        &db,
        &email_service,
        &listing,
        approved,
        payload.reason.as_deref(),
    )
    .await;

    Ok(ApiResponse::ok(FlaggedContentResponse::from(flag)))
}
