use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::models::SavedSearchModel;
use crate::response::ApiResponse;
use crate::services::listing::SearchFilters;
use crate::services::saved_search::SavedSearchService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSavedSearchRequest {
    /// Name for the saved search (3-50 characters)
    #[validate(length(min = 3, max = 50))]
    pub name: String,
    /// Filters to replay
    pub filters: SearchFilters,
    /// Email the user when new matches appear
    pub notify_email: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedSearchResponse {
    /// Saved search ID
    pub id: i32,
    /// Name
    pub name: String,
    /// Stored filters
    pub filters: SearchFilters,
    /// Email notification opt-in
    pub notify_email: bool,
    /// Creation timestamp
    pub created_at: String,
}

impl TryFrom<SavedSearchModel> for SavedSearchResponse {
    type Error = AppError;

    fn try_from(s: SavedSearchModel) -> Result<Self, Self::Error> {
        let filters: SearchFilters = serde_json::from_str(&s.filters)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt saved filters: {}", e)))?;
        Ok(Self {
            id: s.id,
            name: s.name,
            filters,
            notify_email: s.notify_email,
            created_at: s.created_at.to_string(),
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/searches",
    security(("jwt_token" = [])),
    request_body = CreateSavedSearchRequest,
    responses(
        (status = 200, description = "Saved search created", body = SavedSearchResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "searches"
)]
pub async fn create_saved_search(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<CreateSavedSearchRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_id = parse_user_id(&auth_user)?;

    let service = SavedSearchService::new(db);
    let saved = service
        .create(
            user_id,
            &payload.name,
            &payload.filters,
            payload.notify_email.unwrap_or(true),
        )
        .await?;

    Ok(ApiResponse::ok(SavedSearchResponse::try_from(saved)?))
}

#[utoipa::path(
    get,
    path = "/api/v1/searches",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Saved searches, newest first", body = Vec<SavedSearchResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "searches"
)]
pub async fn list_saved_searches(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = SavedSearchService::new(db);
    let searches = service.list_for_user(user_id).await?;

    let items: Vec<SavedSearchResponse> = searches
        .into_iter()
        .map(SavedSearchResponse::try_from)
        .collect::<Result<_, _>>()?;

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    delete,
    path = "/api/v1/searches/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Saved search ID")),
    responses(
        (status = 200, description = "Saved search deleted", body = String),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Saved search not found", body = AppError),
    ),
    tag = "searches"
)]
pub async fn delete_saved_search(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = SavedSearchService::new(db);
    service.delete(id, user_id).await?;

    Ok(ApiResponse::ok("Saved search deleted"))
}
