use crate::error::{AppError, AppResult};
use crate::middleware::auth::parse_user_id;
use crate::middleware::AuthUser;
use crate::models::{ListingImageModel, ListingModel};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::auth::AuthService;
use crate::services::listing::{
    ListingService, NewListing, SearchFilters, PROPERTY_TYPES, STATUS_ACTIVE,
};
use crate::services::moderation;
use crate::services::upload::{UploadConfig, UploadService};
use axum::{
    extract::{Multipart, Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::Validate;

pub const MAX_LISTING_IMAGES: usize = 40;

/// Text fields shared by create (multipart) and update (JSON).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListingForm {
    /// Listing title (10-100 characters)
    #[validate(length(min = 10, max = 100))]
    pub title: String,
    /// Listing description (50-2000 characters)
    #[validate(length(min = 50, max = 2000))]
    pub description: String,
    /// Street address
    #[validate(length(min = 5))]
    pub address: String,
    /// City
    #[validate(length(min = 2))]
    pub city: String,
    /// District within the city
    pub district: Option<String>,
    /// Latitude
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    /// Longitude
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// Monthly rent
    pub price: f64,
    /// Property type: apartment, house, room, studio
    pub property_type: String,
    /// Number of bedrooms
    #[validate(range(min = 0, max = 20))]
    pub bedrooms: i32,
    /// Number of bathrooms
    #[validate(range(min = 0, max = 20))]
    pub bathrooms: i32,
    /// Living area in square meters
    pub area_sqm: f64,
    /// Whether the property is furnished
    pub furnished: bool,
    /// Whether the owner takes the Expat-Friendly Pledge
    pub expat_friendly: bool,
    /// Optional YouTube tour URL
    pub youtube_url: Option<String>,
}

impl ListingForm {
    /// Field checks the validator derive cannot express.
    fn validate_domain(&self) -> AppResult<()> {
        if !PROPERTY_TYPES.contains(&self.property_type.as_str()) {
            return Err(AppError::Validation(format!(
                "property_type must be one of: {}",
                PROPERTY_TYPES.join(", ")
            )));
        }
        if self.price <= 0.0 {
            return Err(AppError::Validation(
                "Price must be greater than 0".to_string(),
            ));
        }
        if self.area_sqm < 5.0 {
            return Err(AppError::Validation(
                "Area must be at least 5 m²".to_string(),
            ));
        }
        Ok(())
    }

    fn into_new_listing(self) -> NewListing {
        NewListing {
            title: self.title,
            description: self.description,
            address: self.address,
            city: self.city,
            district: self.district.filter(|d| !d.trim().is_empty()),
            latitude: self.latitude,
            longitude: self.longitude,
            price: self.price,
            property_type: self.property_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area_sqm: self.area_sqm,
            furnished: self.furnished,
            expat_friendly: self.expat_friendly,
            youtube_url: self.youtube_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListingImageResponse {
    /// Image ID
    pub id: i32,
    /// Public URL
    pub url: String,
    /// Gallery position (0-39)
    pub position: i32,
}

impl From<ListingImageModel> for ListingImageResponse {
    fn from(i: ListingImageModel) -> Self {
        Self {
            id: i.id,
            url: i.url,
            position: i.position,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListingResponse {
    /// Listing ID
    pub id: i32,
    /// Owner user ID
    pub user_id: i32,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// District
    pub district: Option<String>,
    /// Latitude
    pub latitude: f64,
    /// Longitude
    pub longitude: f64,
    /// Monthly rent
    pub price: f64,
    /// Property type
    pub property_type: String,
    /// Bedrooms
    pub bedrooms: i32,
    /// Bathrooms
    pub bathrooms: i32,
    /// Area in square meters
    pub area_sqm: f64,
    /// Furnished
    pub furnished: bool,
    /// Expat-Friendly Pledge taken
    pub expat_friendly: bool,
    /// YouTube tour URL
    pub youtube_url: Option<String>,
    /// Status (pending, active, rejected, archived)
    pub status: String,
    /// Reason given when rejected
    pub rejection_reason: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
    /// Gallery images in display order
    pub images: Vec<ListingImageResponse>,
}

impl ListingResponse {
    pub fn with_images(l: ListingModel, images: Vec<ListingImageModel>) -> Self {
        Self {
            id: l.id,
            user_id: l.user_id,
            title: l.title,
            description: l.description,
            address: l.address,
            city: l.city,
            district: l.district,
            latitude: l.latitude,
            longitude: l.longitude,
            price: l.price,
            property_type: l.property_type,
            bedrooms: l.bedrooms,
            bathrooms: l.bathrooms,
            area_sqm: l.area_sqm,
            furnished: l.furnished,
            expat_friendly: l.expat_friendly,
            youtube_url: l.youtube_url,
            status: l.status,
            rejection_reason: l.rejection_reason,
            created_at: l.created_at.to_string(),
            updated_at: l.updated_at.to_string(),
            images: images.into_iter().map(ListingImageResponse::from).collect(),
        }
    }
}

impl From<ListingModel> for ListingResponse {
    fn from(l: ListingModel) -> Self {
        Self::with_images(l, Vec::new())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitListingResponse {
    /// New listing ID
    pub id: i32,
    /// Initial status (active or pending)
    pub status: String,
    /// True when the text matched a blocked phrase and went to review
    pub flagged: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/listings",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Listing submitted", body = SubmitListingResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Tenants cannot create listings", body = AppError),
    ),
    tag = "listings"
)]
pub async fn create_listing(
    Extension(db): Extension<DatabaseConnection>,
    Extension(upload_config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let auth_service = AuthService::new(db.clone());
    let owner = auth_service.get_user_by_id(user_id).await?;
    if owner.user_type == "tenant" {
        return Err(AppError::Forbidden);
    }

    // Split the multipart body into text fields and image parts.
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut images: Vec<(Vec<u8>, String)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "images" {
            if images.len() >= MAX_LISTING_IMAGES {
                return Err(AppError::Validation(format!(
                    "Maximum {} images allowed",
                    MAX_LISTING_IMAGES
                )));
            }
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read image: {}", e)))?;
            images.push((data.to_vec(), content_type));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field: {}", e)))?;
            fields.insert(name, value);
        }
    }

    let form = parse_listing_form(&fields)?;
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    form.validate_domain()?;

    let service = ListingService::new(db.clone());
    let outcome = service.submit(&owner, form.into_new_listing()).await?;

    // Flagged submissions go straight to review; no gallery until a
    // moderator clears them.
    if outcome.flagged_phrase.is_none() {
        let subdirectory = format!("listings/{}", outcome.listing.id);
        for (position, (data, content_type)) in images.iter().enumerate() {
            match UploadService::save_file(&upload_config, data, content_type, &subdirectory).await
            {
                Ok(url) => {
                    service
                        .add_image(outcome.listing.id, &url, position as i32)
                        .await?;
                }
                Err(e) => {
                    tracing::warn!(
                        listing_id = outcome.listing.id,
                        position,
                        "skipping image: {e}"
                    );
                }
            }
        }
    }

    let flagged = outcome.flagged_phrase.is_some();
    let message = if flagged {
        "Your listing has been submitted for review due to content policy.".to_string()
    } else if outcome.listing.status == STATUS_ACTIVE {
        "Listing created successfully".to_string()
    } else {
        "Listing submitted for review".to_string()
    };

    Ok(ApiResponse::with_message(
        SubmitListingResponse {
            id: outcome.listing.id,
            status: outcome.listing.status,
            flagged,
        },
        message,
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateListingRequest {
    /// Listing title (10-100 characters)
    #[validate(length(min = 10, max = 100))]
    pub title: String,
    /// Listing description (50-2000 characters)
    #[validate(length(min = 50, max = 2000))]
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateListingResponse {
    /// Always true; failures are reported as 400s
    pub valid: bool,
}

/// Backing check for the listing wizard's details step: the same scan the
/// submission endpoint runs, surfaced early so the form can reject
/// discriminatory text outright.
#[utoipa::path(
    post,
    path = "/api/v1/listings/validate",
    security(("jwt_token" = [])),
    request_body = ValidateListingRequest,
    responses(
        (status = 200, description = "Text is acceptable", body = ValidateListingResponse),
        (status = 400, description = "Validation error or blocked phrase", body = AppError),
    ),
    tag = "listings"
)]
pub async fn validate_listing(
    auth_user: AuthUser,
    Json(payload): Json<ValidateListingRequest>,
) -> AppResult<impl IntoResponse> {
    let _ = parse_user_id(&auth_user)?;

    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    check_text_clean(&payload.title, &payload.description)?;

    Ok(ApiResponse::ok(ValidateListingResponse { valid: true }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchListingsQuery {
    /// Filter by city (substring match)
    pub city: Option<String>,
    /// Filter by district (substring match)
    pub district: Option<String>,
    /// Filter by property type
    pub property_type: Option<String>,
    /// Minimum price
    pub price_min: Option<f64>,
    /// Maximum price
    pub price_max: Option<f64>,
    /// Minimum number of bedrooms
    pub bedrooms: Option<i32>,
    /// Minimum number of bathrooms
    pub bathrooms: Option<i32>,
    /// Minimum area in square meters
    pub area_min: Option<f64>,
    /// Maximum area in square meters
    pub area_max: Option<f64>,
    /// Only furnished properties
    pub furnished: Option<bool>,
    /// Only expat-friendly properties
    pub expat_friendly: Option<bool>,
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/listings",
    params(
        ("city" = Option<String>, Query, description = "Filter by city"),
        ("district" = Option<String>, Query, description = "Filter by district"),
        ("property_type" = Option<String>, Query, description = "Filter by property type"),
        ("price_min" = Option<f64>, Query, description = "Minimum price"),
        ("price_max" = Option<f64>, Query, description = "Maximum price"),
        ("bedrooms" = Option<i32>, Query, description = "Minimum bedrooms"),
        ("bathrooms" = Option<i32>, Query, description = "Minimum bathrooms"),
        ("area_min" = Option<f64>, Query, description = "Minimum area"),
        ("area_max" = Option<f64>, Query, description = "Maximum area"),
        ("furnished" = Option<bool>, Query, description = "Only furnished"),
        ("expat_friendly" = Option<bool>, Query, description = "Only expat-friendly"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Active listings", body = PaginatedResponse<ListingResponse>),
    ),
    tag = "listings"
)]
pub async fn search_listings(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<SearchListingsQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let filters = SearchFilters {
        city: params.city,
        district: params.district,
        property_type: params.property_type,
        price_min: params.price_min,
        price_max: params.price_max,
        bedrooms: params.bedrooms,
        bathrooms: params.bathrooms,
        area_min: params.area_min,
        area_max: params.area_max,
        furnished: params.furnished,
        expat_friendly: params.expat_friendly,
    };

    let service = ListingService::new(db);
    let (listings, total) = service.search(&filters, page, per_page).await?;

    let mut items = Vec::with_capacity(listings.len());
    for listing in listings {
        let images = service.get_images(listing.id).await?;
        items.push(ListingResponse::with_images(listing, images));
    }

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing details", body = ListingResponse),
        (status = 404, description = "Listing not found or not public", body = AppError),
    ),
    tag = "listings"
)]
pub async fn get_listing(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ListingService::new(db);
    let listing = service.get_by_id(id).await?;

    // Public visibility is gated solely by status = active.
    if listing.status != STATUS_ACTIVE {
        return Err(AppError::NotFound);
    }

    let images = service.get_images(listing.id).await?;
    Ok(ApiResponse::ok(ListingResponse::with_images(
        listing, images,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/my/listings",
    security(("jwt_token" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Own listings in any status", body = PaginatedResponse<ListingResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "listings"
)]
pub async fn my_listings(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ListingService::new(db);
    let (listings, total) = service.list_by_owner(user_id, page, per_page).await?;

    let mut items = Vec::with_capacity(listings.len());
    for listing in listings {
        let images = service.get_images(listing.id).await?;
        items.push(ListingResponse::with_images(listing, images));
    }

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/my/listings/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Own listing details", body = ListingResponse),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "listings"
)]
pub async fn my_listing_detail(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = ListingService::new(db);
    let listing = service.get_by_id(id).await?;
    if listing.user_id != user_id {
        return Err(AppError::Forbidden);
    }

    let images = service.get_images(listing.id).await?;
    Ok(ApiResponse::ok(ListingResponse::with_images(
        listing, images,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/listings/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    request_body = ListingForm,
    responses(
        (status = 200, description = "Listing updated", body = ListingResponse),
        (status = 400, description = "Validation error or blocked phrase", body = AppError),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "listings"
)]
pub async fn update_listing(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ListingForm>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    payload.validate_domain()?;

    // Edits reject discriminatory text outright rather than re-queueing
    // an already-moderated listing.
    check_text_clean(&payload.title, &payload.description)?;

    let user_id = parse_user_id(&auth_user)?;

    let service = ListingService::new(db);
    let listing = service
        .update(id, user_id, payload.into_new_listing())
        .await?;

    let images = service.get_images(listing.id).await?;
    Ok(ApiResponse::ok(ListingResponse::with_images(
        listing, images,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/archive",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing archived", body = ListingResponse),
        (status = 400, description = "Listing is not active", body = AppError),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "listings"
)]
pub async fn archive_listing(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = ListingService::new(db);
    let listing = service.archive(id, user_id).await?;

    Ok(ApiResponse::ok(ListingResponse::from(listing)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing deleted", body = String),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Listing not found", body = AppError),
    ),
    tag = "listings"
)]
pub async fn delete_listing(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = ListingService::new(db);
    service.delete(id, user_id).await?;

    Ok(ApiResponse::ok("Listing deleted"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}/images/{image_id}",
    security(("jwt_token" = [])),
    params(
        ("id" = i32, Path, description = "Listing ID"),
        ("image_id" = i32, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image deleted", body = String),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Listing or image not found", body = AppError),
    ),
    tag = "listings"
)]
pub async fn delete_listing_image(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path((id, image_id)): Path<(i32, i32)>,
) -> AppResult<impl IntoResponse> {
    let user_id = parse_user_id(&auth_user)?;

    let service = ListingService::new(db);
    service.delete_image(id, image_id, user_id).await?;

    Ok(ApiResponse::ok("Image deleted"))
}

/// Hard-fail path of the blocked-phrase filter: a 400 naming the phrase.
fn check_text_clean(title: &str, description: &str) -> AppResult<()> {
    if let Some(phrase) = moderation::check_blocked_phrases(title) {
        return Err(AppError::Validation(format!(
            "Title contains discriminatory language: \"{}\"",
            phrase
        )));
    }
    if let Some(phrase) = moderation::check_blocked_phrases(description) {
        return Err(AppError::Validation(format!(
            "Description contains discriminatory language: \"{}\"",
            phrase
        )));
    }
    Ok(())
}

fn parse_listing_form(fields: &HashMap<String, String>) -> AppResult<ListingForm> {
    Ok(ListingForm {
        title: required_field(fields, "title")?,
        description: required_field(fields, "description")?,
        address: required_field(fields, "address")?,
        city: required_field(fields, "city")?,
        district: fields.get("district").cloned(),
        latitude: parse_number(fields, "latitude")?,
        longitude: parse_number(fields, "longitude")?,
        price: parse_number(fields, "price")?,
        property_type: required_field(fields, "property_type")?,
        bedrooms: parse_number(fields, "bedrooms")?,
        bathrooms: parse_number(fields, "bathrooms")?,
        area_sqm: parse_number(fields, "area_sqm")?,
        furnished: parse_flag(fields, "furnished"),
        expat_friendly: parse_flag(fields, "expat_friendly"),
        youtube_url: fields.get("youtube_url").cloned(),
    })
}

fn required_field(fields: &HashMap<String, String>, name: &str) -> AppResult<String> {
    fields
        .get(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing field: {}", name)))
}

fn parse_number<T: std::str::FromStr>(
    fields: &HashMap<String, String>,
    name: &str,
) -> AppResult<T> {
    fields
        .get(name)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| AppError::Validation(format!("Invalid or missing field: {}", name)))
}

fn parse_flag(fields: &HashMap<String, String>, name: &str) -> bool {
    fields
        .get(name)
        .map(|s| s.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_fields() -> HashMap<String, String> {
        let mut fields = HashMap::new();
        for (k, v) in [
            ("title", "Bright two-bedroom flat"),
            ("description", "Spacious apartment near the old town with a balcony and fast internet. Available immediately."),
            ("address", "Telliskivi 60"),
            ("city", "Tallinn"),
            ("latitude", "59.4370"),
            ("longitude", "24.7536"),
            ("price", "950"),
            ("property_type", "apartment"),
            ("bedrooms", "2"),
            ("bathrooms", "1"),
            ("area_sqm", "54.5"),
            ("furnished", "true"),
            ("expat_friendly", "true"),
        ] {
            fields.insert(k.to_string(), v.to_string());
        }
        fields
    }

    #[test]
    fn parse_complete_form() {
        let form = parse_listing_form(&base_fields()).unwrap();
        assert_eq!(form.city, "Tallinn");
        assert_eq!(form.bedrooms, 2);
        assert!(form.furnished);
        assert!((form.area_sqm - 54.5).abs() < f64::EPSILON);
        assert!(form.validate().is_ok());
        assert!(form.validate_domain().is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let mut fields = base_fields();
        fields.remove("title");
        assert!(parse_listing_form(&fields).is_err());
    }

    #[test]
    fn malformed_number_fails() {
        let mut fields = base_fields();
        fields.insert("price".to_string(), "not-a-number".to_string());
        assert!(parse_listing_form(&fields).is_err());
    }

    #[test]
    fn unknown_property_type_rejected() {
        let mut fields = base_fields();
        fields.insert("property_type".to_string(), "castle".to_string());
        let form = parse_listing_form(&fields).unwrap();
        assert!(form.validate_domain().is_err());
    }

    #[test]
    fn zero_price_rejected() {
        let mut fields = base_fields();
        fields.insert("price".to_string(), "0".to_string());
        let form = parse_listing_form(&fields).unwrap();
        assert!(form.validate_domain().is_err());
    }

    #[test]
    fn absent_flag_defaults_to_false() {
        let mut fields = base_fields();
        fields.remove("furnished");
        let form = parse_listing_form(&fields).unwrap();
        assert!(!form.furnished);
    }

    #[test]
    fn clean_text_passes() {
        assert!(check_text_clean("Nice flat in Tallinn", "A long enough clean description").is_ok());
    }

    #[test]
    fn blocked_title_names_the_phrase() {
        let err = check_text_clean("Flat, locals only", "clean description").unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("locals only")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn blocked_description_is_caught_too() {
        assert!(check_text_clean("Nice flat", "sorry, no foreigners").is_err());
    }
}
