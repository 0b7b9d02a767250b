use crate::{
    error::{AppError, AppResult},
    models::{listing, listing_image, Listing, ListingImage, ListingImageModel, ListingModel},
    services::moderation,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_ARCHIVED: &str = "archived";

pub const PROPERTY_TYPES: &[&str] = &["apartment", "house", "room", "studio"];

/// The listing status state machine. Submission produces pending or
/// active; everything after that is an explicit human action.
pub fn can_transition(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        (STATUS_PENDING, STATUS_ACTIVE)
            | (STATUS_PENDING, STATUS_REJECTED)
            | (STATUS_ACTIVE, STATUS_ARCHIVED)
    )
}

/// Search filters shared by the public search endpoint and saved searches.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub district: Option<String>,
    pub property_type: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_min: Option<f64>,
    pub area_max: Option<f64>,
    pub furnished: Option<bool>,
    pub expat_friendly: Option<bool>,
}

pub struct NewListing {
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub district: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: f64,
    pub furnished: bool,
    pub expat_friendly: bool,
    pub youtube_url: Option<String>,
}

/// Outcome of a submission: the stored listing plus the phrase that
/// routed it to manual review, if any.
pub struct SubmissionOutcome {
    pub listing: ListingModel,
    pub flagged_phrase: Option<&'static str>,
}

pub struct ListingService {
    db: DatabaseConnection,
}

impl ListingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persist a submitted listing, deciding its initial status.
    ///
    /// Text matching a blocked phrase soft-fails: the listing is stored as
    /// pending and one flagged_content row is written, regardless of the
    /// submitter's verification. Otherwise verified owners publish
    /// immediately and everyone else lands in the moderation queue.
    pub async fn submit(
        &self,
        owner: &crate::models::UserModel,
        data: NewListing,
    ) -> AppResult<SubmissionOutcome> {
        let flagged_phrase = moderation::scan_listing_text(&data.title, &data.description);

        let status = if flagged_phrase.is_some() {
            STATUS_PENDING
        } else if owner.is_verified {
            STATUS_ACTIVE
        } else {
            STATUS_PENDING
        };

        let now = chrono::Utc::now().naive_utc();
        let model = listing::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(owner.id),
            title: sea_orm::ActiveValue::Set(data.title),
            description: sea_orm::ActiveValue::Set(data.description),
            address: sea_orm::ActiveValue::Set(data.address),
            city: sea_orm::ActiveValue::Set(data.city),
            district: sea_orm::ActiveValue::Set(data.district),
            latitude: sea_orm::ActiveValue::Set(data.latitude),
            longitude: sea_orm::ActiveValue::Set(data.longitude),
            price: sea_orm::ActiveValue::Set(data.price),
            property_type: sea_orm::ActiveValue::Set(data.property_type),
            bedrooms: sea_orm::ActiveValue::Set(data.bedrooms),
            bathrooms: sea_orm::ActiveValue::Set(data.bathrooms),
            area_sqm: sea_orm::ActiveValue::Set(data.area_sqm),
            furnished: sea_orm::ActiveValue::Set(data.furnished),
            expat_friendly: sea_orm::ActiveValue::Set(data.expat_friendly),
            youtube_url: sea_orm::ActiveValue::Set(data.youtube_url),
            status: sea_orm::ActiveValue::Set(status.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;

        if let Some(phrase) = flagged_phrase {
            let moderation = moderation::ModerationService::new(self.db.clone());
            moderation.flag_listing(saved.id, phrase).await?;
            tracing::info!(
                listing_id = saved.id,
                phrase,
                "listing flagged for manual review"
            );
        }

        Ok(SubmissionOutcome {
            listing: saved,
            flagged_phrase,
        })
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<ListingModel> {
        Listing::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_images(&self, listing_id: i32) -> AppResult<Vec<ListingImageModel>> {
        let images = ListingImage::find()
            .filter(listing_image::Column::ListingId.eq(listing_id))
            .order_by_asc(listing_image::Column::Position)
            .all(&self.db)
            .await?;
        Ok(images)
    }

    pub async fn add_image(
        &self,
        listing_id: i32,
        url: &str,
        position: i32,
    ) -> AppResult<ListingImageModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = listing_image::ActiveModel {
            listing_id: sea_orm::ActiveValue::Set(listing_id),
            url: sea_orm::ActiveValue::Set(url.to_string()),
            position: sea_orm::ActiveValue::Set(position),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn delete_image(&self, listing_id: i32, image_id: i32, user_id: i32) -> AppResult<()> {
        let listing = self.get_by_id(listing_id).await?;
        if listing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let image = ListingImage::find_by_id(image_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if image.listing_id != listing_id {
            return Err(AppError::NotFound);
        }

        ListingImage::delete_by_id(image_id).exec(&self.db).await?;
        Ok(())
    }

    /// Public search: active listings only, newest first.
    pub async fn search(
        &self,
        filters: &SearchFilters,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ListingModel>, u64)> {
        let mut condition = Condition::all().add(listing::Column::Status.eq(STATUS_ACTIVE));

        if let Some(city) = filters.city.as_deref().filter(|c| !c.is_empty()) {
            condition = condition.add(listing::Column::City.contains(city));
        }
        if let Some(district) = filters.district.as_deref().filter(|d| !d.is_empty()) {
            condition = condition.add(listing::Column::District.contains(district));
        }
        if let Some(property_type) = filters.property_type.as_deref() {
            condition = condition.add(listing::Column::PropertyType.eq(property_type));
        }
        if let Some(price_min) = filters.price_min {
            condition = condition.add(listing::Column::Price.gte(price_min));
        }
        if let Some(price_max) = filters.price_max {
            condition = condition.add(listing::Column::Price.lte(price_max));
        }
        if let Some(bedrooms) = filters.bedrooms {
            condition = condition.add(listing::Column::Bedrooms.gte(bedrooms));
        }
        if let Some(bathrooms) = filters.bathrooms {
            condition = condition.add(listing::Column::Bathrooms.gte(bathrooms));
        }
        if let Some(area_min) = filters.area_min {
            condition = condition.add(listing::Column::AreaSqm.gte(area_min));
        }
        if let Some(area_max) = filters.area_max {
            condition = condition.add(listing::Column::AreaSqm.lte(area_max));
        }
        if let Some(furnished) = filters.furnished {
            condition = condition.add(listing::Column::Furnished.eq(furnished));
        }
        if let Some(expat_friendly) = filters.expat_friendly {
            condition = condition.add(listing::Column::ExpatFriendly.eq(expat_friendly));
        }

        let paginator = Listing::find()
            .filter(condition)
            .order_by_desc(listing::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let listings = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((listings, total))
    }

    /// Owner dashboard: own listings in any status.
    pub async fn list_by_owner(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ListingModel>, u64)> {
        let paginator = Listing::find()
            .filter(listing::Column::UserId.eq(user_id))
            .order_by_desc(listing::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let listings = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((listings, total))
    }

    /// Moderation queue: listings awaiting a decision, oldest first.
    pub async fn list_by_status(
        &self,
        status: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<ListingModel>, u64)> {
        let paginator = Listing::find()
            .filter(listing::Column::Status.eq(status))
            .order_by_asc(listing::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let listings = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((listings, total))
    }

    /// Owner edit. Field changes only; status is never touched here.
    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        data: NewListing,
    ) -> AppResult<ListingModel> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: listing::ActiveModel = existing.into();
        active.title = sea_orm::ActiveValue::Set(data.title);
        active.description = sea_orm::ActiveValue::Set(data.description);
        active.address = sea_orm::ActiveValue::Set(data.address);
        active.city = sea_orm::ActiveValue::Set(data.city);
        active.district = sea_orm::ActiveValue::Set(data.district);
        active.latitude = sea_orm::ActiveValue::Set(data.latitude);
        active.longitude = sea_orm::ActiveValue::Set(data.longitude);
        active.price = sea_orm::ActiveValue::Set(data.price);
        active.property_type = sea_orm::ActiveValue::Set(data.property_type);
        active.bedrooms = sea_orm::ActiveValue::Set(data.bedrooms);
        active.bathrooms = sea_orm::ActiveValue::Set(data.bathrooms);
        active.area_sqm = sea_orm::ActiveValue::Set(data.area_sqm);
        active.furnished = sea_orm::ActiveValue::Set(data.furnished);
        active.expat_friendly = sea_orm::ActiveValue::Set(data.expat_friendly);
        active.youtube_url = sea_orm::ActiveValue::Set(data.youtube_url);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Owner-initiated archive, only reachable from active.
    pub async fn archive(&self, id: i32, user_id: i32) -> AppResult<ListingModel> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if !can_transition(&existing.status, STATUS_ARCHIVED) {
            return Err(AppError::Validation(format!(
                "Cannot archive a {} listing",
                existing.status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: listing::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(STATUS_ARCHIVED.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        Listing::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
