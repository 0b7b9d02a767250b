use crate::{
    error::{AppError, AppResult},
    models::{flagged_content, FlaggedContent, FlaggedContentModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Banned phrases enforced by the Expat-Friendly Pledge. Order matters:
/// the first match wins and is reported back to the submitter/reviewer.
pub const BLOCKED_PHRASES: &[&str] = &[
    "locals only",
    "no foreigners",
    "eestlastele",
    "ainult kohalikud",
    "only estonians",
    "ainult eestlased",
    "no immigrants",
    "mitte välismaalased",
];

/// Case-insensitive substring scan against the banned phrase list.
/// Returns the first matching phrase, or None for clean text.
pub fn check_blocked_phrases(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    BLOCKED_PHRASES
        .iter()
        .find(|phrase| lower.contains(*phrase))
        .copied()
}

/// Scan a listing's title and description. Title is checked first, so a
/// match there takes precedence in the flag record.
pub fn scan_listing_text(title: &str, description: &str) -> Option<&'static str> {
    check_blocked_phrases(title).or_else(|| check_blocked_phrases(description))
}

pub struct ModerationService {
    db: DatabaseConnection,
}

impl ModerationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a flagged listing for manual review.
    pub async fn flag_listing(
        &self,
        listing_id: i32,
        flagged_text: &str,
    ) -> AppResult<FlaggedContentModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = flagged_content::ActiveModel {
            listing_id: sea_orm::ActiveValue::Set(listing_id),
            reason: sea_orm::ActiveValue::Set("Blocked phrase detected".to_string()),
            flagged_text: sea_orm::ActiveValue::Set(flagged_text.to_string()),
            reviewed: sea_orm::ActiveValue::Set(false),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn list_unreviewed(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<FlaggedContentModel>, u64)> {
        let paginator = FlaggedContent::find()
            .filter(flagged_content::Column::Reviewed.eq(false))
            .order_by_desc(flagged_content::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Review a flagged item: marks it reviewed and applies the matching
    /// listing transition (approved: pending -> active, rejected:
    /// pending -> rejected with the given reason).
    pub async fn review(
        &self,
        flag_id: i32,
        reviewer_id: i32,
        action: &str,
        reason: Option<&str>,
    ) -> AppResult<(FlaggedContentModel, crate::models::ListingModel)> {
        if action != "approved" && action != "rejected" {
            return Err(AppError::Validation(
                "action must be 'approved' or 'rejected'".to_string(),
            ));
        }

        let flag = FlaggedContent::find_by_id(flag_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if flag.reviewed {
            return Err(AppError::Validation(
                "Flagged item is already reviewed".to_string(),
            ));
        }

        let admin = crate::services::admin::AdminService::new(self.db.clone());
        let listing = match action {
            "approved" => admin.approve_listing(flag.listing_id, reviewer_id).await?,
            _ => {
                let reason = reason
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("Rejection reason is required".to_string())
                    })?;
                admin
                    .reject_listing(flag.listing_id, reviewer_id, reason)
                    .await?
            }
        };

        let now = chrono::Utc::now().naive_utc();
        let mut active: flagged_content::ActiveModel = flag.into();
        active.reviewed = sea_orm::ActiveValue::Set(true);
        active.reviewed_by = sea_orm::ActiveValue::Set(Some(reviewer_id));
        active.reviewed_at = sea_orm::ActiveValue::Set(Some(now));
        active.action_taken = sea_orm::ActiveValue::Set(Some(action.to_string()));
        let updated = active.update(&self.db).await?;

        Ok((updated, listing))
    }
}
