use crate::{
    error::{AppError, AppResult},
    models::{
        admin_action, flagged_content, listing, user, AdminAction, AdminActionModel,
        FlaggedContent, Listing, ListingModel, User, UserModel,
    },
    services::listing::{can_transition, STATUS_ACTIVE, STATUS_PENDING, STATUS_REJECTED},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

pub const ROLES: &[&str] = &["user", "owner", "moderator", "super_admin"];

pub struct AdminService {
    db: DatabaseConnection,
}

impl AdminService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_stats(&self) -> AppResult<AdminStats> {
        let total_listings = Listing::find().count(&self.db).await?;
        let pending_listings = Listing::find()
            .filter(listing::Column::Status.eq(STATUS_PENDING))
            .count(&self.db)
            .await?;
        let active_listings = Listing::find()
            .filter(listing::Column::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await?;
        let unreviewed_flags = FlaggedContent::find()
            .filter(flagged_content::Column::Reviewed.eq(false))
            .count(&self.db)
            .await?;
        let total_users = User::find().count(&self.db).await?;

        let today = chrono::Utc::now().naive_utc().date();
        let today_start = today.and_hms_opt(0, 0, 0).unwrap();

        let listings_today = Listing::find()
            .filter(listing::Column::CreatedAt.gte(today_start))
            .count(&self.db)
            .await?;

        Ok(AdminStats {
            total_listings,
            pending_listings,
            active_listings,
            listings_today,
            unreviewed_flags,
            total_users,
        })
    }

    pub async fn list_users(&self, page: u64, per_page: u64) -> AppResult<(Vec<UserModel>, u64)> {
        let paginator = User::find()
            .order_by_desc(user::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((users, total))
    }

    /// Approve a pending listing: pending -> active.
    pub async fn approve_listing(&self, listing_id: i32, admin_id: i32) -> AppResult<ListingModel> {
        let existing = Listing::find_by_id(listing_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if !can_transition(&existing.status, STATUS_ACTIVE) {
            return Err(AppError::Validation(format!(
                "Cannot approve a {} listing",
                existing.status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: listing::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(STATUS_ACTIVE.to_string());
        active.rejection_reason = sea_orm::ActiveValue::Set(None);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        self.log_action(admin_id, "approve_listing", listing_id, None)
            .await?;
        Ok(updated)
    }

    /// Reject a pending listing: pending -> rejected. A non-empty reason
    /// is mandatory and is stored on the listing for the owner to see.
    pub async fn reject_listing(
        &self,
        listing_id: i32,
        admin_id: i32,
        reason: &str,
    ) -> AppResult<ListingModel> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }

        let existing = Listing::find_by_id(listing_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if !can_transition(&existing.status, STATUS_REJECTED) {
            return Err(AppError::Validation(format!(
                "Cannot reject a {} listing",
                existing.status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: listing::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(STATUS_REJECTED.to_string());
        active.rejection_reason = sea_orm::ActiveValue::Set(Some(reason.to_string()));
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        self.log_action(admin_id, "reject_listing", listing_id, Some(reason))
            .await?;
        Ok(updated)
    }

    pub async fn delete_listing(&self, listing_id: i32, admin_id: i32) -> AppResult<()> {
        Listing::find_by_id(listing_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        Listing::delete_by_id(listing_id).exec(&self.db).await?;

        self.log_action(admin_id, "delete_listing", listing_id, None)
            .await?;
        Ok(())
    }

    pub async fn set_user_approval(
        &self,
        target_id: i32,
        admin_id: i32,
        is_approved: bool,
    ) -> AppResult<UserModel> {
        let existing = self.get_user(target_id).await?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = existing.into();
        active.is_approved = sea_orm::ActiveValue::Set(is_approved);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        let action = if is_approved {
            "approve_user"
        } else {
            "revoke_approval"
        };
        self.log_action(admin_id, action, target_id, None).await?;
        Ok(updated)
    }

    /// Reject a user's registration: revokes approval and bans in one step.
    pub async fn reject_user(&self, target_id: i32, admin_id: i32) -> AppResult<UserModel> {
        let existing = self.get_user(target_id).await?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = existing.into();
        active.is_approved = sea_orm::ActiveValue::Set(false);
        active.is_banned = sea_orm::ActiveValue::Set(true);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        self.log_action(
            admin_id,
            "reject_user",
            target_id,
            Some("User registration rejected"),
        )
        .await?;
        Ok(updated)
    }

    pub async fn set_user_ban(
        &self,
        target_id: i32,
        admin: &UserModel,
        is_banned: bool,
        reason: Option<&str>,
    ) -> AppResult<UserModel> {
        let existing = self.get_user(target_id).await?;

        // Only a super admin may ban another super admin.
        if existing.role == "super_admin" && admin.role != "super_admin" {
            return Err(AppError::Forbidden);
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = existing.into();
        active.is_banned = sea_orm::ActiveValue::Set(is_banned);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        let action = if is_banned { "ban_user" } else { "unban_user" };
        self.log_action(admin.id, action, target_id, reason).await?;
        Ok(updated)
    }

    pub async fn set_user_verified(
        &self,
        target_id: i32,
        admin_id: i32,
        is_verified: bool,
    ) -> AppResult<UserModel> {
        let existing = self.get_user(target_id).await?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = existing.into();
        active.is_verified = sea_orm::ActiveValue::Set(is_verified);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        let action = if is_verified {
            "verify_user"
        } else {
            "unverify_user"
        };
        self.log_action(admin_id, action, target_id, None).await?;
        Ok(updated)
    }

    pub async fn change_user_role(
        &self,
        target_id: i32,
        admin: &UserModel,
        role: &str,
    ) -> AppResult<UserModel> {
        if !ROLES.contains(&role) {
            return Err(AppError::Validation(format!(
                "Invalid role. Must be one of: {}",
                ROLES.join(", ")
            )));
        }

        // Elevated roles are granted by super admins only.
        if (role == "moderator" || role == "super_admin") && admin.role != "super_admin" {
            return Err(AppError::Forbidden);
        }

        if target_id == admin.id {
            return Err(AppError::Forbidden);
        }

        let existing = self.get_user(target_id).await?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = existing.into();
        active.role = sea_orm::ActiveValue::Set(role.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active.update(&self.db).await?;

        self.log_action(
            admin.id,
            "change_user_role",
            target_id,
            Some(&format!("new role: {}", role)),
        )
        .await?;
        Ok(updated)
    }

    pub async fn list_actions(&self, limit: u64) -> AppResult<Vec<AdminActionModel>> {
        let actions = AdminAction::find()
            .order_by_desc(admin_action::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(actions)
    }

    async fn get_user(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Audit trail: one row per admin mutation.
    async fn log_action(
        &self,
        admin_id: i32,
        action_type: &str,
        target_id: i32,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().naive_utc();
        let model = admin_action::ActiveModel {
            admin_id: sea_orm::ActiveValue::Set(admin_id),
            action_type: sea_orm::ActiveValue::Set(action_type.to_string()),
            target_id: sea_orm::ActiveValue::Set(target_id),
            reason: sea_orm::ActiveValue::Set(reason.map(|s| s.to_string())),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        model.insert(&self.db).await?;
        Ok(())
    }
}

pub struct AdminStats {
    pub total_listings: u64,
    pub pending_listings: u64,
    pub active_listings: u64,
    pub listings_today: u64,
    pub unreviewed_flags: u64,
    pub total_users: u64,
}
