use crate::{
    error::{AppError, AppResult},
    models::{notification, Notification, NotificationModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

pub struct NotificationService {
    db: DatabaseConnection,
}

impl NotificationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Tell a listing owner about a moderation decision.
    pub async fn notify_listing_decision(
        &self,
        owner_id: i32,
        listing_id: i32,
        approved: bool,
        listing_title: &str,
        reason: Option<&str>,
    ) -> AppResult<NotificationModel> {
        let (kind, title, message) = if approved {
            (
                "listing_approved",
                "Listing approved".to_string(),
                format!("Your listing \"{}\" is now live.", listing_title),
            )
        } else {
            (
                "listing_rejected",
                "Listing rejected".to_string(),
                format!(
                    "Your listing \"{}\" was rejected. Reason: {}",
                    listing_title,
                    reason.unwrap_or("not specified")
                ),
            )
        };

        self.insert(owner_id, Some(listing_id), kind, &title, &message)
            .await
    }

    async fn insert(
        &self,
        user_id: i32,
        listing_id: Option<i32>,
        kind: &str,
        title: &str,
        message: &str,
    ) -> AppResult<NotificationModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = notification::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            listing_id: sea_orm::ActiveValue::Set(listing_id),
            kind: sea_orm::ActiveValue::Set(kind.to_string()),
            title: sea_orm::ActiveValue::Set(title.to_string()),
            message: sea_orm::ActiveValue::Set(message.to_string()),
            is_read: sea_orm::ActiveValue::Set(false),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<NotificationModel>, u64)> {
        let paginator = Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn unread_count(&self, user_id: i32) -> AppResult<u64> {
        let count = Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn mark_read(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = Notification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        let mut active: notification::ActiveModel = existing.into();
        active.is_read = sea_orm::ActiveValue::Set(true);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
