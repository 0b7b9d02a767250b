use crate::{
    error::{AppError, AppResult},
    models::{saved_search, SavedSearch, SavedSearchModel},
    services::listing::SearchFilters,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub struct SavedSearchService {
    db: DatabaseConnection,
}

impl SavedSearchService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: i32,
        name: &str,
        filters: &SearchFilters,
        notify_email: bool,
    ) -> AppResult<SavedSearchModel> {
        let filters_json = serde_json::to_string(filters)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode filters: {}", e)))?;

        let now = chrono::Utc::now().naive_utc();
        let model = saved_search::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            name: sea_orm::ActiveValue::Set(name.to_string()),
            filters: sea_orm::ActiveValue::Set(filters_json),
            notify_email: sea_orm::ActiveValue::Set(notify_email),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<SavedSearchModel>> {
        let searches = SavedSearch::find()
            .filter(saved_search::Column::UserId.eq(user_id))
            .order_by_desc(saved_search::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(searches)
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = SavedSearch::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        SavedSearch::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
