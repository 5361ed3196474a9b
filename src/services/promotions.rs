//! Promotional content service

use std::collections::HashSet;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::promotion::{
        BulkPromotionAction, CreatePromotion, Promotion, PromotionQuery, UpdatePromotion,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PromotionsService {
    repository: Repository,
}

impl PromotionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &PromotionQuery) -> AppResult<(Vec<Promotion>, i64)> {
        self.repository.promotions.list(query).await
    }

    pub async fn list_active(&self) -> AppResult<Vec<Promotion>> {
        self.repository.promotions.list_active().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Promotion> {
        self.repository.promotions.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreatePromotion) -> AppResult<Promotion> {
        data.validate()?;
        self.repository.promotions.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdatePromotion) -> AppResult<Promotion> {
        data.validate()?;
        self.repository.promotions.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.promotions.delete(id).await
    }

    /// Persist a drag-and-drop order
    pub async fn reorder(&self, ids: &[i32]) -> AppResult<()> {
        ensure_unique(ids)?;
        self.repository.promotions.reorder(ids).await?;
        tracing::info!(count = ids.len(), "Promotions reordered");
        Ok(())
    }

    pub async fn bulk(&self, data: &BulkPromotionAction) -> AppResult<u64> {
        data.validate()?;
        ensure_unique(&data.ids)?;
        let affected = self.repository.promotions.bulk(&data.ids, data.action).await?;
        tracing::info!(action = ?data.action, affected, "Bulk promotion action applied");
        Ok(affected)
    }
}

fn ensure_unique(ids: &[i32]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::Validation(format!("Promotion {} listed twice", dup)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_unique() {
        assert!(ensure_unique(&[3, 1, 2]).is_ok());
        assert!(matches!(
            ensure_unique(&[3, 1, 3]),
            Err(AppError::Validation(msg)) if msg.contains('3')
        ));
    }
}
