//! Promotional content model (homepage carousel items)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Promotion record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Promotion {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Short label shown over the image ("New", "Free entry", ...)
    pub badge: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    /// Position in the carousel, ascending
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePromotion {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(length(max = 64))]
    pub badge: Option<String>,
    #[validate(length(max = 128))]
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    /// Appended at the end when omitted
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePromotion {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(length(max = 64))]
    pub badge: Option<String>,
    #[validate(length(max = 128))]
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PromotionSort {
    #[default]
    Order,
    Title,
    Created,
}

impl PromotionSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            PromotionSort::Order => "display_order ASC, id ASC",
            PromotionSort::Title => "title ASC, id ASC",
            PromotionSort::Created => "created_at DESC, id DESC",
        }
    }
}

/// Query parameters for the admin grid
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PromotionQuery {
    /// Matches title or description, case-insensitive
    pub search: Option<String>,
    pub active: Option<bool>,
    pub sort: Option<PromotionSort>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Drag-and-drop reorder: ids in their new display order
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReorderPromotions {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkPromotionAction {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
    pub action: BulkAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkActionResult {
    pub affected: u64,
}
