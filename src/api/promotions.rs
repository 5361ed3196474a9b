//! Promotional content endpoints (homepage carousel)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::promotion::{
        BulkActionResult, BulkPromotionAction, CreatePromotion, Promotion, PromotionQuery,
        ReorderPromotions, UpdatePromotion,
    },
    AppState,
};

use super::{AuthenticatedUser, Page, PromotionsPage};

/// Active promotions in display order
#[utoipa::path(
    get,
    path = "/promotions/active",
    tag = "promotions",
    responses(
        (status = 200, description = "Active promotions", body = Vec<Promotion>)
    )
)]
pub async fn active_promotions(State(state): State<AppState>) -> AppResult<Json<Vec<Promotion>>> {
    let promotions = state.services.promotions.list_active().await?;
    Ok(Json(promotions))
}

/// Admin grid: search, filter, sort and paginate
#[utoipa::path(
    get,
    path = "/promotions",
    tag = "promotions",
    security(("bearer_auth" = [])),
    params(PromotionQuery),
    responses(
        (status = 200, description = "Promotions list", body = PromotionsPage)
    )
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PromotionQuery>,
) -> AppResult<Json<Page<Promotion>>> {
    claims.require_admin()?;
    let (promotions, total) = state.services.promotions.list(&query).await?;
    Ok(Json(Page::new(promotions, total, query.page, query.per_page, 50)))
}

#[utoipa::path(
    get,
    path = "/promotions/{id}",
    tag = "promotions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Promotion", body = Promotion),
        (status = 404, description = "Promotion not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_promotion(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Promotion>> {
    claims.require_admin()?;
    let promotion = state.services.promotions.get_by_id(id).await?;
    Ok(Json(promotion))
}

#[utoipa::path(
    post,
    path = "/promotions",
    tag = "promotions",
    security(("bearer_auth" = [])),
    request_body = CreatePromotion,
    responses(
        (status = 201, description = "Promotion created", body = Promotion)
    )
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreatePromotion>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    claims.require_admin()?;
    let promotion = state.services.promotions.create(&data).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

#[utoipa::path(
    put,
    path = "/promotions/{id}",
    tag = "promotions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Promotion ID")),
    request_body = UpdatePromotion,
    responses(
        (status = 200, description = "Promotion updated", body = Promotion),
        (status = 404, description = "Promotion not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePromotion>,
) -> AppResult<Json<Promotion>> {
    claims.require_admin()?;
    let promotion = state.services.promotions.update(id, &data).await?;
    Ok(Json(promotion))
}

#[utoipa::path(
    delete,
    path = "/promotions/{id}",
    tag = "promotions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Promotion ID")),
    responses(
        (status = 204, description = "Promotion deleted"),
        (status = 404, description = "Promotion not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.promotions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Save a new display order; position in `ids` becomes `display_order`
#[utoipa::path(
    put,
    path = "/promotions/order",
    tag = "promotions",
    security(("bearer_auth" = [])),
    request_body = ReorderPromotions,
    responses(
        (status = 204, description = "Order saved"),
        (status = 404, description = "Unknown promotion id", body = crate::error::ErrorResponse)
    )
)]
pub async fn reorder_promotions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<ReorderPromotions>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    data.validate()?;
    state.services.promotions.reorder(&data.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activate, deactivate or delete several promotions at once
#[utoipa::path(
    post,
    path = "/promotions/bulk",
    tag = "promotions",
    security(("bearer_auth" = [])),
    request_body = BulkPromotionAction,
    responses(
        (status = 200, description = "Rows affected", body = BulkActionResult)
    )
)]
pub async fn bulk_action(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<BulkPromotionAction>,
) -> AppResult<Json<BulkActionResult>> {
    claims.require_admin()?;
    let affected = state.services.promotions.bulk(&data).await?;
    Ok(Json(BulkActionResult { affected }))
}
