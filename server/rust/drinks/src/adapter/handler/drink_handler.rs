use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::domain::entity::Recipe;
use crate::usecase::create_drink::CreateDrinkInput;
use crate::usecase::update_drink::UpdateDrinkInput;

/// GET /drinks
pub async fn list_drinks(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let drinks = state.list_drinks_uc.execute().await?;
    let items: Vec<_> = drinks.iter().map(|d| d.short()).collect();
    Ok(Json(json!({ "success": true, "drinks": items })))
}

/// GET /drinks-detail
pub async fn list_drinks_detail(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let drinks = state.list_drinks_uc.execute().await?;
    let items: Vec<_> = drinks.iter().map(|d| d.long()).collect();
    Ok(Json(json!({ "success": true, "drinks": items })))
}

/// POST /drinks
pub async fn create_drink(
    State(state): State<AppState>,
    body: Result<Json<DrinkRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let input = CreateDrinkInput {
        title: req.title,
        recipe: req.recipe,
    };
    let drink = state.create_drink_uc.execute(&input).await?;

    tracing::info!(drink_id = drink.id, title = %drink.title, "drink created");
    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// PATCH /drinks/{id}
pub async fn update_drink(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<DrinkRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let input = UpdateDrinkInput {
        id,
        title: req.title,
        recipe: req.recipe,
    };
    let drink = state.update_drink_uc.execute(&input).await?;

    tracing::info!(drink_id = drink.id, "drink updated");
    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// DELETE /drinks/{id}
pub async fn delete_drink(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let deleted = state.delete_drink_uc.execute(id).await?;

    tracing::info!(drink_id = deleted, "drink deleted");
    Ok(Json(json!({ "success": true, "delete": deleted })))
}

// --- Request types ---

/// POST / PATCH 共通のリクエスト本文。欠落の扱いはユースケース側で決める。
#[derive(Debug, Deserialize)]
pub struct DrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<Recipe>,
}
