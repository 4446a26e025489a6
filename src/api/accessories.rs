//! Accessory pool endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::accessory::{Accessory, CreateAccessory, UpdateAccessory},
};

use super::validate;

/// List all accessories
#[utoipa::path(
    get,
    path = "/accessories",
    tag = "accessories",
    responses(
        (status = 200, description = "All accessories", body = Vec<Accessory>)
    )
)]
pub async fn list_accessories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Accessory>>> {
    let accessories = state.services.inventory.list_accessories().await?;
    Ok(Json(accessories))
}

/// Get an accessory
#[utoipa::path(
    get,
    path = "/accessories/{id}",
    tag = "accessories",
    params(("id" = i32, Path, description = "Accessory ID")),
    responses(
        (status = 200, description = "Accessory", body = Accessory),
        (status = 404, description = "Accessory not found")
    )
)]
pub async fn get_accessory(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Accessory>> {
    let accessory = state.services.inventory.get_accessory(id).await?;
    Ok(Json(accessory))
}

/// Create an accessory
#[utoipa::path(
    post,
    path = "/accessories",
    tag = "accessories",
    request_body = CreateAccessory,
    responses(
        (status = 201, description = "Accessory created", body = Accessory),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_accessory(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateAccessory>,
) -> AppResult<(StatusCode, Json<Accessory>)> {
    validate(&payload)?;
    let accessory = state.services.inventory.create_accessory(payload).await?;
    Ok((StatusCode::CREATED, Json(accessory)))
}

/// Update an accessory
#[utoipa::path(
    put,
    path = "/accessories/{id}",
    tag = "accessories",
    params(("id" = i32, Path, description = "Accessory ID")),
    request_body = UpdateAccessory,
    responses(
        (status = 200, description = "Accessory updated", body = Accessory),
        (status = 404, description = "Accessory not found")
    )
)]
pub async fn update_accessory(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAccessory>,
) -> AppResult<Json<Accessory>> {
    validate(&payload)?;
    let accessory = state.services.inventory.update_accessory(id, payload).await?;
    Ok(Json(accessory))
}

/// Delete an accessory
#[utoipa::path(
    delete,
    path = "/accessories/{id}",
    tag = "accessories",
    params(("id" = i32, Path, description = "Accessory ID")),
    responses(
        (status = 204, description = "Accessory deleted"),
        (status = 404, description = "Accessory not found"),
        (status = 409, description = "Accessory is drawn by live reservations")
    )
)]
pub async fn delete_accessory(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.inventory.delete_accessory(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
