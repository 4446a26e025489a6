//! Device type catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::device_type::{
        Availability, CreateDeviceType, DeviceType, TypeAvailability, UpdateDeviceType,
    },
};

use super::validate;

/// Availability query window; both bounds or neither
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Window start (RFC 3339); defaults with `end` to the current instant
    pub start: Option<DateTime<Utc>>,
    /// Window end (RFC 3339), exclusive
    pub end: Option<DateTime<Utc>>,
}

impl AvailabilityQuery {
    pub(crate) fn window(&self) -> AppResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            (None, None) => Ok(None),
            _ => Err(AppError::Validation(
                "Provide both start and end, or neither".to_string(),
            )),
        }
    }
}

/// List all device types
#[utoipa::path(
    get,
    path = "/device-types",
    tag = "device-types",
    responses(
        (status = 200, description = "All device types", body = Vec<DeviceType>)
    )
)]
pub async fn list_device_types(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<DeviceType>>> {
    let types = state.services.inventory.list_device_types().await?;
    Ok(Json(types))
}

/// Get a device type
#[utoipa::path(
    get,
    path = "/device-types/{id}",
    tag = "device-types",
    params(("id" = i32, Path, description = "Device type ID")),
    responses(
        (status = 200, description = "Device type", body = DeviceType),
        (status = 404, description = "Device type not found")
    )
)]
pub async fn get_device_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DeviceType>> {
    let device_type = state.services.inventory.get_device_type(id).await?;
    Ok(Json(device_type))
}

/// Create a device type
#[utoipa::path(
    post,
    path = "/device-types",
    tag = "device-types",
    request_body = CreateDeviceType,
    responses(
        (status = 201, description = "Device type created", body = DeviceType),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_device_type(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateDeviceType>,
) -> AppResult<(StatusCode, Json<DeviceType>)> {
    validate(&payload)?;
    let device_type = state.services.inventory.create_device_type(payload).await?;
    Ok((StatusCode::CREATED, Json(device_type)))
}

/// Update a device type
#[utoipa::path(
    put,
    path = "/device-types/{id}",
    tag = "device-types",
    params(("id" = i32, Path, description = "Device type ID")),
    request_body = UpdateDeviceType,
    responses(
        (status = 200, description = "Device type updated", body = DeviceType),
        (status = 404, description = "Device type not found")
    )
)]
pub async fn update_device_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDeviceType>,
) -> AppResult<Json<DeviceType>> {
    validate(&payload)?;
    let device_type = state.services.inventory.update_device_type(id, payload).await?;
    Ok(Json(device_type))
}

/// Delete a device type
#[utoipa::path(
    delete,
    path = "/device-types/{id}",
    tag = "device-types",
    params(("id" = i32, Path, description = "Device type ID")),
    responses(
        (status = 204, description = "Device type deleted"),
        (status = 404, description = "Device type not found"),
        (status = 409, description = "Device type still has devices")
    )
)]
pub async fn delete_device_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.inventory.delete_device_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Free/total units of a device type over a window
#[utoipa::path(
    get,
    path = "/device-types/{id}/availability",
    tag = "device-types",
    params(
        ("id" = i32, Path, description = "Device type ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Availability counts", body = Availability),
        (status = 404, description = "Device type not found")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    let counts = state
        .services
        .availability
        .for_type(id, query.window()?)
        .await?;
    Ok(Json(counts))
}

/// Free/total units for every device type in one snapshot
#[utoipa::path(
    get,
    path = "/device-types/availability",
    tag = "device-types",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability per device type", body = Vec<TypeAvailability>)
    )
)]
pub async fn get_all_availability(
    State(state): State<crate::AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<TypeAvailability>>> {
    let counts = state
        .services
        .availability
        .for_all_types(query.window()?)
        .await?;
    Ok(Json(counts))
}
