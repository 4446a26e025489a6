//! Device (physical unit) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        device::{CreateDevice, Device, UpdateDevice},
        payment::SubscriptionPayment,
    },
};

use super::validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeviceListQuery {
    /// Narrow to one device type
    pub device_type_id: Option<i32>,
}

/// List devices
///
/// Listing also sweeps due subscriptions forward, so billing dates shown here
/// are never stale.
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    params(DeviceListQuery),
    responses(
        (status = 200, description = "Devices", body = Vec<Device>)
    )
)]
pub async fn list_devices(
    State(state): State<crate::AppState>,
    Query(query): Query<DeviceListQuery>,
) -> AppResult<Json<Vec<Device>>> {
    state.services.subscriptions.rollover_due(Utc::now()).await?;
    let devices = state.services.inventory.list_devices(query.device_type_id).await?;
    Ok(Json(devices))
}

/// Get a device
#[utoipa::path(
    get,
    path = "/devices/{id}",
    tag = "devices",
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device", body = Device),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Device>> {
    let device = state.services.inventory.get_device(id).await?;
    Ok(Json(device))
}

/// Create a device
#[utoipa::path(
    post,
    path = "/devices",
    tag = "devices",
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 404, description = "Device type not found")
    )
)]
pub async fn create_device(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    validate(&payload)?;
    let device = state.services.inventory.create_device(payload).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Update a device
#[utoipa::path(
    put,
    path = "/devices/{id}",
    tag = "devices",
    params(("id" = i32, Path, description = "Device ID")),
    request_body = UpdateDevice,
    responses(
        (status = 200, description = "Device updated", body = Device),
        (status = 404, description = "Device not found")
    )
)]
pub async fn update_device(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDevice>,
) -> AppResult<Json<Device>> {
    validate(&payload)?;
    let device = state.services.inventory.update_device(id, payload).await?;
    Ok(Json(device))
}

/// Delete a device
#[utoipa::path(
    delete,
    path = "/devices/{id}",
    tag = "devices",
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Device has pending or active reservations")
    )
)]
pub async fn delete_device(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.inventory.delete_device(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subscription payments recorded for a device
#[utoipa::path(
    get,
    path = "/devices/{id}/payments",
    tag = "subscriptions",
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Payments for the device", body = Vec<SubscriptionPayment>),
        (status = 404, description = "Device not found")
    )
)]
pub async fn list_device_payments(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<SubscriptionPayment>>> {
    let payments = state.services.inventory.list_device_payments(id).await?;
    Ok(Json(payments))
}
