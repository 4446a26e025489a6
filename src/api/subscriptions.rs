//! Subscription billing endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        enums::PaymentMethod,
        payment::{PayRequest, SubscriptionPayment},
    },
};

#[derive(Serialize, ToSchema)]
pub struct RolloverResponse {
    /// Devices whose billing date was advanced
    pub updated: u64,
}

/// Advance all due subscription billing dates
///
/// The same sweep runs lazily on device listings; this endpoint exists for
/// external schedulers that want stronger freshness.
#[utoipa::path(
    post,
    path = "/subscriptions/rollover",
    tag = "subscriptions",
    responses(
        (status = 200, description = "Rollover completed", body = RolloverResponse)
    )
)]
pub async fn rollover(
    State(state): State<crate::AppState>,
) -> AppResult<Json<RolloverResponse>> {
    let updated = state.services.subscriptions.rollover_due(Utc::now()).await?;
    Ok(Json(RolloverResponse { updated }))
}

/// Settle a Due subscription payment
#[utoipa::path(
    post,
    path = "/payments/{id}/pay",
    tag = "subscriptions",
    params(("id" = i32, Path, description = "Payment ID")),
    request_body = PayRequest,
    responses(
        (status = 200, description = "Payment settled", body = SubscriptionPayment),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment already paid")
    )
)]
pub async fn pay(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PayRequest>,
) -> AppResult<Json<SubscriptionPayment>> {
    // Normalize unknown method codes instead of persisting them
    let method = PaymentMethod::from(payload.method.unwrap_or(0));
    let payment = state.services.inventory.pay(id, method.into()).await?;
    Ok(Json(payment))
}
