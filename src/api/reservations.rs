//! Reservation (checkout) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::reservation::{
        CheckoutRequest, CheckoutResponse, PriceBreakdown, Reservation, ReservationQuery,
    },
};

use super::validate;

/// Book units of a device type for a window
///
/// Either all requested units (and accessory draws) commit, or nothing does.
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Reservations committed", body = CheckoutResponse),
        (status = 400, description = "Invalid window or quantity"),
        (status = 404, description = "Device type or accessory not found"),
        (status = 409, description = "Sold out for the window, or a concurrent checkout won the race")
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    validate(&payload)?;
    let response = state.services.reservations.checkout(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Price a prospective checkout without reserving
#[utoipa::path(
    post,
    path = "/reservations/quote",
    tag = "reservations",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Cost breakdown", body = PriceBreakdown),
        (status = 400, description = "Invalid window or quantity"),
        (status = 404, description = "Device type or accessory not found")
    )
)]
pub async fn quote(
    State(state): State<crate::AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<PriceBreakdown>> {
    validate(&payload)?;
    let breakdown = state.services.reservations.quote(&payload).await?;
    Ok(Json(breakdown))
}

/// List reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    params(ReservationQuery),
    responses(
        (status = 200, description = "Reservations", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.reservations.list(&query).await?;
    Ok(Json(reservations))
}

/// Get a reservation
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation", body = Reservation),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.get(id).await?;
    Ok(Json(reservation))
}

/// Cancel a reservation (administrative)
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation already completed or cancelled")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.cancel(id).await?;
    Ok(Json(reservation))
}
