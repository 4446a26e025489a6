//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accessories, device_types, devices, events, health, reservations, subscriptions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rentdesk API",
        version = "0.3.0",
        description = "Rental Inventory Availability & Booking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Device types
        device_types::list_device_types,
        device_types::get_device_type,
        device_types::create_device_type,
        device_types::update_device_type,
        device_types::delete_device_type,
        device_types::get_availability,
        device_types::get_all_availability,
        // Devices
        devices::list_devices,
        devices::get_device,
        devices::create_device,
        devices::update_device,
        devices::delete_device,
        devices::list_device_payments,
        // Accessories
        accessories::list_accessories,
        accessories::get_accessory,
        accessories::create_accessory,
        accessories::update_accessory,
        accessories::delete_accessory,
        // Reservations
        reservations::checkout,
        reservations::quote,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::cancel_reservation,
        // Subscriptions
        subscriptions::rollover,
        subscriptions::pay,
        // Events
        events::subscribe,
    ),
    components(
        schemas(
            // Device types
            crate::models::device_type::DeviceType,
            crate::models::device_type::CreateDeviceType,
            crate::models::device_type::UpdateDeviceType,
            crate::models::device_type::Availability,
            crate::models::device_type::TypeAvailability,
            // Devices
            crate::models::device::Device,
            crate::models::device::CreateDevice,
            crate::models::device::UpdateDevice,
            // Accessories
            crate::models::accessory::Accessory,
            crate::models::accessory::CreateAccessory,
            crate::models::accessory::UpdateAccessory,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::AccessorySelection,
            crate::models::reservation::CheckoutRequest,
            crate::models::reservation::CheckoutResponse,
            crate::models::reservation::PriceBreakdown,
            // Subscriptions
            crate::models::payment::SubscriptionPayment,
            crate::models::payment::PayRequest,
            subscriptions::RolloverResponse,
            // Events
            crate::services::changefeed::ChangeEvent,
            crate::services::changefeed::Table,
            crate::services::changefeed::Op,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "device-types", description = "Device type catalog and availability"),
        (name = "devices", description = "Physical unit management"),
        (name = "accessories", description = "Accessory pool management"),
        (name = "reservations", description = "Checkout, quoting and cancellation"),
        (name = "subscriptions", description = "Recurring billing"),
        (name = "events", description = "Live change feed")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
