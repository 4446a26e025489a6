//! Domain models

pub mod accessory;
pub mod device;
pub mod device_type;
pub mod enums;
pub mod payment;
pub mod reservation;
