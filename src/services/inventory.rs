//! Inventory management service (device types, devices, accessories, payments)

use crate::{
    error::AppResult,
    models::{
        accessory::{Accessory, CreateAccessory, UpdateAccessory},
        device::{CreateDevice, Device, UpdateDevice},
        device_type::{CreateDeviceType, DeviceType, UpdateDeviceType},
        payment::SubscriptionPayment,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // -- device types ------------------------------------------------------

    pub async fn list_device_types(&self) -> AppResult<Vec<DeviceType>> {
        self.repository.device_types.list().await
    }

    pub async fn get_device_type(&self, id: i32) -> AppResult<DeviceType> {
        self.repository.device_types.get_by_id(id).await
    }

    pub async fn create_device_type(&self, data: CreateDeviceType) -> AppResult<DeviceType> {
        self.repository.device_types.create(&data).await
    }

    pub async fn update_device_type(&self, id: i32, data: UpdateDeviceType) -> AppResult<DeviceType> {
        self.repository.device_types.update(id, &data).await
    }

    pub async fn delete_device_type(&self, id: i32) -> AppResult<()> {
        self.repository.device_types.delete(id).await
    }

    // -- devices -----------------------------------------------------------

    pub async fn list_devices(&self, device_type_id: Option<i32>) -> AppResult<Vec<Device>> {
        self.repository.devices.list(device_type_id).await
    }

    pub async fn get_device(&self, id: i32) -> AppResult<Device> {
        self.repository.devices.get_by_id(id).await
    }

    pub async fn create_device(&self, data: CreateDevice) -> AppResult<Device> {
        // Reject unknown types up front for a useful 404
        self.repository.device_types.get_by_id(data.device_type_id).await?;
        self.repository.devices.create(&data).await
    }

    pub async fn update_device(&self, id: i32, data: UpdateDevice) -> AppResult<Device> {
        self.repository.devices.update(id, &data).await
    }

    pub async fn delete_device(&self, id: i32) -> AppResult<()> {
        self.repository.devices.delete(id).await
    }

    // -- accessories -------------------------------------------------------

    pub async fn list_accessories(&self) -> AppResult<Vec<Accessory>> {
        self.repository.accessories.list().await
    }

    pub async fn get_accessory(&self, id: i32) -> AppResult<Accessory> {
        self.repository.accessories.get_by_id(id).await
    }

    pub async fn create_accessory(&self, data: CreateAccessory) -> AppResult<Accessory> {
        self.repository.accessories.create(&data).await
    }

    pub async fn update_accessory(&self, id: i32, data: UpdateAccessory) -> AppResult<Accessory> {
        self.repository.accessories.update(id, &data).await
    }

    pub async fn delete_accessory(&self, id: i32) -> AppResult<()> {
        self.repository.accessories.delete(id).await
    }

    // -- subscription payments --------------------------------------------

    pub async fn list_device_payments(&self, device_id: i32) -> AppResult<Vec<SubscriptionPayment>> {
        self.repository.devices.get_by_id(device_id).await?;
        self.repository.payments.list_for_device(device_id).await
    }

    pub async fn pay(&self, payment_id: i32, method: i16) -> AppResult<SubscriptionPayment> {
        self.repository.payments.mark_paid(payment_id, method).await
    }
}
