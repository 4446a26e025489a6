//! Device types repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::device_type::{CreateDeviceType, DeviceType, UpdateDeviceType},
};

#[derive(Clone)]
pub struct DeviceTypesRepository {
    pool: Pool<Postgres>,
}

impl DeviceTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all device types
    pub async fn list(&self) -> AppResult<Vec<DeviceType>> {
        let rows = sqlx::query_as::<_, DeviceType>(
            "SELECT * FROM device_types ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// List all device types inside an open transaction (snapshot reads)
    pub async fn list_in_tx(&self, tx: &mut Transaction<'_, Postgres>) -> AppResult<Vec<DeviceType>> {
        let rows = sqlx::query_as::<_, DeviceType>(
            "SELECT * FROM device_types ORDER BY name"
        )
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows)
    }

    /// Get device type by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<DeviceType> {
        sqlx::query_as::<_, DeviceType>("SELECT * FROM device_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device type {} not found", id)))
    }

    /// Create device type
    pub async fn create(&self, data: &CreateDeviceType) -> AppResult<DeviceType> {
        let row = sqlx::query_as::<_, DeviceType>(
            r#"
            INSERT INTO device_types (name, rental_rate, deposit, has_subscription, subscription_cost)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.rental_rate)
        .bind(data.deposit)
        .bind(data.has_subscription)
        .bind(data.subscription_cost)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update device type
    pub async fn update(&self, id: i32, data: &UpdateDeviceType) -> AppResult<DeviceType> {
        let now = Utc::now();
        let mut sets = vec!["modif_date = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.rental_rate, "rental_rate");
        add_field!(data.deposit, "deposit");
        add_field!(data.has_subscription, "has_subscription");
        add_field!(data.subscription_cost, "subscription_cost");

        let query = format!("UPDATE device_types SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut builder = sqlx::query_as::<_, DeviceType>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.rental_rate);
        bind_field!(data.deposit);
        bind_field!(data.has_subscription);
        bind_field!(data.subscription_cost);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device type {} not found", id)))
    }

    /// Delete device type
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_devices: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM devices WHERE device_type_id = $1)"
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_devices {
            return Err(AppError::Conflict(format!(
                "Device type {} still has devices",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM device_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Device type {} not found", id)));
        }
        Ok(())
    }
}
