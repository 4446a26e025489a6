//! Devices repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        device::{CreateDevice, Device, UpdateDevice},
        enums::WorkingState,
    },
};

/// A device due for a subscription rollover, with the cost of its cycle
#[derive(Debug)]
pub struct DueSubscription {
    pub device_id: i32,
    pub subscription_date: DateTime<Utc>,
    pub subscription_cost: rust_decimal::Decimal,
}

#[derive(Clone)]
pub struct DevicesRepository {
    pool: Pool<Postgres>,
}

impl DevicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all devices, optionally narrowed to a device type
    pub async fn list(&self, device_type_id: Option<i32>) -> AppResult<Vec<Device>> {
        let rows = match device_type_id {
            Some(type_id) => {
                sqlx::query_as::<_, Device>(
                    "SELECT * FROM devices WHERE device_type_id = $1 ORDER BY id"
                )
                .bind(type_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Device>("SELECT * FROM devices ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Get device by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Device> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", id)))
    }

    /// Create device
    pub async fn create(&self, data: &CreateDevice) -> AppResult<Device> {
        let row = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (device_type_id, working_state, condition, subscription_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.device_type_id)
        .bind(data.working_state.unwrap_or(WorkingState::Working as i16))
        .bind(&data.condition)
        .bind(data.subscription_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update device
    pub async fn update(&self, id: i32, data: &UpdateDevice) -> AppResult<Device> {
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

        add_field!(data.working_state, "working_state");
        add_field!(data.condition, "condition");
        add_field!(data.subscription_date, "subscription_date");

        let query = format!("UPDATE devices SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut builder = sqlx::query_as::<_, Device>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.working_state);
        bind_field!(data.condition);
        bind_field!(data.subscription_date);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", id)))
    }

    /// Delete device
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let occupied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE device_id = $1 AND status IN (0, 1))"
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if occupied {
            return Err(AppError::Conflict(format!(
                "Device {} has pending or active reservations",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Device {} not found", id)));
        }
        Ok(())
    }

    /// Working unit IDs of a type inside a transaction (snapshot read)
    pub async fn working_ids_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        device_type_id: i32,
    ) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM devices WHERE device_type_id = $1 AND working_state = 0 ORDER BY id"
        )
        .bind(device_type_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(ids)
    }

    /// Lock and return the working unit IDs of a type, ascending
    ///
    /// The row locks serialize concurrent checkouts racing for the same pool.
    pub async fn working_ids_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        device_type_id: i32,
    ) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM devices WHERE device_type_id = $1 AND working_state = 0 ORDER BY id FOR UPDATE"
        )
        .bind(device_type_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(ids)
    }

    /// Working unit IDs for every type, inside a transaction (snapshot read)
    pub async fn all_working_ids_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> AppResult<Vec<(i32, i32)>> {
        let rows = sqlx::query(
            "SELECT id, device_type_id FROM devices WHERE working_state = 0 ORDER BY device_type_id, id"
        )
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get::<i32, _>("id"), r.get::<i32, _>("device_type_id")))
            .collect())
    }

    /// Lock and return devices whose subscription has come due
    pub async fn due_subscriptions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        as_of: DateTime<Utc>,
    ) -> AppResult<Vec<DueSubscription>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.subscription_date, COALESCE(t.subscription_cost, 0) as subscription_cost
            FROM devices d
            JOIN device_types t ON d.device_type_id = t.id
            WHERE t.has_subscription = TRUE
              AND d.subscription_date IS NOT NULL
              AND d.subscription_date <= $1
            ORDER BY d.id
            FOR UPDATE OF d
            "#,
        )
        .bind(as_of)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DueSubscription {
                device_id: r.get("id"),
                subscription_date: r.get("subscription_date"),
                subscription_cost: r.get("subscription_cost"),
            })
            .collect())
    }

    /// Advance a device's next billing date
    pub async fn set_subscription_date(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        device_id: i32,
        date: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE devices SET subscription_date = $1, modif_date = $2 WHERE id = $3"
        )
        .bind(date)
        .bind(Utc::now())
        .bind(device_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
