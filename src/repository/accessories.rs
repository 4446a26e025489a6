//! Accessories repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::accessory::{Accessory, CreateAccessory, UpdateAccessory},
};

#[derive(Clone)]
pub struct AccessoriesRepository {
    pool: Pool<Postgres>,
}

impl AccessoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all accessories
    pub async fn list(&self) -> AppResult<Vec<Accessory>> {
        let rows = sqlx::query_as::<_, Accessory>(
            "SELECT * FROM accessories ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get accessory by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Accessory> {
        sqlx::query_as::<_, Accessory>("SELECT * FROM accessories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Accessory {} not found", id)))
    }

    /// Lock and return an accessory row inside an open transaction
    ///
    /// Checkouts drawing from the same pool share no device lock when they
    /// book different device types; the row lock here is what serializes
    /// their draw-sum checks.
    pub async fn get_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Accessory> {
        sqlx::query_as::<_, Accessory>("SELECT * FROM accessories WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Accessory {} not found", id)))
    }

    /// Create accessory
    pub async fn create(&self, data: &CreateAccessory) -> AppResult<Accessory> {
        let row = sqlx::query_as::<_, Accessory>(
            r#"
            INSERT INTO accessories (name, rental_rate, total_quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.rental_rate)
        .bind(data.total_quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update accessory
    pub async fn update(&self, id: i32, data: &UpdateAccessory) -> AppResult<Accessory> {
        let mut sets = Vec::new();
        let mut idx = 1;

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
        add_field!(data.total_quantity, "total_quantity");

        let _ = idx;
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE accessories SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut builder = sqlx::query_as::<_, Accessory>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.rental_rate);
        bind_field!(data.total_quantity);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Accessory {} not found", id)))
    }

    /// Delete accessory
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let drawn: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservation_accessories ra
                JOIN reservations r ON ra.reservation_id = r.id
                WHERE ra.accessory_id = $1 AND r.status IN (0, 1)
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if drawn {
            return Err(AppError::Conflict(format!(
                "Accessory {} is drawn by pending or active reservations",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM accessories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Accessory {} not found", id)));
        }
        Ok(())
    }
}
