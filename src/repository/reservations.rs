//! Reservations repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ReservationStatus,
        reservation::{Reservation, ReservationQuery},
    },
};

/// The occupied window of one Pending/Active reservation
#[derive(Debug, Clone)]
pub struct ReservationWindow {
    pub device_id: i32,
    pub device_type_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    /// List reservations with optional filters
    pub async fn list(&self, query: &ReservationQuery) -> AppResult<Vec<Reservation>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        macro_rules! add_filter {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    conditions.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_filter!(query.device_type_id, "device_type_id");
        add_filter!(query.device_id, "device_id");
        add_filter!(query.status, "status");

        let _ = idx;
        let sql = if conditions.is_empty() {
            "SELECT * FROM reservations ORDER BY start_at, id".to_string()
        } else {
            format!(
                "SELECT * FROM reservations WHERE {} ORDER BY start_at, id",
                conditions.join(" AND ")
            )
        };

        let mut builder = sqlx::query_as::<_, Reservation>(&sql);

        macro_rules! bind_filter {
            ($field:expr) => {
                if let Some(val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_filter!(query.device_type_id);
        bind_filter!(query.device_id);
        bind_filter!(query.status);

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Pending/Active windows for a device type, inside a transaction
    pub async fn occupied_windows_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        device_type_id: i32,
    ) -> AppResult<Vec<ReservationWindow>> {
        let rows = sqlx::query(
            r#"
            SELECT device_id, device_type_id, start_at, end_at
            FROM reservations
            WHERE device_type_id = $1 AND status IN (0, 1)
            "#,
        )
        .bind(device_type_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(window_from_row).collect())
    }

    /// Pending/Active windows across all device types, inside a transaction
    pub async fn all_occupied_windows_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> AppResult<Vec<ReservationWindow>> {
        let rows = sqlx::query(
            r#"
            SELECT device_id, device_type_id, start_at, end_at
            FROM reservations
            WHERE status IN (0, 1)
            "#,
        )
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows.into_iter().map(window_from_row).collect())
    }

    /// Insert one Pending reservation for a unit
    pub async fn insert_pending(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        device_id: i32,
        device_type_id: i32,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reservations (device_id, device_type_id, start_at, end_at, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(device_id)
        .bind(device_type_id)
        .bind(start_at)
        .bind(end_at)
        .bind(i16::from(ReservationStatus::Pending))
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// Units of an accessory already drawn by Pending/Active reservations
    /// overlapping the window
    pub async fn accessory_draws_overlapping(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        accessory_id: i32,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> AppResult<i64> {
        let drawn: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(ra.quantity), 0)::bigint
            FROM reservation_accessories ra
            JOIN reservations r ON ra.reservation_id = r.id
            WHERE ra.accessory_id = $1
              AND r.status IN (0, 1)
              AND r.start_at < $3
              AND $2 < r.end_at
            "#,
        )
        .bind(accessory_id)
        .bind(start_at)
        .bind(end_at)
        .fetch_one(&mut **tx)
        .await?;
        Ok(drawn)
    }

    /// Record an accessory draw against a reservation
    pub async fn insert_accessory_draw(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: i32,
        accessory_id: i32,
        quantity: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reservation_accessories (reservation_id, accessory_id, quantity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(reservation_id)
        .bind(accessory_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Cancel a reservation (administrative); frees the unit and its draws
    pub async fn cancel(&self, id: i32) -> AppResult<Reservation> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations SET status = $2
            WHERE id = $1 AND status IN (0, 1)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(i16::from(ReservationStatus::Cancelled))
        .fetch_optional(&self.pool)
        .await?;

        match reservation {
            Some(r) => Ok(r),
            None => {
                // Distinguish "gone" from "already terminal"
                self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Reservation {} is already completed or cancelled",
                    id
                )))
            }
        }
    }
}

fn window_from_row(row: sqlx::postgres::PgRow) -> ReservationWindow {
    ReservationWindow {
        device_id: row.get("device_id"),
        device_type_id: row.get("device_type_id"),
        start_at: row.get("start_at"),
        end_at: row.get("end_at"),
    }
}
