//! Subscription payments repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{PaymentMethod, PaymentStatus},
        payment::SubscriptionPayment,
    },
};

#[derive(Clone)]
pub struct PaymentsRepository {
    pool: Pool<Postgres>,
}

impl PaymentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Payments recorded for a device, newest cycle first
    pub async fn list_for_device(&self, device_id: i32) -> AppResult<Vec<SubscriptionPayment>> {
        let rows = sqlx::query_as::<_, SubscriptionPayment>(
            "SELECT * FROM subscription_payments WHERE device_id = $1 ORDER BY payment_date DESC"
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get payment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<SubscriptionPayment> {
        sqlx::query_as::<_, SubscriptionPayment>(
            "SELECT * FROM subscription_payments WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", id)))
    }

    /// Insert one Due payment for a billing cycle
    pub async fn insert_due(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        device_id: i32,
        payment_date: DateTime<Utc>,
        amount: Decimal,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO subscription_payments (device_id, payment_date, amount, method, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(device_id)
        .bind(payment_date)
        .bind(amount)
        .bind(i16::from(PaymentMethod::Unspecified))
        .bind(i16::from(PaymentStatus::Due))
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// Settle a Due payment
    pub async fn mark_paid(&self, id: i32, method: i16) -> AppResult<SubscriptionPayment> {
        let payment = sqlx::query_as::<_, SubscriptionPayment>(
            r#"
            UPDATE subscription_payments SET status = $2, method = $3
            WHERE id = $1 AND status = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(i16::from(PaymentStatus::Paid))
        .bind(method)
        .bind(i16::from(PaymentStatus::Due))
        .fetch_optional(&self.pool)
        .await?;

        match payment {
            Some(p) => Ok(p),
            None => {
                self.get_by_id(id).await?;
                Err(AppError::Conflict(format!("Payment {} is already paid", id)))
            }
        }
    }
}
