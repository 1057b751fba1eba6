use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;

use adboard_core::payments::{NewPipelinePayment, PaymentRepositoryTrait, PipelinePayment};
use adboard_core::{Error, Result};

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::pipeline_payments;

#[derive(Queryable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::pipeline_payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct PipelinePaymentDB {
    id: i32,
    order_id: String,
    seq_no: i32,
    amount: String,
    note: Option<String>,
    created_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::pipeline_payments)]
struct NewPipelinePaymentDB {
    order_id: String,
    seq_no: i32,
    amount: String,
    note: Option<String>,
    created_at: String,
}

impl TryFrom<PipelinePaymentDB> for PipelinePayment {
    type Error = StorageError;

    fn try_from(row: PipelinePaymentDB) -> std::result::Result<Self, Self::Error> {
        let amount = row.amount.parse().map_err(|e| {
            StorageError::conversion(format!("Invalid stored amount '{}': {}", row.amount, e))
        })?;
        Ok(PipelinePayment {
            id: row.id,
            order_id: row.order_id,
            seq_no: row.seq_no,
            amount,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

pub struct PaymentRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PaymentRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PaymentRepository { pool, writer }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn list_payments(&self, order_id: String) -> Result<Vec<PipelinePayment>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = pipeline_payments::table
            .filter(pipeline_payments::order_id.eq(order_id))
            .order(pipeline_payments::seq_no.asc())
            .load::<PipelinePaymentDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Ok(PipelinePayment::try_from(row)?))
            .collect()
    }

    async fn insert_payment(&self, new_payment: NewPipelinePayment) -> Result<PipelinePayment> {
        if new_payment.order_id.trim().is_empty() {
            return Err(Error::validation("orderId must not be empty"));
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PipelinePayment> {
                // The writer actor serializes all writes, so max+1 cannot race.
                let last_seq: Option<i32> = pipeline_payments::table
                    .filter(pipeline_payments::order_id.eq(&new_payment.order_id))
                    .select(max(pipeline_payments::seq_no))
                    .first(conn)
                    .map_err(StorageError::from)?;

                let row = NewPipelinePaymentDB {
                    order_id: new_payment.order_id,
                    seq_no: last_seq.unwrap_or(0) + 1,
                    amount: new_payment.amount.to_string(),
                    note: new_payment.note,
                    created_at: Utc::now().to_rfc3339(),
                };
                let stored = diesel::insert_into(pipeline_payments::table)
                    .values(&row)
                    .returning(PipelinePaymentDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PipelinePayment::try_from(stored)?)
            })
            .await
    }

    async fn delete_payment(&self, payment_id: i32) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(pipeline_payments::table.find(payment_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_database;
    use rust_decimal_macros::dec;

    fn payment(order_id: &str, amount: rust_decimal::Decimal) -> NewPipelinePayment {
        NewPipelinePayment {
            order_id: order_id.to_string(),
            amount,
            note: None,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sequence_numbers_are_per_order_and_gapless_on_append() {
        let (pool, writer) = test_database();
        let repo = PaymentRepository::new(pool, writer);

        let first = repo.insert_payment(payment("order-1", dec!(100))).await.unwrap();
        let second = repo.insert_payment(payment("order-1", dec!(50))).await.unwrap();
        let other = repo.insert_payment(payment("order-2", dec!(75))).await.unwrap();

        assert_eq!(first.seq_no, 1);
        assert_eq!(second.seq_no, 2);
        assert_eq!(other.seq_no, 1);

        let listed = repo.list_payments("order-1".to_string()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].seq_no, 1);
        assert_eq!(listed[1].amount, dec!(50));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_removes_a_single_payment() {
        let (pool, writer) = test_database();
        let repo = PaymentRepository::new(pool, writer);

        let first = repo.insert_payment(payment("order-1", dec!(10))).await.unwrap();
        repo.insert_payment(payment("order-1", dec!(20))).await.unwrap();

        assert_eq!(repo.delete_payment(first.id).await.unwrap(), 1);
        assert_eq!(repo.delete_payment(first.id).await.unwrap(), 0);
        assert_eq!(repo.list_payments("order-1".to_string()).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_order_id_is_rejected() {
        let (pool, writer) = test_database();
        let repo = PaymentRepository::new(pool, writer);

        let err = repo.insert_payment(payment("  ", dec!(10))).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
