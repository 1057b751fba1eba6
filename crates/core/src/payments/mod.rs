//! Pipeline payment models. Payments live in the same metadata store as the
//! sync tables but are plain CRUD, outside the sync core.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// A recorded payment against a pipeline order. `seq_no` is assigned
/// sequentially per order on insert and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePayment {
    pub id: i32,
    pub order_id: String,
    pub seq_no: i32,
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: String,
}

/// Payload for creating a payment; `seq_no` is computed by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPipelinePayment {
    pub order_id: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[async_trait]
pub trait PaymentRepositoryTrait: Send + Sync {
    async fn list_payments(&self, order_id: String) -> Result<Vec<PipelinePayment>>;
    async fn insert_payment(&self, new_payment: NewPipelinePayment) -> Result<PipelinePayment>;
    async fn delete_payment(&self, payment_id: i32) -> Result<usize>;
}
