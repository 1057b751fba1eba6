//! Pipeline payment CRUD endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use adboard_core::payments::{NewPipelinePayment, PipelinePayment};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub note: Option<String>,
}

pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Vec<PipelinePayment>>> {
    let payments = state.payment_repository.list_payments(order_id).await?;
    Ok(Json(payments))
}

pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Json(body): Json<CreatePaymentRequest>,
) -> ApiResult<Json<PipelinePayment>> {
    let payment = state
        .payment_repository
        .insert_payment(NewPipelinePayment {
            order_id,
            amount: body.amount,
            note: body.note,
        })
        .await?;
    info!(
        "Payment {} recorded for order {} (seq {})",
        payment.id, payment.order_id, payment.seq_no
    );
    Ok(Json(payment))
}

pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<i32>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = state.payment_repository.delete_payment(payment_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "Payment {} not found",
            payment_id
        )));
    }
    info!("Payment {} deleted", payment_id);
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
