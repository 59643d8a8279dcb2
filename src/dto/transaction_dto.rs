use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::rent_transaction::RentTransaction;

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub vehicle_id: i64,
    pub transaction_id: String,
    pub amount: i64,
    pub user_id: i64,
    pub date_rented: DateTime<Utc>,
}

impl From<RentTransaction> for TransactionResponse {
    fn from(tx: RentTransaction) -> Self {
        Self {
            id: tx.id,
            vehicle_id: tx.vehicle_id,
            transaction_id: tx.transaction_id,
            amount: tx.amount,
            user_id: tx.user_id,
            date_rented: tx.date_rented,
        }
    }
}
