use std::sync::Arc;

use crate::dto::transaction_dto::TransactionResponse;
use crate::repositories::RentalStore;
use crate::utils::errors::AppResult;

pub struct TransactionController {
    store: Arc<dyn RentalStore>,
}

impl TransactionController {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<TransactionResponse>> {
        let transactions = self.store.list_transactions_for_user(user_id).await?;
        Ok(transactions.into_iter().map(TransactionResponse::from).collect())
    }

    pub async fn list_all(&self) -> AppResult<Vec<TransactionResponse>> {
        let transactions = self.store.list_all_transactions().await?;
        Ok(transactions.into_iter().map(TransactionResponse::from).collect())
    }
}
