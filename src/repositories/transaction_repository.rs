use async_trait::async_trait;

use super::{PgRentalStore, TransactionStore};
use crate::models::rent_transaction::RentTransaction;
use crate::utils::errors::{map_db_error, AppResult};

#[async_trait]
impl TransactionStore for PgRentalStore {
    async fn list_transactions_for_user(&self, user_id: i64) -> AppResult<Vec<RentTransaction>> {
        sqlx::query_as::<_, RentTransaction>(
            "SELECT * FROM rent_transactions WHERE user_id = $1 ORDER BY date_rented DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Error listing user transactions", e))
    }

    async fn list_all_transactions(&self) -> AppResult<Vec<RentTransaction>> {
        sqlx::query_as::<_, RentTransaction>(
            "SELECT * FROM rent_transactions ORDER BY date_rented DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Error listing transactions", e))
    }

    async fn find_transaction(&self, transaction_id: &str) -> AppResult<Option<RentTransaction>> {
        sqlx::query_as::<_, RentTransaction>("SELECT * FROM rent_transactions WHERE transaction_id = $1")
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Error finding transaction", e))
    }
}
