use async_trait::async_trait;

use super::{PgRentalStore, UserDirectory};
use crate::models::user::UserAccount;
use crate::utils::errors::{map_db_error, AppResult};

#[async_trait]
impl UserDirectory for PgRentalStore {
    async fn find_user(&self, id: i64) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserAccount>(
            "SELECT id, username, email, full_name, phone_number, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Error finding user", e))
    }
}
