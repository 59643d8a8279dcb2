use serde::Deserialize;
use validator::Validate;

use crate::models::payment::{PaymentCallback, RenterIdentity};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_not_blank, PHONE_REGEX};

// Request para iniciar el pago de un alquiler
#[derive(Debug, Deserialize, Validate)]
pub struct InitiatePaymentRequest {
    pub vehicle_id: i64,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(regex = "PHONE_REGEX")]
    pub phone: String,
}

impl InitiatePaymentRequest {
    pub fn renter(&self) -> RenterIdentity {
        RenterIdentity {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.clone(),
        }
    }
}

/// Query de la redirección de vuelta desde Khalti
#[derive(Debug, Default, Deserialize)]
pub struct VerifyPaymentQuery {
    pub pidx: Option<String>,
    pub transaction_id: Option<String>,
    pub purchase_order_id: Option<String>,
}

impl VerifyPaymentQuery {
    /// Parámetros ausentes o mal formados cuentan como verificación fallida
    pub fn into_callback(self) -> AppResult<PaymentCallback> {
        let pidx = non_empty(self.pidx, "pidx")?;
        let transaction_id = non_empty(self.transaction_id, "transaction_id")?;
        let purchase_order_id = non_empty(self.purchase_order_id, "purchase_order_id")?;

        let vehicle_id = purchase_order_id.parse::<i64>().map_err(|_| {
            AppError::PaymentVerification(format!(
                "purchase_order_id '{}' is not a vehicle id",
                purchase_order_id
            ))
        })?;

        Ok(PaymentCallback {
            pidx,
            transaction_id,
            vehicle_id,
        })
    }
}

fn non_empty(value: Option<String>, name: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::PaymentVerification(format!("missing {} in callback", name)))
}
