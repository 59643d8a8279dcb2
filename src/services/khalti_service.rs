//! Cliente de la pasarela de pago Khalti (ePayment v2)
//!
//! Dos llamadas puntuales, sin reintentos:
//! - `initiate`: abre una sesión y devuelve la `payment_url` para redirigir al cliente
//! - `lookup`: consulta el estado de una sesión por su `pidx`

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::config::environment::KhaltiConfig;
use crate::models::payment::{InitiatedPayment, PaymentLookup, PaymentRequest, PaymentStatus};
use crate::utils::errors::AppError;

/// Errores de la pasarela
#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    /// La pasarela no devolvió una `payment_url`; `body` es la respuesta tal cual
    #[error("Khalti initiate rejected with status {status}")]
    Initiation { status: u16, body: Value },

    #[error("Khalti lookup failed: {0}")]
    Lookup(String),

    #[error("Khalti request timed out")]
    Timeout,

    #[error("Khalti transport error: {0}")]
    Transport(String),

    #[error("Khalti client configuration error: {0}")]
    Configuration(String),
}

impl PaymentGatewayError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            PaymentGatewayError::Timeout
        } else {
            PaymentGatewayError::Transport(error.to_string())
        }
    }

    /// Convertir a error de aplicación según la operación que falló
    pub fn into_initiation_error(self) -> AppError {
        match self {
            PaymentGatewayError::Initiation { status, body } => AppError::PaymentInitiation {
                message: format!("Khalti responded with status {}", status),
                details: body,
            },
            other => AppError::PaymentInitiation {
                message: other.to_string(),
                details: Value::Null,
            },
        }
    }

    pub fn into_lookup_error(self) -> AppError {
        AppError::PaymentVerification(self.to_string())
    }
}

/// Puerto de la pasarela de pago
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: PaymentRequest) -> Result<InitiatedPayment, PaymentGatewayError>;

    async fn lookup(&self, pidx: &str) -> Result<PaymentLookup, PaymentGatewayError>;
}

#[derive(Debug, Serialize)]
struct CustomerInfo<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct ProductDetail<'a> {
    identity: String,
    name: &'a str,
    unit_price: i64,
    total_price: i64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct InitiateBody<'a> {
    return_url: &'a str,
    website_url: &'a str,
    amount: i64,
    purchase_order_id: String,
    purchase_order_name: &'a str,
    transaction_id: &'a str,
    customer_info: CustomerInfo<'a>,
    product_details: Vec<ProductDetail<'a>>,
    merchant_username: &'a str,
}

#[derive(Debug, Serialize)]
struct LookupBody<'a> {
    pidx: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    pidx: Option<String>,
    status: String,
    total_amount: Option<i64>,
}

/// Cliente HTTP para Khalti
pub struct KhaltiGateway {
    client: Client,
    config: KhaltiConfig,
}

impl KhaltiGateway {
    pub fn new(config: KhaltiConfig) -> Result<Self, PaymentGatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentGatewayError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.config.secret_key)
    }
}

#[async_trait]
impl PaymentGateway for KhaltiGateway {
    async fn initiate(&self, request: PaymentRequest) -> Result<InitiatedPayment, PaymentGatewayError> {
        let transaction_id = Uuid::new_v4().to_string();
        let purchase_order_id = request.vehicle_id.to_string();

        let body = InitiateBody {
            return_url: &self.config.return_url,
            website_url: &self.config.website_url,
            amount: request.amount,
            purchase_order_id: purchase_order_id.clone(),
            purchase_order_name: &request.vehicle_name,
            transaction_id: &transaction_id,
            customer_info: CustomerInfo {
                name: &request.renter.name,
                email: &request.renter.email,
                phone: &request.renter.phone,
            },
            product_details: vec![ProductDetail {
                identity: purchase_order_id.clone(),
                name: &request.vehicle_name,
                unit_price: request.amount,
                total_price: request.amount,
                quantity: 1,
            }],
            merchant_username: &request.merchant_username,
        };

        log::info!(
            "💳 Iniciando pago Khalti para vehículo {} (transaction_id {})",
            request.vehicle_id,
            transaction_id
        );

        let response = self
            .client
            .post(self.endpoint("epayment/initiate/"))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(PaymentGatewayError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(PaymentGatewayError::from_reqwest)?;
        let payload: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        log::debug!("📡 Khalti initiate status {}: {}", status, payload);

        let payment_url = payload
            .get("payment_url")
            .and_then(Value::as_str)
            .map(str::to_string);

        match payment_url {
            Some(payment_url) if status == StatusCode::OK => {
                log::info!("✅ Sesión Khalti creada para vehículo {}", request.vehicle_id);
                Ok(InitiatedPayment {
                    payment_url,
                    pidx: payload.get("pidx").and_then(Value::as_str).map(str::to_string),
                    transaction_id,
                    purchase_order_id,
                })
            }
            _ => {
                log::warn!("❌ Khalti rechazó el inicio de pago ({}): {}", status, payload);
                Err(PaymentGatewayError::Initiation {
                    status: status.as_u16(),
                    body: payload,
                })
            }
        }
    }

    async fn lookup(&self, pidx: &str) -> Result<PaymentLookup, PaymentGatewayError> {
        log::info!("🔍 Consultando estado de pago Khalti pidx={}", pidx);

        let response = self
            .client
            .post(self.endpoint("epayment/lookup/"))
            .header("Authorization", self.auth_header())
            .json(&LookupBody { pidx })
            .send()
            .await
            .map_err(PaymentGatewayError::from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(PaymentGatewayError::from_reqwest)?;

        log::debug!("📡 Khalti lookup status {}: {}", status, text);

        let parsed: LookupResponse = serde_json::from_str(&text).map_err(|e| {
            PaymentGatewayError::Lookup(format!("malformed lookup response ({}): {}", status, e))
        })?;

        let payment_status = PaymentStatus::from_gateway(&parsed.status);
        if payment_status == PaymentStatus::Completed && parsed.total_amount.is_none() {
            return Err(PaymentGatewayError::Lookup(
                "completed payment without total_amount".to_string(),
            ));
        }

        Ok(PaymentLookup {
            pidx: parsed.pidx.unwrap_or_else(|| pidx.to_string()),
            status: payment_status,
            gateway_status: parsed.status,
            total_amount: parsed.total_amount,
        })
    }
}
