//! Notificaciones al propietario
//!
//! Un único intento por alquiler. Un fallo aquí nunca deshace ni bloquea
//! la transición de estado: el llamador lo registra como advertencia.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::environment::MailConfig;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("mail API rejected message with status {0}")]
    Rejected(u16),

    #[error("mail transport error: {0}")]
    Transport(String),

    #[error("mail client configuration error: {0}")]
    Configuration(String),
}

/// Aviso de alquiler para el propietario del vehículo
#[derive(Debug, Clone, PartialEq)]
pub struct RentalNotice {
    pub owner_email: String,
    pub vehicle_model: String,
    pub renter_username: String,
}

impl RentalNotice {
    pub fn subject(&self) -> &'static str {
        "Vehicle Rented"
    }

    pub fn body(&self) -> String {
        format!(
            "Your vehicle {} has been rented by {}.",
            self.vehicle_model, self.renter_username
        )
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &RentalNotice) -> Result<(), NotificationError>;
}

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: String,
}

/// Envío por API HTTP de correo transaccional
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig, api_url: String) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn notify(&self, notice: &RentalNotice) -> Result<(), NotificationError> {
        let message = MailMessage {
            from: &self.from,
            to: &notice.owner_email,
            subject: notice.subject(),
            body: notice.body(),
        };

        let mut request = self.client.post(&self.api_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected(response.status().as_u16()));
        }

        log::info!("📧 Aviso de alquiler enviado a {}", notice.owner_email);
        Ok(())
    }
}

/// Sin API de correo configurada: el aviso solo queda en el log
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &RentalNotice) -> Result<(), NotificationError> {
        log::info!(
            "📧 [sin API de correo] para {}: {} - {}",
            notice.owner_email,
            notice.subject(),
            notice.body()
        );
        Ok(())
    }
}

/// Elegir el notificador según la configuración de correo
pub fn notifier_from_config(config: &MailConfig) -> Result<Box<dyn Notifier>, NotificationError> {
    match &config.api_url {
        Some(url) => Ok(Box::new(HttpMailer::new(config, url.clone())?)),
        None => {
            log::warn!("⚠️ MAIL_API_URL no configurada, los avisos irán al log");
            Ok(Box::new(LogNotifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        let notice = RentalNotice {
            owner_email: "owner@example.com".to_string(),
            vehicle_model: "Toyota Hilux".to_string(),
            renter_username: "ram".to_string(),
        };

        assert_eq!(notice.subject(), "Vehicle Rented");
        assert_eq!(notice.body(), "Your vehicle Toyota Hilux has been rented by ram.");
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notice = RentalNotice {
            owner_email: "owner@example.com".to_string(),
            vehicle_model: "Bajaj Pulsar".to_string(),
            renter_username: "sita".to_string(),
        };

        assert!(LogNotifier.notify(&notice).await.is_ok());
    }
}
