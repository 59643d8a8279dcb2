//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errores al leer la configuración
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Configuración de la pasarela Khalti
#[derive(Debug, Clone)]
pub struct KhaltiConfig {
    pub base_url: String,
    pub secret_key: String,
    pub return_url: String,
    pub website_url: String,
    pub timeout: Duration,
}

/// Configuración del envío de correos
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub renter_dashboard_url: String,
    pub khalti: KhaltiConfig,
    pub mail: MailConfig,
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let khalti_timeout: u64 = parse_var("KHALTI_TIMEOUT_SECS", "15")?;
        let mail_timeout: u64 = parse_var("MAIL_TIMEOUT_SECS", "10")?;

        Ok(Self {
            environment: var_or("ENVIRONMENT", "development"),
            port: parse_var("PORT", "3000")?,
            host: var_or("HOST", "0.0.0.0"),
            jwt_secret: required("JWT_SECRET")?,
            cors_origins: var_or("CORS_ORIGINS", "")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            renter_dashboard_url: var_or("RENTER_DASHBOARD_URL", "/api/rentals/mine"),
            khalti: KhaltiConfig {
                base_url: var_or("KHALTI_BASE_URL", "https://a.khalti.com/api/v2"),
                secret_key: required("KHALTI_SECRET_KEY")?,
                return_url: required("KHALTI_RETURN_URL")?,
                website_url: required("KHALTI_WEBSITE_URL")?,
                timeout: Duration::from_secs(khalti_timeout),
            },
            mail: MailConfig {
                api_url: env::var("MAIL_API_URL").ok().filter(|s| !s.is_empty()),
                api_key: env::var("MAIL_API_KEY").ok().filter(|s| !s.is_empty()),
                from: var_or("MAIL_FROM", "no-reply@vehicle-rental.local"),
                timeout: Duration::from_secs(mail_timeout),
            },
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("VEHICLE_RENTAL_TEST_PORT", "not-a-port");
        let result: Result<u16, _> = parse_var("VEHICLE_RENTAL_TEST_PORT", "3000");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        env::remove_var("VEHICLE_RENTAL_TEST_PORT");
    }

    #[test]
    fn test_parse_var_uses_default() {
        let result: u64 = parse_var("VEHICLE_RENTAL_TEST_UNSET_TIMEOUT", "15").unwrap();
        assert_eq!(result, 15);
    }

    #[test]
    fn test_required_rejects_blank() {
        env::set_var("VEHICLE_RENTAL_TEST_BLANK", "  ");
        assert!(matches!(
            required("VEHICLE_RENTAL_TEST_BLANK"),
            Err(ConfigError::Missing("VEHICLE_RENTAL_TEST_BLANK"))
        ));
        env::remove_var("VEHICLE_RENTAL_TEST_BLANK");
    }
}
