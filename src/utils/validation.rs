//! Utilidades de validación
//!
//! Expresiones regulares y validadores personalizados usados por los DTOs.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Teléfono con 7 a 15 dígitos, con `+` opcional al inicio
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("9800000001"));
        assert!(PHONE_REGEX.is_match("+9779800000001"));
        assert!(!PHONE_REGEX.is_match("98-000"));
        assert!(!PHONE_REGEX.is_match(""));
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Hilux").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
