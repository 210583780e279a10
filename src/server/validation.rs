//! Request validation for the bulletin resource
//!
//! Rejections happen before any store call and carry the offending field.

use serde::Deserialize;

use crate::models::{NewBoletin, Plazo};

/// Create-request body: every field is declared optional so a missing one
/// produces a field-level message instead of a bare deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateBoletinRequest {
    pub titulo: Option<String>,
    pub temas: Option<Vec<String>>,
    pub plazo: Option<Plazo>,
    pub comentarios: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingField { field: &'static str },
    EmptyTemas,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "El campo '{}' es obligatorio", field)
            }
            ValidationError::EmptyTemas => {
                write!(f, "El campo 'temas' debe incluir al menos un tema")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check every required field and assemble the insert payload.
pub fn validate_create(req: CreateBoletinRequest) -> Result<NewBoletin, ValidationError> {
    let titulo = req
        .titulo
        .filter(|t| !t.trim().is_empty())
        .ok_or(ValidationError::MissingField { field: "titulo" })?;

    let temas = req
        .temas
        .ok_or(ValidationError::MissingField { field: "temas" })?;
    if temas.is_empty() {
        return Err(ValidationError::EmptyTemas);
    }

    let plazo = req
        .plazo
        .ok_or(ValidationError::MissingField { field: "plazo" })?;

    let comentarios = req
        .comentarios
        .ok_or(ValidationError::MissingField { field: "comentarios" })?;

    Ok(NewBoletin {
        titulo,
        temas,
        plazo,
        comentarios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateBoletinRequest {
        CreateBoletinRequest {
            titulo: Some("Riego".to_string()),
            temas: Some(vec!["Sequía".to_string()]),
            plazo: Some(Plazo::TresMeses),
            comentarios: Some("test".to_string()),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let nuevo = validate_create(full_request()).unwrap();
        assert_eq!(nuevo.titulo, "Riego");
        assert_eq!(nuevo.plazo, Plazo::TresMeses);
    }

    #[test]
    fn test_missing_titulo_named_in_error() {
        let mut req = full_request();
        req.titulo = None;

        let err = validate_create(req).unwrap_err();
        assert!(err.to_string().contains("titulo"));
    }

    #[test]
    fn test_blank_titulo_rejected() {
        let mut req = full_request();
        req.titulo = Some("   ".to_string());

        assert_eq!(
            validate_create(req).unwrap_err(),
            ValidationError::MissingField { field: "titulo" }
        );
    }

    #[test]
    fn test_empty_temas_rejected() {
        let mut req = full_request();
        req.temas = Some(Vec::new());

        assert_eq!(validate_create(req).unwrap_err(), ValidationError::EmptyTemas);
    }

    #[test]
    fn test_missing_comentarios_rejected() {
        let mut req = full_request();
        req.comentarios = None;

        let err = validate_create(req).unwrap_err();
        assert!(err.to_string().contains("comentarios"));
    }
}
