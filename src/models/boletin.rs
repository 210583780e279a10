//! Bulletin domain records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracking horizon for a bulletin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plazo {
    #[serde(rename = "3_meses")]
    TresMeses,
    #[serde(rename = "6_meses")]
    SeisMeses,
    #[serde(rename = "1_año")]
    UnAno,
    #[serde(rename = "3_años")]
    TresAnos,
    #[serde(rename = "5_años")]
    CincoAnos,
}

impl Plazo {
    /// Horizon length in months
    pub fn months(&self) -> u32 {
        match self {
            Plazo::TresMeses => 3,
            Plazo::SeisMeses => 6,
            Plazo::UnAno => 12,
            Plazo::TresAnos => 36,
            Plazo::CincoAnos => 60,
        }
    }
}

/// Status assigned to every newly registered bulletin
pub const ESTADO_REGISTRADO: &str = "Registrado";

/// A registered bulletin as persisted in the datastore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boletin {
    pub id: i64,

    pub titulo: String,

    /// Topics tracked by this bulletin (never empty)
    pub temas: Vec<String>,

    pub plazo: Plazo,

    pub comentarios: String,

    /// Opaque status label ("Registrado", "Completado", ...)
    pub estado: String,

    pub fecha_registro: DateTime<Utc>,

    /// Search results attached by a later update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultados_api: Option<serde_json::Value>,
}

impl Boletin {
    /// Whole days elapsed since registration, floored.
    pub fn dias_transcurridos(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fecha_registro).num_days()
    }
}

/// Payload for registering a bulletin. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBoletin {
    pub titulo: String,
    pub temas: Vec<String>,
    pub plazo: Plazo,
    pub comentarios: String,
}

/// Partial update: only populated fields are applied, absent fields are
/// left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoletinChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temas: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plazo: Option<Plazo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comentarios: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resultados_api: Option<serde_json::Value>,
}

impl BoletinChanges {
    pub fn is_empty(&self) -> bool {
        self.titulo.is_none()
            && self.temas.is_none()
            && self.plazo.is_none()
            && self.comentarios.is_none()
            && self.estado.is_none()
            && self.resultados_api.is_none()
    }

    /// Apply the populated fields onto an existing record.
    pub fn apply_to(&self, boletin: &mut Boletin) {
        if let Some(ref titulo) = self.titulo {
            boletin.titulo = titulo.clone();
        }
        if let Some(ref temas) = self.temas {
            boletin.temas = temas.clone();
        }
        if let Some(plazo) = self.plazo {
            boletin.plazo = plazo;
        }
        if let Some(ref comentarios) = self.comentarios {
            boletin.comentarios = comentarios.clone();
        }
        if let Some(ref estado) = self.estado {
            boletin.estado = estado.clone();
        }
        if let Some(ref resultados) = self.resultados_api {
            boletin.resultados_api = Some(resultados.clone());
        }
    }
}

/// Row shape returned by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoletinResumen {
    pub id: i64,
    pub titulo: String,
    pub temas: Vec<String>,
    /// Registration date formatted dd/mm/yyyy
    pub fecha: String,
    pub estado: String,
}

impl BoletinResumen {
    pub fn from_boletin(boletin: &Boletin) -> Self {
        Self {
            id: boletin.id,
            titulo: boletin.titulo.clone(),
            temas: boletin.temas.clone(),
            fecha: boletin.fecha_registro.format("%d/%m/%Y").to_string(),
            estado: boletin.estado.clone(),
        }
    }
}

/// Row shape returned by the estado endpoint, with the derived day count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoletinEstadoRow {
    pub id: i64,
    pub titulo: String,
    pub temas: Vec<String>,
    pub fecha_registro: String,
    pub dias_transcurridos: i64,
    pub estado: String,
}

impl BoletinEstadoRow {
    pub fn from_boletin(boletin: &Boletin, now: DateTime<Utc>) -> Self {
        Self {
            id: boletin.id,
            titulo: boletin.titulo.clone(),
            temas: boletin.temas.clone(),
            fecha_registro: boletin.fecha_registro.format("%d/%m/%Y").to_string(),
            dias_transcurridos: boletin.dias_transcurridos(now),
            estado: boletin.estado.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Boletin {
        Boletin {
            id: 1,
            titulo: "Riego tecnificado".to_string(),
            temas: vec!["Sequía".to_string()],
            plazo: Plazo::TresMeses,
            comentarios: "seguimiento".to_string(),
            estado: ESTADO_REGISTRADO.to_string(),
            fecha_registro: Utc::now(),
            resultados_api: None,
        }
    }

    #[test]
    fn test_plazo_serde_names() {
        assert_eq!(
            serde_json::to_string(&Plazo::TresMeses).unwrap(),
            "\"3_meses\""
        );
        assert_eq!(serde_json::to_string(&Plazo::UnAno).unwrap(), "\"1_año\"");

        let parsed: Plazo = serde_json::from_str("\"5_años\"").unwrap();
        assert_eq!(parsed, Plazo::CincoAnos);
    }

    #[test]
    fn test_plazo_months() {
        assert_eq!(Plazo::TresMeses.months(), 3);
        assert_eq!(Plazo::CincoAnos.months(), 60);
    }

    #[test]
    fn test_dias_transcurridos_floors() {
        let mut boletin = sample();
        let now = Utc::now();
        boletin.fecha_registro = now - Duration::days(10) - Duration::hours(5);

        // 10 days and 5 hours ago still counts as 10 whole days
        assert_eq!(boletin.dias_transcurridos(now), 10);
    }

    #[test]
    fn test_changes_apply_partial() {
        let mut boletin = sample();
        let changes = BoletinChanges {
            estado: Some("Completado".to_string()),
            ..Default::default()
        };

        changes.apply_to(&mut boletin);

        assert_eq!(boletin.estado, "Completado");
        assert_eq!(boletin.titulo, "Riego tecnificado");
        assert_eq!(boletin.temas, vec!["Sequía".to_string()]);
    }

    #[test]
    fn test_changes_skip_absent_fields_in_json() {
        let changes = BoletinChanges {
            estado: Some("Completado".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&changes).unwrap();

        assert_eq!(json, serde_json::json!({ "estado": "Completado" }));
    }

    #[test]
    fn test_resumen_formats_date() {
        let mut boletin = sample();
        boletin.fecha_registro = "2026-03-05T10:00:00Z".parse().unwrap();

        let row = BoletinResumen::from_boletin(&boletin);
        assert_eq!(row.fecha, "05/03/2026");
    }
}
