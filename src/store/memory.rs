//! In-memory bulletin store for tests and local runs

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{BoletinStore, StoreResult};
use crate::error::StoreError;
use crate::models::boletin::ESTADO_REGISTRADO;
use crate::models::{Boletin, BoletinChanges, NewBoletin};

pub struct MemoryStore {
    rows: Mutex<Vec<Boletin>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert a fully formed row, keeping its id and registration time.
    /// Lets tests stage history (e.g. a bulletin registered days ago).
    pub fn seed(&self, boletin: Boletin) {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        self.next_id
            .fetch_max(boletin.id + 1, Ordering::SeqCst);
        rows.push(boletin);
    }
}

#[async_trait]
impl BoletinStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Boletin>> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let mut all = rows.clone();
        all.sort_by(|a, b| b.fecha_registro.cmp(&a.fecha_registro));
        Ok(all)
    }

    async fn get(&self, id: i64) -> StoreResult<Boletin> {
        let rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        rows.iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::RowNotFound(id))
    }

    async fn insert(&self, nuevo: NewBoletin) -> StoreResult<Boletin> {
        let boletin = Boletin {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            titulo: nuevo.titulo,
            temas: nuevo.temas,
            plazo: nuevo.plazo,
            comentarios: nuevo.comentarios,
            estado: ESTADO_REGISTRADO.to_string(),
            fecha_registro: Utc::now(),
            resultados_api: None,
        };

        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        rows.push(boletin.clone());
        Ok(boletin)
    }

    async fn update(&self, id: i64, changes: BoletinChanges) -> StoreResult<Boletin> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let boletin = rows
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::RowNotFound(id))?;

        changes.apply_to(boletin);
        Ok(boletin.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let before = rows.len();
        rows.retain(|b| b.id != id);

        if rows.len() == before {
            return Err(StoreError::RowNotFound(id));
        }
        Ok(())
    }
}
