//! Managed-datastore client (PostgREST-style interface)
//!
//! All persistence is delegated to the hosted database's REST interface;
//! this module only shapes requests and maps its error signals. The
//! datastore reports "no row matched" with error code `PGRST116`, which
//! becomes [`StoreError::RowNotFound`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use super::{BoletinStore, StoreResult};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::boletin::ESTADO_REGISTRADO;
use crate::models::{Boletin, BoletinChanges, NewBoletin};

/// Error code the datastore uses for an empty single-row result
const NO_ROW_CODE: &str = "PGRST116";

/// Error body shape returned by the datastore
#[derive(Debug, Deserialize)]
struct DatastoreError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

pub struct RestStore {
    http: HttpClient,
    base_url: String,
    service_key: String,
    table: String,
}

impl RestStore {
    pub fn new(config: &DatabaseConfig) -> StoreResult<Self> {
        let service_key = config
            .service_key
            .clone()
            .ok_or_else(|| StoreError::Backend("datastore service key not configured".into()))?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key,
            table: config.table.clone(),
        })
    }

    fn request(&self, method: Method, query: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}{}", self.base_url, self.table, query);
        self.http
            .request(method, url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    /// Map a non-success datastore response to a store error, translating
    /// the no-row code for `id` when one is given.
    async fn map_error(response: reqwest::Response, id: Option<i64>) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<DatastoreError>(&body) {
            if err.code == NO_ROW_CODE {
                if let Some(id) = id {
                    return StoreError::RowNotFound(id);
                }
            }
            if !err.message.is_empty() {
                return StoreError::Backend(err.message);
            }
        }
        StoreError::Backend(format!("datastore returned {}: {}", status, body))
    }
}

#[async_trait]
impl BoletinStore for RestStore {
    async fn list(&self) -> StoreResult<Vec<Boletin>> {
        let response = self
            .request(Method::GET, "?select=*&order=fecha_registro.desc")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response, None).await);
        }
        response
            .json::<Vec<Boletin>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn get(&self, id: i64) -> StoreResult<Boletin> {
        let response = self
            .request(Method::GET, &format!("?select=*&id=eq.{}", id))
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response, Some(id)).await);
        }
        response
            .json::<Boletin>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn insert(&self, nuevo: NewBoletin) -> StoreResult<Boletin> {
        let row = json!({
            "titulo": nuevo.titulo,
            "temas": nuevo.temas,
            "plazo": nuevo.plazo,
            "comentarios": nuevo.comentarios,
            "estado": ESTADO_REGISTRADO,
        });

        let response = self
            .request(Method::POST, "")
            .header("Accept", "application/vnd.pgrst.object+json")
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response, None).await);
        }
        response
            .json::<Boletin>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn update(&self, id: i64, changes: BoletinChanges) -> StoreResult<Boletin> {
        let response = self
            .request(Method::PATCH, &format!("?id=eq.{}", id))
            .header("Accept", "application/vnd.pgrst.object+json")
            .header("Prefer", "return=representation")
            .json(&changes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response, Some(id)).await);
        }
        response
            .json::<Boletin>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        // return=representation lets one round trip double as the
        // existence check: an empty result set means nothing matched
        let response = self
            .request(Method::DELETE, &format!("?id=eq.{}", id))
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response, Some(id)).await);
        }

        let deleted = response
            .json::<Vec<Boletin>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if deleted.is_empty() {
            return Err(StoreError::RowNotFound(id));
        }
        Ok(())
    }
}
