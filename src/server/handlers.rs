//! Handlers for the bulletin resource
//!
//! Every response is the `{status, data, message, error}` envelope; store
//! failures map to 404 when the row is missing and 500 otherwise.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::error::StoreError;
use crate::models::{
    ApiResponse, Boletin, BoletinChanges, BoletinEstadoRow, BoletinResumen,
};
use crate::server::state::AppState;
use crate::server::validation::{validate_create, CreateBoletinRequest};

fn not_found_message(id: i64) -> String {
    format!("No se encontró un boletín con el ID {}", id)
}

/// GET /api/boletines
pub async fn list_boletines(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<BoletinResumen>>>) {
    match state.store.list().await {
        Ok(boletines) => {
            let rows: Vec<BoletinResumen> =
                boletines.iter().map(BoletinResumen::from_boletin).collect();
            (StatusCode::OK, Json(ApiResponse::success(rows)))
        }
        Err(e) => {
            log::error!("list boletines failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error_with_detail(
                    "Error al obtener los boletines",
                    e.to_string(),
                )),
            )
        }
    }
}

/// GET /api/boletines/estado
pub async fn estado_boletines(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<BoletinEstadoRow>>>) {
    match state.store.list().await {
        Ok(boletines) => {
            let now = Utc::now();
            let rows: Vec<BoletinEstadoRow> = boletines
                .iter()
                .map(|b| BoletinEstadoRow::from_boletin(b, now))
                .collect();
            (StatusCode::OK, Json(ApiResponse::success(rows)))
        }
        Err(e) => {
            log::error!("estado boletines failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error_with_detail(
                    "Error al obtener el estado de los boletines",
                    e.to_string(),
                )),
            )
        }
    }
}

/// GET /api/boletines/{id}
pub async fn get_boletin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Boletin>>) {
    match state.store.get(id).await {
        Ok(boletin) => (StatusCode::OK, Json(ApiResponse::success(boletin))),
        Err(StoreError::RowNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(not_found_message(id))),
        ),
        Err(e) => {
            log::error!("get boletin {} failed: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error_with_detail(
                    "Error al obtener el boletín",
                    e.to_string(),
                )),
            )
        }
    }
}

/// POST /api/boletines
pub async fn create_boletin(
    State(state): State<AppState>,
    Json(req): Json<CreateBoletinRequest>,
) -> (StatusCode, Json<ApiResponse<Boletin>>) {
    let nuevo = match validate_create(req) {
        Ok(nuevo) => nuevo,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(e.to_string())),
            );
        }
    };

    log::info!("creating boletin {:?}", nuevo.titulo);
    match state.store.insert(nuevo).await {
        Ok(boletin) => (
            StatusCode::CREATED,
            Json(ApiResponse::success_with_message(
                boletin,
                "Boletín creado correctamente",
            )),
        ),
        Err(e) => {
            log::error!("create boletin failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error_with_detail(
                    "Error al crear el boletín",
                    e.to_string(),
                )),
            )
        }
    }
}

/// PUT /api/boletines/{id}
pub async fn update_boletin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<BoletinChanges>,
) -> (StatusCode, Json<ApiResponse<Boletin>>) {
    log::info!("updating boletin {}", id);
    match state.store.update(id, changes).await {
        Ok(boletin) => (
            StatusCode::OK,
            Json(ApiResponse::success_with_message(
                boletin,
                "Boletín actualizado correctamente",
            )),
        ),
        Err(StoreError::RowNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(not_found_message(id))),
        ),
        Err(e) => {
            log::error!("update boletin {} failed: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error_with_detail(
                    "Error al actualizar el boletín",
                    e.to_string(),
                )),
            )
        }
    }
}

/// DELETE /api/boletines/{id}
pub async fn delete_boletin(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    log::info!("deleting boletin {}", id);
    match state.store.delete(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message_only("Boletín eliminado correctamente")),
        ),
        Err(StoreError::RowNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(not_found_message(id))),
        ),
        Err(e) => {
            log::error!("delete boletin {} failed: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error_with_detail(
                    "Error al eliminar el boletín",
                    e.to_string(),
                )),
            )
        }
    }
}
