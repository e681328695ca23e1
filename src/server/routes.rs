// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// HTTP route handlers

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::error::{ServerError, ServerResult};
use super::state::AppState;
use crate::pii_filter::config::{EntityKind, ReplacementAction, ENTITY_CATALOG_VERSION};
use crate::pii_filter::mapping::{EditMapping, PiiMapping};
use crate::pii_filter::masking::suggest_edits;

/// Upload response
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub pii_list: PiiMapping,
    pub file_path: String,
}

/// Mask request
#[derive(Debug, Serialize, Deserialize)]
pub struct MaskRequest {
    pub file_path: String,
    #[serde(default)]
    pub edited_pii_data: EditMapping,
}

/// Mask response
#[derive(Debug, Serialize, Deserialize)]
pub struct MaskResponse {
    pub masked_file_path: String,
}

/// Suggest request
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub pii_list: PiiMapping,
    #[serde(default)]
    pub action: Option<ReplacementAction>,
}

/// Suggest response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub edited_pii_data: EditMapping,
}

/// Service info (GET /)
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "PII Masker",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/upload",
            "/mask",
            "/suggest",
            "/download/{reference}",
            "/health"
        ]
    }))
}

/// Liveness plus the entity catalog this instance detects
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "entity_catalog_version": ENTITY_CATALOG_VERSION,
        "entities": state.pipeline.detector().kinds(),
    }))
}

/// Parse the comma separated `entities` form field
fn parse_entities(raw: &str) -> ServerResult<Vec<EntityKind>> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| label.parse::<EntityKind>().map_err(ServerError::BadRequest))
        .collect()
}

/// Submit a document (POST /upload, multipart field `file`)
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|_| ServerError::BadRequest("No file part".to_string()))?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut kinds: Option<Vec<EntityKind>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    return Err(ServerError::BadRequest("No selected file".to_string()));
                }
                let bytes = field.bytes().await?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("entities") => {
                let parsed = parse_entities(&field.text().await?)?;
                if !parsed.is_empty() {
                    kinds = Some(parsed);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ServerError::BadRequest("No file part".to_string()))?;

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        pipeline.run_detect_with(&file_name, &bytes, kinds.as_deref())
    })
    .await??;

    Ok(Json(UploadResponse {
        pii_list: outcome.pii_list,
        file_path: outcome.reference.to_string(),
    }))
}

/// Apply an edit mapping (POST /mask)
pub async fn mask(
    State(state): State<Arc<AppState>>,
    request: Result<Json<MaskRequest>, JsonRejection>,
) -> ServerResult<Json<MaskResponse>> {
    let Json(request) = request.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        pipeline.run_mask(&request.file_path, &request.edited_pii_data)
    })
    .await??;

    Ok(Json(MaskResponse {
        masked_file_path: outcome.reference.to_string(),
    }))
}

/// Propose replacements for a PII list (POST /suggest)
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    request: Result<Json<SuggestRequest>, JsonRejection>,
) -> ServerResult<Json<SuggestResponse>> {
    let Json(request) = request.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let masking = &state.config.masking;
    let action = request.action.unwrap_or(masking.default_action);

    Ok(Json(SuggestResponse {
        edited_pii_data: suggest_edits(&request.pii_list, action, masking),
    }))
}

/// Retrieve an artifact as an attachment (GET /download/{reference})
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(reference): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let pipeline = state.pipeline.clone();
    let lookup = reference.clone();
    let bytes = tokio::task::spawn_blocking(move || pipeline.retrieve(&lookup)).await??;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&reference).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{reference}\""),
        ),
    ];
    Ok((headers, bytes))
}

fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "txt" => "text/plain; charset=utf-8",
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
