use actix_multipart::Multipart;
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use futures::TryStreamExt;
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::errors::ApiError;
use crate::utils::{self, MAX_UPLOAD_BYTES};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub user_id: Option<String>,
}

/// Baca field `file` (hanya image/*) ke memori, maksimal `MAX_UPLOAD_BYTES`.
async fn baca_file_gambar(mut payload: Multipart) -> Result<Option<Vec<u8>>, ApiError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::validation(format!("Multipart error: {}", e)))?
    {
        if field.name().unwrap_or_default() != "file" {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(ApiError::validation("File harus berupa gambar"));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ApiError::validation(format!("Gagal membaca file: {}", e)))?
        {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::validation("Ukuran file maksimal 2MB"));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(Some(bytes));
    }

    Ok(None)
}

#[post("/api/upload")]
pub async fn upload_foto(
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    payload: Multipart,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;

    let bytes = baca_file_gambar(payload)
        .await?
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::validation("No file uploaded"))?;

    // user_id jadi nama file, jadi hanya angka yang diterima
    let owner_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("user_id is required"))?
        .parse::<i64>()
        .map_err(|_| ApiError::validation("user_id harus berupa angka"))?;

    let url = utils::simpan_foto(&bytes, owner_id, &utils::upload_dir()).await?;
    Ok(HttpResponse::Ok().json(json!({ "url": url })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_foto);
}
