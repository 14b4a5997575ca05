use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::controllers::auth_controller::jadwal_guru;
use crate::errors::ApiError;
use crate::models::jadwal::JadwalNgajarPayload;
use crate::utils::wajib_id;

#[post("/jadwal-ngajar")]
pub async fn create_jadwal_ngajar(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<JadwalNgajarPayload>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;

    let (guru_id, kelas_id, waktu_id) = match (payload.guru_id, payload.kelas_id, payload.waktu_id) {
        (Some(g), Some(k), Some(w)) if g > 0 && k > 0 && w > 0 => (g, k, w),
        _ => return Err(ApiError::validation("Semua field wajib diisi!")),
    };

    let result = sqlx::query("INSERT INTO jadwal_ngajar (guru_id, kelas_id, waktu_id) VALUES (?, ?, ?)")
        .bind(guru_id)
        .bind(kelas_id)
        .bind(waktu_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Jadwal ngajar berhasil ditambahkan!",
        "jadwal_id": result.last_insert_id()
    })))
}

#[get("/jadwal-ngajar/guru/{guru_id}")]
pub async fn get_jadwal_by_guru(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let guru_id = wajib_id("guru_id", Some(path.into_inner()))?;

    let jadwal = jadwal_guru(pool.get_ref(), guru_id).await?;
    Ok(HttpResponse::Ok().json(jadwal))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_jadwal_ngajar).service(get_jadwal_by_guru);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::tests::{bearer, lazy_pool};
    use actix_web::{http::StatusCode, test as actix_test, App};

    #[actix_web::test]
    async fn schedule_requires_all_ids() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).configure(routes),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/jadwal-ngajar")
            .insert_header(bearer())
            .set_json(json!({"guru_id": 1, "kelas_id": 2}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
