// src/controllers/master_controller.rs
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::auth;
use crate::errors::ApiError;
use crate::models::master::{
    GuruBulkPayload, Kelas, KelasBulkPayload, Santri, SantriBulkPayload, Waktu, WaktuBulkPayload,
};
use crate::models::user::UserProfile;
use crate::utils::{wajib_array, wajib_id};

/// Trim semua nama dan tolak kalau ada yang kosong.
fn daftar_nama(tabel: &str, nama: Vec<String>) -> Result<Vec<String>, ApiError> {
    let nama: Vec<String> = nama.into_iter().map(|n| n.trim().to_string()).collect();
    if nama.iter().any(String::is_empty) {
        return Err(ApiError::validation(format!("Nama {} tidak boleh kosong", tabel)));
    }
    Ok(nama)
}

/// `tabel` hanya diisi konstanta dari handler, tidak pernah dari input user.
async fn insert_nama(pool: &MySqlPool, tabel: &str, nama: &[String]) -> Result<u64, ApiError> {
    let mut qb: QueryBuilder<MySql> = QueryBuilder::new(format!("INSERT INTO {} (nama) ", tabel));
    qb.push_values(nama.iter(), |mut b, n| {
        b.push_bind(n);
    });

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

#[get("/api/users")]
pub async fn get_users(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;

    let users = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT
            CAST(u.id AS SIGNED) AS id,
            u.username,
            CAST(g.id AS SIGNED) AS guru_id,
            g.nama AS nama_guru
        FROM users u
        LEFT JOIN guru g ON g.user_id = u.id
        ORDER BY u.id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(users))
}

#[post("/kelas")]
pub async fn create_kelas(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<KelasBulkPayload>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let nama = daftar_nama("kelas", wajib_array("kelas", payload.into_inner().kelas)?)?;

    let jumlah = insert_nama(pool.get_ref(), "kelas", &nama).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} kelas berhasil ditambahkan", jumlah)
    })))
}

#[post("/guru")]
pub async fn create_guru(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<GuruBulkPayload>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let nama = daftar_nama("guru", wajib_array("guru", payload.into_inner().guru)?)?;

    let jumlah = insert_nama(pool.get_ref(), "guru", &nama).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} guru berhasil ditambahkan", jumlah)
    })))
}

#[post("/waktu")]
pub async fn create_waktu(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<WaktuBulkPayload>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let nama = daftar_nama("waktu", wajib_array("waktu", payload.into_inner().waktu)?)?;

    let jumlah = insert_nama(pool.get_ref(), "waktu", &nama).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} waktu berhasil ditambahkan", jumlah)
    })))
}

#[post("/santri")]
pub async fn create_santri(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<SantriBulkPayload>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let santri = wajib_array("santri", payload.into_inner().santri)?;
    if santri.iter().any(|s| s.nama().is_empty()) {
        return Err(ApiError::validation("Nama santri tidak boleh kosong"));
    }

    let mut qb: QueryBuilder<MySql> =
        QueryBuilder::new("INSERT INTO santri (nama, kelas_id, status) ");
    qb.push_values(santri.iter(), |mut b, s| {
        b.push_bind(s.nama())
            .push_bind(s.kelas_id())
            .push_bind(s.status().unwrap_or("aktif"));
    });
    let result = qb.build().execute(pool.get_ref()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} santri berhasil ditambahkan", result.rows_affected())
    })))
}

#[get("/kelas")]
pub async fn get_kelas(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;

    let kelas = sqlx::query_as::<_, Kelas>(
        "SELECT CAST(id AS SIGNED) AS id, nama FROM kelas ORDER BY nama",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(kelas))
}

#[get("/waktu")]
pub async fn get_waktu(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;

    let waktu = sqlx::query_as::<_, Waktu>(
        "SELECT CAST(id AS SIGNED) AS id, nama FROM waktu ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(waktu))
}

#[get("/kelas/{kelas_id}/santri")]
pub async fn get_santri_by_kelas(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let kelas_id = wajib_id("kelas_id", Some(path.into_inner()))?;

    let santri = sqlx::query_as::<_, Santri>(
        r#"
        SELECT
            CAST(id AS SIGNED) AS id,
            nama,
            CAST(kelas_id AS SIGNED) AS kelas_id,
            status
        FROM santri
        WHERE kelas_id = ?
        ORDER BY nama
        "#,
    )
    .bind(kelas_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(santri))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_users)
        .service(create_kelas)
        .service(create_guru)
        .service(create_waktu)
        .service(create_santri)
        .service(get_kelas)
        .service(get_waktu)
        .service(get_santri_by_kelas);
}
