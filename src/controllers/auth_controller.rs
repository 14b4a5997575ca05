use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{post, web, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth::{self, Identity, ACCESS_COOKIE};
use crate::errors::ApiError;
use crate::models::jadwal::JadwalNgajar;
use crate::models::user::{
    LoginPayload, RegisterBulkPayload, RegisterPayload, ResetPasswordPayload, User,
};
use crate::utils::{wajib_array, wajib_teks};

pub async fn jadwal_guru(pool: &MySqlPool, guru_id: i64) -> Result<Vec<JadwalNgajar>, ApiError> {
    let jadwal = sqlx::query_as::<_, JadwalNgajar>(
        r#"
        SELECT
            CAST(j.id AS SIGNED) AS jadwal_id,
            CAST(j.kelas_id AS SIGNED) AS kelas_id,
            CAST(j.guru_id AS SIGNED) AS guru_id,
            CAST(j.waktu_id AS SIGNED) AS waktu_id,
            g.nama AS guru_nama,
            k.nama AS kelas_nama,
            w.nama AS waktu_nama
        FROM jadwal_ngajar j
        JOIN guru g ON j.guru_id = g.id
        JOIN kelas k ON j.kelas_id = k.id
        JOIN waktu w ON j.waktu_id = w.id
        WHERE j.guru_id = ?
        ORDER BY j.id
        "#,
    )
    .bind(guru_id)
    .fetch_all(pool)
    .await?;

    Ok(jadwal)
}

/// Hash yang tidak bisa dibaca bcrypt (mis. sisa password plaintext lama) dianggap tidak cocok.
fn password_cocok(password: &str, hashed: &str) -> bool {
    verify(password, hashed).unwrap_or_else(|e| {
        log::warn!("Hash password tidak valid di database: {:?}", e);
        false
    })
}

async fn cari_user(pool: &MySqlPool, username: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT CAST(id AS SIGNED) AS id, username, password FROM users WHERE username = ? LIMIT 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

#[post("/login")]
pub async fn login(
    pool: web::Data<MySqlPool>,
    payload: web::Json<LoginPayload>,
) -> Result<impl Responder, ApiError> {
    let username = payload.username.trim();
    let password = payload.password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::validation("Username dan password wajib diisi"));
    }

    let user = cari_user(pool.get_ref(), username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Username atau password salah".into()))?;

    if !password_cocok(password, &user.password) {
        return Err(ApiError::Unauthorized("Username atau password salah".into()));
    }

    let guru_id = sqlx::query_scalar::<_, i64>(
        "SELECT CAST(id AS SIGNED) FROM guru WHERE user_id = ? LIMIT 1",
    )
    .bind(user.id)
    .fetch_optional(pool.get_ref())
    .await?;

    let Some(guru_id) = guru_id else {
        return Err(ApiError::Forbidden("User ini bukan seorang guru".into()));
    };

    let jadwal_ngajar = jadwal_guru(pool.get_ref(), guru_id).await?;

    let token = auth::generate_jwt(&Identity {
        user_id: user.id,
        username: user.username.clone(),
        guru_id: Some(guru_id),
    })?;

    let access_cookie = Cookie::build(ACCESS_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(2))
        .finish();

    log::info!("Login berhasil: {} (guru {})", user.username, guru_id);

    Ok(HttpResponse::Ok().cookie(access_cookie).json(json!({
        "message": "Login berhasil",
        "token": token,
        "user": {
            "id": user.id,
            "username": user.username,
            "guru_id": guru_id
        },
        "jadwal_ngajar": jadwal_ngajar
    })))
}

fn validasi_register(user: &RegisterPayload) -> Result<(), ApiError> {
    if user.username.trim().is_empty() || user.password.trim().is_empty() {
        return Err(ApiError::validation("Username dan password wajib diisi"));
    }
    Ok(())
}

#[post("/register")]
pub async fn register(
    pool: web::Data<MySqlPool>,
    payload: web::Json<RegisterPayload>,
) -> Result<impl Responder, ApiError> {
    validasi_register(&payload)?;
    let username = payload.username.trim();

    if cari_user(pool.get_ref(), username).await?.is_some() {
        return Err(ApiError::validation("Username sudah digunakan"));
    }

    let hashed = hash(payload.password.trim(), DEFAULT_COST)?;

    let mut tx = pool.begin().await?;
    let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
        .bind(username)
        .bind(&hashed)
        .execute(&mut *tx)
        .await?;
    let user_id = result.last_insert_id();

    if let Some(nama_guru) = payload.guru_baru() {
        sqlx::query("INSERT INTO guru (nama, user_id) VALUES (?, ?)")
            .bind(nama_guru)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Pendaftaran berhasil",
        "user_id": user_id
    })))
}

#[post("/register/bulk")]
pub async fn register_bulk(
    pool: web::Data<MySqlPool>,
    payload: web::Json<RegisterBulkPayload>,
) -> Result<impl Responder, ApiError> {
    let users = wajib_array("users", payload.into_inner().users)?;
    for user in &users {
        validasi_register(user).map_err(|_| {
            ApiError::validation("Username dan password wajib diisi untuk setiap user")
        })?;
    }

    // Semua atau tidak sama sekali: user dan guru-nya masuk dalam satu transaksi
    let mut tx = pool.begin().await?;
    for user in &users {
        let hashed = hash(user.password.trim(), DEFAULT_COST)?;
        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(user.username.trim())
            .bind(&hashed)
            .execute(&mut *tx)
            .await?;

        if let Some(nama_guru) = user.guru_baru() {
            sqlx::query("INSERT INTO guru (nama, user_id) VALUES (?, ?)")
                .bind(nama_guru)
                .bind(result.last_insert_id())
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} user berhasil didaftarkan", users.len())
    })))
}

#[post("/reset-password")]
pub async fn reset_password(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ResetPasswordPayload>,
) -> Result<impl Responder, ApiError> {
    let (username, lama, baru) = match (
        wajib_teks("username", &payload.username),
        wajib_teks("password_lama", &payload.password_lama),
        wajib_teks("password_baru", &payload.password_baru),
    ) {
        (Ok(u), Ok(l), Ok(b)) => (u, l, b),
        _ => {
            return Err(ApiError::validation(
                "Username, password lama, dan password baru wajib diisi",
            ))
        }
    };

    let user = cari_user(pool.get_ref(), username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User tidak ditemukan".into()))?;

    if !password_cocok(lama, &user.password) {
        return Err(ApiError::Unauthorized("Password lama salah".into()));
    }

    let hashed = hash(baru, DEFAULT_COST)?;
    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&hashed)
        .bind(user.id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password berhasil direset" })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(register)
        .service(register_bulk)
        .service(reset_password);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::tests::lazy_pool;
    use actix_web::{http::StatusCode, test as actix_test, App};

    #[actix_web::test]
    async fn login_requires_username_and_password() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).service(login),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "ali", "password": "  "}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn bulk_register_rejects_empty_and_incomplete_entries() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).service(register_bulk),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/register/bulk")
            .set_json(json!({"users": []}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = actix_test::TestRequest::post()
            .uri("/register/bulk")
            .set_json(json!({"users": [{"username": "a", "password": "b"}, {"username": "c"}]}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reset_password_requires_all_fields() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).service(reset_password),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/reset-password")
            .set_json(json!({"username": "ali", "password_lama": "x"}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn guru_row_only_when_flagged_and_named() {
        let mut payload = RegisterPayload {
            username: "ali".into(),
            password: "rahasia".into(),
            is_guru: true,
            nama_guru: Some(" Ustadz Ali ".into()),
        };
        assert_eq!(payload.guru_baru(), Some("Ustadz Ali"));
        payload.nama_guru = Some("   ".into());
        assert_eq!(payload.guru_baru(), None);
        payload.nama_guru = Some("Ustadz Ali".into());
        payload.is_guru = false;
        assert_eq!(payload.guru_baru(), None);
    }

    #[test]
    fn stored_password_is_a_bcrypt_hash() {
        let hashed = hash("rahasia", 4).unwrap();
        assert_ne!(hashed, "rahasia");
        assert!(verify("rahasia", &hashed).unwrap());
        assert!(!verify("salah", &hashed).unwrap());
    }

    #[test]
    fn legacy_plaintext_never_matches() {
        assert!(!password_cocok("rahasia", "rahasia"));
    }
}
