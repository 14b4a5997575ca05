// src/controllers/rekap_controller.rs
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use chrono::NaiveDate;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::errors::ApiError;
use crate::models::absensi::{
    BarisRekapBulanan, BarisRekapHijriah, BarisRekapWaktu, HariAktifWaktu, RekapBulananRequest,
    RekapPeriodeRequest,
};
use crate::rekap::bulanan::susun_rekap_bulanan;
use crate::rekap::hijriah::{kunci_bulan, segmen_bulan_hijriah, susun_rekap_hijriah, ModeTotal};
use crate::rekap::semua_waktu::susun_rekap_semua_waktu;
use crate::rekap::tanggal::parse_tanggal;
use crate::utils::wajib_id;

/// Rentang laporan terpanjang yang dilayani, inklusif.
pub const MAKS_RENTANG_HARI: i64 = 366;

/// Periode laporan yang sudah divalidasi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Periode {
    mulai: NaiveDate,
    selesai: NaiveDate,
    kelas_id: i64,
}

fn validasi_periode(
    start_date: Option<&str>,
    end_date: Option<&str>,
    kelas_id: Option<i64>,
) -> Result<Periode, ApiError> {
    let kosong = |s: Option<&str>| s.map_or(true, |v| v.trim().is_empty());
    if kosong(start_date) || kosong(end_date) || kelas_id.is_none() {
        return Err(ApiError::validation("startDate, endDate, kelas_id wajib diisi"));
    }

    let mulai = parse_tanggal("startDate", start_date)?;
    let selesai = parse_tanggal("endDate", end_date)?;
    let kelas_id = wajib_id("kelas_id", kelas_id)?;
    if (selesai - mulai).num_days() + 1 > MAKS_RENTANG_HARI {
        return Err(ApiError::validation(format!(
            "Rentang tanggal maksimal {} hari",
            MAKS_RENTANG_HARI
        )));
    }
    Ok(Periode { mulai, selesai, kelas_id })
}

#[post("/absensi/bulanan")]
pub async fn rekap_bulanan(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<RekapBulananRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let periode = validasi_periode(
        payload.start_date.as_deref(),
        payload.end_date.as_deref(),
        payload.kelas_id,
    )?;
    let waktu_id = wajib_id("waktu_id", payload.waktu_id)?;
    log::debug!("rekap bulanan {:?} waktu={}", periode, waktu_id);

    let baris = sqlx::query_as::<_, BarisRekapBulanan>(
        r#"
        SELECT
            s.nama AS nama_santri,
            DATE(a.tanggal) AS tanggal,
            CAST(a.hadir AS SIGNED) AS hadir,
            CAST(a.izin AS SIGNED) AS izin,
            CAST(a.alpa AS SIGNED) AS alpa,
            CAST(a.pulang AS SIGNED) AS pulang,
            CAST(a.sakit AS SIGNED) AS sakit
        FROM absensi a
        JOIN santri s ON a.santri_id = s.id
        WHERE DATE(a.tanggal) BETWEEN ? AND ?
          AND a.kelas_id = ?
          AND a.waktu_id = ?
        ORDER BY s.nama, a.tanggal, a.id
        "#,
    )
    .bind(periode.mulai)
    .bind(periode.selesai)
    .bind(periode.kelas_id)
    .bind(waktu_id)
    .fetch_all(pool.get_ref())
    .await?;

    let rekap = susun_rekap_bulanan(&baris, periode.mulai, periode.selesai);
    Ok(HttpResponse::Ok().json(rekap))
}

#[post("/absensi/bulanan/semuawaktu")]
pub async fn rekap_semua_waktu(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<RekapPeriodeRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let periode = validasi_periode(
        payload.start_date.as_deref(),
        payload.end_date.as_deref(),
        payload.kelas_id,
    )?;
    log::debug!("rekap semua waktu {:?}", periode);

    let baris = sqlx::query_as::<_, BarisRekapWaktu>(
        r#"
        SELECT
            CAST(a.waktu_id AS SIGNED) AS waktu_id,
            w.nama AS nama_waktu,
            s.nama AS nama_santri,
            CAST(COALESCE(SUM(a.hadir), 0) AS SIGNED) AS hadir,
            CAST(COALESCE(SUM(a.izin), 0) AS SIGNED) AS izin,
            CAST(COALESCE(SUM(a.alpa), 0) AS SIGNED) AS alpa,
            CAST(COALESCE(SUM(a.pulang), 0) AS SIGNED) AS pulang,
            CAST(COALESCE(SUM(a.sakit), 0) AS SIGNED) AS sakit
        FROM absensi a
        JOIN santri s ON a.santri_id = s.id
        JOIN waktu w ON a.waktu_id = w.id
        WHERE DATE(a.tanggal) BETWEEN ? AND ?
          AND a.kelas_id = ?
        GROUP BY a.waktu_id, w.nama, a.santri_id, s.nama
        ORDER BY w.nama, s.nama
        "#,
    )
    .bind(periode.mulai)
    .bind(periode.selesai)
    .bind(periode.kelas_id)
    .fetch_all(pool.get_ref())
    .await?;

    let hari_aktif = sqlx::query_as::<_, HariAktifWaktu>(
        r#"
        SELECT
            CAST(waktu_id AS SIGNED) AS waktu_id,
            CAST(COUNT(DISTINCT DATE(tanggal)) AS SIGNED) AS jumlah_hari
        FROM absensi
        WHERE DATE(tanggal) BETWEEN ? AND ?
          AND kelas_id = ?
        GROUP BY waktu_id
        "#,
    )
    .bind(periode.mulai)
    .bind(periode.selesai)
    .bind(periode.kelas_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(susun_rekap_semua_waktu(&baris, &hari_aktif)))
}

async fn rekap_hijriah_dengan_mode(
    pool: &MySqlPool,
    periode: Periode,
    mode: ModeTotal,
) -> Result<HttpResponse, ApiError> {
    let segmen = segmen_bulan_hijriah(periode.mulai, periode.selesai);
    let kunci = kunci_bulan(&segmen);
    log::debug!("rekap hijriah {:?}: {} segmen {:?}", periode, segmen.len(), kunci);

    // Satu query untuk seluruh rentang, dibagi per segmen di memori
    let baris = sqlx::query_as::<_, BarisRekapHijriah>(
        r#"
        SELECT
            CAST(a.santri_id AS SIGNED) AS santri_id,
            s.nama,
            DATE(a.tanggal) AS tanggal,
            CAST(a.hadir AS SIGNED) AS hadir,
            CAST(a.izin AS SIGNED) AS izin,
            CAST(a.alpa AS SIGNED) AS alpa,
            CAST(a.pulang AS SIGNED) AS pulang,
            CAST(a.sakit AS SIGNED) AS sakit
        FROM absensi a
        JOIN santri s ON a.santri_id = s.id
        WHERE DATE(a.tanggal) BETWEEN ? AND ?
          AND a.kelas_id = ?
        ORDER BY a.santri_id, a.tanggal, a.id
        "#,
    )
    .bind(periode.mulai)
    .bind(periode.selesai)
    .bind(periode.kelas_id)
    .fetch_all(pool)
    .await?;

    let data = susun_rekap_hijriah(&segmen, &kunci, &baris, mode);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": data
    })))
}

#[post("/absensi/hijriah")]
pub async fn rekap_hijriah(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<RekapPeriodeRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let periode = validasi_periode(
        payload.start_date.as_deref(),
        payload.end_date.as_deref(),
        payload.kelas_id,
    )?;
    rekap_hijriah_dengan_mode(pool.get_ref(), periode, ModeTotal::Jumlah).await
}

#[post("/absensi/hijriah/persen")]
pub async fn rekap_hijriah_persen(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<RekapPeriodeRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let periode = validasi_periode(
        payload.start_date.as_deref(),
        payload.end_date.as_deref(),
        payload.kelas_id,
    )?;
    rekap_hijriah_dengan_mode(pool.get_ref(), periode, ModeTotal::Persen).await
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(rekap_bulanan)
        .service(rekap_semua_waktu)
        .service(rekap_hijriah)
        .service(rekap_hijriah_persen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::tests::{bearer, lazy_pool};
    use actix_web::{http::StatusCode, test as actix_test, App};

    #[test]
    fn period_validation() {
        let periode = validasi_periode(Some("2024-01-01"), Some("2024-01-31"), Some(5)).unwrap();
        assert_eq!(periode.kelas_id, 5);
        assert_eq!(periode.mulai, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert!(matches!(validasi_periode(None, Some("2024-01-31"), Some(5)), Err(ApiError::Validation(_))));
        assert!(matches!(validasi_periode(Some("2024-01-01"), Some(""), Some(5)), Err(ApiError::Validation(_))));
        assert!(matches!(validasi_periode(Some("2024-01-01"), Some("2024-01-31"), None), Err(ApiError::Validation(_))));
        assert!(matches!(validasi_periode(Some("kemarin"), Some("2024-01-31"), Some(5)), Err(ApiError::Validation(_))));
    }

    #[test]
    fn period_span_is_bounded() {
        assert!(validasi_periode(Some("2024-01-01"), Some("2024-12-31"), Some(5)).is_ok());
        assert!(matches!(
            validasi_periode(Some("2024-01-01"), Some("2025-01-01"), Some(5)),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validasi_periode(Some("0001-01-01"), Some("9999-12-31"), Some(5)),
            Err(ApiError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn monthly_report_rejects_missing_timeslot() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).configure(routes),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/absensi/bulanan")
            .insert_header(bearer())
            .set_json(json!({"startDate": "2024-01-01", "endDate": "2024-01-03", "kelas_id": 5}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "waktu_id wajib diisi");
    }

    #[actix_web::test]
    async fn period_reports_reject_missing_fields() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).configure(routes),
        )
        .await;
        for uri in ["/absensi/bulanan/semuawaktu", "/absensi/hijriah", "/absensi/hijriah/persen"] {
            let req = actix_test::TestRequest::post()
                .uri(uri)
                .insert_header(bearer())
                .set_json(json!({"startDate": "2024-01-01", "kelas_id": 5}))
                .to_request();
            assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn malformed_date_is_bad_request() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).configure(routes),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/absensi/hijriah")
            .insert_header(bearer())
            .set_json(json!({"startDate": "2024-13-01", "endDate": "2024-12-31", "kelas_id": 5}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reports_require_token() {
        let app = actix_test::init_service(
            App::new().app_data(web::Data::new(lazy_pool())).configure(routes),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/absensi/bulanan")
            .set_json(json!({"startDate": "2024-01-01", "endDate": "2024-01-03", "kelas_id": 5, "waktu_id": 2}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
