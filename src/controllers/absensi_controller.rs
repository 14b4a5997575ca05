// src/controllers/absensi_controller.rs
use actix_web::{post, put, web, HttpRequest, HttpResponse, Responder};
use chrono::NaiveDate;
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth;
use crate::errors::ApiError;
use crate::models::absensi::{
    AbsensiBatchRequest, AbsensiHarian, AbsensiHarianRequest, AbsensiInput, KunciAbsensi,
};
use crate::rekap::status::FlagAbsensi;
use crate::rekap::tanggal::parse_tanggal;
use crate::utils::wajib_array;

/// Lembar absensi default: semua santri kelas dengan kelima status nol.
fn lembar_kosong(santri: Vec<(i64, String)>) -> Vec<AbsensiHarian> {
    santri
        .into_iter()
        .map(|(santri_id, nama)| AbsensiHarian {
            santri_id,
            nama,
            flag: FlagAbsensi::default(),
        })
        .collect()
}

/// Akses tabel absensi yang dipakai handler; `MySqlPool` di produksi.
pub(crate) trait TokoAbsensi {
    async fn lembar_tercatat(
        &self,
        kelas_id: i64,
        tanggal: NaiveDate,
        waktu_id: i64,
    ) -> Result<Vec<AbsensiHarian>, ApiError>;
    async fn santri_kelas(&self, kelas_id: i64) -> Result<Vec<(i64, String)>, ApiError>;
    async fn sudah_ada(&self, kunci: &KunciAbsensi) -> Result<bool, ApiError>;
    async fn tambah(&self, kunci: &KunciAbsensi, flag: &FlagAbsensi) -> Result<(), ApiError>;
    async fn flag_tersimpan(&self, kunci: &KunciAbsensi) -> Result<Option<FlagAbsensi>, ApiError>;
    async fn perbarui(&self, kunci: &KunciAbsensi, flag: &FlagAbsensi) -> Result<u64, ApiError>;
}

impl TokoAbsensi for MySqlPool {
    async fn lembar_tercatat(
        &self,
        kelas_id: i64,
        tanggal: NaiveDate,
        waktu_id: i64,
    ) -> Result<Vec<AbsensiHarian>, ApiError> {
        let rows = sqlx::query_as::<_, AbsensiHarian>(
            r#"
            SELECT
                CAST(absensi.santri_id AS SIGNED) AS santri_id,
                santri.nama,
                CAST(absensi.hadir AS SIGNED) AS hadir,
                CAST(absensi.izin AS SIGNED) AS izin,
                CAST(absensi.alpa AS SIGNED) AS alpa,
                CAST(absensi.pulang AS SIGNED) AS pulang,
                CAST(absensi.sakit AS SIGNED) AS sakit
            FROM absensi
            JOIN santri ON absensi.santri_id = santri.id
            WHERE absensi.kelas_id = ?
              AND DATE(absensi.tanggal) = ?
              AND absensi.waktu_id = ?
            ORDER BY absensi.santri_id, absensi.id
            "#,
        )
        .bind(kelas_id)
        .bind(tanggal)
        .bind(waktu_id)
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn santri_kelas(&self, kelas_id: i64) -> Result<Vec<(i64, String)>, ApiError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT CAST(id AS SIGNED), nama FROM santri WHERE kelas_id = ? ORDER BY id",
        )
        .bind(kelas_id)
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn sudah_ada(&self, kunci: &KunciAbsensi) -> Result<bool, ApiError> {
        let jumlah = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM absensi
            WHERE DATE(tanggal) = ? AND guru_id = ? AND kelas_id = ? AND waktu_id = ? AND santri_id = ?
            "#,
        )
        .bind(kunci.tanggal)
        .bind(kunci.guru_id)
        .bind(kunci.kelas_id)
        .bind(kunci.waktu_id)
        .bind(kunci.santri_id)
        .fetch_one(self)
        .await?;
        Ok(jumlah > 0)
    }

    async fn tambah(&self, kunci: &KunciAbsensi, flag: &FlagAbsensi) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO absensi (tanggal, guru_id, kelas_id, waktu_id, santri_id, hadir, izin, alpa, pulang, sakit)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(kunci.tanggal)
        .bind(kunci.guru_id)
        .bind(kunci.kelas_id)
        .bind(kunci.waktu_id)
        .bind(kunci.santri_id)
        .bind(flag.hadir)
        .bind(flag.izin)
        .bind(flag.alpa)
        .bind(flag.pulang)
        .bind(flag.sakit)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn flag_tersimpan(&self, kunci: &KunciAbsensi) -> Result<Option<FlagAbsensi>, ApiError> {
        let flag = sqlx::query_as::<_, FlagAbsensi>(
            r#"
            SELECT
                CAST(hadir AS SIGNED) AS hadir,
                CAST(izin AS SIGNED) AS izin,
                CAST(alpa AS SIGNED) AS alpa,
                CAST(pulang AS SIGNED) AS pulang,
                CAST(sakit AS SIGNED) AS sakit
            FROM absensi
            WHERE DATE(tanggal) = ? AND guru_id = ? AND kelas_id = ? AND waktu_id = ? AND santri_id = ?
            LIMIT 1
            "#,
        )
        .bind(kunci.tanggal)
        .bind(kunci.guru_id)
        .bind(kunci.kelas_id)
        .bind(kunci.waktu_id)
        .bind(kunci.santri_id)
        .fetch_optional(self)
        .await?;
        Ok(flag)
    }

    async fn perbarui(&self, kunci: &KunciAbsensi, flag: &FlagAbsensi) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE absensi
            SET hadir = ?, izin = ?, alpa = ?, pulang = ?, sakit = ?
            WHERE DATE(tanggal) = ? AND guru_id = ? AND kelas_id = ? AND waktu_id = ? AND santri_id = ?
            "#,
        )
        .bind(flag.hadir)
        .bind(flag.izin)
        .bind(flag.alpa)
        .bind(flag.pulang)
        .bind(flag.sakit)
        .bind(kunci.tanggal)
        .bind(kunci.guru_id)
        .bind(kunci.kelas_id)
        .bind(kunci.waktu_id)
        .bind(kunci.santri_id)
        .execute(self)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Catatan yang sudah ada untuk (kelas, tanggal, waktu); kalau belum ada,
/// lembar nol untuk semua santri kelas.
async fn lembar_harian<T: TokoAbsensi>(
    toko: &T,
    kelas_id: i64,
    tanggal: NaiveDate,
    waktu_id: i64,
) -> Result<Vec<AbsensiHarian>, ApiError> {
    let tercatat = toko.lembar_tercatat(kelas_id, tanggal, waktu_id).await?;
    if !tercatat.is_empty() {
        return Ok(tercatat);
    }
    Ok(lembar_kosong(toko.santri_kelas(kelas_id).await?))
}

#[post("/api/absensi-harian")]
pub async fn absensi_harian(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<AbsensiHarianRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;

    let (kelas_id, waktu_id) = match (payload.kelas_id, payload.waktu_id, payload.tanggal.as_deref()) {
        (Some(k), Some(w), Some(t)) if k > 0 && w > 0 && !t.trim().is_empty() => (k, w),
        _ => return Err(ApiError::validation("kelas_id, tanggal, dan waktu_id diperlukan")),
    };
    let tanggal = parse_tanggal("tanggal", payload.tanggal.as_deref())?;
    log::debug!("absensi harian kelas={} tanggal={} waktu={}", kelas_id, tanggal, waktu_id);

    let lembar = lembar_harian(pool.get_ref(), kelas_id, tanggal, waktu_id).await?;
    Ok(HttpResponse::Ok().json(lembar))
}

/// Validasi seluruh batch sebelum menyentuh database.
fn validasi_batch(
    absensi: Option<Vec<AbsensiInput>>,
) -> Result<Vec<(KunciAbsensi, FlagAbsensi)>, ApiError> {
    let absensi = wajib_array("absensi", absensi)?;

    absensi
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let tuple = match (item.guru_id, item.kelas_id, item.waktu_id, item.santri_id) {
                (Some(g), Some(k), Some(w), Some(s)) if g > 0 && k > 0 && w > 0 && s > 0 => {
                    (g, k, w, s)
                }
                _ => {
                    return Err(ApiError::validation(format!(
                        "Data absensi ke-{}: tanggal, guru_id, kelas_id, waktu_id, dan santri_id wajib diisi",
                        i + 1
                    )))
                }
            };
            let tanggal = parse_tanggal("tanggal", item.tanggal.as_deref())?;

            let flag = item.flag();
            let nilai = [flag.hadir, flag.izin, flag.alpa, flag.pulang, flag.sakit];
            if nilai.iter().any(|v| !(0..=1).contains(v)) {
                return Err(ApiError::validation(format!(
                    "Data absensi ke-{}: nilai hadir/izin/alpa/pulang/sakit harus 0 atau 1",
                    i + 1
                )));
            }

            let (guru_id, kelas_id, waktu_id, santri_id) = tuple;
            Ok((
                KunciAbsensi {
                    tanggal,
                    guru_id,
                    kelas_id,
                    waktu_id,
                    santri_id,
                },
                flag,
            ))
        })
        .collect()
}

/// Simpan catatan berurutan. Duplikat pertama menghentikan batch dengan 409;
/// catatan sebelumnya tetap tersimpan.
async fn simpan_batch<T: TokoAbsensi>(
    toko: &T,
    catatan: &[(KunciAbsensi, FlagAbsensi)],
) -> Result<usize, ApiError> {
    let mut tersimpan = 0usize;
    for (kunci, flag) in catatan {
        if toko.sudah_ada(kunci).await? {
            log::warn!(
                "Absensi duplikat ditolak: {:?} ({} catatan sebelumnya sudah tersimpan)",
                kunci,
                tersimpan
            );
            return Err(ApiError::Conflict(
                "Data absensi sudah ada, tidak boleh duplikat".into(),
            ));
        }
        toko.tambah(kunci, flag).await?;
        tersimpan += 1;
    }
    Ok(tersimpan)
}

#[post("/absensi")]
pub async fn insert_absensi(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<AbsensiBatchRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let catatan = validasi_batch(payload.into_inner().absensi)?;
    let tersimpan = simpan_batch(pool.get_ref(), &catatan).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Absensi berhasil ditambahkan tanpa duplikasi",
        "jumlah": tersimpan
    })))
}

fn ringkasan_update(diperbarui: usize, tidak_ditemukan: usize, total: usize) -> Result<String, ApiError> {
    if diperbarui == 0 && tidak_ditemukan == total {
        return Err(ApiError::NotFound("Semua data absensi tidak ditemukan".into()));
    }
    Ok(format!("{} data absensi berhasil diperbarui", diperbarui))
}

/// Perbarui catatan yang ada; yang tidak ditemukan atau tidak berubah dilewati.
async fn perbarui_batch<T: TokoAbsensi>(
    toko: &T,
    catatan: &[(KunciAbsensi, FlagAbsensi)],
) -> Result<String, ApiError> {
    let mut diperbarui = 0usize;
    let mut tidak_ditemukan = 0usize;

    for (kunci, flag) in catatan {
        match toko.flag_tersimpan(kunci).await? {
            None => {
                tidak_ditemukan += 1;
                continue;
            }
            Some(lama) if lama == *flag => continue,
            Some(_) => {}
        }

        if toko.perbarui(kunci, flag).await? > 0 {
            diperbarui += 1;
        }
    }

    ringkasan_update(diperbarui, tidak_ditemukan, catatan.len())
}

#[put("/absensi")]
pub async fn update_absensi(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    payload: web::Json<AbsensiBatchRequest>,
) -> Result<impl Responder, ApiError> {
    auth::verify_jwt(&req)?;
    let catatan = validasi_batch(payload.into_inner().absensi)?;
    let message = perbarui_batch(pool.get_ref(), &catatan).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(absensi_harian)
        .service(insert_absensi)
        .service(update_absensi);
}
