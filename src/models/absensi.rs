// src/models/absensi.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::rekap::status::FlagAbsensi;

/// Satu baris lembar absensi harian (tercatat atau default nol).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct AbsensiHarian {
    pub santri_id: i64,
    pub nama: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub flag: FlagAbsensi,
}

#[derive(Debug, Clone, FromRow)]
pub struct BarisRekapBulanan {
    pub nama_santri: String,
    pub tanggal: NaiveDate,
    #[sqlx(flatten)]
    pub flag: FlagAbsensi,
}

/// Jumlah flag per (waktu, santri) dalam rentang tanggal.
#[derive(Debug, Clone, FromRow)]
pub struct BarisRekapWaktu {
    pub waktu_id: i64,
    pub nama_waktu: String,
    pub nama_santri: String,
    #[sqlx(flatten)]
    pub flag: FlagAbsensi,
}

#[derive(Debug, Clone, FromRow)]
pub struct HariAktifWaktu {
    pub waktu_id: i64,
    pub jumlah_hari: i64,
}

/// Satu catatan absensi untuk pivot Hijriah.
#[derive(Debug, Clone, FromRow)]
pub struct BarisRekapHijriah {
    pub santri_id: i64,
    pub nama: String,
    pub tanggal: NaiveDate,
    #[sqlx(flatten)]
    pub flag: FlagAbsensi,
}

#[derive(Debug, Deserialize)]
pub struct AbsensiHarianRequest {
    pub kelas_id: Option<i64>,
    pub tanggal: Option<String>,
    pub waktu_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RekapBulananRequest {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub kelas_id: Option<i64>,
    pub waktu_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RekapPeriodeRequest {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub kelas_id: Option<i64>,
}

/// Satu catatan absensi pada body `POST /absensi` dan `PUT /absensi`.
#[derive(Debug, Clone, Deserialize)]
pub struct AbsensiInput {
    pub tanggal: Option<String>,
    pub guru_id: Option<i64>,
    pub kelas_id: Option<i64>,
    pub waktu_id: Option<i64>,
    pub santri_id: Option<i64>,
    #[serde(default)]
    pub hadir: i64,
    #[serde(default)]
    pub izin: i64,
    #[serde(default)]
    pub alpa: i64,
    #[serde(default)]
    pub pulang: i64,
    #[serde(default)]
    pub sakit: i64,
}

impl AbsensiInput {
    pub fn flag(&self) -> FlagAbsensi {
        FlagAbsensi {
            hadir: self.hadir,
            izin: self.izin,
            alpa: self.alpa,
            pulang: self.pulang,
            sakit: self.sakit,
        }
    }
}

/// Kunci unik satu catatan absensi setelah divalidasi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KunciAbsensi {
    pub tanggal: NaiveDate,
    pub guru_id: i64,
    pub kelas_id: i64,
    pub waktu_id: i64,
    pub santri_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AbsensiBatchRequest {
    pub absensi: Option<Vec<AbsensiInput>>,
}
