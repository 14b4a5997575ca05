// src/models/jadwal.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct JadwalNgajar {
    pub jadwal_id: i64,
    pub kelas_id: i64,
    pub guru_id: i64,
    pub waktu_id: i64,
    pub guru_nama: String,
    pub kelas_nama: String,
    pub waktu_nama: String,
}

#[derive(Debug, Deserialize)]
pub struct JadwalNgajarPayload {
    pub guru_id: Option<i64>,
    pub kelas_id: Option<i64>,
    pub waktu_id: Option<i64>,
}
