// src/models/master.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct Kelas {
    pub id: i64,
    pub nama: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Waktu {
    pub id: i64,
    pub nama: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Santri {
    pub id: i64,
    pub nama: String,
    pub kelas_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KelasBulkPayload {
    pub kelas: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct GuruBulkPayload {
    pub guru: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct WaktuBulkPayload {
    pub waktu: Option<Vec<String>>,
}

/// Santri bisa dikirim sebagai nama saja atau objek lengkap.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SantriInput {
    Nama(String),
    Lengkap {
        nama: String,
        kelas_id: Option<i64>,
        status: Option<String>,
    },
}

impl SantriInput {
    pub fn nama(&self) -> &str {
        match self {
            SantriInput::Nama(nama) | SantriInput::Lengkap { nama, .. } => nama.trim(),
        }
    }

    pub fn kelas_id(&self) -> Option<i64> {
        match self {
            SantriInput::Nama(_) => None,
            SantriInput::Lengkap { kelas_id, .. } => *kelas_id,
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            SantriInput::Nama(_) => None,
            SantriInput::Lengkap { status, .. } => status.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SantriBulkPayload {
    pub santri: Option<Vec<SantriInput>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn santri_accepts_name_or_object() {
        let payload: SantriBulkPayload = serde_json::from_value(serde_json::json!({
            "santri": ["Ali", {"nama": " Umar ", "kelas_id": 5, "status": "aktif"}]
        }))
        .unwrap();
        let santri = payload.santri.unwrap();
        assert_eq!(santri[0].nama(), "Ali");
        assert_eq!(santri[0].kelas_id(), None);
        assert_eq!(santri[1].nama(), "Umar");
        assert_eq!(santri[1].kelas_id(), Some(5));
        assert_eq!(santri[1].status(), Some("aktif"));
    }
}
