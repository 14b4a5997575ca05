use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// User tanpa hash password, untuk listing.
#[derive(Debug, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub guru_id: Option<i64>,
    pub nama_guru: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "isGuru", default)]
    pub is_guru: bool,
    #[serde(rename = "namaGuru")]
    pub nama_guru: Option<String>,
}

impl RegisterPayload {
    /// Nama guru yang akan dibuat, hanya kalau user ditandai guru dan namanya terisi.
    pub fn guru_baru(&self) -> Option<&str> {
        if !self.is_guru {
            return None;
        }
        self.nama_guru
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterBulkPayload {
    pub users: Option<Vec<RegisterPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password_lama: String,
    #[serde(default)]
    pub password_baru: String,
}
