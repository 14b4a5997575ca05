//utils.rs
use image::GenericImageView;
use std::env;
use std::path::{Path, PathBuf};
use webp::Encoder;

use crate::errors::ApiError;

pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const WEBP_QUALITY: f32 = 80.0;

/// Field id wajib: harus ada dan positif.
pub fn wajib_id(field: &str, value: Option<i64>) -> Result<i64, ApiError> {
    value
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::validation(format!("{} wajib diisi", field)))
}

/// Field teks wajib, sudah di-trim.
pub fn wajib_teks<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{} wajib diisi", field)));
    }
    Ok(value)
}

/// Array wajib dan tidak boleh kosong, pesan mengikuti nama tabelnya.
pub fn wajib_array<T>(nama: &str, value: Option<Vec<T>>) -> Result<Vec<T>, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!(
            "Data {} harus berupa array dan tidak boleh kosong",
            nama
        ))),
    }
}

pub fn upload_dir() -> PathBuf {
    env::var("UPLOAD_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./uploads"))
}

/// Decode gambar apa pun yang dikenali crate `image` lalu encode ulang ke WebP.
pub fn konversi_ke_webp(bytes: &[u8]) -> Result<Vec<u8>, ApiError> {
    let img = image::load_from_memory(bytes).map_err(|e| {
        log::warn!("Gagal membaca gambar: {}", e);
        ApiError::validation(format!("File bukan gambar yang valid: {}", e))
    })?;

    let (w, h) = img.dimensions();
    let rgba = img.to_rgba8();
    let encoder = Encoder::from_rgba(&rgba, w, h);
    Ok(encoder.encode(WEBP_QUALITY).to_vec())
}

/// Simpan foto milik `owner_id` sebagai `<dir>/<owner_id>.webp`, menimpa foto lama.
/// Return: URL publik di bawah `/uploads`.
pub async fn simpan_foto(bytes: &[u8], owner_id: i64, dir: &Path) -> Result<String, ApiError> {
    let webp_bytes = konversi_ke_webp(bytes)?;

    tokio::fs::create_dir_all(dir).await?;
    let filename = format!("{}.webp", owner_id);
    let path = dir.join(&filename);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tokio::fs::remove_file(&path).await?;
    }
    tokio::fs::write(&path, &webp_bytes).await?;
    log::info!("Foto user {} disimpan ke {}", owner_id, path.display());

    Ok(format!("/uploads/{}", filename))
}
