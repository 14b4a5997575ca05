use chrono::NaiveDate;

use crate::errors::ApiError;

pub const FORMAT_TANGGAL: &str = "%Y-%m-%d";

/// Semua tanggal dari `mulai` sampai `selesai` (inklusif) dalam format `YYYY-MM-DD`.
/// Kosong kalau `mulai > selesai`.
pub fn rentang_tanggal(mulai: NaiveDate, selesai: NaiveDate) -> impl Iterator<Item = String> {
    mulai
        .iter_days()
        .take_while(move |t| *t <= selesai)
        .map(|t| t.format(FORMAT_TANGGAL).to_string())
}

pub fn format_tanggal(tanggal: NaiveDate) -> String {
    tanggal.format(FORMAT_TANGGAL).to_string()
}

/// Parse field tanggal wajib dari body request.
pub fn parse_tanggal(field: &str, raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{} wajib diisi", field)))?;

    // Frontend kadang mengirim ISO datetime lengkap, buang bagian `T...`
    let bagian_tanggal = raw.split_once('T').map_or(raw, |(tanggal, _)| tanggal);
    NaiveDate::parse_from_str(bagian_tanggal, FORMAT_TANGGAL).map_err(|_| {
        ApiError::validation(format!("{} harus berformat YYYY-MM-DD, diterima '{}'", field, raw))
    })
}
