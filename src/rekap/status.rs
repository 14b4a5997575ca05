use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kode untuk tanggal tanpa catatan absensi, atau catatan tanpa flag aktif.
pub const TANPA_DATA: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAbsensi {
    Hadir,
    Izin,
    Sakit,
    Pulang,
    Alpa,
}

/// Urutan presedensi saat lebih dari satu flag aktif pada satu catatan:
/// flag pertama yang aktif menentukan kode.
pub const URUTAN_PRESEDENSI: [(StatusAbsensi, &str); 5] = [
    (StatusAbsensi::Hadir, "H"),
    (StatusAbsensi::Izin, "I"),
    (StatusAbsensi::Sakit, "S"),
    (StatusAbsensi::Pulang, "P"),
    (StatusAbsensi::Alpa, "A"),
];

/// Lima flag status satu catatan absensi (atau jumlahnya, untuk hasil `SUM`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FlagAbsensi {
    pub hadir: i64,
    pub izin: i64,
    pub alpa: i64,
    pub pulang: i64,
    pub sakit: i64,
}

impl FlagAbsensi {
    pub fn nilai(&self, status: StatusAbsensi) -> i64 {
        match status {
            StatusAbsensi::Hadir => self.hadir,
            StatusAbsensi::Izin => self.izin,
            StatusAbsensi::Sakit => self.sakit,
            StatusAbsensi::Pulang => self.pulang,
            StatusAbsensi::Alpa => self.alpa,
        }
    }

    /// Status tampilan menurut `URUTAN_PRESEDENSI`; `None` kalau tidak ada flag aktif.
    pub fn status(&self) -> Option<(StatusAbsensi, &'static str)> {
        URUTAN_PRESEDENSI
            .iter()
            .copied()
            .find(|(status, _)| self.nilai(*status) > 0)
    }

    pub fn kode(&self) -> &'static str {
        self.status().map(|(_, kode)| kode).unwrap_or(TANPA_DATA)
    }
}

/// Penghitung per jenis status. Urutan field mengikuti urutan kolom laporan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JumlahStatus {
    #[serde(rename = "jumlah_h")]
    pub hadir: i64,
    #[serde(rename = "jumlah_s")]
    pub sakit: i64,
    #[serde(rename = "jumlah_p")]
    pub pulang: i64,
    #[serde(rename = "jumlah_i")]
    pub izin: i64,
    #[serde(rename = "jumlah_a")]
    pub alpa: i64,
}

impl JumlahStatus {
    pub fn tambah(&mut self, status: StatusAbsensi) {
        match status {
            StatusAbsensi::Hadir => self.hadir += 1,
            StatusAbsensi::Izin => self.izin += 1,
            StatusAbsensi::Sakit => self.sakit += 1,
            StatusAbsensi::Pulang => self.pulang += 1,
            StatusAbsensi::Alpa => self.alpa += 1,
        }
    }

    /// Tambahkan hasil agregasi (`SUM`) apa adanya, tanpa presedensi.
    pub fn gabung(&mut self, flag: &FlagAbsensi) {
        self.hadir += flag.hadir;
        self.izin += flag.izin;
        self.sakit += flag.sakit;
        self.pulang += flag.pulang;
        self.alpa += flag.alpa;
    }

    pub fn tidak_hadir(&self) -> i64 {
        self.sakit + self.pulang + self.alpa + self.izin
    }

    /// Urutan vektor laporan Hijriah: `[hadir, sakit, pulang, alpa, izin]`.
    pub fn vektor(&self) -> [i64; 5] {
        [self.hadir, self.sakit, self.pulang, self.alpa, self.izin]
    }
}

impl From<FlagAbsensi> for JumlahStatus {
    fn from(flag: FlagAbsensi) -> Self {
        let mut jumlah = JumlahStatus::default();
        jumlah.gabung(&flag);
        jumlah
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(hadir: i64, izin: i64, alpa: i64, pulang: i64, sakit: i64) -> FlagAbsensi {
        FlagAbsensi { hadir, izin, alpa, pulang, sakit }
    }

    #[test]
    fn single_flag_maps_to_its_code() {
        assert_eq!(flag(1, 0, 0, 0, 0).kode(), "H");
        assert_eq!(flag(0, 1, 0, 0, 0).kode(), "I");
        assert_eq!(flag(0, 0, 1, 0, 0).kode(), "A");
        assert_eq!(flag(0, 0, 0, 1, 0).kode(), "P");
        assert_eq!(flag(0, 0, 0, 0, 1).kode(), "S");
    }

    #[test]
    fn hadir_wins_over_sakit() {
        assert_eq!(flag(1, 0, 0, 0, 1).kode(), "H");
        assert_eq!(flag(1, 0, 0, 0, 1).status().map(|(s, _)| s), Some(StatusAbsensi::Hadir));
    }

    #[test]
    fn precedence_follows_table_order() {
        assert_eq!(flag(0, 1, 1, 1, 1).kode(), "I");
        assert_eq!(flag(0, 0, 1, 1, 1).kode(), "S");
        assert_eq!(flag(0, 0, 1, 1, 0).kode(), "P");
    }

    #[test]
    fn no_flag_is_sentinel() {
        assert_eq!(FlagAbsensi::default().kode(), TANPA_DATA);
        assert!(FlagAbsensi::default().status().is_none());
    }

    #[test]
    fn vector_and_absent_total() {
        let jumlah = JumlahStatus::from(flag(10, 2, 1, 3, 4));
        assert_eq!(jumlah.vektor(), [10, 4, 3, 1, 2]);
        assert_eq!(jumlah.tidak_hadir(), 10);
    }

    #[test]
    fn counts_serialize_with_report_keys() {
        let mut jumlah = JumlahStatus::default();
        jumlah.tambah(StatusAbsensi::Hadir);
        jumlah.tambah(StatusAbsensi::Alpa);
        let value = serde_json::to_value(jumlah).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"jumlah_h": 1, "jumlah_s": 0, "jumlah_p": 0, "jumlah_i": 0, "jumlah_a": 1})
        );
    }
}
