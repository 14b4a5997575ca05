use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

use super::status::{JumlahStatus, TANPA_DATA};
use super::tanggal::{format_tanggal, rentang_tanggal};
use crate::models::absensi::BarisRekapBulanan;

/// Satu baris laporan bulanan: kode status per tanggal plus jumlah per jenis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RekapBulananSantri {
    pub nama: String,
    /// Kunci `YYYY-MM-DD`, urut leksikografis = urut kalender.
    pub tanggal: BTreeMap<String, &'static str>,
    pub jumlah: JumlahStatus,
}

impl RekapBulananSantri {
    fn kosong(nama: &str, daftar_tanggal: &[String]) -> Self {
        RekapBulananSantri {
            nama: nama.to_string(),
            tanggal: daftar_tanggal
                .iter()
                .map(|t| (t.clone(), TANPA_DATA))
                .collect(),
            jumlah: JumlahStatus::default(),
        }
    }
}

impl Serialize for RekapBulananSantri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tanggal.len() + 6))?;
        map.serialize_entry("nama", &self.nama)?;
        for (tanggal, kode) in &self.tanggal {
            map.serialize_entry(tanggal, kode)?;
        }
        map.serialize_entry("jumlah_h", &self.jumlah.hadir)?;
        map.serialize_entry("jumlah_s", &self.jumlah.sakit)?;
        map.serialize_entry("jumlah_p", &self.jumlah.pulang)?;
        map.serialize_entry("jumlah_i", &self.jumlah.izin)?;
        map.serialize_entry("jumlah_a", &self.jumlah.alpa)?;
        map.end()
    }
}

/// Pivot baris absensi menjadi tabel santri x tanggal yang rapat: setiap santri
/// yang muncul di `baris` mendapat semua tanggal dari `mulai` sampai `selesai`.
/// Urutan santri mengikuti kemunculan pertamanya di `baris`.
pub fn susun_rekap_bulanan(
    baris: &[BarisRekapBulanan],
    mulai: NaiveDate,
    selesai: NaiveDate,
) -> Vec<RekapBulananSantri> {
    let daftar_tanggal: Vec<String> = rentang_tanggal(mulai, selesai).collect();
    let mut hasil: Vec<RekapBulananSantri> = Vec::new();
    let mut indeks: HashMap<String, usize> = HashMap::new();

    for row in baris {
        let i = *indeks.entry(row.nama_santri.clone()).or_insert_with(|| {
            hasil.push(RekapBulananSantri::kosong(&row.nama_santri, &daftar_tanggal));
            hasil.len() - 1
        });

        let Some((status, kode)) = row.flag.status() else {
            continue;
        };
        let santri = &mut hasil[i];
        // Baris di luar rentang tidak boleh menambah kolom baru
        if let Some(slot) = santri.tanggal.get_mut(&format_tanggal(row.tanggal)) {
            *slot = kode;
            santri.jumlah.tambah(status);
        }
    }

    hasil
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rekap::status::FlagAbsensi;
    use serde_json::json;

    fn tgl(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn baris(nama: &str, tanggal: &str, flag: FlagAbsensi) -> BarisRekapBulanan {
        BarisRekapBulanan {
            nama_santri: nama.to_string(),
            tanggal: tgl(tanggal),
            flag,
        }
    }

    fn hadir() -> FlagAbsensi {
        FlagAbsensi { hadir: 1, ..Default::default() }
    }

    #[test]
    fn single_present_row_yields_dense_record() {
        let rows = vec![baris("Ali", "2024-01-02", hadir())];
        let hasil = susun_rekap_bulanan(&rows, tgl("2024-01-01"), tgl("2024-01-03"));
        assert_eq!(
            serde_json::to_value(&hasil).unwrap(),
            json!([{
                "nama": "Ali",
                "2024-01-01": "-",
                "2024-01-02": "H",
                "2024-01-03": "-",
                "jumlah_h": 1,
                "jumlah_s": 0,
                "jumlah_p": 0,
                "jumlah_i": 0,
                "jumlah_a": 0
            }])
        );
    }

    #[test]
    fn every_student_gets_every_date() {
        let rows = vec![
            baris("Ali", "2024-02-01", hadir()),
            baris("Umar", "2024-02-05", FlagAbsensi { sakit: 1, ..Default::default() }),
            baris("Ali", "2024-02-07", FlagAbsensi { alpa: 1, ..Default::default() }),
        ];
        let hasil = susun_rekap_bulanan(&rows, tgl("2024-02-01"), tgl("2024-02-29"));
        assert_eq!(hasil.len(), 2);
        for santri in &hasil {
            assert_eq!(santri.tanggal.len(), 29);
        }
        assert_eq!(hasil[0].nama, "Ali");
        assert_eq!(hasil[0].tanggal["2024-02-07"], "A");
        assert_eq!(hasil[0].jumlah.hadir, 1);
        assert_eq!(hasil[0].jumlah.alpa, 1);
        assert_eq!(hasil[1].tanggal["2024-02-05"], "S");
        assert_eq!(hasil[1].tanggal["2024-02-01"], "-");
    }

    #[test]
    fn conflicting_flags_resolve_by_precedence() {
        let rows = vec![baris(
            "Ali",
            "2024-01-01",
            FlagAbsensi { hadir: 1, sakit: 1, ..Default::default() },
        )];
        let hasil = susun_rekap_bulanan(&rows, tgl("2024-01-01"), tgl("2024-01-01"));
        assert_eq!(hasil[0].tanggal["2024-01-01"], "H");
        assert_eq!(hasil[0].jumlah.hadir, 1);
        assert_eq!(hasil[0].jumlah.sakit, 0);
    }

    #[test]
    fn row_without_flags_keeps_sentinel_and_is_not_counted() {
        let rows = vec![baris("Ali", "2024-01-02", FlagAbsensi::default())];
        let hasil = susun_rekap_bulanan(&rows, tgl("2024-01-01"), tgl("2024-01-03"));
        assert_eq!(hasil[0].tanggal["2024-01-02"], "-");
        assert_eq!(hasil[0].jumlah, JumlahStatus::default());
    }

    #[test]
    fn row_outside_range_adds_no_column() {
        let rows = vec![baris("Ali", "2024-03-01", hadir())];
        let hasil = susun_rekap_bulanan(&rows, tgl("2024-01-01"), tgl("2024-01-02"));
        assert_eq!(hasil[0].tanggal.len(), 2);
        assert_eq!(hasil[0].jumlah.hadir, 0);
    }

    #[test]
    fn serialized_keys_keep_report_order() {
        let rows = vec![baris("Ali", "2024-01-01", hadir())];
        let hasil = susun_rekap_bulanan(&rows, tgl("2024-01-01"), tgl("2024-01-02"));
        let teks = serde_json::to_string(&hasil[0]).unwrap();
        let posisi: Vec<usize> = ["\"nama\"", "\"2024-01-01\"", "\"2024-01-02\"", "\"jumlah_h\"", "\"jumlah_a\""]
            .iter()
            .map(|k| teks.find(k).unwrap())
            .collect();
        assert!(posisi.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn no_rows_no_students() {
        assert!(susun_rekap_bulanan(&[], tgl("2024-01-01"), tgl("2024-01-31")).is_empty());
    }
}
