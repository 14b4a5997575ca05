use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::status::JumlahStatus;
use crate::models::absensi::{BarisRekapWaktu, HariAktifWaktu};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RingkasanSantri {
    pub nama: String,
    #[serde(flatten)]
    pub jumlah: JumlahStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RekapWaktu {
    /// Jumlah tanggal berbeda yang punya catatan absensi untuk waktu ini,
    /// bukan panjang rentang kalender.
    pub jumlah_aktif_belajar: i64,
    pub rekap_bulanan: Vec<RingkasanSantri>,
}

/// Kelompokkan jumlah per (waktu, santri) menurut nama waktu. Waktu tanpa baris
/// tidak muncul sama sekali.
pub fn susun_rekap_semua_waktu(
    baris: &[BarisRekapWaktu],
    hari_aktif: &[HariAktifWaktu],
) -> BTreeMap<String, RekapWaktu> {
    let hari_per_waktu: HashMap<i64, i64> = hari_aktif
        .iter()
        .map(|h| (h.waktu_id, h.jumlah_hari))
        .collect();

    let mut hasil: BTreeMap<String, RekapWaktu> = BTreeMap::new();
    for row in baris {
        let rekap = hasil
            .entry(row.nama_waktu.clone())
            .or_insert_with(|| RekapWaktu {
                jumlah_aktif_belajar: hari_per_waktu.get(&row.waktu_id).copied().unwrap_or(0),
                rekap_bulanan: Vec::new(),
            });

        rekap.rekap_bulanan.push(RingkasanSantri {
            nama: row.nama_santri.clone(),
            jumlah: JumlahStatus::from(row.flag),
        });
    }

    hasil
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rekap::status::FlagAbsensi;
    use serde_json::json;

    fn baris(waktu_id: i64, waktu: &str, nama: &str, flag: FlagAbsensi) -> BarisRekapWaktu {
        BarisRekapWaktu {
            waktu_id,
            nama_waktu: waktu.to_string(),
            nama_santri: nama.to_string(),
            flag,
        }
    }

    #[test]
    fn groups_by_timeslot_with_active_days() {
        let rows = vec![
            baris(1, "Subuh", "Ali", FlagAbsensi { hadir: 18, izin: 1, alpa: 0, pulang: 0, sakit: 1 }),
            baris(1, "Subuh", "Umar", FlagAbsensi { hadir: 20, ..Default::default() }),
            baris(2, "Maghrib", "Ali", FlagAbsensi { hadir: 5, alpa: 2, ..Default::default() }),
        ];
        let hari = vec![
            HariAktifWaktu { waktu_id: 1, jumlah_hari: 20 },
            HariAktifWaktu { waktu_id: 2, jumlah_hari: 7 },
        ];

        let hasil = susun_rekap_semua_waktu(&rows, &hari);
        assert_eq!(
            serde_json::to_value(&hasil).unwrap(),
            json!({
                "Subuh": {
                    "jumlah_aktif_belajar": 20,
                    "rekap_bulanan": [
                        {"nama": "Ali", "jumlah_h": 18, "jumlah_s": 1, "jumlah_p": 0, "jumlah_i": 1, "jumlah_a": 0},
                        {"nama": "Umar", "jumlah_h": 20, "jumlah_s": 0, "jumlah_p": 0, "jumlah_i": 0, "jumlah_a": 0}
                    ]
                },
                "Maghrib": {
                    "jumlah_aktif_belajar": 7,
                    "rekap_bulanan": [
                        {"nama": "Ali", "jumlah_h": 5, "jumlah_s": 0, "jumlah_p": 0, "jumlah_i": 0, "jumlah_a": 2}
                    ]
                }
            })
        );
    }

    #[test]
    fn timeslot_without_rows_is_absent() {
        let rows = vec![baris(1, "Subuh", "Ali", FlagAbsensi { hadir: 1, ..Default::default() })];
        let hari = vec![
            HariAktifWaktu { waktu_id: 1, jumlah_hari: 1 },
            HariAktifWaktu { waktu_id: 3, jumlah_hari: 4 },
        ];
        let hasil = susun_rekap_semua_waktu(&rows, &hari);
        assert_eq!(hasil.len(), 1);
        assert!(hasil.contains_key("Subuh"));
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(susun_rekap_semua_waktu(&[], &[]).is_empty());
    }
}
