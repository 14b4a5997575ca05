// src/rekap/hijriah.rs
//! Konversi Masehi ke Hijriah (kalender sipil tabular dari `icu_calendar`),
//! pemotongan rentang Masehi per bulan Hijriah, dan pivot rekap per bulan
//! Hijriah.

use chrono::{Datelike, NaiveDate};
use icu_calendar::islamic::IslamicCivil;
use icu_calendar::{Date, Iso};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

use super::status::JumlahStatus;
use crate::models::absensi::BarisRekapHijriah;

pub const NAMA_BULAN: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabiul Awal",
    "Rabiul Akhir",
    "Jumadil Awal",
    "Jumadil Akhir",
    "Rajab",
    "Sya'ban",
    "Ramadhan",
    "Syawal",
    "Dzulqa'dah",
    "Dzulhijjah",
];

pub fn nama_bulan(bulan: u32) -> &'static str {
    NAMA_BULAN[(bulan.clamp(1, 12) - 1) as usize]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TanggalHijriah {
    pub tahun: i32,
    pub bulan: u32,
    pub hari: u32,
}

impl TanggalHijriah {
    /// `None` hanya untuk tanggal di luar jangkauan `icu_calendar`.
    pub fn dari_masehi(tanggal: NaiveDate) -> Option<Self> {
        let iso = Date::try_new_iso_date(
            tanggal.year(),
            u8::try_from(tanggal.month()).ok()?,
            u8::try_from(tanggal.day()).ok()?,
        )
        .ok()?;
        let hijriah = iso.to_calendar(IslamicCivil::new());
        Some(TanggalHijriah {
            tahun: hijriah.year().number,
            bulan: hijriah.month().ordinal,
            hari: hijriah.day_of_month().0,
        })
    }

    fn ke_icu(&self) -> Option<Date<IslamicCivil>> {
        Date::try_new_islamic_civil_date_with_calendar(
            self.tahun,
            u8::try_from(self.bulan).ok()?,
            u8::try_from(self.hari).ok()?,
            IslamicCivil::new(),
        )
        .ok()
    }

    pub fn ke_masehi(&self) -> Option<NaiveDate> {
        let iso: Date<Iso> = self.ke_icu()?.to_iso();
        NaiveDate::from_ymd_opt(iso.year().number, iso.month().ordinal, iso.day_of_month().0)
    }

    fn akhir_bulan(&self) -> Option<TanggalHijriah> {
        Some(TanggalHijriah {
            hari: panjang_bulan(self.tahun, self.bulan)?,
            ..*self
        })
    }
}

pub fn panjang_bulan(tahun: i32, bulan: u32) -> Option<u32> {
    TanggalHijriah { tahun, bulan, hari: 1 }
        .ke_icu()
        .map(|awal| u32::from(awal.days_in_month()))
}

/// Irisan satu bulan Hijriah dengan rentang Masehi yang diminta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenHijriah {
    pub tahun: i32,
    pub bulan: u32,
    pub mulai: NaiveDate,
    pub selesai: NaiveDate,
}

impl SegmenHijriah {
    pub fn nama_bulan(&self) -> &'static str {
        nama_bulan(self.bulan)
    }
}

/// Potong `mulai..=selesai` menjadi segmen yang masing-masing berada dalam satu
/// bulan Hijriah. Kosong kalau `mulai > selesai`.
pub fn segmen_bulan_hijriah(mulai: NaiveDate, selesai: NaiveDate) -> Vec<SegmenHijriah> {
    let mut segmen = Vec::new();
    let mut kursor = mulai;

    while kursor <= selesai {
        let Some(hijriah) = TanggalHijriah::dari_masehi(kursor) else {
            break;
        };
        let akhir_bulan = hijriah
            .akhir_bulan()
            .and_then(|t| t.ke_masehi())
            .unwrap_or(selesai);
        let akhir = akhir_bulan.min(selesai);
        segmen.push(SegmenHijriah {
            tahun: hijriah.tahun,
            bulan: hijriah.bulan,
            mulai: kursor,
            selesai: akhir,
        });
        match akhir.succ_opt() {
            Some(berikut) => kursor = berikut,
            None => break,
        }
    }

    segmen
}

/// Kunci JSON per segmen: nama bulan, ditambah tahun Hijriah kalau nama bulan
/// yang sama muncul lebih dari sekali dalam rentang.
pub fn kunci_bulan(segmen: &[SegmenHijriah]) -> Vec<String> {
    let mut kemunculan: HashMap<u32, usize> = HashMap::new();
    for s in segmen {
        *kemunculan.entry(s.bulan).or_default() += 1;
    }

    segmen
        .iter()
        .map(|s| {
            if kemunculan[&s.bulan] > 1 {
                format!("{} {}", s.nama_bulan(), s.tahun)
            } else {
                s.nama_bulan().to_string()
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTotal {
    Jumlah,
    Persen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalHijriah {
    Jumlah([i64; 2]),
    Persen([String; 2]),
}

impl TotalHijriah {
    fn dari(jumlah: &JumlahStatus, mode: ModeTotal) -> Self {
        let hadir = jumlah.hadir;
        let tidak_hadir = jumlah.tidak_hadir();
        match mode {
            ModeTotal::Jumlah => TotalHijriah::Jumlah([hadir, tidak_hadir]),
            ModeTotal::Persen => TotalHijriah::Persen([
                format_persen(hadir, hadir + tidak_hadir),
                format_persen(tidak_hadir, hadir + tidak_hadir),
            ]),
        }
    }
}

impl Serialize for TotalHijriah {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TotalHijriah::Jumlah(v) => v.serialize(serializer),
            TotalHijriah::Persen(v) => v.serialize(serializer),
        }
    }
}

fn format_persen(bagian: i64, total: i64) -> String {
    if total <= 0 {
        return "0 %".to_string();
    }
    let persen = (bagian as f64 * 100.0 / total as f64).round() as i64;
    format!("{} %", persen)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RekapHijriahSantri {
    pub santri_id: i64,
    pub nama: String,
    /// Vektor `[hadir, sakit, pulang, alpa, izin]` per bulan, urut segmen.
    pub bulan: Vec<(String, [i64; 5])>,
    pub jumlah: JumlahStatus,
    pub total: TotalHijriah,
}

impl Serialize for RekapHijriahSantri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bulan.len() + 3))?;
        map.serialize_entry("santri_id", &self.santri_id)?;
        map.serialize_entry("nama", &self.nama)?;
        for (kunci, vektor) in &self.bulan {
            map.serialize_entry(kunci, vektor)?;
        }
        map.serialize_entry("total", &self.total)?;
        map.end()
    }
}

/// Pivot baris absensi menjadi satu baris per santri, urut `santri_id`, dengan
/// satu vektor per segmen (`segmen[i]` berkunci `kunci[i]`). Setiap baris
/// dihitung sekali menurut presedensi status. Bulan tanpa data tetap muncul
/// dengan vektor nol.
pub fn susun_rekap_hijriah(
    segmen: &[SegmenHijriah],
    kunci: &[String],
    baris: &[BarisRekapHijriah],
    mode: ModeTotal,
) -> Vec<RekapHijriahSantri> {
    let jumlah_segmen = segmen.len().min(kunci.len());
    let mut per_santri: BTreeMap<i64, (String, Vec<JumlahStatus>)> = BTreeMap::new();

    for row in baris {
        let i = segmen.partition_point(|s| s.selesai < row.tanggal);
        if i >= jumlah_segmen || segmen[i].mulai > row.tanggal {
            continue;
        }

        let (_, bulan) = per_santri
            .entry(row.santri_id)
            .or_insert_with(|| (row.nama.clone(), vec![JumlahStatus::default(); jumlah_segmen]));
        if let Some((status, _)) = row.flag.status() {
            bulan[i].tambah(status);
        }
    }

    per_santri
        .into_iter()
        .map(|(santri_id, (nama, bulan))| {
            let mut jumlah = JumlahStatus::default();
            for b in &bulan {
                jumlah.hadir += b.hadir;
                jumlah.sakit += b.sakit;
                jumlah.pulang += b.pulang;
                jumlah.alpa += b.alpa;
                jumlah.izin += b.izin;
            }
            RekapHijriahSantri {
                santri_id,
                nama,
                bulan: kunci.iter().cloned().zip(bulan.iter().map(JumlahStatus::vektor)).collect(),
                total: TotalHijriah::dari(&jumlah, mode),
                jumlah,
            }
        })
        .collect()
}
