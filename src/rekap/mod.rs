// src/rekap/mod.rs
//! Penyusun rekap absensi. Semua fungsi di sini murni: menerima baris hasil
//! query dan mengembalikan struktur siap-serialisasi, tanpa akses database.

pub mod bulanan;
pub mod hijriah;
pub mod semua_waktu;
pub mod status;
pub mod tanggal;
