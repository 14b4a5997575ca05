pub mod absensi;
pub mod jadwal;
pub mod master;
pub mod user;
