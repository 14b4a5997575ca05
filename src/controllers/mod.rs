pub mod absensi_controller;
pub mod auth_controller;
pub mod jadwal_controller;
pub mod master_controller;
pub mod rekap_controller;
pub mod upload_controller;
