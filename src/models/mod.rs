pub mod course;
pub mod guru;
pub mod registration;
pub mod schedule;
pub mod siswa;
pub mod tagihan;
pub mod transaksi_guru;
pub mod transaksi_siswa;
pub mod user;
