//! Billing (tagihan), teacher payout (transaksi guru) and enrollment
//! (schedules, purchase payment) workflows.
//!
//! The workflows reach the database through the store traits declared here,
//! implemented for Postgres in [`postgres`] and in memory for tests.

pub mod billing;
pub mod enrollment;
pub mod payout;
pub mod postgres;

#[cfg(test)]
pub mod memory;
