//! # docvault-scan
//!
//! Virus-scan backends implementing [`docvault_core::traits::VirusScanner`].
//! The production backend talks to a ClamAV daemon over TCP; the mock
//! backend drives tests deterministically.

pub mod clamav;
pub mod mock;

pub use clamav::ClamAvScanner;
pub use mock::MockScanner;
