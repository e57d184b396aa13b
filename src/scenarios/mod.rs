//! Pre-built training scenarios.
//!
//! Provides ready-to-use plant and procedure catalogs:
//! - Cold ship to main engine (the full dead-ship startup)

pub mod cold_ship;
