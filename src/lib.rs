//! STORMWATCH: forecast cache and weather dashboard backend.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod location;
pub mod cache;
pub mod provider;
pub mod scenarios;
pub mod dev;
pub mod service;
pub mod geocode;
pub mod radar;
pub mod storage;
pub mod dashboard;
