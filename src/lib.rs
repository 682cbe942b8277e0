// ABOUTME: Library root for revwatch - waits for deployed revisions to become ready.
// ABOUTME: The main binary is in main.rs.

pub mod classify;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod fetch;
pub mod monitor;
pub mod output;
pub mod runner;
pub mod status;
