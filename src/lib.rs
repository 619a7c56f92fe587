//! SkySmuggler: autonomous trading agent for the SkySmuggler space-trader game.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod engine;
pub mod server;
pub mod storage;
pub mod strategy;
pub mod types;
