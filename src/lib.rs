//! # Luxr Library
//!
//! Internal library for the luxr binary application.
//!
//! This library exists to enable testing of the engine internals and provide
//! clean separation between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Luxr` struct provides the main application API with
//!   resource management
//! - **Engine**: `engine` module owns the loop and the home/away state
//!   machine
//! - **Decision inputs**: `rules` (scheduled table), `rotation` (away
//!   rotation), `presence` (occupancy tracking), `sun` (sun time cache),
//!   `overrides` (manual drop-box)
//! - **Gateway**: `gateway` module abstracts the light transport
//! - **Configuration**: `config` module for TOML-based settings with
//!   hot reload
//! - **Infrastructure**: signal handling, lock file, logging, time source

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod config;
pub mod constants;
pub mod engine;
pub mod gateway;
pub mod hhmm;
pub mod lock;
pub mod overrides;
pub mod presence;
pub mod rotation;
pub mod rules;
pub mod signals;
pub mod sun;
pub mod time_source;

mod luxr;

// Re-export for binary
pub use luxr::Luxr;
