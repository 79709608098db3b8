//! Lifetime Viewer - load particle-lifetime tables, plot them, fit the decay.
//!
//! ## Module Structure
//!
//! - [`data`] - sources, `.csv` / `.tdf` ingestion, serialization, window selection
//! - [`fit`] - exponential-decay fitting (tau, half-life, decay rate)
//! - [`simulate`] - simulated decay histograms
//! - [`config`] - JSON configuration
//! - [`error`] - library error type
//! - [`state`] - UI state independent of rendering
//! - [`app`] / [`ui`] / [`color`] - eframe application

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod fit;
pub mod simulate;
pub mod state;
pub mod ui;

pub use error::{Error, Result};
