//! # Printer Module
//!
//! This module provides the media and resolution catalogs pages are sized from.
//!
//! ## Modules
//!
//! - [`config`]: Media (tape) and resolution profiles

pub mod config;

pub use config::{MediaProfile, ResolutionProfile};
