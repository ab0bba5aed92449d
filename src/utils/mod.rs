//! Utility modules
//!
//! This module contains common utilities used throughout the application,
//! including error handling, logging setup, geographic math and helper functions.

pub mod errors;
pub mod logging;
pub mod helpers;
pub mod location;

pub use errors::{BaropotError, Result};
