//! Configuration and constants
//!
//! - [`defaults`] - Default values for the workspace configuration

pub mod defaults;
