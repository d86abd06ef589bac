//! Infrastructure layer
//!
//! Handles external processes. This module is the only place where build
//! and render side effects occur.

pub mod process;
