//! Public API module.
//!
//! This module contains the user-facing API of the `cellhal` crate.

pub mod builders;
pub mod conformance;
pub mod models;
pub mod modem;
pub mod raw;
pub mod status;
