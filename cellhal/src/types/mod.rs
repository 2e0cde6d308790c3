//! Type definitions and constants.
//!
//! This module contains the contract constants: status codes, buffer
//! capacities and physical value ranges.

pub mod constants;
