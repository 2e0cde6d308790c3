//! Builders for HAL input structures.
//!
//! Most callers construct profiles with [`ProfileBuilder`], which fills in
//! the usual 3GPP defaults and validates the text limits on `build()`.
//!
//! # Examples
//!
//! ```rust
//! use cellhal::builders::ProfileBuilder;
//! use cellhal::{PdpAuthentication, PdpType};
//!
//! let profile = ProfileBuilder::new(3, "enterprise")
//!     .apn("corp.example")
//!     .pdp_type(PdpType::Ipv4)
//!     .authentication(PdpAuthentication::Chap)
//!     .credentials("device-17", "s3cret")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(profile.username, "device-17");
//! ```

pub mod profile;

pub use profile::ProfileBuilder;
