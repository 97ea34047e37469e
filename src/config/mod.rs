//! User configuration for artdeps.
//!
//! The shared, version-controlled input is the descriptor (see
//! [`crate::descriptor`]). Everything personal lives in the global
//! configuration file handled by [`global`]: the default descriptor path, the
//! default build variant and server URL overrides.

pub mod global;

pub use global::{DEFAULT_DESCRIPTOR, GlobalConfig};
