//! NWN2MDK Core Library
//!
//! This crate provides the error type and the small value types
//! shared by the metadata and pipeline crates.

pub mod error;
pub mod types;

pub use error::{Error, HostError, Result, ResultExt};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, HostError, Result, ResultExt};
    pub use crate::types::*;
}
