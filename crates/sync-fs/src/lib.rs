//! Filesystem primitives for Routesync
//!
//! Provides route-path validation and the locked, append-only file
//! operations the session log is built on.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use path::{PathRole, ValidationError, normalize, validate};
