//! Route table loading
//!
//! The route file is a JSON object mapping absolute source paths to
//! destination paths. Object order is declaration order and is the
//! processing order (`serde_json` runs with `preserve_order`). The table
//! is loaded once per session and frozen; edits to the file apply to the
//! next session.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sync_fs::{PathRole, ValidationError, validate};

use crate::error::{Error, Result};

/// One source/destination pair, exactly as declared in the route file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub source: String,
    pub destination: String,
}

impl RouteEntry {
    /// Validate both sides and return the normalized pair.
    ///
    /// A failure on either side fails this entry only; the session moves
    /// on to the next route.
    pub fn validated(&self) -> std::result::Result<ValidatedRoute, ValidationError> {
        let source = validate(&self.source, PathRole::Source)?;
        let destination = validate(&self.destination, PathRole::Destination)?;
        Ok(ValidatedRoute {
            source,
            destination,
        })
    }
}

impl std::fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// A route whose both sides passed validation, paths normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRoute {
    pub source: String,
    pub destination: String,
}

/// Ordered, immutable collection of routes for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Load the route table from a JSON route file.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when the file is missing or
    /// unreadable, is not a JSON object of string values, or declares no
    /// routes. Entries are returned unvalidated, in declaration order.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(path, format!("cannot read route file: {}", e)))?;

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| Error::config(path, format!("invalid JSON: {}", e)))?;

        let map = value
            .as_object()
            .ok_or_else(|| Error::config(path, "route file must be a JSON object"))?;

        let mut entries = Vec::with_capacity(map.len());
        for (source, destination) in map {
            let destination = destination.as_str().ok_or_else(|| {
                Error::config(
                    path,
                    format!("destination for {} must be a string", source),
                )
            })?;
            entries.push(RouteEntry {
                source: source.clone(),
                destination: destination.to_string(),
            });
        }

        if entries.is_empty() {
            return Err(Error::config(path, "route file declares no routes"));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
