//! Route-path validation and normalization
//!
//! Every route side passes through [`validate`] before it reaches the
//! transfer tool. The rules are independent and all must hold: no empty
//! paths, no parent-directory traversal, sources must be absolute, and no
//! shell metacharacters anywhere. Paths that pass are normalized to a
//! canonical separator form.

/// Which side of a route a path belongs to.
///
/// Destinations are resolved against the remote account and may be
/// relative; sources are read locally and must be absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRole {
    Source,
    Destination,
}

impl std::fmt::Display for PathRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathRole::Source => write!(f, "source"),
            PathRole::Destination => write!(f, "destination"),
        }
    }
}

/// Why a route path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("path is empty")]
    Empty,

    #[error("path contains a parent-directory traversal")]
    Traversal,

    #[error("source path must be absolute")]
    NotAbsolute,

    #[error("path contains unsafe character '{0}'")]
    UnsafeCharacter(char),
}

/// Characters that would be dangerous if a path ever reached a shell.
///
/// Arguments are always passed as discrete argv elements, but rejecting
/// these keeps the route table safe against any downstream command
/// construction.
const UNSAFE_CHARS: [char; 7] = [';', '&', '|', '`', '$', '(', ')'];

/// Validate one side of a route and return its normalized form.
pub fn validate(path: &str, role: PathRole) -> Result<String, ValidationError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    // Reject `..` as a path component, in both separator styles.
    if trimmed
        .split(['/', '\\'])
        .any(|component| component == "..")
    {
        return Err(ValidationError::Traversal);
    }

    if let Some(c) = trimmed.chars().find(|c| UNSAFE_CHARS.contains(c)) {
        return Err(ValidationError::UnsafeCharacter(c));
    }

    if role == PathRole::Source && !trimmed.starts_with('/') {
        return Err(ValidationError::NotAbsolute);
    }

    Ok(normalize(trimmed))
}

/// Normalize a path: collapse repeated separators, strip a trailing
/// separator (except for the root itself), substitute root for an empty
/// result.
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut prev_sep = false;

    for c in path.chars() {
        if c == '/' {
            if !prev_sep {
                normalized.push(c);
            }
            prev_sep = true;
        } else {
            normalized.push(c);
            prev_sep = false;
        }
    }

    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }

    if normalized.is_empty() {
        normalized.push('/');
    }

    normalized
}
