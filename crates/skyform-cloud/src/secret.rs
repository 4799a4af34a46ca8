//! Secret values
//!
//! A [`Secret`] carries a sensitive string (passwords, tokens) through the
//! declaration pipeline. Its value never shows up in `Debug`, `Display` or logs;
//! the engine receives it, and every rendering of a request redacts it.

use std::fmt;

/// Placeholder rendered in place of secret values
pub const REDACTED: &str = "[secret]";

#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the plaintext. Only the engine boundary should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}
