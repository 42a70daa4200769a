#![forbid(unsafe_code)]

//! Device session state.
//!
//! The hosted auth service owns the session; this crate only models the
//! snapshot the app observes. A session starts in `Checking` and is resolved
//! asynchronously exactly once per app load, then again on every subsequent
//! sign-in or sign-out event. No redirect decision may be made while the
//! state is still `Checking`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity handle issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Authentication state of the current device user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Resolution in progress; no routing decision is valid yet.
    #[default]
    Checking,
    SignedOut,
    SignedIn(IdentityId),
}

impl SessionState {
    /// Apply an observation from the auth service.
    pub fn resolve(&mut self, identity: Option<IdentityId>) {
        *self = match identity {
            Some(id) => Self::SignedIn(id),
            None => Self::SignedOut,
        };
    }

    /// Whether the first observation is still pending.
    pub fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    pub fn identity(&self) -> Option<&IdentityId> {
        match self {
            Self::SignedIn(id) => Some(id),
            _ => None,
        }
    }
}
