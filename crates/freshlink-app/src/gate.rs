#![forbid(unsafe_code)]

//! Authentication gate for role-restricted screens.
//!
//! The gate consumes session observations and answers one question: may
//! the wrapped screen render? Until the first observation arrives the
//! answer is "show a loading placeholder" — never a redirect, because no
//! routing decision is valid while the session is still resolving. The
//! subscription that feeds the gate is declared by the flow model and
//! released by the runtime's reconcile on every exit path.

use freshlink_core::{IdentityId, SessionState};

/// What the surrounding screen should present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    /// First observation still pending.
    Loading,
    /// No identity: go to Register, replacing history so back-navigation
    /// cannot land on the protected screen.
    RedirectToRegister,
    /// Authenticated: render the wrapped screen.
    Content(IdentityId),
}

/// Session-state follower for one protected screen.
#[derive(Debug, Default)]
pub struct AuthGate {
    session: SessionState,
}

impl AuthGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an observation. Called for the immediate observation on
    /// subscribe and for every change after it.
    pub fn observe(&mut self, identity: Option<IdentityId>) {
        self.session.resolve(identity);
    }

    /// Forget everything; the next mount starts from a fresh check.
    pub fn reset(&mut self) {
        self.session = SessionState::Checking;
    }

    pub fn is_checking(&self) -> bool {
        self.session.is_checking()
    }

    pub fn view(&self) -> GateView {
        match &self.session {
            SessionState::Checking => GateView::Loading,
            SessionState::SignedOut => GateView::RedirectToRegister,
            SessionState::SignedIn(id) => GateView::Content(id.clone()),
        }
    }
}
