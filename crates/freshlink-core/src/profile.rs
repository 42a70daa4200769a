#![forbid(unsafe_code)]

//! User profiles as stored in the hosted document store.
//!
//! A profile is written once at registration and read once after each
//! sign-in to pick the home screen. The role is immutable after
//! registration — there is no edit flow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Marketplace role, fixed at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

/// Seller-only registration data. Sellers are manually verified, so new
/// seller profiles always start with `pending_approval = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerDetails {
    pub address: String,
    pub age: u8,
    pub category: String,
    pub items: BTreeSet<String>,
    pub id_photo_ref: String,
    pub face_photo_ref: String,
    pub pending_approval: bool,
}

/// Role and registration data for an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<SellerDetails>,
}

impl UserProfile {
    /// A buyer profile carries no seller block.
    pub fn buyer(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            role: Role::Buyer,
            seller: None,
        }
    }

    /// A seller profile, flagged for manual approval.
    pub fn seller(
        full_name: impl Into<String>,
        email: impl Into<String>,
        mut details: SellerDetails,
    ) -> Self {
        details.pending_approval = true;
        Self {
            full_name: full_name.into(),
            email: email.into(),
            role: Role::Seller,
            seller: Some(details),
        }
    }
}
