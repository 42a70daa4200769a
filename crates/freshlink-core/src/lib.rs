#![forbid(unsafe_code)]

//! FreshLink Core
//!
//! Domain model and service contracts for the FreshLink grocery marketplace
//! front-end: catalog reference data, user profiles, session state, the error
//! taxonomy, and the traits describing the hosted authentication and profile
//! services the app consumes.
//!
//! # Role in FreshLink
//! `freshlink-core` is the vocabulary crate. Every other crate depends on it;
//! it depends on nothing but serde. It carries no screen logic and performs
//! no I/O of its own — the in-memory service fakes exist so flows can be
//! exercised without the hosted backend.

pub mod error;
pub mod product;
pub mod profile;
pub mod services;
pub mod session;

pub use error::{
    AuthError, Error, Field, FieldError, FieldErrorKind, FlowError, ProfileError, Recovery,
};
pub use product::{Category, Product, ProductId, Unit, demo_catalog};
pub use profile::{Role, SellerDetails, UserProfile};
pub use services::{
    AuthService, MemoryProfileStore, MockAuthService, ProfileStore, SessionCallback, SessionWatch,
};
pub use session::{IdentityId, SessionState};
