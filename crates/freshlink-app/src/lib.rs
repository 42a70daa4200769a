#![forbid(unsafe_code)]

//! FreshLink App
//!
//! The screens' logic, with no rendering attached: the navigation flow
//! controller that decides which screen is visible, the auth gate guarding
//! the role-restricted home screens, the buyer catalog view-state, and the
//! registration/login forms with their validation.
//!
//! # Role in FreshLink
//! This crate is where the domain (`freshlink-core`), localization
//! (`freshlink-i18n`), and the runtime (`freshlink-runtime`) meet. A host
//! UI embeds [`FlowModel`] in a `Program`, forwards user actions as
//! [`FlowMsg`] values, and draws whatever the accessors describe.

pub mod catalog_view;
pub mod flow;
pub mod forms;
pub mod gate;

pub use catalog_view::{CatalogView, CategoryFilter};
pub use flow::{FlowModel, FlowMsg, NavigationState, Screen, TransitionPhase};
pub use forms::{LoginForm, RegisterForm, Registration};
pub use gate::{AuthGate, GateView};
