#![forbid(unsafe_code)]

//! Localization for FreshLink.
//!
//! Provides externalized string storage with key-based lookup and a
//! locale fallback chain, plus the persisted per-device locale preference.
//!
//! # Role in FreshLink
//! Every screen used to carry its own translation table; this crate
//! consolidates them into one bundle indexed by `(locale, key)` so screens
//! stay deterministic and the tables stay in one place. It does not depend
//! on the runtime or the domain crates, keeping localization reusable and
//! testable on its own.

pub mod catalog;
pub mod preference;

pub use catalog::{CoverageReport, Locale, StringCatalog, UnsupportedLocale};
pub use preference::{FileLocaleStore, LocaleContext, LocaleStore, MemoryLocaleStore};
