#![forbid(unsafe_code)]

//! Persisted locale preference.
//!
//! The selected locale is process-wide state with a single writer: it is
//! loaded once at startup (defaulting to English), and every change the
//! user makes is re-persisted immediately. Screens read it through
//! [`LocaleContext`]; nothing else writes it.

use crate::catalog::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where the locale preference lives between runs.
///
/// The surface is infallible by design: a store that cannot read reports
/// absence, a store that cannot write logs and drops the update. Locale
/// persistence is best-effort; the app must come up either way.
pub trait LocaleStore: Send + Sync {
    fn load(&self) -> Option<Locale>;
    fn store(&self, locale: Locale);
}

/// Volatile store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryLocaleStore {
    slot: Mutex<Option<Locale>>,
}

impl MemoryLocaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn load(&self) -> Option<Locale> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self, locale: Locale) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(locale);
    }
}

impl<S: LocaleStore + ?Sized> LocaleStore for std::sync::Arc<S> {
    fn load(&self) -> Option<Locale> {
        (**self).load()
    }

    fn store(&self, locale: Locale) {
        (**self).store(locale);
    }
}

#[derive(Serialize, Deserialize)]
struct PreferenceDoc {
    locale: String,
}

/// JSON-document store, one small file per device profile.
pub struct FileLocaleStore {
    path: PathBuf,
}

impl FileLocaleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocaleStore for FileLocaleStore {
    fn load(&self) -> Option<Locale> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let doc: PreferenceDoc = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(
                    target: "freshlink.i18n",
                    path = %self.path.display(),
                    %err,
                    "unreadable locale preference, using default"
                );
                return None;
            }
        };
        doc.locale.parse().ok()
    }

    fn store(&self, locale: Locale) {
        let doc = PreferenceDoc {
            locale: locale.as_str().to_string(),
        };
        let json = match serde_json::to_string(&doc) {
            Ok(json) => json,
            Err(_) => return,
        };
        if let Err(err) = fs::write(&self.path, json) {
            tracing::warn!(
                target: "freshlink.i18n",
                path = %self.path.display(),
                %err,
                "failed to persist locale preference"
            );
        }
    }
}

/// The single writer for the process-wide locale.
pub struct LocaleContext {
    locale: Locale,
    store: Box<dyn LocaleStore>,
}

impl LocaleContext {
    /// Load the persisted preference, defaulting to English.
    pub fn init(store: impl LocaleStore + 'static) -> Self {
        let locale = store.load().unwrap_or_default();
        tracing::debug!(target: "freshlink.i18n", locale = %locale, "locale initialized");
        Self {
            locale,
            store: Box::new(store),
        }
    }

    pub fn get(&self) -> Locale {
        self.locale
    }

    /// Update the selection and re-persist immediately.
    pub fn set(&mut self, locale: Locale) {
        if self.locale == locale {
            return;
        }
        self.locale = locale;
        self.store.store(locale);
        tracing::info!(target: "freshlink.i18n", locale = %locale, "locale changed");
    }
}
