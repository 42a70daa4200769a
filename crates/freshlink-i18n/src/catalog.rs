#![forbid(unsafe_code)]

//! Keyed string bundle with locale fallback.
//!
//! Lookup order is `(locale, key)`, then `(En, key)`. A key missing from
//! English is a configuration error: it trips a `debug_assert` during
//! development and renders the key verbatim in release builds — resolution
//! never panics in production and never surfaces an error to the user.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Si,
    Ta,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Si, Locale::Ta];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Si => "si",
            Self::Ta => "ta",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unsupported tags are an error; callers typically fall back to [`Locale::En`].
impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "si" => Ok(Self::Si),
            "ta" => Ok(Self::Ta),
            other => Err(UnsupportedLocale(other.to_string())),
        }
    }
}

/// A locale tag outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLocale(pub String);

impl fmt::Display for UnsupportedLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale tag: {}", self.0)
    }
}

impl std::error::Error for UnsupportedLocale {}

/// Translation coverage for one locale, for tooling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageReport {
    pub locale: Locale,
    pub translated: usize,
    pub total: usize,
}

/// The consolidated string bundle.
pub struct StringCatalog {
    tables: HashMap<Locale, HashMap<&'static str, &'static str>>,
}

impl StringCatalog {
    /// Build a catalog from per-locale `(key, string)` tables.
    pub fn from_tables(
        tables: impl IntoIterator<Item = (Locale, &'static [(&'static str, &'static str)])>,
    ) -> Self {
        let tables = tables
            .into_iter()
            .map(|(locale, entries)| (locale, entries.iter().copied().collect()))
            .collect();
        Self { tables }
    }

    /// The built-in bundle covering every FreshLink screen.
    pub fn builtin() -> Self {
        Self::from_tables([
            (Locale::En, EN_TABLE),
            (Locale::Si, SI_TABLE),
            (Locale::Ta, TA_TABLE),
        ])
    }

    /// Resolve `key` for `locale`, falling back to English.
    ///
    /// Missing English keys render verbatim (and assert in debug builds);
    /// see the module docs.
    pub fn resolve(&self, locale: Locale, key: &'static str) -> &'static str {
        if let Some(s) = self.lookup(locale, key) {
            return s;
        }
        if let Some(s) = self.lookup(Locale::En, key) {
            return s;
        }
        debug_assert!(false, "string key {key:?} missing from the English table");
        tracing::warn!(target: "freshlink.i18n", key, "untranslatable key rendered verbatim");
        key
    }

    fn lookup(&self, locale: Locale, key: &str) -> Option<&'static str> {
        self.tables.get(&locale).and_then(|t| t.get(key)).copied()
    }

    /// Whether `key` has an entry for `locale` itself (no fallback).
    pub fn has(&self, locale: Locale, key: &str) -> bool {
        self.tables
            .get(&locale)
            .is_some_and(|t| t.contains_key(key))
    }

    /// Per-locale translation coverage against the English key set.
    pub fn coverage(&self, locale: Locale) -> CoverageReport {
        let english = self.tables.get(&Locale::En).map_or(0, HashMap::len);
        let translated = self
            .tables
            .get(&Locale::En)
            .map_or(0, |en| en.keys().filter(|k| self.has(locale, k)).count());
        CoverageReport {
            locale,
            translated,
            total: english,
        }
    }
}

impl Default for StringCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Built-in tables ─────────────────────────────────────────────────────
// English is the reference table; si/ta cover the user-facing strings and
// fall back to English for the rest.

static EN_TABLE: &[(&str, &str)] = &[
    ("appName", "FreshLink"),
    ("tagline", "Fresh from the farm, straight to you"),
    // Language selection
    ("chooseLanguage", "Choose Your Language"),
    ("chooseLanguageLead", "Please select your preferred language to continue."),
    ("continue", "Continue"),
    // Registration
    ("registerTitle", "Let's Get You SetUP!"),
    ("registerLead", "Please fill the form below to register"),
    ("fullName", "Full Name"),
    ("email", "Email"),
    ("password", "Password"),
    ("buyer", "Buyer"),
    ("seller", "Seller"),
    ("address", "Address"),
    ("age", "Age"),
    ("sellerCategory", "What category do you sell in?"),
    ("sellerItems", "What items do you sell?"),
    ("uploadId", "Upload NIC / ID:"),
    ("uploadFace", "Upload Face Photo:"),
    ("chooseFile", "Choose File"),
    ("register", "Register"),
    ("haveAccount", "Already have an account"),
    ("registerSuccess", "Registered successfully!"),
    // Login
    ("loginTitle", "Welcome Back!"),
    ("loginLead", "Login to your FreshLink account"),
    ("login", "Login"),
    // Buyer home
    ("homeTitle", "Fresh Grocery"),
    ("homeLead", "Deliver to your door"),
    ("searchPlaceholder", "Search for fresh groceries..."),
    ("addToCart", "Add to Cart"),
    ("outOfStock", "Out of Stock"),
    ("back", "Back"),
    ("loading", "Loading..."),
    ("categoryAll", "All"),
    ("categoryVegetables", "Vegetables"),
    ("categoryFruits", "Fruits"),
    ("categoryHerbs", "Herbs"),
    ("categoryOrganic", "Organic"),
    // Errors
    ("errInvalidCredentials", "Incorrect email or password."),
    ("errEmailInUse", "That email is already registered."),
    ("errWeakPassword", "Password must be at least 6 characters."),
    ("errNetwork", "Network problem. Please try again."),
    ("errPermissionDenied", "You do not have permission to do that."),
    ("errRoleUnresolved", "Unknown account type."),
    ("errCheckFields", "Please check the highlighted fields."),
    ("errRequired", "This field is required."),
    ("errInvalidEmail", "Enter a valid email address."),
    ("errAgeNotANumber", "Age must be a number."),
    ("errAgeOutOfRange", "Sellers must be between 18 and 100."),
    ("errItemsRequired", "List at least one item you sell."),
];

static SI_TABLE: &[(&str, &str)] = &[
    ("tagline", "ගොවිපලෙන් නැවුම්ව ඔබ වෙතට"),
    ("chooseLanguage", "ඔබේ භාෂාව තෝරන්න"),
    ("chooseLanguageLead", "ඉදිරියට යාමට ඔබ කැමති භාෂාව තෝරන්න."),
    ("continue", "ඉදිරියට"),
    ("registerTitle", "අපි ඔබව සූදානම් කරමු!"),
    ("registerLead", "ලියාපදිංචි වීමට පහත පෝරමය පුරවන්න"),
    ("fullName", "සම්පූර්ණ නම"),
    ("email", "විද්‍යුත් තැපෑල"),
    ("password", "මුරපදය"),
    ("buyer", "ගැනුම්කරු"),
    ("seller", "විකුණුම්කරු"),
    ("address", "ලිපිනය"),
    ("age", "වයස"),
    ("register", "ලියාපදිංචි වන්න"),
    ("loginTitle", "නැවත සාදරයෙන් පිළිගනිමු!"),
    ("login", "පිවිසෙන්න"),
    ("searchPlaceholder", "නැවුම් භාණ්ඩ සොයන්න..."),
    ("addToCart", "කූඩයට එක් කරන්න"),
    ("outOfStock", "තොග අවසන්"),
    ("back", "ආපසු"),
    ("loading", "පූරණය වෙමින්..."),
    ("categoryAll", "සියල්ල"),
    ("categoryVegetables", "එළවළු"),
    ("categoryFruits", "පලතුරු"),
    ("errInvalidCredentials", "විද්‍යුත් තැපෑල හෝ මුරපදය වැරදියි."),
    ("errNetwork", "ජාල දෝෂයකි. නැවත උත්සාහ කරන්න."),
];

static TA_TABLE: &[(&str, &str)] = &[
    ("tagline", "பண்ணையிலிருந்து நேரடியாக உங்களுக்கு"),
    ("chooseLanguage", "உங்கள் மொழியைத் தேர்ந்தெடுக்கவும்"),
    ("chooseLanguageLead", "தொடர விருப்பமான மொழியைத் தேர்ந்தெடுக்கவும்."),
    ("continue", "தொடரவும்"),
    ("registerTitle", "உங்களைத் தயார்படுத்துவோம்!"),
    ("registerLead", "பதிவு செய்ய கீழே உள்ள படிவத்தை நிரப்பவும்"),
    ("fullName", "முழு பெயர்"),
    ("email", "மின்னஞ்சல்"),
    ("password", "கடவுச்சொல்"),
    ("buyer", "வாங்குபவர்"),
    ("seller", "விற்பனையாளர்"),
    ("address", "முகவரி"),
    ("age", "வயது"),
    ("register", "பதிவு செய்க"),
    ("loginTitle", "மீண்டும் வருக!"),
    ("login", "உள்நுழைய"),
    ("searchPlaceholder", "புதிய பொருட்களைத் தேடுங்கள்..."),
    ("addToCart", "கூடையில் சேர்"),
    ("outOfStock", "கையிருப்பு இல்லை"),
    ("back", "பின்செல்"),
    ("loading", "ஏற்றுகிறது..."),
    ("categoryAll", "அனைத்தும்"),
    ("categoryVegetables", "காய்கறிகள்"),
    ("categoryFruits", "பழங்கள்"),
    ("errInvalidCredentials", "மின்னஞ்சல் அல்லது கடவுச்சொல் தவறு."),
    ("errNetwork", "இணைய சிக்கல். மீண்டும் முயற்சிக்கவும்."),
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn locale_round_trips_through_str() {
        for locale in Locale::ALL {
            assert_eq!(locale.as_str().parse::<Locale>().unwrap(), locale);
        }
    }

    #[test]
    fn unsupported_tag_is_an_error() {
        let err = "xx".parse::<Locale>().unwrap_err();
        assert!(err.to_string().contains("xx"));
    }

    #[test]
    fn sinhala_string_resolves_directly() {
        let catalog = StringCatalog::builtin();
        assert_eq!(catalog.resolve(Locale::Si, "addToCart"), "කූඩයට එක් කරන්න");
    }

    #[test]
    fn tamil_string_resolves_directly() {
        let catalog = StringCatalog::builtin();
        assert_eq!(catalog.resolve(Locale::Ta, "login"), "உள்நுழைய");
    }

    #[test]
    fn untranslated_key_falls_back_to_english() {
        let catalog = StringCatalog::builtin();
        // "uploadId" is intentionally untranslated in si.
        assert!(!catalog.has(Locale::Si, "uploadId"));
        assert_eq!(catalog.resolve(Locale::Si, "uploadId"), "Upload NIC / ID:");
    }

    #[test]
    fn unsupported_locale_parses_to_error_and_default_resolves_english() {
        // Callers map a bad persisted tag to the default locale.
        let locale = "xx".parse::<Locale>().unwrap_or_default();
        let catalog = StringCatalog::builtin();
        assert_eq!(catalog.resolve(locale, "addToCart"), "Add to Cart");
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn missing_key_renders_verbatim_in_release() {
        let catalog = StringCatalog::builtin();
        assert_eq!(catalog.resolve(Locale::En, "noSuchKey"), "noSuchKey");
    }

    #[test]
    #[should_panic(expected = "missing from the English table")]
    #[cfg(debug_assertions)]
    fn missing_key_asserts_in_debug() {
        let catalog = StringCatalog::builtin();
        let _ = catalog.resolve(Locale::En, "noSuchKey");
    }

    #[test]
    fn every_translated_key_exists_in_english() {
        let catalog = StringCatalog::builtin();
        for (key, _) in SI_TABLE.iter().chain(TA_TABLE.iter()) {
            assert!(catalog.has(Locale::En, key), "orphan translation: {key}");
        }
    }

    #[test]
    fn coverage_counts_against_english() {
        let catalog = StringCatalog::builtin();
        let en = catalog.coverage(Locale::En);
        assert_eq!(en.translated, en.total);
        let si = catalog.coverage(Locale::Si);
        assert!(si.translated < si.total);
        assert_eq!(si.translated, SI_TABLE.len());
    }

    proptest! {
        // Resolution of known keys never yields the key itself, whatever
        // the locale: every key is at worst English.
        #[test]
        fn known_keys_always_resolve(idx in 0usize..EN_TABLE.len(), locale_idx in 0usize..3) {
            let catalog = StringCatalog::builtin();
            let (key, english) = EN_TABLE[idx];
            let locale = Locale::ALL[locale_idx];
            let resolved = catalog.resolve(locale, key);
            prop_assert!(!resolved.is_empty());
            if !catalog.has(locale, key) {
                prop_assert_eq!(resolved, english);
            }
        }
    }
}
