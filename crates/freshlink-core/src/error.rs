#![forbid(unsafe_code)]

//! FreshLink error model.
//!
//! # Design Principles
//!
//! 1. **Result everywhere** — screen logic never panics on a failed call.
//! 2. **Domain-specific errors** — each boundary has its own typed error so
//!    callers can match on what matters and let the rest propagate.
//! 3. **Normalized transport failures** — raw network errors are folded into
//!    `Network` variants; their text is logged, never shown to the user.
//! 4. **User-initiated recovery only** — every error maps to a [`Recovery`]
//!    action and a stable message key; nothing is retried automatically.

use std::fmt;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// Authentication service failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong credentials or unknown account.
    InvalidCredentials,
    /// Registration attempted with an email that already has an identity.
    EmailInUse,
    /// The service rejected the password as too weak.
    WeakPassword,
    /// The call never completed; the payload is transport detail for logs.
    Network(String),
}

/// Profile store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    Network(String),
    PermissionDenied,
}

/// A registration field the user can correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    Email,
    Password,
    Address,
    Age,
    SellerCategory,
    Items,
    IdPhoto,
    FacePhoto,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Password => "password",
            Self::Address => "address",
            Self::Age => "age",
            Self::SellerCategory => "sellerCategory",
            Self::Items => "items",
            Self::IdPhoto => "idPhoto",
            Self::FacePhoto => "facePhoto",
        }
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    InvalidEmail,
    PasswordTooShort { min: usize },
    AgeNotANumber,
    AgeOutOfRange { min: u8, max: u8 },
    /// A seller must list at least one item.
    ItemsRequired,
}

/// Field-level validation failure. The form is not submitted while any of
/// these are outstanding, so no network call is ever made on invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }
}

/// Navigation flow failures after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Authenticated, but the profile is missing or its role is
    /// unrecognized. Fatal to routing: the flow stays on the login screen.
    RoleUnresolved { identity: String },
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error for FreshLink flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Auth(AuthError),
    Profile(ProfileError),
    Validation(Vec<FieldError>),
    Flow(FlowError),
}

/// Standard result type for FreshLink APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Recovery ────────────────────────────────────────────────────────────

/// What the user can do about an error. There is no automatic retry path;
/// this is surfaced alongside the message so the screen can decide whether
/// to keep the form editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Correct the highlighted fields and submit again.
    CorrectFields,
    /// The form content was fine; resubmitting may succeed.
    Resubmit,
    /// Nothing the user does on this screen will help.
    Unrecoverable,
}

impl AuthError {
    /// Stable i18n key for the user-visible message.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "errInvalidCredentials",
            Self::EmailInUse => "errEmailInUse",
            Self::WeakPassword => "errWeakPassword",
            Self::Network(_) => "errNetwork",
        }
    }
}

impl ProfileError {
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Network(_) => "errNetwork",
            Self::PermissionDenied => "errPermissionDenied",
        }
    }
}

impl FieldErrorKind {
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Required => "errRequired",
            Self::InvalidEmail => "errInvalidEmail",
            Self::PasswordTooShort { .. } => "errWeakPassword",
            Self::AgeNotANumber => "errAgeNotANumber",
            Self::AgeOutOfRange { .. } => "errAgeOutOfRange",
            Self::ItemsRequired => "errItemsRequired",
        }
    }
}

impl FlowError {
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::RoleUnresolved { .. } => "errRoleUnresolved",
        }
    }
}

impl Error {
    /// The recovery action available to the user.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Validation(_) => Recovery::CorrectFields,
            Self::Auth(AuthError::InvalidCredentials) => Recovery::Resubmit,
            Self::Auth(AuthError::EmailInUse) => Recovery::CorrectFields,
            Self::Auth(AuthError::WeakPassword) => Recovery::CorrectFields,
            Self::Auth(AuthError::Network(_)) => Recovery::Resubmit,
            Self::Profile(ProfileError::Network(_)) => Recovery::Resubmit,
            Self::Profile(ProfileError::PermissionDenied) => Recovery::Resubmit,
            Self::Flow(FlowError::RoleUnresolved { .. }) => Recovery::Unrecoverable,
        }
    }

    /// Error class label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Profile(_) => "profile",
            Self::Validation(_) => "validation",
            Self::Flow(_) => "flow",
        }
    }

    /// Stable i18n key for the banner message. Validation errors are
    /// surfaced per field, so the unified key is a generic prompt.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.message_key(),
            Self::Profile(e) => e.message_key(),
            Self::Validation(_) => "errCheckFields",
            Self::Flow(e) => e.message_key(),
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::EmailInUse => write!(f, "email already in use"),
            Self::WeakPassword => write!(f, "password too weak"),
            Self::Network(detail) => write!(f, "auth network failure: {detail}"),
        }
    }
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(detail) => write!(f, "profile network failure: {detail}"),
            Self::PermissionDenied => write!(f, "profile access denied"),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldErrorKind::Required => write!(f, "{} is required", self.field.as_str()),
            FieldErrorKind::InvalidEmail => write!(f, "{} is not an email", self.field.as_str()),
            FieldErrorKind::PasswordTooShort { min } => {
                write!(f, "password shorter than {min} characters")
            }
            FieldErrorKind::AgeNotANumber => write!(f, "age is not a number"),
            FieldErrorKind::AgeOutOfRange { min, max } => {
                write!(f, "age outside {min}..={max}")
            }
            FieldErrorKind::ItemsRequired => write!(f, "at least one item required"),
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleUnresolved { identity } => {
                write!(f, "no resolvable role for identity {identity}")
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "{e}"),
            Self::Profile(e) => write!(f, "{e}"),
            Self::Validation(errors) => {
                write!(f, "{} invalid field(s):", errors.len())?;
                for e in errors {
                    write!(f, " {e};")?;
                }
                Ok(())
            }
            Self::Flow(e) => write!(f, "{e}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for AuthError {}
impl std::error::Error for ProfileError {}
impl std::error::Error for FlowError {}
impl std::error::Error for Error {}

// ── From conversions ────────────────────────────────────────────────────

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<ProfileError> for Error {
    fn from(err: ProfileError) -> Self {
        Self::Profile(err)
    }
}

impl From<Vec<FieldError>> for Error {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

impl From<FlowError> for Error {
    fn from(err: FlowError) -> Self {
        Self::Flow(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_resubmit() {
        let err: Error = AuthError::InvalidCredentials.into();
        assert_eq!(err.recovery(), Recovery::Resubmit);
        assert_eq!(err.message_key(), "errInvalidCredentials");
    }

    #[test]
    fn email_in_use_needs_field_correction() {
        let err: Error = AuthError::EmailInUse.into();
        assert_eq!(err.recovery(), Recovery::CorrectFields);
    }

    #[test]
    fn network_errors_normalize_to_one_key() {
        let auth: Error = AuthError::Network("dns timeout".into()).into();
        let profile: Error = ProfileError::Network("tls reset".into()).into();
        assert_eq!(auth.message_key(), "errNetwork");
        assert_eq!(profile.message_key(), "errNetwork");
        // Transport detail stays available for logs.
        assert!(auth.to_string().contains("dns timeout"));
    }

    #[test]
    fn validation_blocks_with_field_errors() {
        let err: Error = vec![
            FieldError::new(Field::Items, FieldErrorKind::ItemsRequired),
            FieldError::new(Field::Email, FieldErrorKind::InvalidEmail),
        ]
        .into();
        assert_eq!(err.recovery(), Recovery::CorrectFields);
        assert_eq!(err.error_type(), "validation");
        assert!(err.to_string().contains("2 invalid field(s)"));
    }

    #[test]
    fn items_required_has_its_own_key() {
        let e = FieldError::new(Field::Items, FieldErrorKind::ItemsRequired);
        assert_eq!(e.kind.message_key(), "errItemsRequired");
    }

    #[test]
    fn role_unresolved_is_unrecoverable() {
        let err: Error = FlowError::RoleUnresolved {
            identity: "uid-9".into(),
        }
        .into();
        assert_eq!(err.recovery(), Recovery::Unrecoverable);
        assert_eq!(err.message_key(), "errRoleUnresolved");
    }

    #[test]
    fn error_type_labels() {
        let cases: Vec<(Error, &str)> = vec![
            (AuthError::WeakPassword.into(), "auth"),
            (ProfileError::PermissionDenied.into(), "profile"),
            (
                vec![FieldError::new(Field::Age, FieldErrorKind::AgeNotANumber)].into(),
                "validation",
            ),
            (
                FlowError::RoleUnresolved {
                    identity: "u".into(),
                }
                .into(),
                "flow",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.error_type(), expected);
        }
    }

    #[test]
    fn field_error_display_names_the_field() {
        let e = FieldError::new(Field::Address, FieldErrorKind::Required);
        assert!(e.to_string().contains("address"));
    }
}
