#![forbid(unsafe_code)]

//! Registration and login form state.
//!
//! Fields are mutated per keystroke; validation runs only on submit and is
//! all-or-nothing: any outstanding [`FieldError`] blocks submission before
//! a network call can happen. Validation mirrors what the hosted backend
//! would reject anyway (password length) plus the seller requirements the
//! approval workflow depends on.

use freshlink_core::services::MIN_PASSWORD_LEN;
use freshlink_core::{Field, FieldError, FieldErrorKind, Role, SellerDetails, UserProfile};
use std::collections::BTreeSet;

const SELLER_MIN_AGE: u8 = 18;
const SELLER_MAX_AGE: u8 = 100;

fn email_shape_ok(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Comma-separated items text into a trimmed, deduplicated set.
/// `"carrots, beans,,carrots "` yields `{beans, carrots}`.
fn parse_items(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Login ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-keystroke field update. Non-login fields are ignored.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        match field {
            Field::Email => self.email = value.into(),
            Field::Password => self.password = value.into(),
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.email.trim().is_empty() {
            errors.push(FieldError::new(Field::Email, FieldErrorKind::Required));
        } else if !email_shape_ok(self.email.trim()) {
            errors.push(FieldError::new(Field::Email, FieldErrorKind::InvalidEmail));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new(Field::Password, FieldErrorKind::Required));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// ── Registration ────────────────────────────────────────────────────────

/// The validated output of a registration form: credentials for the auth
/// service plus the profile document to write once an identity exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub profile: UserProfile,
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub password: String,
    // Seller-only.
    pub address: String,
    pub age: String,
    pub category: String,
    pub items: String,
    pub id_photo_ref: Option<String>,
    pub face_photo_ref: Option<String>,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            role: Role::Buyer,
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            address: String::new(),
            age: String::new(),
            category: String::new(),
            items: String::new(),
            id_photo_ref: None,
            face_photo_ref: None,
        }
    }
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-keystroke field update. Photo fields record the picked upload ref.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FullName => self.full_name = value,
            Field::Email => self.email = value,
            Field::Password => self.password = value,
            Field::Address => self.address = value,
            Field::Age => self.age = value,
            Field::SellerCategory => self.category = value,
            Field::Items => self.items = value,
            Field::IdPhoto => self.id_photo_ref = Some(value),
            Field::FacePhoto => self.face_photo_ref = Some(value),
        }
    }

    /// Validate and assemble the registration, or report every failing
    /// field at once.
    pub fn validate(&self) -> Result<Registration, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.full_name.trim().is_empty() {
            errors.push(FieldError::new(Field::FullName, FieldErrorKind::Required));
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new(Field::Email, FieldErrorKind::Required));
        } else if !email_shape_ok(self.email.trim()) {
            errors.push(FieldError::new(Field::Email, FieldErrorKind::InvalidEmail));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new(Field::Password, FieldErrorKind::Required));
        } else if self.password.len() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                Field::Password,
                FieldErrorKind::PasswordTooShort {
                    min: MIN_PASSWORD_LEN,
                },
            ));
        }

        let seller = if self.role == Role::Seller {
            Some(self.validate_seller(&mut errors))
        } else {
            None
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let email = self.email.trim().to_string();
        let profile = match seller {
            None => UserProfile::buyer(self.full_name.trim(), email.clone()),
            Some(details) => UserProfile::seller(self.full_name.trim(), email.clone(), details),
        };
        Ok(Registration {
            email,
            password: self.password.clone(),
            profile,
        })
    }

    fn validate_seller(&self, errors: &mut Vec<FieldError>) -> SellerDetails {
        if self.address.trim().is_empty() {
            errors.push(FieldError::new(Field::Address, FieldErrorKind::Required));
        }
        let age = match self.age.trim() {
            "" => {
                errors.push(FieldError::new(Field::Age, FieldErrorKind::Required));
                0
            }
            raw => match raw.parse::<u8>() {
                Ok(age) if (SELLER_MIN_AGE..=SELLER_MAX_AGE).contains(&age) => age,
                Ok(_) => {
                    errors.push(FieldError::new(
                        Field::Age,
                        FieldErrorKind::AgeOutOfRange {
                            min: SELLER_MIN_AGE,
                            max: SELLER_MAX_AGE,
                        },
                    ));
                    0
                }
                Err(_) => {
                    errors.push(FieldError::new(Field::Age, FieldErrorKind::AgeNotANumber));
                    0
                }
            },
        };
        if self.category.trim().is_empty() {
            errors.push(FieldError::new(
                Field::SellerCategory,
                FieldErrorKind::Required,
            ));
        }
        let items = parse_items(&self.items);
        if items.is_empty() {
            errors.push(FieldError::new(Field::Items, FieldErrorKind::ItemsRequired));
        }
        if self.id_photo_ref.is_none() {
            errors.push(FieldError::new(Field::IdPhoto, FieldErrorKind::Required));
        }
        if self.face_photo_ref.is_none() {
            errors.push(FieldError::new(Field::FacePhoto, FieldErrorKind::Required));
        }
        SellerDetails {
            address: self.address.trim().to_string(),
            age,
            category: self.category.trim().to_string(),
            items,
            id_photo_ref: self.id_photo_ref.clone().unwrap_or_default(),
            face_photo_ref: self.face_photo_ref.clone().unwrap_or_default(),
            pending_approval: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_buyer() -> RegisterForm {
        let mut form = RegisterForm::new();
        form.set(Field::FullName, "Amal Perera");
        form.set(Field::Email, "amal@example.com");
        form.set(Field::Password, "secret1");
        form
    }

    fn filled_seller() -> RegisterForm {
        let mut form = filled_buyer();
        form.role = Role::Seller;
        form.set(Field::Address, "12 Lake Rd, Kandy");
        form.set(Field::Age, "34");
        form.set(Field::SellerCategory, "Vegetables");
        form.set(Field::Items, "carrots, beans");
        form.set(Field::IdPhoto, "uploads/nic-1.jpg");
        form.set(Field::FacePhoto, "uploads/face-1.jpg");
        form
    }

    #[test]
    fn buyer_form_validates() {
        let reg = filled_buyer().validate().unwrap();
        assert_eq!(reg.profile.role, Role::Buyer);
        assert!(reg.profile.seller.is_none());
        assert_eq!(reg.email, "amal@example.com");
    }

    #[test]
    fn empty_buyer_form_reports_every_field() {
        let errors = RegisterForm::new().validate().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::FullName, Field::Email, Field::Password]);
    }

    #[test]
    fn malformed_email_is_flagged() {
        for bad in ["amal", "@example.com", "amal@nodot", "a b@example.com"] {
            let mut form = filled_buyer();
            form.set(Field::Email, bad);
            let errors = form.validate().unwrap_err();
            assert!(
                errors.contains(&FieldError::new(Field::Email, FieldErrorKind::InvalidEmail)),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn short_password_is_flagged_locally() {
        let mut form = filled_buyer();
        form.set(Field::Password, "12345");
        let errors = form.validate().unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e.kind,
            FieldErrorKind::PasswordTooShort { min: MIN_PASSWORD_LEN }
        )));
    }

    #[test]
    fn seller_form_validates_and_pends_approval() {
        let reg = filled_seller().validate().unwrap();
        let details = reg.profile.seller.unwrap();
        assert!(details.pending_approval);
        assert_eq!(details.age, 34);
        assert_eq!(
            details.items,
            BTreeSet::from(["carrots".to_string(), "beans".to_string()])
        );
    }

    #[test]
    fn seller_with_empty_items_is_blocked() {
        let mut form = filled_seller();
        form.set(Field::Items, "  ,  , ");
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new(Field::Items, FieldErrorKind::ItemsRequired)]
        );
    }

    #[test]
    fn seller_age_bounds() {
        for (raw, kind) in [
            ("17", FieldErrorKind::AgeOutOfRange { min: 18, max: 100 }),
            ("abc", FieldErrorKind::AgeNotANumber),
            ("300", FieldErrorKind::AgeNotANumber), // overflows u8
            ("", FieldErrorKind::Required),
        ] {
            let mut form = filled_seller();
            form.set(Field::Age, raw);
            let errors = form.validate().unwrap_err();
            assert!(
                errors.contains(&FieldError::new(Field::Age, kind)),
                "age {raw:?}: {errors:?}"
            );
        }
    }

    #[test]
    fn seller_without_photos_is_blocked() {
        let mut form = filled_seller();
        form.id_photo_ref = None;
        form.face_photo_ref = None;
        let errors = form.validate().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::IdPhoto, Field::FacePhoto]);
    }

    #[test]
    fn buyer_ignores_seller_fields() {
        let mut form = filled_buyer();
        form.set(Field::Items, "");
        form.set(Field::Age, "not a number");
        assert!(form.validate().is_ok(), "buyer must not run seller checks");
    }

    #[test]
    fn items_parsing_trims_and_dedupes() {
        let parsed = parse_items("carrots, beans,,carrots ");
        assert_eq!(
            parsed,
            BTreeSet::from(["beans".to_string(), "carrots".to_string()])
        );
    }

    #[test]
    fn login_form_requires_both_fields() {
        let errors = LoginForm::new().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn login_form_accepts_filled_fields() {
        let mut form = LoginForm::new();
        form.set(Field::Email, "amal@example.com");
        form.set(Field::Password, "secret1");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn login_form_ignores_register_only_fields() {
        let mut form = LoginForm::new();
        form.set(Field::Address, "somewhere");
        assert!(form.email.is_empty() && form.password.is_empty());
    }
}
