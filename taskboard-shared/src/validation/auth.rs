/// Sign-up and login form schemas

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{FieldErrors, FormData};

/// Validated credentials ready to send to the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Sign-up form
///
/// Field names on the wire are `email`, `password` and `confirmPassword`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignUpForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(
        min = 6,
        max = 100,
        message = "Password must be between 6 and 100 characters"
    ))]
    pub password: String,

    #[serde(default, rename = "confirmPassword")]
    #[validate(
        length(min = 1, message = "Please confirm your password"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    pub confirm_password: String,
}

impl SignUpForm {
    /// Validates the form; a password mismatch is always reported on
    /// `confirmPassword`.
    pub fn into_credentials(self) -> Result<Credentials, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };
        errors.rename("confirm_password", "confirmPassword");

        errors.into_result(Credentials {
            email: self.email,
            password: self.password,
        })
    }

    /// Data safe to echo back to the form (no passwords)
    pub fn echo(&self) -> FormData {
        echo_email(&self.email)
    }
}

/// Login form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn into_credentials(self) -> Result<Credentials, FieldErrors> {
        let errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        errors.into_result(Credentials {
            email: self.email,
            password: self.password,
        })
    }

    /// Data safe to echo back to the form (no passwords)
    pub fn echo(&self) -> FormData {
        echo_email(&self.email)
    }
}

fn echo_email(email: &str) -> FormData {
    let mut data = FormData::new();
    data.insert("email".to_string(), email.to_string());
    data
}
