/// User-facing messages for identity provider failures
///
/// Provider messages are matched case-insensitively against known phrases;
/// anything unrecognised falls back to the provider's own message, then to a
/// generic one.

use crate::backend::BackendError;

const GENERIC_MESSAGE: &str = "An error occurred during authentication. Please try again.";
const NETWORK_MESSAGE: &str = "Network error. Please check your internet connection and try again.";

/// Maps a sign-up / login failure to the message shown on the form
pub fn auth_error_message(error: &BackendError) -> String {
    let raw = match error {
        BackendError::Provider { message, .. } => message.as_str(),
        BackendError::Network(_) => return NETWORK_MESSAGE.to_string(),
        BackendError::Decode(_) => return GENERIC_MESSAGE.to_string(),
    };
    let message = raw.to_lowercase();

    let mapped = if message.contains("user already registered") || message.contains("already registered") {
        Some("An account with this email already exists. Please log in instead.")
    } else if message.contains("invalid login credentials") || message.contains("invalid credentials") {
        Some("Invalid email or password. Please check your credentials and try again.")
    } else if message.contains("email not confirmed") {
        Some("Please confirm your email address before logging in. Check your inbox for a confirmation link.")
    } else if message.contains("too many requests") || message.contains("rate limit") {
        Some("Too many login attempts. Please wait a few minutes and try again.")
    } else if message.contains("network") || message.contains("fetch") {
        Some(NETWORK_MESSAGE)
    } else if message.contains("password") && message.contains("weak") {
        Some("Password is too weak. Please use a stronger password with at least 6 characters.")
    } else if message.contains("invalid email") {
        Some("Please enter a valid email address.")
    } else {
        None
    };

    match mapped {
        Some(text) => text.to_string(),
        None if !raw.is_empty() => raw.to_string(),
        None => GENERIC_MESSAGE.to_string(),
    }
}

/// Whether the failure happened before the provider could answer
pub fn is_network_error(error: &BackendError) -> bool {
    match error {
        BackendError::Network(_) => true,
        BackendError::Provider { message, .. } => {
            let message = message.to_lowercase();
            message.contains("network") || message.contains("fetch")
        }
        BackendError::Decode(_) => false,
    }
}
