use bcrypt::BcryptError;
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::config;

/// Hash of a random secret at the configured cost. Sign-in verifies against it
/// when the email is unknown, so both failure paths cost one bcrypt verification.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    hash_password(&Uuid::new_v4().to_string()).unwrap_or_else(|e| {
        tracing::error!("Could not prepare dummy password hash: {}", e);
        String::new()
    })
});

/// Hash with the configured bcrypt cost
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

/// Malformed stored hashes count as a mismatch
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Same work as a real verification, for accounts that do not exist
pub fn verify_against_dummy(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic structural check: one `@`, non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("email is required");
    }
    if email.chars().any(char::is_whitespace) {
        return Err("email must not contain whitespace");
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("email must contain a single @");
    };

    if local.is_empty() {
        return Err("email is missing the local part");
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("email domain is invalid");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let min = config::config().security.min_password_length;
    check_password_length(password, min)
}

fn check_password_length(password: &str, min: usize) -> Result<(), String> {
    if password.chars().count() < min {
        return Err(format!("password must be at least {} characters", min));
    }
    // bcrypt ignores everything past 72 bytes
    if password.len() > 72 {
        return Err("password must be at most 72 bytes".to_string());
    }
    Ok(())
}
