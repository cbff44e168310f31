//! Input validation utilities
//!
//! Lengths are counted in characters, not bytes.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{LoginRequest, RegisterRequest};

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let len = username.chars().count();
    if len < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if len > 50 {
        return Err("Username must be at most 50 characters long".to_string());
    }

    Ok(())
}

/// Longest address accepted, per the SMTP path limit
const MAX_EMAIL_LEN: usize = 254;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    match email.chars().count() {
        0 => Err("Email is required".to_string()),
        n if n > MAX_EMAIL_LEN => Err(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LEN
        )),
        _ if !email_regex().is_match(email) => Err("Invalid email format".to_string()),
        _ => Ok(()),
    }
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    Ok(())
}

/// Validate a given or family name
pub fn validate_name(field: &str, name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if len == 0 {
        return Err(format!("{} is required", field));
    }

    if len > 50 {
        return Err(format!("{} must be at most 50 characters long", field));
    }

    Ok(())
}

impl RegisterRequest {
    /// Validate every field, reporting the first failure
    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_name("First name", &self.first_name)?;
        validate_name("Last name", &self.last_name)
    }
}

impl LoginRequest {
    /// Validate every field, reporting the first failure
    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}
