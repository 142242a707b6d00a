//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{EventRequest, RegisterRequest};

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err("Password must contain at least one letter and one digit".to_string());
    }

    Ok(())
}

/// Validate an optional personal name field
fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.chars().count() > 100 {
        return Err(format!("{field} must be at most 100 characters long"));
    }

    Ok(())
}

/// Validate a registration payload
pub fn validate_registration(request: &RegisterRequest) -> Result<(), String> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;
    validate_name("First name", &request.first_name)?;
    validate_name("Last name", &request.last_name)?;
    Ok(())
}

/// Validate the descriptive fields of an event.
///
/// Capacity is checked by the event use case.
pub fn validate_event(request: &EventRequest) -> Result<(), String> {
    if request.title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    if request.title.chars().count() > 200 {
        return Err("Title must be at most 200 characters long".to_string());
    }

    if request.location.trim().is_empty() {
        return Err("Location is required".to_string());
    }

    if request.location.chars().count() > 200 {
        return Err("Location must be at most 200 characters long".to_string());
    }

    Ok(())
}
