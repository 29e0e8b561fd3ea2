//! Input validation functions
//!
//! Checks applied to domain values before they are written.

use std::collections::HashMap;
use uuid::Uuid;

/// Lowest accepted comment rating
pub const MIN_COMMENT_RATING: i32 = 1;
/// Highest accepted comment rating
pub const MAX_COMMENT_RATING: i32 = 5;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| format!("Invalid email pattern: {e}"))?;
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate a login name
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.chars().any(char::is_whitespace) {
        return Err("Username cannot contain whitespace".to_string());
    }
    if username.len() > 64 {
        return Err("Username too long".to_string());
    }
    Ok(())
}

/// Validate a comment rating
pub fn validate_comment_rating(rating: i32) -> Result<(), String> {
    if !(MIN_COMMENT_RATING..=MAX_COMMENT_RATING).contains(&rating) {
        return Err(format!(
            "Rating must be between {MIN_COMMENT_RATING} and {MAX_COMMENT_RATING}"
        ));
    }
    Ok(())
}

/// Validate comment text
pub fn validate_comment_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Comment text cannot be empty".to_string());
    }
    Ok(())
}

/// Validate number of servings
pub fn validate_servings(servings: i32) -> Result<(), String> {
    if servings <= 0 {
        return Err("Number of servings must be positive".to_string());
    }
    Ok(())
}

/// Validate cooking time in minutes
pub fn validate_time_to_cook(minutes: i32) -> Result<(), String> {
    if minutes < 0 {
        return Err("Time to cook cannot be negative".to_string());
    }
    Ok(())
}

/// Validate the name of a recipe step
pub fn validate_step_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Step name cannot be empty".to_string());
    }
    Ok(())
}

/// Words of `text` present in the keyword map, case-insensitive
///
/// The map is the word -> id listing returned by the keyword repository.
pub fn find_keywords<'a>(text: &str, keywords: &'a HashMap<String, Uuid>) -> Vec<&'a str> {
    let mut found: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter_map(|word| {
            let lower = word.to_lowercase();
            keywords
                .get_key_value(lower.as_str())
                .map(|(key, _)| key.as_str())
        })
        .collect();
    found.sort_unstable();
    found.dedup();
    found
}
