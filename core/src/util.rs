//! Shared utility functions

use crate::error::{Result, RouterError};

/// Validate an API key can be used in an HTTP header
///
/// Control characters, DEL and line breaks are rejected; the value must
/// also parse as a `HeaderValue`.
pub fn validate_api_key(api_key: &str, key_name: &str) -> Result<String> {
    let trimmed = api_key.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Err(RouterError::MissingConfig {
            key: key_name.to_string(),
        });
    }

    if let Some((index, ch)) = trimmed.char_indices().find(|(_, ch)| ch.is_control()) {
        return Err(RouterError::InvalidConfig {
            message: format!(
                "{} contains invalid character at position {} ({:#04x})",
                key_name, index, ch as u32
            ),
        });
    }

    trimmed
        .parse::<reqwest::header::HeaderValue>()
        .map_err(|_| RouterError::InvalidConfig {
            message: format!("{} is not a valid HTTP header value", key_name),
        })?;

    Ok(trimmed.to_string())
}

/// Sanitize a base URL for API requests, returning it without a trailing slash
pub fn sanitize_base_url(url: &str, field_name: &str) -> Result<String> {
    let trimmed = url.trim();

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(RouterError::InvalidConfig {
            message: format!("{} must start with 'http://' or 'https://'. Got: {:?}", field_name, trimmed),
        });
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Strip a surrounding markdown code fence (```json ... ```), if present
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
