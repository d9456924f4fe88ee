//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Payloads are
//! typed at the API boundary; these helpers reject empty or oversized text
//! before anything reaches the lifecycle core.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: item, cliente, tecnico, username
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: nota fiscal numbers, OM references
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Free text: descricao, annotation texto
pub const MAX_TEXT_LEN: usize = 2000;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is non-empty and within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        validate_required_text(v, field, max_len)?;
    }
    Ok(())
}
