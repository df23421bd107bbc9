//! Base contract system

use pm_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Adds `"<field> is required"` when `value` is missing or blank.
pub fn validate_present(field: &str, value: Option<&str>, errors: &mut ValidationErrors) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.add(field, "is required");
    }
}

/// Adds an error when a provided value is blank.
pub fn validate_not_blank(field: &str, value: Option<&str>, errors: &mut ValidationErrors) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        errors.add(field, "can't be blank");
    }
}

pub fn validate_max_length(
    field: &str,
    value: Option<&str>,
    max: usize,
    errors: &mut ValidationErrors,
) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}

/// Converts `validator` derive output into our error collection, with
/// field names in the camelCase used on the wire.
pub fn from_validator(errors: validator::ValidationErrors) -> ValidationErrors {
    let mut out = ValidationErrors::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", error.code));
            out.add(camel_case(field), message);
        }
    }
    out
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_present() {
        let mut errors = ValidationErrors::new();
        validate_present("title", None, &mut errors);
        validate_present("name", Some("   "), &mut errors);
        validate_present("email", Some("a@b.io"), &mut errors);

        assert!(errors.has_error("title"));
        assert!(errors.has_error("name"));
        assert!(!errors.has_error("email"));
    }

    #[test]
    fn test_validate_not_blank_ignores_missing() {
        let mut errors = ValidationErrors::new();
        validate_not_blank("title", None, &mut errors);
        assert!(errors.is_empty());

        validate_not_blank("title", Some(""), &mut errors);
        assert!(errors.has_error("title"));
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("email"), "email");
    }
}
