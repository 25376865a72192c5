// ============================================================
// IDENTITY FIELD NORMALIZATION
// ============================================================
// Canonicalize raw field values for comparison. Comparison only:
// normalized values are never written back to the store.

use once_cell::sync::Lazy;
use regex::Regex;

use super::identity::IdentityField;

static PHONE_FORMATTING_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());

/// Normalize a raw value for the given identity field.
///
/// Returns `None` for empty or whitespace-only input. An absent value must
/// never compare equal to another absent value, so emptiness is an explicit
/// marker rather than an empty string.
pub fn normalize(field: IdentityField, raw: &str) -> Option<String> {
    let canonical = match field {
        IdentityField::Email | IdentityField::Username => raw.trim().to_lowercase(),
        // Strip whitespace and hyphens only. "+972..." and "0..." forms are
        // compared literally, not folded into one another.
        IdentityField::Phone => PHONE_FORMATTING_PATTERN.replace_all(raw.trim(), "").to_string(),
    };

    if canonical.is_empty() {
        None
    } else {
        Some(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_case_folded_and_trimmed() {
        assert_eq!(
            normalize(IdentityField::Email, "  A@X.Com "),
            Some("a@x.com".to_string())
        );
    }

    #[test]
    fn test_username_case_folded() {
        assert_eq!(
            normalize(IdentityField::Username, "ALICE"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_phone_formatting_stripped() {
        assert_eq!(
            normalize(IdentityField::Phone, "050-123-4567"),
            Some("0501234567".to_string())
        );
        assert_eq!(
            normalize(IdentityField::Phone, " 050 123 4567 "),
            Some("0501234567".to_string())
        );
    }

    #[test]
    fn test_phone_country_prefix_not_folded() {
        let international = normalize(IdentityField::Phone, "+972-50-123-4567");
        let local = normalize(IdentityField::Phone, "050-123-4567");
        assert_eq!(international, Some("+972501234567".to_string()));
        assert_ne!(international, local);
    }

    #[test]
    fn test_empty_input_is_absent() {
        assert_eq!(normalize(IdentityField::Email, ""), None);
        assert_eq!(normalize(IdentityField::Phone, "   "), None);
        assert_eq!(normalize(IdentityField::Username, "\t"), None);
    }

    #[test]
    fn test_phone_of_only_formatting_is_absent() {
        assert_eq!(normalize(IdentityField::Phone, " - - "), None);
    }
}
