//! Field formatting and validation shared by the record types
//!
//! Validation runs before any write is attempted, so a rejected record never
//! reaches the backend or the in-memory collections.

use thiserror::Error;

/// Maximum length of a licence plate after formatting
pub const MAX_PLATE_LEN: usize = 20;

/// A record failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty or blank
    #[error("{entity}: '{field}' is required")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    /// Phone number is not in NNN-NNN form
    #[error("Invalid phone '{0}'. Use the format NNN-NNN")]
    InvalidPhone(String),
    /// Plate is empty or too long
    #[error("Invalid plate '{0}'")]
    InvalidPlate(String),
    /// An auction needs at least one entry
    #[error("Auction needs at least one entry")]
    NoAuctionEntries,
    /// The investigator roster cannot be emptied
    #[error("The investigator roster needs at least one investigator")]
    EmptyRoster,
    /// An auction entry is incomplete or has a non-positive amount
    #[error("Auction entry {index} is invalid: {reason}")]
    InvalidAuctionEntry { index: usize, reason: &'static str },
}

/// Fails with `MissingField` when `value` is blank
pub fn require(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { entity, field });
    }
    Ok(())
}

/// Keeps the digits of `value` and inserts the dash: "1234567" -> "123-456"
pub fn format_phone(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}", &digits[..3], &digits[3..6]),
    }
}

/// True when `phone` is exactly three digits, a dash, three digits
pub fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 7
        && bytes[3] == b'-'
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && bytes[4..].iter().all(u8::is_ascii_digit)
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone(phone.to_string()))
    }
}

/// Upper-cases a plate and truncates it to `MAX_PLATE_LEN` characters
pub fn format_plate(value: &str) -> String {
    value.to_uppercase().chars().take(MAX_PLATE_LEN).collect()
}

pub fn validate_plate(plate: &str) -> Result<(), ValidationError> {
    if plate.trim().is_empty() || plate.chars().count() > MAX_PLATE_LEN {
        return Err(ValidationError::InvalidPlate(plate.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("12"), "12");
        assert_eq!(format_phone("1234"), "123-4");
        assert_eq!(format_phone("(123) 456"), "123-456");
        assert_eq!(format_phone("1234567"), "123-456");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("555-123").is_ok());
        assert_eq!(
            validate_phone("5551234"),
            Err(ValidationError::InvalidPhone("5551234".into()))
        );
        assert!(validate_phone("55-5123").is_err());
        assert!(validate_phone("abc-def").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_plate() {
        assert_eq!(format_plate("abc1d23"), "ABC1D23");
        assert_eq!(format_plate(&"x".repeat(30)).len(), MAX_PLATE_LEN);
        assert!(validate_plate("ABC1D23").is_ok());
        assert!(validate_plate("   ").is_err());
    }

    #[test]
    fn test_require() {
        assert!(require("Gang", "name", "Ballas").is_ok());
        let err = require("Gang", "name", "  ").unwrap_err();
        assert_eq!(err.to_string(), "Gang: 'name' is required");
    }
}
