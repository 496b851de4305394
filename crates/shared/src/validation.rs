//! Field validators shared by request types.
//!
//! All functions follow the `validator` custom-function signature so they can
//! be used as `#[validate(custom(function = "..."))]`.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 ().-]{4,18}[0-9]$").unwrap();
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]{1,150}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Accepts an empty string (phone is optional) or a plausible phone number.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() || PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(error("phone_format", "Enter a valid phone number"))
    }
}

/// Letters, digits and `@.+-_`, up to 150 characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        Err(error(
            "username_format",
            "Username may contain only letters, digits and @/./+/-/_ characters",
        ))
    }
}

/// Rejects empty or whitespace-only strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "This field may not be blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("").is_ok());
        assert!(validate_phone("+229 97 00 00 00").is_ok());
        assert!(validate_phone("97000000").is_ok());
        assert!(validate_phone("(229) 97-00-00").is_ok());
        assert!(validate_phone("abc").is_err());
        assert!(validate_phone("12").is_err());
    }

    #[test]
    fn test_validate_phone_message() {
        let err = validate_phone("call me").unwrap_err();
        assert_eq!(err.code, "phone_format");
        assert_eq!(err.message.unwrap(), "Enter a valid phone number");
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("koffi.a").is_ok());
        assert!(validate_username("driver+1@zone").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Rue 12").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
