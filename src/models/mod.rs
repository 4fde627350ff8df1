pub mod booking;
pub mod hostel;
pub mod room;
pub mod user;

use validator::ValidationError;

/// Accepts international numbers like "+256 700 123 456"; 7 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let chars_ok = phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == ' ' || c == '-');

    if !chars_ok || !(7..=15).contains(&digits) {
        return Err(ValidationError::new("phone"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_international_format() {
        assert!(validate_phone("+256700123456").is_ok());
        assert!(validate_phone("+256 700 123 456").is_ok());
        assert!(validate_phone("0700-123-456").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(validate_phone("not a phone").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("12345678901234567890").is_err());
    }
}
