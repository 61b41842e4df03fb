//! Phone number helpers shared by transports
//!
//! Format enforcement is a transport/service responsibility; this module only
//! provides the common E.164 shape check and the masking helper every
//! transport uses before logging a number.

/// Mask a phone number for logging
///
/// Shows only the last 4 digits of the phone number for security.
///
/// # Example
///
/// ```
/// use pv_core::domain::mask_phone_number;
/// assert_eq!(mask_phone_number("+1234567890"), "+******7890");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    // Phone numbers are opaque strings at this layer, so count chars rather
    // than bytes; slicing at a byte offset would panic on multibyte input.
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible_digits = 4;
    let masked_count = chars.len() - visible_digits;
    let last_digits: String = chars[chars.len() - visible_digits..].iter().collect();

    if phone.starts_with('+') {
        format!("+{}{}", "*".repeat(masked_count - 1), last_digits)
    } else {
        format!("{}{}", "*".repeat(masked_count), last_digits)
    }
}

/// Validate phone number format (E.164)
///
/// Checks if the phone number is in valid E.164 format:
/// - Starts with '+'
/// - Contains only digits after '+'
/// - Length between 10 and 15 digits (excluding '+')
pub fn is_valid_phone_number(phone: &str) -> bool {
    if !phone.starts_with('+') {
        return false;
    }

    let digits = &phone[1..];
    if digits.len() < 10 || digits.len() > 15 {
        return false;
    }

    digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("+1234567890"), "+******7890");
        assert_eq!(mask_phone_number("+12345678901234"), "+**********1234");
        assert_eq!(mask_phone_number("1234567890"), "******7890");
        assert_eq!(mask_phone_number("123"), "***");
        assert_eq!(mask_phone_number("1234"), "****");
    }

    #[test]
    fn test_mask_phone_number_multibyte() {
        // Mistyped numbers can contain multibyte chars; masking must not
        // panic on them and must count chars, not bytes.
        assert_eq!(mask_phone_number("+123456é890"), "+******é890");
        assert_eq!(mask_phone_number("é890"), "****");
        assert_eq!(mask_phone_number("ééééé"), "*éééé");
    }

    #[test]
    fn test_is_valid_phone_number() {
        assert!(is_valid_phone_number("+1234567890"));
        assert!(is_valid_phone_number("+123456789012345"));

        assert!(!is_valid_phone_number("1234567890")); // No plus
        assert!(!is_valid_phone_number("+123")); // Too short
        assert!(!is_valid_phone_number("+1234567890123456")); // Too long
        assert!(!is_valid_phone_number("+123abc4567")); // Contains letters
        assert!(!is_valid_phone_number("+")); // Only plus sign
    }
}
