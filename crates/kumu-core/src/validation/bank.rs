//! Bank-detail checks for payouts and onboarding.

/// Nine ASCII digits passing the ABA checksum
/// `3(d1+d4+d7) + 7(d2+d5+d8) + (d3+d6+d9) ≡ 0 (mod 10)`.
#[must_use]
pub fn routing_number(routing: &str) -> bool {
    let bytes = routing.as_bytes();
    if bytes.len() != 9 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let d = |i: usize| u32::from(bytes[i] - b'0');
    let checksum = 3 * (d(0) + d(3) + d(6)) + 7 * (d(1) + d(4) + d(7)) + (d(2) + d(5) + d(8));
    checksum % 10 == 0
}

/// Between 4 and 17 ASCII digits, nothing else.
#[must_use]
pub fn account_number(account: &str) -> bool {
    (4..=17).contains(&account.len()) && account.bytes().all(|b| b.is_ascii_digit())
}

/// At least two non-blank characters; letters, whitespace, `&`, `.` and `-`.
#[must_use]
pub fn bank_name(name: &str) -> bool {
    long_enough(name) && name.chars().all(|c| is_name_char(c) || c == '&')
}

/// At least two non-blank characters; letters, whitespace, `.` and `-`.
#[must_use]
pub fn account_holder_name(name: &str) -> bool {
    long_enough(name) && name.chars().all(is_name_char)
}

fn long_enough(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || c == '.' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn aba_checksum() {
        assert!(routing_number("021000021"));
        assert!(routing_number("011000015"));
        assert!(!routing_number("123456789"));
        assert!(!routing_number("02100002"));
        assert!(!routing_number("0210000210"));
        assert!(!routing_number("02100002a"));
        assert!(!routing_number(""));
    }

    #[test]
    fn account_number_length_window() {
        assert!(!account_number("123"));
        assert!(account_number("1234"));
        assert!(account_number("12345678901234567"));
        assert!(!account_number("123456789012345678"));
        assert!(!account_number("1234 5678"));
        assert!(!account_number("١٢٣٤"));
    }

    #[test]
    fn bank_and_holder_names() {
        assert!(bank_name("Chase"));
        assert!(bank_name("Bank of America"));
        assert!(bank_name("AT&T Credit Union"));
        assert!(!bank_name("A"));
        assert!(!bank_name("  B  "));
        assert!(!bank_name("Bank 1"));

        assert!(account_holder_name("Mary-Jane O.Brien"));
        assert!(!account_holder_name("Tom & Jerry"));
        assert!(!account_holder_name("x"));
    }

    proptest! {
        #[test]
        fn account_number_accepts_exact_digit_runs(s in "[0-9]{4,17}") {
            prop_assert!(account_number(&s));
        }

        #[test]
        fn account_number_rejects_short_or_long(s in "[0-9]{0,3}|[0-9]{18,24}") {
            prop_assert!(!account_number(&s));
        }

        #[test]
        fn routing_number_never_accepts_wrong_length(s in "[0-9]{0,8}|[0-9]{10,12}") {
            prop_assert!(!routing_number(&s));
        }

        #[test]
        fn fixing_the_check_digit_makes_any_prefix_valid(prefix in "[0-9]{8}") {
            let digits: Vec<u32> = prefix.bytes().map(|b| u32::from(b - b'0')).collect();
            let partial = 3 * (digits[0] + digits[3] + digits[6])
                + 7 * (digits[1] + digits[4] + digits[7])
                + digits[2] + digits[5];
            let check = (10 - partial % 10) % 10;
            let routing = format!("{}{}", prefix, check);
            prop_assert!(routing_number(&routing));
        }
    }
}
