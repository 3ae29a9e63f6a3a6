//! Generic form-field checks.

/// Non-empty after trimming.
#[must_use]
pub fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Length in characters, not bytes.
#[must_use]
pub fn min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

#[must_use]
pub fn max_length(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// `local@domain.tld` shape: exactly one `@`, no whitespace, and a dot inside
/// the domain with text on both sides.
#[must_use]
pub fn email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Account passwords need eight characters.
#[must_use]
pub fn password(password: &str) -> bool {
    min_length(password, 8)
}

/// Optional leading `+`, then digits, whitespace, `-` or parentheses, with at
/// least ten digits in total.
#[must_use]
pub fn phone(phone: &str) -> bool {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    if body.is_empty() {
        return false;
    }
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')'));
    allowed && phone.chars().filter(char::is_ascii_digit).count() >= 10
}
