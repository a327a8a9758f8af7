use unicode_general_category::{get_general_category, GeneralCategory};

/// Splits a message on whitespace runs. Leading and trailing whitespace is
/// ignored, so an empty or blank message yields no tokens.
pub fn tokenize(message: &str) -> Vec<String> {
    message.split_whitespace().map(str::to_owned).collect()
}

/// True when `token` holds a decimal digit (general category Nd) in any
/// script. Superscripts, fractions and roman numerals do not count.
pub fn has_digit(token: &str) -> bool {
    token
        .chars()
        .any(|c| c.is_ascii_digit() || get_general_category(c) == GeneralCategory::DecimalNumber)
}
