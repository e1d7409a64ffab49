use num_format::{Locale, ToFormattedString};

/// Formats an integer with `,` thousands separators.
#[must_use]
pub fn thousands(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

/// Formats a token amount with `,` thousands separators on the whole part.
///
/// Whole amounts print without a decimal point; fractional amounts keep
/// their shortest decimal form, so `1234.5` becomes `1,234.5`.
#[must_use]
pub fn token_amount(value: f64) -> String {
    let text = value.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let Ok(whole) = whole.parse::<u64>() else {
        return text;
    };

    match fraction {
        Some(fraction) => format!("{sign}{}.{fraction}", thousands(whole)),
        None => format!("{sign}{}", thousands(whole)),
    }
}
