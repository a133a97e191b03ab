use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_DIGIT: Regex = Regex::new(r"[^0-9]").unwrap();
}

/// Removes every character that is not an ASCII digit.
pub fn digits_only(input: &str) -> String {
    NON_DIGIT.replace_all(input, "").into_owned()
}

/// Validates a CPF (Brazilian individual taxpayer number).
///
/// Punctuation is ignored, so `"111.444.777-35"` and `"11144477735"` are
/// equivalent. The input must reduce to exactly 11 digits, must not be a
/// single repeated digit, and both mod-11 check digits must match.
///
/// # Examples
/// ```
/// use talho::cpf::validate_cpf;
///
/// assert!(validate_cpf("111.444.777-35"));
/// assert!(!validate_cpf("111.111.111-11"));
/// ```
pub fn validate_cpf(input: &str) -> bool {
    let digits: Vec<u32> = digits_only(input)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Formats a valid CPF as `###.###.###-##`.
pub fn format_cpf(input: &str) -> Option<String> {
    if !validate_cpf(input) {
        return None;
    }
    let d = digits_only(input);
    Some(format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]))
}

// Weights run from len+1 down to 2; a remainder of 10 maps to 0.
fn check_digit(prefix: &[u32]) -> u32 {
    let top = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();

    match sum * 10 % 11 {
        10 => 0,
        r => r,
    }
}
