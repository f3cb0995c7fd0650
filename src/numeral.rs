/// Decode a chapter numeral token (Arabic digits or Roman letters).
///
/// Decoding never fails: unknown symbols count as zero and an all-digit token
/// that does not fit a `u32` decodes to zero. Callers treat 0 as "not a
/// chapter number".
pub fn parse_numeral(token: &str) -> u32 {
    let token = token.trim();
    if token.is_empty() {
        return 0;
    }

    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().unwrap_or(0);
    }

    roman_to_int(token)
}

fn roman_value(symbol: char) -> i64 {
    match symbol.to_ascii_uppercase() {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => 0,
    }
}

/// Right-to-left subtractive decoding: a symbol smaller than its right-hand
/// neighbour is subtracted, otherwise added.
fn roman_to_int(token: &str) -> u32 {
    let mut total: i64 = 0;
    let mut prev = 0;

    for symbol in token.chars().rev() {
        let value = roman_value(symbol);
        if value < prev {
            total -= value;
        } else {
            total += value;
        }
        prev = value;
    }

    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}
