use crate::model::RawRecord;

/// Currency signs accepted around a donation amount. Covers the Unicode
/// currency-symbol block plus the legacy Latin-1 signs.
fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '\u{A2}'..='\u{A5}' | '\u{20A0}'..='\u{20C0}')
}

/// Parse a donation or pledge figure as entered in a spreadsheet.
///
/// Currency signs, thousands separators and inner whitespace are ignored,
/// wherever they appear. Accounting negatives `(1,200)` and a leading sign
/// are honored. Any other character rejects the value.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    let (parenthesized, body) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };

    let mut digits = String::with_capacity(body.len());
    let mut sign: Option<char> = None;
    for c in body.chars() {
        match c {
            '0'..='9' | '.' => digits.push(c),
            ',' => {}
            c if c.is_whitespace() || is_currency_symbol(c) => {}
            '-' | '+' if digits.is_empty() && !parenthesized && sign.is_none() => sign = Some(c),
            _ => return None,
        }
    }

    let magnitude = digits.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let negative = parenthesized || sign == Some('-');
    Some(if negative { -magnitude } else { magnitude })
}

/// First candidate whose value parses as an amount, whatever its sign.
pub fn first_number<S: AsRef<str>>(record: &RawRecord, candidates: &[S]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|c| record.get(c.as_ref()))
        .find_map(parse_amount)
}

/// First positive amount among `candidates`, or `0.0`.
pub fn extract_amount<S: AsRef<str>>(record: &RawRecord, candidates: &[S]) -> f64 {
    candidates
        .iter()
        .filter_map(|c| record.get(c.as_ref()))
        .filter_map(parse_amount)
        .find(|v| *v > 0.0)
        .unwrap_or(0.0)
}
