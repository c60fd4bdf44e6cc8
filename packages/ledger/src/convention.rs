//! Amount conventions.
//!
//! Amounts are computed and first rendered in the *internal* convention
//! (`1,234.56`: comma thousands separator, dot decimal separator). Reports
//! are read in the *display* convention (`1.234,56`). [`swap_convention`]
//! rewrites already-rendered text from the former to the latter.

use std::sync::LazyLock;

use num_format::{Locale, ToFormattedString as _};
use regex::Regex;

/// Candidate internal-convention amounts: a digit, further digits and
/// commas, a dot, and two fraction digits. Boundaries are checked by
/// [`is_isolated`].
static INTERNAL_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9,]*\.[0-9]{2}").expect("valid regex"));

/// Parses an amount, coercing anything unparseable to `0.0`.
///
/// Commas are read as decimal separators (`"12,50"` is `12.5`). Thousands
/// separators are not understood, so `"1.500,00"` coerces to `0.0`.
/// Non-finite spellings such as `"nan"` or `"inf"` also coerce to `0.0`.
#[must_use]
pub fn parse_or_default(raw: &str) -> f64 {
    raw.replace(',', ".")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Formats `value` in the internal convention with exactly two fraction
/// digits, e.g. `-1,234.56`.
///
/// Rounding works on the exact binary value with ties going to the even
/// digit, so `0.125` renders as `0.12`.
#[must_use]
pub fn format_internal(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let sign = if value.is_sign_negative() { "-" } else { "" };

    match fixed.split_once('.') {
        Some((integer, fraction)) => {
            let grouped = integer.parse::<u128>().map_or_else(
                |_| integer.to_owned(),
                |n| n.to_formatted_string(&Locale::en),
            );
            format!("{sign}{grouped}.{fraction}")
        }
        None => format!("{sign}{fixed}"),
    }
}

/// Formats `value` directly in the display convention, e.g. `1.234,56`.
#[must_use]
pub fn format_display(value: f64) -> String {
    swap_convention(&format_internal(value))
}

/// Rewrites every internal-convention amount in `text` to the display
/// convention, leaving everything else untouched.
///
/// Only substrings shaped like `digit[digits/commas].dd` that are not glued
/// to further digits or dots are rewritten. Each match is converted from
/// its own text, so no value is converted twice. A rejected candidate does
/// not hide a valid amount starting inside it.
#[must_use]
pub fn swap_convention(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(m) = INTERNAL_AMOUNT_RE.find_at(text, pos) {
        let converted = is_isolated(text, m.start(), m.end())
            .then(|| to_display(m.as_str()))
            .flatten();
        let Some(converted) = converted else {
            // matches start with an ASCII digit
            pos = m.start() + 1;
            continue;
        };
        out.push_str(&text[last..m.start()]);
        out.push_str(&converted);
        last = m.end();
        pos = m.end();
    }

    out.push_str(&text[last..]);
    out
}

/// Rejects matches that are part of a longer number (`1.234.56`,
/// `12.345`).
fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    !before.is_some_and(|c| c.is_ascii_digit() || c == '.')
        && !after.is_some_and(|c| c.is_ascii_digit())
}

/// Converts one internal-convention amount (`1,234.56`) to the display
/// convention (`1.234,56`), regrouping the integer digits.
fn to_display(amount: &str) -> Option<String> {
    let (integer, fraction) = amount.split_once('.')?;
    let digits: String = integer.chars().filter(char::is_ascii_digit).collect();
    let integer: u128 = digits.parse().ok()?;

    let grouped = integer.to_formatted_string(&Locale::en).replace(',', ".");
    Some(format!("{grouped},{fraction}"))
}
