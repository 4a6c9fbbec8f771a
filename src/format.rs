//! Stateless text helpers. None of these fail: unusable input renders as a placeholder.

use crate::dom::{Dom, Namespace};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use num_traits::ToPrimitive;
use tracing::error;

/// Rendered for dates that can't be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

pub const DEFAULT_LOCALE: &str = "cs-CZ";

/// The largest supported number of decimals. Larger requests are clamped.
pub const MAX_DECIMALS: usize = 100;

/// The default of [`format_number`]'s `decimals` in the page API.
pub const DEFAULT_DECIMALS: usize = 2;

/// Enough fractional digits to print any finite [`f64`] exactly.
const EXACT_PRECISION: usize = 1074;

/// Formats `value` as a calendar date in [`DEFAULT_LOCALE`], e.g. `5. 3. 2024`.
#[must_use]
pub fn format_date(value: &str) -> String {
	format_date_in(value, DEFAULT_LOCALE)
}

/// Formats `value` as a calendar date in `locale`.
///
/// Accepted are RFC 3339 timestamps, which are shown in local time,
/// and ISO 8601 dates or date-times without offset, which are shown as written.
#[must_use]
pub fn format_date_in(value: &str, locale: &str) -> String {
	match parse_date(value) {
		Some(date) => date.format(date_pattern(locale)).to_string(),
		None => INVALID_DATE.to_owned(),
	}
}

/// Formats milliseconds since the Unix epoch as a local calendar date in `locale`.
#[must_use]
pub fn format_timestamp(millis: i64, locale: &str) -> String {
	match DateTime::from_timestamp_millis(millis) {
		Some(utc) => utc.with_timezone(&Local).date_naive().format(date_pattern(locale)).to_string(),
		None => INVALID_DATE.to_owned(),
	}
}

fn parse_date(value: &str) -> Option<NaiveDate> {
	let value = js_trim(value);
	if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
		return Some(timestamp.with_timezone(&Local).date_naive());
	}
	if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
		return Some(date);
	}
	["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
		.iter()
		.find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
		.map(|date_time| date_time.date())
}

fn date_pattern(locale: &str) -> &'static str {
	match locale.to_ascii_lowercase().as_str() {
		"cs" | "cs-cz" | "sk" | "sk-sk" => "%-d. %-m. %Y",
		"de" | "de-de" | "de-at" => "%-d.%-m.%Y",
		"en-us" => "%-m/%-d/%Y",
		"en-gb" => "%d/%m/%Y",
		_ => "%Y-%m-%d",
	}
}

/// Values [`format_number`] accepts.
///
/// Text goes through [`parse_float`], numbers are converted directly.
pub trait Numeric {
	fn to_number(&self) -> f64;
}
impl Numeric for str {
	fn to_number(&self) -> f64 {
		parse_float(self)
	}
}
impl Numeric for String {
	fn to_number(&self) -> f64 {
		parse_float(self)
	}
}
impl<T: Numeric + ?Sized> Numeric for &T {
	fn to_number(&self) -> f64 {
		(**self).to_number()
	}
}
macro_rules! numeric_primitives {
	($($ty:ty),*$(,)?) => {$(
		impl Numeric for $ty {
			fn to_number(&self) -> f64 {
				self.to_f64().unwrap_or(f64::NAN)
			}
		}
	)*};
}
numeric_primitives!(f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Renders `value` with exactly `decimals` fractional digits, e.g. `1.23` for `(1.23456, 2)`.
///
/// Non-numeric input renders as `NaN`.
#[must_use]
pub fn format_number(value: impl Numeric, decimals: usize) -> String {
	to_fixed(value.to_number(), decimals)
}

/// Whether ***JavaScript*** counts `c` as white space or a line terminator.
///
/// Unlike [`char::is_whitespace`], this includes U+FEFF and excludes U+0085.
#[must_use]
pub fn is_js_whitespace(c: char) -> bool {
	matches!(
		c,
		'\t' | '\n' | '\u{b}' | '\u{c}' | '\r' | ' ' | '\u{a0}' | '\u{1680}' | '\u{2000}'..='\u{200a}' | '\u{2028}' | '\u{2029}' | '\u{202f}' | '\u{205f}' | '\u{3000}' | '\u{feff}'
	)
}

/// Trims `text` like `String.prototype.trim`.
#[must_use]
pub fn js_trim(text: &str) -> &str {
	text.trim_matches(is_js_whitespace)
}

/// Parses the longest numeric prefix of `text` after leading whitespace, or returns [`f64::NAN`].
///
/// `"12.5px"` parses as `12.5`, `"  -3e2x"` as `-300`, `"Infinity and beyond"` as infinity.
#[must_use]
pub fn parse_float(text: &str) -> f64 {
	let text = text.trim_start_matches(is_js_whitespace);
	let bytes = text.as_bytes();
	let is_digit = |i: usize| bytes.get(i).map_or(false, u8::is_ascii_digit);

	let mut end = 0;
	if let Some(b'+') | Some(b'-') = bytes.first() {
		end = 1;
	}
	if text[end..].starts_with("Infinity") {
		return if bytes.first() == Some(&b'-') { f64::NEG_INFINITY } else { f64::INFINITY };
	}

	let integer_start = end;
	while is_digit(end) {
		end += 1
	}
	let mut mantissa_digits = end - integer_start;
	if bytes.get(end) == Some(&b'.') {
		let fraction_start = end + 1;
		let mut fraction_end = fraction_start;
		while is_digit(fraction_end) {
			fraction_end += 1
		}
		mantissa_digits += fraction_end - fraction_start;
		if mantissa_digits > 0 {
			end = fraction_end;
		}
	}
	if mantissa_digits == 0 {
		return f64::NAN;
	}

	if let Some(b'e') | Some(b'E') = bytes.get(end) {
		let mut exponent_end = end + 1;
		if let Some(b'+') | Some(b'-') = bytes.get(exponent_end) {
			exponent_end += 1
		}
		if is_digit(exponent_end) {
			while is_digit(exponent_end) {
				exponent_end += 1
			}
			end = exponent_end;
		}
	}

	text[..end].parse().unwrap_or(f64::NAN)
}

/// Fixed-point rendering that rounds ties away from zero on the exact binary value of `x`.
#[must_use]
pub fn to_fixed(x: f64, decimals: usize) -> String {
	let decimals = decimals.min(MAX_DECIMALS);
	if x.is_nan() {
		return "NaN".to_owned();
	}
	if x.is_infinite() {
		return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
	}
	if x.abs() >= 1e21 {
		let exponential = format!("{:e}", x);
		return match exponential.find('e') {
			Some(e) if !exponential[e + 1..].starts_with('-') => format!("{}e+{}", &exponential[..e], &exponential[e + 1..]),
			_ => exponential,
		};
	}

	let exact = format!("{:.*}", EXACT_PRECISION, x.abs());
	let (integer, fraction) = match exact.find('.') {
		Some(dot) => (&exact[..dot], &exact[dot + 1..]),
		None => (exact.as_str(), ""),
	};
	let mut digits: Vec<u8> = integer.bytes().chain(fraction.bytes().take(decimals)).collect();
	if fraction.as_bytes().get(decimals).map_or(false, |&next| next >= b'5') {
		let mut carry = true;
		for digit in digits.iter_mut().rev() {
			if *digit == b'9' {
				*digit = b'0';
			} else {
				*digit += 1;
				carry = false;
				break;
			}
		}
		if carry {
			digits.insert(0, b'1');
		}
	}

	let integer_len = digits.len() - decimals;
	let mut rendered = String::with_capacity(digits.len() + 2);
	if x < 0.0 {
		rendered.push('-');
	}
	rendered.extend(digits[..integer_len].iter().map(|&digit| char::from(digit)));
	if decimals > 0 {
		rendered.push('.');
		rendered.extend(digits[integer_len..].iter().map(|&digit| char::from(digit)));
	}
	rendered
}

/// Makes `value` safe for literal display inside markup by serializing it as a text node.
///
/// Returns an empty string if `dom` can't create the scratch element.
pub fn escape_html<D: Dom>(dom: &D, value: &str) -> String {
	match dom.create_element(Namespace::Html, "div") {
		Some(scratch) => {
			dom.append_text(&scratch, value);
			dom.inner_html(&scratch)
		}
		None => {
			error!("Failed to create scratch element for escaping.");
			String::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fixed_decimals() {
		assert_eq!(format_number(1.23456, 2), "1.23");
		assert_eq!(format_number(2.5, 0), "3");
		assert_eq!(format_number(-2.5, 0), "-3");
		assert_eq!(format_number(0.125, 2), "0.13");
		assert_eq!(format_number(1.005, 2), "1.00"); // 1.00499999999999989…
		assert_eq!(format_number(9.999, 2), "10.00");
		assert_eq!(format_number(42, DEFAULT_DECIMALS), "42.00");
		assert_eq!(format_number(0.5, 0), "1");
		assert_eq!(format_number(-0.0, 2), "0.00");
		assert_eq!(format_number(-0.001, 2), "-0.00");
	}

	#[test]
	fn text_input() {
		assert_eq!(format_number("abc", 2), "NaN");
		assert_eq!(format_number("", 2), "NaN");
		assert_eq!(format_number("12.345kg", 1), "12.3");
		assert_eq!(format_number("  7", 3), "7.000");
		assert_eq!(format_number(String::from("-Infinity"), 2), "-Infinity");
		assert_eq!(format_number(".5", 1), "0.5");
		assert_eq!(format_number("5.", 1), "5.0");
	}

	#[test]
	fn special_values() {
		assert_eq!(format_number(f64::NAN, 2), "NaN");
		assert_eq!(format_number(f64::INFINITY, 2), "Infinity");
		assert_eq!(format_number(1e21, 2), "1e+21");
		assert_eq!(format_number(1.5e300, 2), "1.5e+300");
		assert_eq!(to_fixed(1.0, 500).len(), 2 + MAX_DECIMALS);
	}

	#[test]
	fn float_prefixes() {
		assert_eq!(parse_float("1e3"), 1000.0);
		assert_eq!(parse_float("1e"), 1.0);
		assert_eq!(parse_float("1e+"), 1.0);
		assert_eq!(parse_float("-2.5E-1x"), -0.25);
		assert_eq!(parse_float("+4"), 4.0);
		assert_eq!(parse_float("\u{a0}\t8"), 8.0);
		assert!(parse_float(".").is_nan());
		assert!(parse_float("-").is_nan());
		assert!(parse_float("x1").is_nan());
		assert_eq!(parse_float("Infinityx"), f64::INFINITY);
	}

	#[test]
	fn javascript_whitespace() {
		assert_eq!(js_trim("\u{feff}\u{2028} x\u{3000}\t"), "x");
		assert_eq!(js_trim("\u{feff}"), "");
		assert_eq!(js_trim("\u{85}"), "\u{85}");
		assert_eq!(parse_float("\u{feff}\u{2029}3"), 3.0);
		assert!(parse_float("\u{85}3").is_nan());
	}

	#[test]
	fn czech_dates() {
		assert_eq!(format_date("2024-03-05"), "5. 3. 2024");
		assert_eq!(format_date("2024-12-31T23:59:00"), "31. 12. 2024");
		assert_eq!(format_date("2024-01-02 08:15"), "2. 1. 2024");
		assert_eq!(format_date(" 2024-01-02 "), "2. 1. 2024");
	}

	#[test]
	fn other_locales() {
		assert_eq!(format_date_in("2024-03-05", "en-US"), "3/5/2024");
		assert_eq!(format_date_in("2024-03-05", "en-GB"), "05/03/2024");
		assert_eq!(format_date_in("2024-03-05", "de-DE"), "5.3.2024");
		assert_eq!(format_date_in("2024-03-05", "xx"), "2024-03-05");
	}

	#[test]
	fn offsets_convert_to_local_time() {
		let value = "2024-03-05T23:30:00-05:00";
		let local = DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Local).date_naive();
		assert_eq!(format_date(value), local.format("%-d. %-m. %Y").to_string());
		assert_eq!(format_date_in(value, "en-GB"), local.format("%d/%m/%Y").to_string());
	}

	#[test]
	fn timestamps() {
		let millis = 1_709_632_800_000;
		let local = DateTime::from_timestamp_millis(millis).unwrap().with_timezone(&Local).date_naive();
		assert_eq!(format_timestamp(millis, "cs-CZ"), local.format("%-d. %-m. %Y").to_string());
		assert_eq!(format_timestamp(millis, "xx"), local.format("%Y-%m-%d").to_string());
		assert_eq!(format_timestamp(i64::MAX, "cs-CZ"), INVALID_DATE);
		assert_eq!(format_timestamp(i64::MIN, "cs-CZ"), INVALID_DATE);
	}

	#[test]
	fn invalid_dates() {
		assert_eq!(format_date("tomorrow"), INVALID_DATE);
		assert_eq!(format_date(""), INVALID_DATE);
		assert_eq!(format_date("2024-02-30"), INVALID_DATE);
	}
}
