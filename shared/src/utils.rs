// Lenient numeric coercions shared by the date parser and the price aggregates.
// Spreadsheet exports put numbers in text cells all the time ("100", " 24", "12.5 EUR"),
// so both the engine and any presentation layer read them with the same prefix rules.

pub mod lenient {
    /// Reads the leading integer of `s`: leading whitespace, an optional sign, then the
    /// longest run of ASCII digits. Anything after the digits is ignored.
    ///
    /// Returns `None` when no digit follows the optional sign, or when the digits do not
    /// fit in an `i64`.
    pub fn leading_int(s: &str) -> Option<i64> {
        let s = s.trim_start();
        let (negative, rest) = split_sign(s);
        let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return None;
        }
        let magnitude: i64 = rest[..digits_len].parse().ok()?;
        Some(if negative { -magnitude } else { magnitude })
    }

    /// Reads the leading decimal number of `s` (`"10.5"`, `"12abc"`, `".5"`, `"1e3x"`,
    /// `"-Infinity"`). Returns `None` if `s` does not start with a number.
    pub fn leading_float(s: &str) -> Option<f64> {
        let s = s.trim_start();
        let (negative, rest) = split_sign(s);
        let sign = if negative { -1.0 } else { 1.0 };

        if rest.starts_with("Infinity") {
            return Some(sign * f64::INFINITY);
        }

        let bytes = rest.as_bytes();
        let mut end = 0;
        let int_digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
        end += int_digits;

        let mut frac_digits = 0;
        if bytes.get(end) == Some(&b'.') {
            frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
            if int_digits > 0 || frac_digits > 0 {
                end += 1 + frac_digits;
            }
        }
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }

        // An exponent only counts when at least one digit follows it.
        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
                exp_end += 1;
            }
            let exp_digits = bytes[exp_end.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if exp_digits > 0 {
                end = exp_end + exp_digits;
            }
        }

        rest[..end].parse::<f64>().ok().map(|value| sign * value)
    }

    /// Parses the whole of `s` (surrounding whitespace allowed) as a finite number.
    /// Used when typing loosely-typed text cells, where "12abc" must stay text.
    pub fn exact_number(s: &str) -> Option<f64> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
    }

    fn split_sign(s: &str) -> (bool, &str) {
        if let Some(rest) = s.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix('+') {
            (false, rest)
        } else {
            (false, s)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_leading_int_plain_and_padded() {
            assert_eq!(leading_int("24"), Some(24));
            assert_eq!(leading_int(" 05"), Some(5));
            assert_eq!(leading_int("-3"), Some(-3));
            assert_eq!(leading_int("+7"), Some(7));
        }

        #[test]
        fn test_leading_int_ignores_trailing_text() {
            assert_eq!(leading_int("15T10:00:00"), Some(15));
            assert_eq!(leading_int("2024 "), Some(2024));
        }

        #[test]
        fn test_leading_int_rejects_non_numeric() {
            assert_eq!(leading_int(""), None);
            assert_eq!(leading_int("abc"), None);
            assert_eq!(leading_int("-"), None);
            assert_eq!(leading_int("99999999999999999999999"), None);
        }

        #[test]
        fn test_leading_float_variants() {
            assert_eq!(leading_float("10.5"), Some(10.5));
            assert_eq!(leading_float("12abc"), Some(12.0));
            assert_eq!(leading_float(".5"), Some(0.5));
            assert_eq!(leading_float("5."), Some(5.0));
            assert_eq!(leading_float(" -2.25 EUR"), Some(-2.25));
            assert_eq!(leading_float("1e3x"), Some(1000.0));
            assert_eq!(leading_float("7e"), Some(7.0));
            assert_eq!(leading_float("Infinity"), Some(f64::INFINITY));
        }

        #[test]
        fn test_leading_float_rejects_non_numeric() {
            assert_eq!(leading_float("abc"), None);
            assert_eq!(leading_float(""), None);
            assert_eq!(leading_float("."), None);
            assert_eq!(leading_float("null"), None);
        }

        #[test]
        fn test_exact_number() {
            assert_eq!(exact_number("100"), Some(100.0));
            assert_eq!(exact_number(" 45292.5 "), Some(45292.5));
            assert_eq!(exact_number("12abc"), None);
            assert_eq!(exact_number(""), None);
            assert_eq!(exact_number("NaN"), None);
        }
    }
}
