//! Built-in strings68 functions.
//!
//! Every function is a variant of [`Builtin`] with a fixed arity.  The
//! evaluator resolves the name and checks the argument count before any
//! argument is evaluated, then hands the already-evaluated strings to
//! [`call_builtin`].
//!
//! Position and count arguments are digit strings.  They are validated
//! here, never stored as numbers, and reduced (saturated or taken modulo
//! the string length) before any fixed-width conversion so arbitrarily long
//! digit strings cannot overflow.

use regex::Regex;
use tracing::debug;

use super::array;
use super::error::ScriptError;

// ── Builtin table ─────────────────────────────────────────────────────────────

/// A built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Concat,
    Uppercase,
    Lowercase,
    Reverse,
    Length,
    Replace,
    Substring,
    Match,
    Split,
    Get,
    ShiftL,
    ShiftR,
    RotL,
    RotR,
}

impl Builtin {
    pub const ALL: [Builtin; 14] = [
        Builtin::Concat,
        Builtin::Uppercase,
        Builtin::Lowercase,
        Builtin::Reverse,
        Builtin::Length,
        Builtin::Replace,
        Builtin::Substring,
        Builtin::Match,
        Builtin::Split,
        Builtin::Get,
        Builtin::ShiftL,
        Builtin::ShiftR,
        Builtin::RotL,
        Builtin::RotR,
    ];

    /// Look a function up by its source-level name.
    pub fn from_name(name: &str) -> Option<Builtin> {
        Some(match name {
            "concat" => Builtin::Concat,
            "uppercase" => Builtin::Uppercase,
            "lowercase" => Builtin::Lowercase,
            "reverse" => Builtin::Reverse,
            "length" => Builtin::Length,
            "replace" => Builtin::Replace,
            "substring" => Builtin::Substring,
            "match" => Builtin::Match,
            "split" => Builtin::Split,
            "get" => Builtin::Get,
            "shiftl" => Builtin::ShiftL,
            "shiftr" => Builtin::ShiftR,
            "rotl" => Builtin::RotL,
            "rotr" => Builtin::RotR,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Concat => "concat",
            Builtin::Uppercase => "uppercase",
            Builtin::Lowercase => "lowercase",
            Builtin::Reverse => "reverse",
            Builtin::Length => "length",
            Builtin::Replace => "replace",
            Builtin::Substring => "substring",
            Builtin::Match => "match",
            Builtin::Split => "split",
            Builtin::Get => "get",
            Builtin::ShiftL => "shiftl",
            Builtin::ShiftR => "shiftr",
            Builtin::RotL => "rotl",
            Builtin::RotR => "rotr",
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Uppercase | Builtin::Lowercase | Builtin::Reverse | Builtin::Length => 1,
            Builtin::Concat
            | Builtin::Match
            | Builtin::Split
            | Builtin::Get
            | Builtin::ShiftL
            | Builtin::ShiftR
            | Builtin::RotL
            | Builtin::RotR => 2,
            Builtin::Replace | Builtin::Substring => 3,
        }
    }

    /// Fail with `ArityMismatch` unless `got` matches [`arity`](Self::arity).
    pub fn check_arity(self, got: usize) -> Result<(), ScriptError> {
        if got == self.arity() {
            Ok(())
        } else {
            Err(ScriptError::ArityMismatch {
                function: self.name().to_owned(),
                expected: self.arity(),
                got,
            })
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Run a built-in on already-evaluated arguments.
pub fn call_builtin(builtin: Builtin, args: &[String]) -> Result<String, ScriptError> {
    builtin.check_arity(args.len())?;
    let name = builtin.name();

    Ok(match builtin {
        Builtin::Concat => {
            let mut out = String::with_capacity(args[0].len() + args[1].len());
            out.push_str(&args[0]);
            out.push_str(&args[1]);
            out
        }
        Builtin::Uppercase => args[0].to_uppercase(),
        Builtin::Lowercase => args[0].to_lowercase(),
        Builtin::Reverse => args[0].chars().rev().collect(),
        Builtin::Length => args[0].chars().count().to_string(),
        Builtin::Replace => args[0].replace(args[1].as_str(), &args[2]),
        Builtin::Substring => {
            let chars: Vec<char> = args[0].chars().collect();
            let start = parse_count(name, 2, &args[1])?.min(chars.len());
            let end = parse_count(name, 3, &args[2])?.min(chars.len());
            if start >= end {
                String::new()
            } else {
                chars[start..end].iter().collect()
            }
        }
        Builtin::Match => {
            let (s, pattern) = (&args[0], &args[1]);
            let re = Regex::new(pattern).map_err(|e| {
                ScriptError::invalid_argument(
                    name,
                    format!("invalid regex pattern '{pattern}': {e}"),
                )
            })?;
            let found = re.find(s).map(|m| m.as_str()).unwrap_or("");
            debug!(%pattern, input = %s, result = %found, "match");
            found.to_owned()
        }
        Builtin::Split => {
            let (s, sep) = (&args[0], &args[1]);
            if sep.is_empty() {
                array::encode(s.chars().map(String::from))
            } else {
                array::encode(s.split(sep.as_str()))
            }
        }
        Builtin::Get => {
            let items = array::decode(&args[0]);
            let index = parse_count(name, 2, &args[1])?;
            match items.get(index) {
                Some(item) => (*item).to_owned(),
                None => {
                    return Err(ScriptError::IndexOutOfBounds {
                        index: args[1].clone(),
                        length: items.len(),
                    })
                }
            }
        }
        Builtin::ShiftL => {
            let n = parse_count(name, 2, &args[1])?;
            args[0].chars().skip(n).collect()
        }
        Builtin::ShiftR => {
            let n = parse_count(name, 2, &args[1])?;
            let len = args[0].chars().count();
            args[0].chars().take(len.saturating_sub(n)).collect()
        }
        Builtin::RotL => {
            let chars: Vec<char> = args[0].chars().collect();
            let k = digits_mod(name, 2, &args[1], chars.len())?;
            rotate(&chars, k)
        }
        Builtin::RotR => {
            let chars: Vec<char> = args[0].chars().collect();
            let k = digits_mod(name, 2, &args[1], chars.len())?;
            rotate(&chars, (chars.len() - k) % chars.len().max(1))
        }
    })
}

/// `chars[k..] + chars[..k]` for `k < chars.len()` (or an empty slice).
fn rotate(chars: &[char], k: usize) -> String {
    chars[k..].iter().chain(&chars[..k]).collect()
}

// ── Argument accessors ────────────────────────────────────────────────────────

/// Check that `arg` (argument number `pos`, 1-based) is a digit string.
fn check_digits(function: &str, pos: usize, arg: &str) -> Result<(), ScriptError> {
    if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ScriptError::invalid_argument(
            function,
            format!("argument {pos} must be a non-negative integer, got '{arg}'"),
        ))
    }
}

/// Parse a digit-string count, saturating at `usize::MAX`.
pub(crate) fn parse_count(function: &str, pos: usize, arg: &str) -> Result<usize, ScriptError> {
    check_digits(function, pos, arg)?;
    Ok(arg.bytes().fold(0usize, |acc, b| {
        acc.saturating_mul(10).saturating_add(usize::from(b - b'0'))
    }))
}

/// Reduce a digit string modulo `modulus` without materialising it.
/// Returns 0 when `modulus` is 0.
pub(crate) fn digits_mod(
    function: &str,
    pos: usize,
    arg: &str,
    modulus: usize,
) -> Result<usize, ScriptError> {
    check_digits(function, pos, arg)?;
    if modulus == 0 {
        return Ok(0);
    }
    let m = modulus as u128;
    let r = arg
        .bytes()
        .fold(0u128, |acc, b| (acc * 10 + u128::from(b - b'0')) % m);
    Ok(r as usize)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::error::ErrorKind;

    fn call(b: Builtin, args: &[&str]) -> String {
        let args: Vec<String> = args.iter().map(|&s| s.to_owned()).collect();
        call_builtin(b, &args).expect("call failed")
    }

    fn call_err(b: Builtin, args: &[&str]) -> ScriptError {
        let args: Vec<String> = args.iter().map(|&s| s.to_owned()).collect();
        call_builtin(b, &args).expect_err("call should fail")
    }

    #[test]
    fn names_round_trip() {
        for b in Builtin::ALL {
            assert_eq!(Builtin::from_name(b.name()), Some(b));
        }
        assert_eq!(Builtin::from_name("strlen"), None);
        assert_eq!(Builtin::from_name("Concat"), None);
    }

    #[test]
    fn concat() {
        assert_eq!(call(Builtin::Concat, &["Hello", " World"]), "Hello World");
    }

    #[test]
    fn case_folding() {
        assert_eq!(call(Builtin::Uppercase, &["strings68"]), "STRINGS68");
        assert_eq!(call(Builtin::Lowercase, &["MiXeD"]), "mixed");
    }

    #[test]
    fn reverse_by_chars() {
        assert_eq!(call(Builtin::Reverse, &["STRINGS68"]), "86SGNIRTS");
        assert_eq!(call(Builtin::Reverse, &["añb"]), "bña");
    }

    #[test]
    fn length_counts_chars() {
        assert_eq!(call(Builtin::Length, &["hello"]), "5");
        assert_eq!(call(Builtin::Length, &[""]), "0");
        assert_eq!(call(Builtin::Length, &["日本"]), "2");
    }

    #[test]
    fn replace_all() {
        assert_eq!(call(Builtin::Replace, &["a-b-c", "-", "+"]), "a+b+c");
        assert_eq!(call(Builtin::Replace, &["aaa", "aa", "b"]), "ba");
    }

    #[test]
    fn substring_half_open() {
        assert_eq!(call(Builtin::Substring, &["ABCDEF", "1", "4"]), "BCD");
        assert_eq!(call(Builtin::Substring, &["ABCDEF", "0", "6"]), "ABCDEF");
    }

    #[test]
    fn substring_clamps() {
        assert_eq!(call(Builtin::Substring, &["ABCDEF", "4", "99"]), "EF");
        assert_eq!(call(Builtin::Substring, &["ABCDEF", "9", "12"]), "");
        assert_eq!(call(Builtin::Substring, &["ABCDEF", "3", "3"]), "");
        assert_eq!(call(Builtin::Substring, &["ABCDEF", "4", "2"]), "");
    }

    #[test]
    fn match_first_leftmost() {
        assert_eq!(call(Builtin::Match, &["abc123def456", "[0-9]+"]), "123");
        assert_eq!(call(Builtin::Match, &["abc", "[0-9]+"]), "");
    }

    #[test]
    fn match_bad_pattern() {
        let e = call_err(Builtin::Match, &["abc", "("]);
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn split_and_get() {
        let arr = call(Builtin::Split, &["apple,banana,cherry", ","]);
        assert_eq!(call(Builtin::Get, &[&arr, "1"]), "banana");
        assert_eq!(call(Builtin::Get, &[&arr, "0"]), "apple");
        assert_eq!(call(Builtin::Get, &[&arr, "2"]), "cherry");
    }

    #[test]
    fn split_empty_separator_into_chars() {
        let arr = call(Builtin::Split, &["abc", ""]);
        assert_eq!(arr, "3\0a\0b\0c");
    }

    #[test]
    fn split_single_field_is_still_an_array() {
        let arr = call(Builtin::Split, &["abc", ","]);
        assert_eq!(arr, "1\0abc");
        assert_eq!(call(Builtin::Get, &[&arr, "0"]), "abc");
        let e = call_err(Builtin::Get, &[&arr, "1"]);
        assert_eq!(e.to_string(), "Index 1 out of bounds (length: 1)");
    }

    #[test]
    fn split_empty_string_into_chars_has_no_fields() {
        let arr = call(Builtin::Split, &["", ""]);
        assert_eq!(arr, "0\0");
        let e = call_err(Builtin::Get, &[&arr, "0"]);
        assert_eq!(e.kind(), ErrorKind::IndexOutOfBounds);
        assert_eq!(e.to_string(), "Index 0 out of bounds (length: 0)");
    }

    #[test]
    fn split_empty_string_on_separator_has_one_empty_field() {
        let arr = call(Builtin::Split, &["", ","]);
        assert_eq!(call(Builtin::Get, &[&arr, "0"]), "");
    }

    #[test]
    fn get_out_of_bounds() {
        let arr = call(Builtin::Split, &["a,b", ","]);
        let e = call_err(Builtin::Get, &[&arr, "5"]);
        assert_eq!(e.kind(), ErrorKind::IndexOutOfBounds);
        assert_eq!(e.to_string(), "Index 5 out of bounds (length: 2)");
    }

    #[test]
    fn get_on_plain_string() {
        assert_eq!(call(Builtin::Get, &["solo", "0"]), "solo");
        let e = call_err(Builtin::Get, &["solo", "1"]);
        assert_eq!(e.to_string(), "Index 1 out of bounds (length: 1)");
    }

    #[test]
    fn shifts() {
        assert_eq!(call(Builtin::ShiftL, &["ABCDEF", "3"]), "DEF");
        assert_eq!(call(Builtin::ShiftL, &["ABCDEF", "6"]), "");
        assert_eq!(call(Builtin::ShiftL, &["ABCDEF", "0"]), "ABCDEF");
        assert_eq!(call(Builtin::ShiftR, &["ABCDEF", "2"]), "ABCD");
        assert_eq!(call(Builtin::ShiftR, &["ABCDEF", "60"]), "");
    }

    #[test]
    fn shift_rejects_negative() {
        let e = call_err(Builtin::ShiftL, &["ABC", "-1"]);
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            e.to_string(),
            "shiftl: argument 2 must be a non-negative integer, got '-1'"
        );
    }

    #[test]
    fn rotations() {
        assert_eq!(call(Builtin::RotL, &["ABCDEF", "2"]), "CDEFAB");
        assert_eq!(call(Builtin::RotL, &["ABCDEF", "8"]), "CDEFAB");
        assert_eq!(call(Builtin::RotR, &["ABCDEF", "2"]), "EFABCD");
        assert_eq!(call(Builtin::RotR, &["ABCDEF", "6"]), "ABCDEF");
        assert_eq!(call(Builtin::RotL, &["", "5"]), "");
        assert_eq!(call(Builtin::RotR, &["", "0"]), "");
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let huge = "9".repeat(60);
        // 10^60 - 1 ≡ 0 (mod 3) → identity for a 3-char string.
        assert_eq!(call(Builtin::RotL, &["abc", &huge]), "abc");
        assert_eq!(call(Builtin::ShiftL, &["abc", &huge]), "");
        assert_eq!(call(Builtin::Substring, &["abc", "1", &huge]), "bc");
        let e = call_err(Builtin::Get, &["abc", &huge]);
        assert_eq!(e.to_string(), format!("Index {huge} out of bounds (length: 1)"));
    }

    #[test]
    fn non_digit_positions_rejected() {
        for args in [["abc", "x"], ["abc", ""], ["abc", "1.5"], ["abc", " 1"]] {
            let e = call_err(Builtin::RotL, &args);
            assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn arity_is_checked() {
        let e = call_err(Builtin::Concat, &["a"]);
        assert_eq!(e.kind(), ErrorKind::ArityMismatch);
        assert_eq!(e.to_string(), "concat expects 2 arguments, got 1");
    }
}
