//! Arrays stored inside string values.
//!
//! strings68 has no array type; `split` produces an ordinary string of the
//! form `<count>` [`SEPARATOR`] `<e1>` [`SEPARATOR`] `<e2>` …, and `get` /
//! `foreach` decode it again.  The count header makes one-element and empty
//! arrays distinguishable from plain strings: `split("abc", ",")` is
//! `"1\0abc"` and the empty array is `"0\0"`.
//!
//! String literals cannot express the separator, so user data only contains
//! it when a host injects it.  A string with NUL but without a well-formed
//! header is treated as a plain string.

/// Element separator (NUL).
pub const SEPARATOR: char = '\0';

/// Encode `items` as one array string.
pub fn encode<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut body = String::new();
    let mut count = 0usize;
    for item in items {
        if count > 0 {
            body.push(SEPARATOR);
        }
        body.push_str(item.as_ref());
        count += 1;
    }
    let mut out = count.to_string();
    out.push(SEPARATOR);
    out.push_str(&body);
    out
}

/// Elements of `s`, or `None` if `s` is not an encoded array.
fn parse(s: &str) -> Option<Vec<&str>> {
    let (header, body) = s.split_once(SEPARATOR)?;
    if header.is_empty() || !header.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count: usize = header.parse().ok()?;
    if count == 0 {
        return body.is_empty().then(Vec::new);
    }
    let items: Vec<&str> = body.split(SEPARATOR).collect();
    (items.len() == count).then_some(items)
}

/// Split an array string into its elements.
///
/// Anything that is not an encoded array is a one-element array.
pub fn decode(s: &str) -> Vec<&str> {
    parse(s).unwrap_or_else(|| vec![s])
}

/// Returns `true` if `s` is an encoded array (of any length).
pub fn is_encoded(s: &str) -> bool {
    parse(s).is_some()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
