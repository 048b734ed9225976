//! Cell and header canonicalization
//!
//! Raw cells are opaque strings; this module makes them comparable.
//! `canonical_scalar` is the single string form used for set membership,
//! key comparison, and exact-match tests. Header names are reduced to
//! alias-normalized token sequences for header similarity.
//!
//! Boolean parsing runs before decimal parsing, so `"0"` canonicalizes to
//! `"false"`: it compares equal to `"no"` and unequal to `"0.0"`.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Strict decimal-literal gate: no thousand separators, exponents, or
/// currency symbols
static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)$").expect("numeric pattern is valid"));

/// Maximal lowercase alphanumeric runs within a header name
static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("token pattern is valid"));

/// Header token alias table, applied per-token after extraction
///
/// An empty replacement drops the token. This is data, not code: the engine
/// can be retargeted to a different rename vocabulary by editing this table.
pub const HEADER_TOKEN_ALIASES: &[(&str, &str)] = &[
    ("crumb", "breadcrumb"),
    ("crumbs", "breadcrumbs"),
    ("tree", "path"),
    ("details", "desc"),
    ("highlights", "eyecatchers"),
    ("badges", "pills"),
    ("reviews", "rating"),
    ("score", "value"),
    ("qty", "quantity"),
    ("pack", "unit"),
    ("subline", "subheadline"),
    ("is", "has"),
    // low-signal tokens, dropped entirely
    ("amt", ""),
    ("code", ""),
    ("product", ""),
];

static ALIAS_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HEADER_TOKEN_ALIASES.iter().copied().collect());

/// A cell is empty iff it is absent or whitespace-only
pub fn is_empty(value: &str) -> bool {
    value.trim().is_empty()
}

/// Whitespace-trimmed view of a raw cell
pub fn normalize_text(value: &str) -> &str {
    value.trim()
}

/// Parse a cell as a boolean: {true,1,yes,y} / {false,0,no,n}
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parse a cell as a decimal, accepting only plain fixed-notation literals
///
/// Values the 96-bit decimal cannot represent are treated as text by the
/// caller, never as an error.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let s = value.trim();
    if s.is_empty() || !NUMERIC_RE.is_match(s) {
        return None;
    }
    // rust_decimal is stricter than the gate above about degenerate forms
    // such as "+.5" or "5."; rewrite them before parsing.
    let s = s.strip_prefix('+').unwrap_or(s);
    let owned;
    let s = if let Some(rest) = s.strip_prefix('.') {
        owned = format!("0.{rest}");
        owned.as_str()
    } else if let Some(rest) = s.strip_prefix("-.") {
        owned = format!("-0.{rest}");
        owned.as_str()
    } else {
        s.strip_suffix('.').unwrap_or(s)
    };
    Decimal::from_str(s).ok()
}

/// Canonical string form of a raw cell
///
/// Empty -> `""`; boolean -> `"true"`/`"false"`; decimal -> fixed notation
/// with trailing fractional zeros stripped; otherwise the trimmed original.
/// Idempotent: `canonical_scalar(canonical_scalar(x)) == canonical_scalar(x)`.
pub fn canonical_scalar(value: &str) -> String {
    if is_empty(value) {
        return String::new();
    }
    if let Some(b) = parse_bool(value) {
        return if b { "true" } else { "false" }.to_string();
    }
    if let Some(d) = parse_decimal(value) {
        return d.normalize().to_string();
    }
    normalize_text(value).to_string()
}

/// Alias-normalized token sequence of a header name
pub fn header_tokens(name: &str) -> Vec<String> {
    let lowered = name.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| {
            let t = m.as_str();
            ALIAS_MAP.get(t).copied().unwrap_or(t)
        })
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
