//! Centralized identifier and unit normalization.
//!
//! Ledger exports round-trip through spreadsheet tooling, which rewrites
//! numeric-looking identifiers as floats ("30012345" becomes "30012345.0").
//! Every identifier used as a lookup key passes through [`canonical_id`]
//! exactly once, at parse/classification time, so the matching phases never
//! see a float-vs-string key mismatch.

/// Conversion factor from square feet to the canonical square-inch unit
pub const SQUARE_INCHES_PER_SQUARE_FOOT: f64 = 144.0;

/// Normalize an identifier to its canonical string form.
///
/// Numeric values are truncated to an integer and stringified; anything
/// else is passed through trimmed.
///
/// # Examples
///
/// ```
/// use ledger_recon::utils::normalize::canonical_id;
///
/// assert_eq!(canonical_id("30012345.0"), "30012345");
/// assert_eq!(canonical_id("  30012345 "), "30012345");
/// assert_eq!(canonical_id("D-1230055-10001"), "D-1230055-10001");
/// ```
#[must_use]
pub fn canonical_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return format!("{}", value.trunc() as i64);
        }
    }
    trimmed.to_string()
}

/// Normalize an optional identifier field; empty cells become `None`.
#[must_use]
pub fn canonical_id_opt(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(canonical_id(trimmed))
    }
}
