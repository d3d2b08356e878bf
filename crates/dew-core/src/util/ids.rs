//! ID normalization utilities.
//!
//! Graph node IDs, reference-book IDs, and domain names share one
//! normalized form: lowercase kebab-case.

/// Normalize an identifier to lowercase kebab-case.
///
/// Trims surrounding whitespace, lowercases, treats underscores as word
/// separators, and collapses runs of whitespace into single hyphens.
///
/// # Examples
///
/// ```
/// use dew_core::util::ids::normalize_id;
///
/// assert_eq!(normalize_id("Economic Evaluations"), "economic-evaluations");
/// assert_eq!(normalize_id("seasonal_energy_savings"), "seasonal-energy-savings");
/// assert_eq!(normalize_id("  Mixed   Case  "), "mixed-case");
/// ```
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join("-")
}
