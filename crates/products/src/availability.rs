//! Shipping availability rule.
//!
//! A product is available for a destination when the destination's resolved
//! city equals the product's distribution center, compared case-insensitively.
//! The fold is per-character Unicode lowercase, independent of locale, with no
//! diacritic normalization: "CURITIBA" matches "curitiba", "São Paulo" does not
//! match "Sao Paulo". Surrounding whitespace is significant.

/// Decide availability from a resolved city and a distribution center.
///
/// Absence on either side yields `false`.
pub fn is_available(resolved_city: Option<&str>, distribution_center: Option<&str>) -> bool {
    match (resolved_city, distribution_center) {
        (Some(city), Some(center)) => eq_ignore_case(city, center),
        _ => false,
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
