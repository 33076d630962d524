//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Highest rating shown on the site.
const MAX_STARS: usize = 5;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a rating as a row of star emoji, capped at five.
///
/// Usage in templates: `{{ restaurant.rating|stars }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let count = rating
        .to_string()
        .parse::<usize>()
        .unwrap_or_default()
        .min(MAX_STARS);
    Ok("⭐".repeat(count))
}
