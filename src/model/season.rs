use chrono::{Datelike, NaiveDate};

/// Month (1-based) on or after which the season starting this calendar year
/// counts as the current one. Regular seasons tip off in October.
pub const DEFAULT_SEASON_START_MONTH: u32 = 10;

/// First season with complete box-score coverage upstream.
pub const DEFAULT_FIRST_SEASON: i32 = 1996;

/// Formats a start year as a season label, e.g. `2023` -> `"2023-24"`.
#[must_use]
pub fn season_label(start_year: i32) -> String {
    format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100))
}

#[must_use]
pub fn current_season_start_year(today: NaiveDate, season_start_month: u32) -> i32 {
    if today.month() >= season_start_month {
        today.year()
    } else {
        today.year() - 1
    }
}

#[must_use]
pub fn current_season(today: NaiveDate, season_start_month: u32) -> String {
    season_label(current_season_start_year(today, season_start_month))
}

/// Every season label from the current season back to `first_season`,
/// newest first. Empty when `first_season` is in the future.
#[must_use]
pub fn seasons_since(first_season: i32, today: NaiveDate, season_start_month: u32) -> Vec<String> {
    let current = current_season_start_year(today, season_start_month);
    (first_season..=current).rev().map(season_label).collect()
}

/// Parses `"2023-24"` into its start year. The two-digit suffix has to be
/// the year after the start year.
#[must_use]
pub fn parse_season_label(label: &str) -> Option<i32> {
    let (start, end) = label.trim().split_once('-')?;
    if start.len() != 4 || end.len() != 2 {
        return None;
    }
    let start_year: i32 = start.parse().ok()?;
    let end_suffix: i32 = end.parse().ok()?;
    if (start_year + 1).rem_euclid(100) == end_suffix {
        Some(start_year)
    } else {
        None
    }
}
