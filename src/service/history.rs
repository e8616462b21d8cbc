//! Streak calculator and history view builder.
//!
//! Pure functions over [`DailySummary`] rows. Nothing here is cached: every
//! view is recomputed from the rows it is given, so edits to past days are
//! reflected the next time a view is built.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DailySummary, Resort};

/// `ever_opened` per date for one terrain.
pub type TerrainCalendar = BTreeMap<NaiveDate, bool>;

/// Snowfall per date for one resort.
pub type SnowCalendar = BTreeMap<NaiveDate, f64>;

/// Cross-sectional view: every resort's terrain rows for one date.
pub type DailyView = BTreeMap<Resort, Vec<TerrainDay>>;

/// One terrain's row in the daily view.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TerrainDay {
    /// Terrain name.
    pub terrain_name: String,
    /// Whether the terrain opened at any point that day.
    pub ever_opened: bool,
    /// Resort snowfall recorded on the row.
    pub snowfall_24hr: f64,
    /// Consecutive closed days ending at the view's date.
    pub closed_streak: u32,
}

/// Longitudinal matrix across every recorded date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FullHistory {
    /// Distinct dates, ascending.
    #[schema(value_type = Vec<String>)]
    pub dates: Vec<NaiveDate>,
    /// `"resort|terrain"` to date to `ever_opened`.
    #[schema(value_type = Object)]
    pub terrain: BTreeMap<String, TerrainCalendar>,
    /// Resort to date to snowfall; the first row seen per resort/date wins.
    #[schema(value_type = Object)]
    pub snow: BTreeMap<Resort, SnowCalendar>,
}

impl FullHistory {
    /// Builds the matrix from daily rows.
    ///
    /// Rows are stably sorted by date first, so within a date the caller's
    /// order decides which terrain row supplies the resort's snowfall.
    #[must_use]
    pub fn from_rows(rows: &[DailySummary]) -> Self {
        let mut ordered: Vec<&DailySummary> = rows.iter().collect();
        ordered.sort_by_key(|row| row.date);

        let mut history = Self::default();
        for row in ordered {
            if history.dates.last() != Some(&row.date) {
                history.dates.push(row.date);
            }
            history
                .terrain
                .entry(row.key_string())
                .or_default()
                .insert(row.date, row.ever_opened);
            history
                .snow
                .entry(row.resort)
                .or_default()
                .entry(row.date)
                .or_insert(row.snowfall_24hr);
        }
        history
    }
}

/// Consecutive closed days for a terrain ending at `date`.
///
/// Zero when `date` has no row or the terrain opened that day. Otherwise
/// counts `date` itself plus each directly preceding day whose row exists
/// and never opened; the first missing or opened day ends the count.
#[must_use]
pub fn closed_streak(history: &TerrainCalendar, date: NaiveDate) -> u32 {
    if history.get(&date) != Some(&false) {
        return 0;
    }
    let mut streak = 1;
    let mut day = date;
    while let Some(prev) = day.pred_opt() {
        if history.get(&prev) != Some(&false) {
            break;
        }
        streak += 1;
        day = prev;
    }
    streak
}

/// Projects one terrain's rows to a date calendar.
#[must_use]
pub fn terrain_calendar(rows: &[DailySummary]) -> TerrainCalendar {
    rows.iter().map(|row| (row.date, row.ever_opened)).collect()
}

/// Projects one resort's rows to a snowfall calendar, first row per date
/// wins.
#[must_use]
pub fn snow_calendar(rows: &[DailySummary]) -> SnowCalendar {
    let mut calendar = SnowCalendar::new();
    for row in rows {
        calendar.entry(row.date).or_insert(row.snowfall_24hr);
    }
    calendar
}

/// Builds the view for `date` from rows covering at least that terrain's
/// history up to `date`.
#[must_use]
pub fn daily_view(rows: &[DailySummary], date: NaiveDate) -> DailyView {
    let mut calendars: BTreeMap<String, TerrainCalendar> = BTreeMap::new();
    for row in rows {
        calendars
            .entry(row.key_string())
            .or_default()
            .insert(row.date, row.ever_opened);
    }

    let mut view = DailyView::new();
    for row in rows.iter().filter(|row| row.date == date) {
        let closed_streak = calendars
            .get(&row.key_string())
            .map_or(0, |calendar| closed_streak(calendar, date));
        view.entry(row.resort).or_default().push(TerrainDay {
            terrain_name: row.terrain_name.clone(),
            ever_opened: row.ever_opened,
            snowfall_24hr: row.snowfall_24hr,
            closed_streak,
        });
    }
    view
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(2025, 3, d) else {
            panic!("valid date");
        };
        date
    }

    fn row(resort: Resort, terrain: &str, d: u32, ever_opened: bool, snow: f64) -> DailySummary {
        DailySummary {
            resort,
            terrain_name: terrain.to_string(),
            date: day(d),
            ever_opened,
            snowfall_24hr: snow,
        }
    }

    fn calendar(days: &[(u32, bool)]) -> TerrainCalendar {
        days.iter().map(|(d, opened)| (day(*d), *opened)).collect()
    }

    #[test]
    fn streak_counts_back_to_last_open_day() {
        let history = calendar(&[(1, false), (2, false), (3, true), (4, false), (5, false)]);
        assert_eq!(closed_streak(&history, day(5)), 2);
        assert_eq!(closed_streak(&history, day(2)), 2);
        assert_eq!(closed_streak(&history, day(3)), 0);
        assert_eq!(closed_streak(&history, day(1)), 1);
    }

    #[test]
    fn streak_breaks_on_gap() {
        let history = calendar(&[(1, false), (3, false), (4, false)]);
        assert_eq!(closed_streak(&history, day(4)), 2);
        assert_eq!(closed_streak(&history, day(3)), 1);
    }

    #[test]
    fn streak_is_zero_without_row() {
        let history = calendar(&[(1, false)]);
        assert_eq!(closed_streak(&history, day(2)), 0);
        assert_eq!(closed_streak(&TerrainCalendar::new(), day(2)), 0);
    }

    #[test]
    fn streak_reflects_edited_past_day() {
        let mut history = calendar(&[(1, false), (2, false), (3, false)]);
        assert_eq!(closed_streak(&history, day(3)), 3);
        history.insert(day(2), true);
        assert_eq!(closed_streak(&history, day(3)), 1);
    }

    #[test]
    fn full_history_snow_is_first_wins() {
        let rows = vec![
            row(Resort::Snowbasin, "Allen Peak Tram", 7, true, 4.0),
            row(Resort::Snowbasin, "Strawberry Gondola", 7, false, 6.0),
        ];
        let history = FullHistory::from_rows(&rows);
        let snow = history
            .snow
            .get(&Resort::Snowbasin)
            .and_then(|dates| dates.get(&day(7)))
            .copied();
        assert_eq!(snow, Some(4.0));
    }

    #[test]
    fn full_history_sorts_dates_and_keys_terrain() {
        let rows = vec![
            row(Resort::Brighton, "Milly Bowl", 9, false, 2.0),
            row(Resort::Brighton, "Milly Bowl", 8, true, 1.0),
            row(Resort::Brighton, "Snake Bowl", 9, true, 3.0),
        ];
        let history = FullHistory::from_rows(&rows);
        assert_eq!(history.dates, vec![day(8), day(9)]);
        let Some(milly) = history.terrain.get("brighton|Milly Bowl") else {
            panic!("terrain key present");
        };
        assert_eq!(milly.get(&day(8)), Some(&true));
        assert_eq!(milly.get(&day(9)), Some(&false));
        let Some(snow) = history.snow.get(&Resort::Brighton) else {
            panic!("resort present");
        };
        assert_eq!(snow.get(&day(9)), Some(&2.0));
    }

    #[test]
    fn empty_rows_give_empty_history() {
        let history = FullHistory::from_rows(&[]);
        assert!(history.dates.is_empty());
        assert!(history.terrain.is_empty());
        assert!(history.snow.is_empty());
    }

    #[test]
    fn daily_view_groups_by_resort_with_streaks() {
        let rows = vec![
            row(Resort::Snowbird, "High Baldy", 1, false, 0.0),
            row(Resort::Snowbird, "High Baldy", 2, false, 3.0),
            row(Resort::Snowbird, "Mineral Basin", 2, true, 3.0),
            row(Resort::Brighton, "Milly Bowl", 2, false, 5.0),
        ];
        let view = daily_view(&rows, day(2));
        let Some(snowbird) = view.get(&Resort::Snowbird) else {
            panic!("snowbird present");
        };
        assert_eq!(snowbird.len(), 2);
        let baldy = snowbird.iter().find(|t| t.terrain_name == "High Baldy");
        assert_eq!(baldy.map(|t| t.closed_streak), Some(2));
        let mineral = snowbird.iter().find(|t| t.terrain_name == "Mineral Basin");
        assert_eq!(mineral.map(|t| t.closed_streak), Some(0));
        assert_eq!(view.get(&Resort::Brighton).map(Vec::len), Some(1));
        assert!(daily_view(&rows, day(20)).is_empty());
    }

    #[test]
    fn calendars_project_rows() {
        let rows = vec![
            row(Resort::Solitude, "Summit Express", 4, true, 1.0),
            row(Resort::Solitude, "Honeycomb Canyon", 4, false, 9.0),
            row(Resort::Solitude, "Summit Express", 5, false, 2.0),
        ];
        assert_eq!(snow_calendar(&rows), SnowCalendar::from([(day(4), 1.0), (day(5), 2.0)]));
        let summit: Vec<DailySummary> = rows
            .iter()
            .filter(|r| r.terrain_name == "Summit Express")
            .cloned()
            .collect();
        assert_eq!(
            terrain_calendar(&summit),
            TerrainCalendar::from([(day(4), true), (day(5), false)])
        );
    }
}
