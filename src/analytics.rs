//! Dashboard Analytics
//!
//! Pure transforms from the backend's summary rows and analytics series into
//! what the dashboard shows: totals, the ranked leaderboard, the leader of the
//! day, chart-ready series and the weekly comparison. No I/O happens here.
//!
//! All inputs are already coerced to finite numbers by [`crate::models`], so
//! sums and comparisons never see `NaN`.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{parse_timestamp, AnalyticsSummary, DashboardSummaryRow, Id};

/// Shown instead of an empty weekly comparison chart
pub const NO_WEEKLY_DATA: &str = "No completed sessions in last 7 days.";

/// Hours in the dense today-by-hour series
const HOURS_PER_DAY: u32 = 24;

// ============================================
// Derived types
// ============================================

/// Team-wide minute totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub today_minutes: f64,
    pub all_time_minutes: f64,
}

/// One bar of the weekly-by-day chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPoint {
    pub date: String,
    pub label: String,
    pub minutes: f64,
}

/// One point of the today-by-hour chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourPoint {
    /// Two-digit hour, `"00"` to `"23"`
    pub hour: String,
    pub minutes: f64,
}

/// Summary row joined with weekly minutes and ranked for today
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub user_id: Id,
    pub name: String,
    pub today_minutes: f64,
    pub week_minutes: f64,
    pub all_time_minutes: f64,
    /// 1-based position after sorting
    pub rank_today: usize,
}

/// One bar of the weekly comparison chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBar {
    pub name: String,
    pub minutes: f64,
}

/// Weekly comparison series, or an explicit no-data signal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeekComparison {
    NoData { message: String },
    Bars { bars: Vec<ComparisonBar> },
}

impl WeekComparison {
    pub fn is_empty(&self) -> bool {
        matches!(self, WeekComparison::NoData { .. })
    }
}

// ============================================
// Transforms
// ============================================

/// Sum today's and all-time minutes across every row
pub fn totals(rows: &[DashboardSummaryRow]) -> Totals {
    rows.iter().fold(Totals::default(), |acc, row| Totals {
        today_minutes: acc.today_minutes + row.total_today_minutes,
        all_time_minutes: acc.all_time_minutes + row.total_all_time_minutes,
    })
}

/// Last 7 days, one point per backend bucket, in backend order
pub fn weekly_by_day(analytics: Option<&AnalyticsSummary>) -> Vec<DayPoint> {
    analytics
        .map(|a| a.last_7_days_by_day.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|bucket| DayPoint {
            date: bucket.date.clone(),
            label: format_date_short(&bucket.date),
            minutes: bucket.minutes,
        })
        .collect()
}

/// Dense 24-hour series for today. Missing hours are 0, out-of-range hours
/// are dropped, and a repeated hour keeps its last value.
pub fn today_by_hour(analytics: Option<&AnalyticsSummary>) -> Vec<HourPoint> {
    let mut minutes_by_hour: HashMap<u32, f64> = HashMap::new();

    if let Some(analytics) = analytics {
        for bucket in &analytics.today_by_hour {
            let Some(hour) = bucket.hour else { continue };
            if hour.fract() != 0.0 || hour < 0.0 || hour >= HOURS_PER_DAY as f64 {
                tracing::debug!(hour, "Ignoring out-of-range hour bucket");
                continue;
            }
            minutes_by_hour.insert(hour as u32, bucket.minutes);
        }
    }

    (0..HOURS_PER_DAY)
        .map(|h| HourPoint {
            hour: format!("{:02}", h),
            minutes: minutes_by_hour.get(&h).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Join summary rows with 7-day minutes and rank them.
///
/// Order: today's minutes descending, then weekly minutes descending, then
/// name ascending. `rank_today` is the 1-based position in that order.
pub fn leaderboard(
    rows: &[DashboardSummaryRow],
    analytics: Option<&AnalyticsSummary>,
) -> Vec<LeaderboardRow> {
    let week_minutes: HashMap<String, f64> = analytics
        .map(|a| a.last_7_days_by_user.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|bucket| (bucket.user_id.key(), bucket.minutes))
        .collect();

    let mut board: Vec<LeaderboardRow> = rows
        .iter()
        .map(|row| LeaderboardRow {
            user_id: row.user_id.clone(),
            name: row.name.clone(),
            today_minutes: row.total_today_minutes,
            week_minutes: week_minutes
                .get(&row.user_id.key())
                .copied()
                .unwrap_or(0.0),
            all_time_minutes: row.total_all_time_minutes,
            rank_today: 0,
        })
        .collect();

    board.sort_by(|a, b| {
        desc(a.today_minutes, b.today_minutes)
            .then_with(|| desc(a.week_minutes, b.week_minutes))
            .then_with(|| compare_names(&a.name, &b.name))
    });

    for (idx, row) in board.iter_mut().enumerate() {
        row.rank_today = idx + 1;
    }

    board
}

/// The top-ranked row, unless nobody has logged time today
pub fn leader_of_the_day(board: &[LeaderboardRow]) -> Option<&LeaderboardRow> {
    board.first().filter(|row| row.today_minutes > 0.0)
}

/// Case-insensitive substring filter on name. Order and ranks are kept; a
/// blank query returns every row.
pub fn filter_by_name<'a>(board: &'a [LeaderboardRow], query: &str) -> Vec<&'a LeaderboardRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return board.iter().collect();
    }

    board
        .iter()
        .filter(|row| row.name.to_lowercase().contains(&needle))
        .collect()
}

/// Rows re-sorted by weekly minutes (stable) for the comparison chart
pub fn week_comparison(board: &[LeaderboardRow]) -> WeekComparison {
    if board.iter().all(|row| row.week_minutes <= 0.0) {
        return WeekComparison::NoData {
            message: NO_WEEKLY_DATA.to_string(),
        };
    }

    let mut bars: Vec<ComparisonBar> = board
        .iter()
        .map(|row| ComparisonBar {
            name: row.name.clone(),
            minutes: row.week_minutes,
        })
        .collect();
    bars.sort_by(|a, b| desc(a.minutes, b.minutes));

    WeekComparison::Bars { bars }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// ============================================
// Formatting
// ============================================

/// `"<n> min"`, rounded and never negative
pub fn format_minutes(minutes: f64) -> String {
    let rounded = minutes.round();
    if rounded > 0.0 {
        format!("{:.0} min", rounded)
    } else {
        "0 min".to_string()
    }
}

/// Whole numbers without decimals, fractions as-is
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Short `Mon DD` label for a bucket date; unparsable dates pass through
pub fn format_date_short(raw: &str) -> String {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()));

    match date {
        Some(d) => d.format("%b %d").to_string(),
        None => raw.to_string(),
    }
}

// ============================================
// Snapshot
// ============================================

/// Everything the dashboard renders, derived in one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub totals: Totals,
    pub leader: Option<LeaderboardRow>,
    /// Full ranked board
    pub leaderboard: Vec<LeaderboardRow>,
    /// Rows matching the name filter
    pub filtered: Vec<LeaderboardRow>,
    pub weekly_by_day: Vec<DayPoint>,
    pub today_by_hour: Vec<HourPoint>,
    pub week_comparison: WeekComparison,
}

impl DashboardSnapshot {
    pub fn derive(
        rows: &[DashboardSummaryRow],
        analytics: Option<&AnalyticsSummary>,
        filter: &str,
    ) -> Self {
        let board = leaderboard(rows, analytics);
        let filtered = filter_by_name(&board, filter).into_iter().cloned().collect();

        Self {
            totals: totals(rows),
            leader: leader_of_the_day(&board).cloned(),
            filtered,
            weekly_by_day: weekly_by_day(analytics),
            today_by_hour: today_by_hour(analytics),
            week_comparison: week_comparison(&board),
            leaderboard: board,
        }
    }
}
