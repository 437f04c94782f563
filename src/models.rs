//! Wire Models
//!
//! Types exchanged with the time-tracking backend. Every minutes field is
//! decoded leniently: numbers, numeric strings, `null` and missing values
//! all become a finite `f64`, so nothing downstream ever sees `NaN`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================
// Identifiers
// ============================================

/// Backend identifier (user or session).
///
/// The backend may send ids as JSON numbers or strings. Two ids are equal
/// when their textual forms match, and an id is sent back in the shape it
/// was received. Integral floats such as `7.0` decode as numbers; any other
/// scalar keeps its textual form and `null` becomes an empty id.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Id::Number(i),
                (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Id::Number(f as i64)
                }
                _ => Id::Text(n.to_string()),
            },
            Value::String(s) => Id::Text(s),
            Value::Null => Id::Text(String::new()),
            other => Id::Text(other.to_string()),
        })
    }
}

impl Id {
    /// Textual form used for joins and lookups
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Number(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_string())
    }
}

// ============================================
// Users and sessions
// ============================================

/// A member of the user directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A work session as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub user_id: Option<Id>,
    /// Start timestamp exactly as received
    #[serde(default)]
    pub start_time: Option<String>,
    /// End timestamp; absent while the session is running
    #[serde(default)]
    pub end_time: Option<String>,
    /// Present once the session has ended
    #[serde(
        default,
        deserialize_with = "lenient_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_minutes: Option<f64>,
}

impl WorkSession {
    /// A session is active while it has no end time
    pub fn is_active(&self) -> bool {
        self.end_time.as_deref().map_or(true, |end| end.trim().is_empty())
    }

    /// Parsed start time, `None` when missing or malformed
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_timestamp)
    }
}

// ============================================
// Dashboard aggregates
// ============================================

/// Per-user totals for today and all time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummaryRow {
    pub user_id: Id,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_today_minutes: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_all_time_minutes: f64,
}

/// Time-bucketed series over the trailing 7-day window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(rename = "last7DaysByDay", default)]
    pub last_7_days_by_day: Vec<DayBucket>,
    #[serde(rename = "todayByHour", default)]
    pub today_by_hour: Vec<HourBucket>,
    #[serde(rename = "last7DaysByUser", default)]
    pub last_7_days_by_user: Vec<UserBucket>,
}

/// Minutes worked on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub minutes: f64,
}

/// Minutes worked in one hour of today (only non-zero hours are sent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourBucket {
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub hour: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub minutes: f64,
}

/// Minutes one user worked over the last 7 days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBucket {
    pub user_id: Id,
    #[serde(default, deserialize_with = "lenient_number")]
    pub minutes: f64,
}

// ============================================
// Coercion helpers
// ============================================

/// Coerce an arbitrary JSON value into a finite number.
///
/// Numbers pass through, numeric strings are parsed, everything else
/// (including non-finite results) is 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_number).unwrap_or(0.0))
}

/// Strings pass through, `null` is empty, other scalars keep their JSON text
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_number(&v)),
    })
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` /
/// `YYYY-MM-DD HH:MM:SS[.fff]` timestamp which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    raw.replacen(' ', "T", 1)
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12)), 12.0);
        assert_eq!(coerce_number(&json!(" 7.5 ")), 7.5);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&json!({"m": 3})), 0.0);
    }

    #[test]
    fn test_summary_row_lenient_minutes() {
        let row: DashboardSummaryRow = serde_json::from_value(json!({
            "user_id": 3,
            "name": "Ada",
            "total_today_minutes": "45",
            "total_all_time_minutes": null
        }))
        .unwrap();

        assert_eq!(row.user_id, Id::Number(3));
        assert_eq!(row.total_today_minutes, 45.0);
        assert_eq!(row.total_all_time_minutes, 0.0);
    }

    #[test]
    fn test_analytics_summary_defaults() {
        let summary: AnalyticsSummary = serde_json::from_value(json!({
            "todayByHour": [{"hour": "09", "minutes": 30}]
        }))
        .unwrap();

        assert!(summary.last_7_days_by_day.is_empty());
        assert!(summary.last_7_days_by_user.is_empty());
        assert_eq!(summary.today_by_hour[0].hour, Some(9.0));
        assert_eq!(summary.today_by_hour[0].minutes, 30.0);
    }

    #[test]
    fn test_id_equality_across_shapes() {
        assert_eq!(Id::Number(7), Id::from("7"));
        assert_ne!(Id::Number(7), Id::from("8"));

        let encoded = serde_json::to_value(Id::Number(7)).unwrap();
        assert_eq!(encoded, json!(7));
        let encoded = serde_json::to_value(Id::from("u-7")).unwrap();
        assert_eq!(encoded, json!("u-7"));
    }

    #[test]
    fn test_lenient_ids_and_names() {
        let users: Vec<User> = serde_json::from_value(json!([
            {"id": 7.0, "name": null},
            {"id": 7.5, "name": 42},
            {"id": "g-2"}
        ]))
        .unwrap();

        assert!(matches!(users[0].id, Id::Number(7)));
        assert_eq!(users[0].name, "");
        assert_eq!(users[1].id, Id::from("7.5"));
        assert_eq!(users[1].name, "42");
        assert_eq!(users[2].name, "");

        let row: DashboardSummaryRow = serde_json::from_value(json!({
            "user_id": 3.0,
            "name": null,
            "total_today_minutes": 5
        }))
        .unwrap();
        assert_eq!(row.user_id, Id::Number(3));
        assert_eq!(row.name, "");

        // Absent optional ids stay absent
        let session: WorkSession = serde_json::from_value(json!({"id": null})).unwrap();
        assert!(session.id.is_none());
    }

    #[test]
    fn test_session_activity() {
        let session: WorkSession = serde_json::from_value(json!({
            "id": 1,
            "user_id": 2,
            "start_time": "2024-05-01T08:00:00Z",
            "end_time": null
        }))
        .unwrap();
        assert!(session.is_active());
        assert!(session.total_minutes.is_none());

        let ended: WorkSession = serde_json::from_value(json!({
            "id": 1,
            "user_id": 2,
            "start_time": "2024-05-01T08:00:00Z",
            "end_time": "2024-05-01T08:42:00Z",
            "total_minutes": 42
        }))
        .unwrap();
        assert!(!ended.is_active());
        assert_eq!(ended.total_minutes, Some(42.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = parse_timestamp("2024-05-01T08:00:00Z").unwrap();
        assert_eq!(parse_timestamp("2024-05-01T10:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 08:00:00"), Some(expected));
        assert!(parse_timestamp("2024-05-01T08:00:00.250").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
