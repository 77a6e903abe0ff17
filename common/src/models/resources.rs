// common/src/models/resources.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource identifier. The backend may send numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// Progress milestone for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub description: String,
}

/// Report delivered to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ItemId,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
}

/// Upcoming payment. `due_date` is kept as sent and parsed only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: ItemId,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl Payment {
    /// Calendar date of `due_date`, accepting plain dates, RFC 3339 timestamps
    /// and naive `YYYY-MM-DDTHH:MM:SS` timestamps.
    pub fn due_on(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?.trim();

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|ts| ts.date())
    }
}
