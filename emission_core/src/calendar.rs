//! Calendar features derived from timestamps

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Calendar position of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFeatures {
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    /// 1 ..= 12
    pub month: u32,
    /// 1 ..= 4
    pub quarter: u32,
    /// 0 ..= 23
    pub hour: u32,
    /// 1 ..= 366
    pub day_of_year: u32,
}

impl CalendarFeatures {
    /// Create a new set of calendar features for the given timestamp
    pub fn from_timestamp(timestamp: &DateTime<Utc>) -> Self {
        let month = timestamp.month();
        Self {
            day_of_week: timestamp.weekday().num_days_from_monday(),
            month,
            quarter: (month - 1) / 3 + 1,
            hour: timestamp.hour(),
            day_of_year: timestamp.ordinal(),
        }
    }
}
