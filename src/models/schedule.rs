use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow};
use std::fmt;
use std::str::FromStr;

use super::stakeholder::Stakeholder;

/// Lifecycle of a pickup. Any status may be changed to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Scheduled,
    Completed,
    Pending,
    Cancelled,
}

impl Default for ScheduleStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown schedule status '{other}'")),
        }
    }
}

/// One planned or completed pickup for a stakeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: i64,
    pub stakeholder_id: i64,
    pub pickup_date: NaiveDate,
    pub quantity: i64,
    pub status: ScheduleStatus,
    pub pic: Option<String>,
    pub notes: Option<String>,
    pub proof_file: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A schedule with its parent stakeholder joined in
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleWithStakeholder {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub stakeholder: Stakeholder,
}

impl<'r> FromRow<'r, SqliteRow> for ScheduleWithStakeholder {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            schedule: Schedule::from_row(row)?,
            stakeholder: Stakeholder::from_joined_row(row)?,
        })
    }
}

/// Values for a new schedule, after form parsing
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub stakeholder_id: i64,
    pub pickup_date: NaiveDate,
    pub quantity: i64,
    pub status: ScheduleStatus,
    pub pic: Option<String>,
    pub notes: Option<String>,
    pub proof_file: Option<String>,
    pub created_by: Option<i64>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct SchedulePatch {
    pub stakeholder_id: Option<i64>,
    pub pickup_date: Option<NaiveDate>,
    pub quantity: Option<i64>,
    pub status: Option<ScheduleStatus>,
    pub pic: Option<String>,
    pub notes: Option<String>,
    pub proof_file: Option<String>,
    pub created_by: Option<i64>,
}

impl SchedulePatch {
    pub fn apply(self, schedule: &mut Schedule) {
        if let Some(stakeholder_id) = self.stakeholder_id {
            schedule.stakeholder_id = stakeholder_id;
        }
        if let Some(date) = self.pickup_date {
            schedule.pickup_date = date;
        }
        if let Some(quantity) = self.quantity {
            schedule.quantity = quantity;
        }
        if let Some(status) = self.status {
            schedule.status = status;
        }
        if self.pic.is_some() {
            schedule.pic = self.pic;
        }
        if self.notes.is_some() {
            schedule.notes = self.notes;
        }
        if self.proof_file.is_some() {
            schedule.proof_file = self.proof_file;
        }
        if self.created_by.is_some() {
            schedule.created_by = self.created_by;
        }
    }
}

/// Query string filters for the schedule list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub stakeholder_id: Option<i64>,
}

impl ScheduleFilter {
    /// Inclusive pickup date bounds. A month is only honoured together with a year.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>, String> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(format!("month must be between 1 and 12, got {month}"));
            }
        }
        match (self.month, self.year) {
            (Some(month), Some(year)) => month_range(year, month)
                .map(Some)
                .ok_or_else(|| format!("year {year} is out of range")),
            (None, Some(year)) => year_range(year)
                .map(Some)
                .ok_or_else(|| format!("year {year} is out of range")),
            _ => Ok(None),
        }
    }

    /// `None` when no status filter applies ("all" or absent)
    pub fn status_filter(&self) -> Result<Option<ScheduleStatus>, String> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

/// First and last day of a calendar month
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// January 1st through December 31st
pub fn year_range(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// Day of the month on which generated pickups are placed
pub const GENERATED_PICKUP_DAY: u32 = 15;

/// Body of the monthly generation request
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl GenerateRequest {
    pub fn target(&self) -> Result<(i32, u32), String> {
        let (Some(month), Some(year)) = (self.month, self.year) else {
            return Err("month and year are required".to_string());
        };
        if !(1..=12).contains(&month) {
            return Err(format!("month must be between 1 and 12, got {month}"));
        }
        Ok((year, month))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub message: String,
    pub created: u64,
}

/// Body for status changes applied to several schedules at once
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleBulkStatus {
    pub ids: Vec<i64>,
    pub status: ScheduleStatus,
}

/// Year selector shared by the by-stakeholder, analytics and export endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

impl YearQuery {
    pub fn year_or_current(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}
