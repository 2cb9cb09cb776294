use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indonesian month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Short month names used as CSV column headers
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Expense and proposal count for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFigure {
    pub month: u32,
    pub name: String,
    pub expense: f64,
    pub count: i64,
}

/// Bar of the yearly expense chart, height relative to the largest month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub month: u32,
    pub name: String,
    pub height_percent: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub compare_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpenseReport {
    pub year: i32,
    pub months: Vec<MonthlyFigure>,
    pub selected: MonthlyFigure,
    pub comparison: MonthlyFigure,
    pub difference: f64,
    pub percentage_change: f64,
    pub total_expense: f64,
    pub total_proposals: i64,
    pub average_monthly_expense: f64,
    pub max_expense: f64,
    pub chart: Vec<ChartBar>,
}

/// Totals over one year of the stakeholder roster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineAnalytics {
    pub year: i32,
    pub total_schedules: i64,
    pub completed: i64,
    pub scheduled: i64,
    pub pending: i64,
    pub cancelled: i64,
    pub total_quantity: i64,
    pub completion_rate: i64,
    pub branch_counts: BTreeMap<String, i64>,
    pub unique_branches: usize,
    pub unique_stakeholders: usize,
}
