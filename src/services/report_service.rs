//! Aggregates behind the report page and the routine analytics panel.
//!
//! Everything here is pure: the stores fetch rows, these functions fold them.

use std::collections::BTreeMap;

use crate::models::{
    report::{ChartBar, MonthlyExpenseReport, MonthlyFigure, RoutineAnalytics, MONTH_NAMES},
    schedule::ScheduleStatus,
    stakeholder::StakeholderWithSchedules,
};

/// Twelve month rows from the per-month totals the store returns.
/// Months missing from `totals` get zero expense and count.
pub fn yearly_figures(totals: &[(u32, f64, i64)]) -> Vec<MonthlyFigure> {
    (1..=12u32)
        .map(|month| {
            let (expense, count) = totals
                .iter()
                .find(|(m, _, _)| *m == month)
                .map(|(_, expense, count)| (*expense, *count))
                .unwrap_or((0.0, 0));

            MonthlyFigure {
                month,
                name: MONTH_NAMES[(month - 1) as usize].to_string(),
                expense,
                count,
            }
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Relative change from `comparison` to `current`, in percent with two decimals.
/// A zero baseline yields zero.
pub fn percentage_change(current: f64, comparison: f64) -> f64 {
    if comparison == 0.0 {
        return 0.0;
    }
    round2((current - comparison) / comparison * 100.0)
}

pub fn monthly_expense_report(
    year: i32,
    selected_month: u32,
    compare_month: u32,
    totals: &[(u32, f64, i64)],
) -> MonthlyExpenseReport {
    let months = yearly_figures(totals);
    let pick = |month: u32| months[(month.clamp(1, 12) - 1) as usize].clone();

    let selected = pick(selected_month);
    let comparison = pick(compare_month);

    let total_expense: f64 = months.iter().map(|m| m.expense).sum();
    let total_proposals: i64 = months.iter().map(|m| m.count).sum();
    let max_expense = months.iter().map(|m| m.expense).fold(0.0, f64::max);

    let chart = months
        .iter()
        .map(|m| ChartBar {
            month: m.month,
            name: m.name.clone(),
            height_percent: if max_expense > 0.0 {
                round2(m.expense / max_expense * 100.0)
            } else {
                0.0
            },
        })
        .collect();

    MonthlyExpenseReport {
        year,
        difference: selected.expense - comparison.expense,
        percentage_change: percentage_change(selected.expense, comparison.expense),
        selected,
        comparison,
        total_expense,
        total_proposals,
        average_monthly_expense: total_expense / 12.0,
        max_expense,
        chart,
        months,
    }
}

/// Schedule totals, completion rate and branch spread over the roster view
pub fn routine_analytics(year: i32, roster: &[StakeholderWithSchedules]) -> RoutineAnalytics {
    let mut analytics = RoutineAnalytics {
        year,
        unique_stakeholders: roster.len(),
        ..Default::default()
    };
    let mut branch_counts: BTreeMap<String, i64> = BTreeMap::new();

    for entry in roster {
        if let Some(branch) = entry.stakeholder.branch.as_deref().filter(|b| !b.is_empty()) {
            *branch_counts.entry(branch.to_string()).or_default() += 1;
        }

        for schedule in &entry.schedules {
            analytics.total_schedules += 1;
            analytics.total_quantity += schedule.quantity;

            match schedule.status {
                ScheduleStatus::Completed => analytics.completed += 1,
                ScheduleStatus::Scheduled => analytics.scheduled += 1,
                ScheduleStatus::Pending => analytics.pending += 1,
                ScheduleStatus::Cancelled => analytics.cancelled += 1,
            }
        }
    }

    analytics.completion_rate = if analytics.total_schedules > 0 {
        (analytics.completed as f64 / analytics.total_schedules as f64 * 100.0).round() as i64
    } else {
        0
    };
    analytics.unique_branches = branch_counts.len();
    analytics.branch_counts = branch_counts;

    analytics
}
