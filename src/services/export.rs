//! CSV and printable HTML renditions of the dashboard tables.

use askama::Template;
use chrono::{NaiveDate, Utc};
use std::borrow::Cow;

use crate::models::{
    proposal::{ProposalSummary, ProposalView},
    report::{MonthlyFigure, RoutineAnalytics, MONTH_ABBREVIATIONS},
    stakeholder::StakeholderWithSchedules,
};

/// Quote a CSV field when it contains a separator, quote or line break
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_document(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut out = csv_line(header);
    out.push('\n');
    for row in rows {
        out.push_str(&csv_line(&row));
        out.push('\n');
    }
    out
}

/// Day/month/year as used on Indonesian forms
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Whole rupiah with dot thousands separators, e.g. `Rp 1.500.000`
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}Rp {grouped}")
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_num<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One line per proposal, in the order given
pub fn proposals_csv(proposals: &[ProposalView]) -> String {
    csv_document(
        &[
            "Case ID",
            "Name",
            "Origin",
            "Status",
            "PIC",
            "Date",
            "Donation Form",
            "Quantity",
            "Total Price",
        ],
        proposals.iter().map(|view| {
            let p = &view.proposal;
            vec![
                p.case_id.clone(),
                p.name.clone(),
                opt(&p.origin),
                p.status.to_string(),
                view.pic_name().to_string(),
                format_date(p.entry_date),
                opt(&p.donation_form),
                opt_num(p.product_quantity),
                p.total_price.to_string(),
            ]
        }),
    )
}

/// First pickup date in each month, or "-" when the month has none
fn month_cells(entry: &StakeholderWithSchedules) -> Vec<String> {
    use chrono::Datelike;

    (1..=12u32)
        .map(|month| {
            entry
                .schedules
                .iter()
                .find(|s| s.pickup_date.month() == month)
                .map(|s| s.pickup_date.to_string())
                .unwrap_or_else(|| "-".to_string())
        })
        .collect()
}

/// Month-by-month grid of the stakeholder roster
pub fn routine_grid_csv(roster: &[StakeholderWithSchedules]) -> String {
    let mut header = vec!["No", "Institution", "Branch", "Quantity"];
    header.extend(MONTH_ABBREVIATIONS);
    header.push("Total Schedules");

    csv_document(
        &header,
        roster.iter().enumerate().map(|(idx, entry)| {
            let mut row = vec![
                (idx + 1).to_string(),
                entry.stakeholder.institution_name.clone(),
                entry.stakeholder.branch.clone().unwrap_or_else(|| "-".to_string()),
                entry.stakeholder.default_quantity.to_string(),
            ];
            row.extend(month_cells(entry));
            row.push(entry.schedules.len().to_string());
            row
        }),
    )
}

pub fn monthly_expense_csv(months: &[MonthlyFigure]) -> String {
    csv_document(
        &["Month", "Expense (IDR)", "Proposals"],
        months
            .iter()
            .map(|m| vec![m.name.clone(), m.expense.to_string(), m.count.to_string()]),
    )
}

pub struct ProposalPrintRow {
    pub no: usize,
    pub case_id: String,
    pub name: String,
    pub origin: String,
    pub status: String,
    pub pic: String,
    pub date: String,
    pub total_price: String,
}

#[derive(Template)]
#[template(path = "proposals_print.html")]
pub struct ProposalPrintTemplate {
    pub generated_at: String,
    pub total_proposals: i64,
    pub in_progress: i64,
    pub ready_for_pickup: i64,
    pub done: i64,
    pub total_budget: String,
    pub rows: Vec<ProposalPrintRow>,
}

impl ProposalPrintTemplate {
    pub fn new(summary: &ProposalSummary, proposals: &[ProposalView]) -> Self {
        Self {
            generated_at: Utc::now().format("%d/%m/%Y %H:%M").to_string(),
            total_proposals: summary.total_proposals,
            in_progress: summary.in_progress,
            ready_for_pickup: summary.ready_for_pickup,
            done: summary.done,
            total_budget: format_rupiah(summary.total_budget),
            rows: proposals
                .iter()
                .enumerate()
                .map(|(idx, view)| ProposalPrintRow {
                    no: idx + 1,
                    case_id: view.proposal.case_id.clone(),
                    name: view.proposal.name.clone(),
                    origin: opt(&view.proposal.origin),
                    status: view.proposal.status.to_string(),
                    pic: view.pic_name().to_string(),
                    date: format_date(view.proposal.entry_date),
                    total_price: format_rupiah(view.proposal.total_price),
                })
                .collect(),
        }
    }
}

pub struct RoutinePrintRow {
    pub no: usize,
    pub institution: String,
    pub branch: String,
    pub quantity: i64,
    pub months: Vec<String>,
    pub total: usize,
}

pub struct BranchRow {
    pub name: String,
    pub count: i64,
}

#[derive(Template)]
#[template(path = "routine_print.html")]
pub struct RoutinePrintTemplate {
    pub year: i32,
    pub generated_at: String,
    pub month_headers: Vec<&'static str>,
    pub analytics: RoutineAnalytics,
    pub branches: Vec<BranchRow>,
    pub rows: Vec<RoutinePrintRow>,
}

impl RoutinePrintTemplate {
    pub fn new(year: i32, analytics: RoutineAnalytics, roster: &[StakeholderWithSchedules]) -> Self {
        let branches = analytics
            .branch_counts
            .iter()
            .map(|(name, count)| BranchRow {
                name: name.clone(),
                count: *count,
            })
            .collect();

        Self {
            year,
            generated_at: Utc::now().format("%d/%m/%Y %H:%M").to_string(),
            month_headers: MONTH_ABBREVIATIONS.to_vec(),
            analytics,
            branches,
            rows: roster
                .iter()
                .enumerate()
                .map(|(idx, entry)| RoutinePrintRow {
                    no: idx + 1,
                    institution: entry.stakeholder.institution_name.clone(),
                    branch: entry.stakeholder.branch.clone().unwrap_or_else(|| "-".to_string()),
                    quantity: entry.stakeholder.default_quantity,
                    months: month_cells(entry),
                    total: entry.schedules.len(),
                })
                .collect(),
        }
    }
}
