use axum::{
    extract::{rejection::QueryRejection, Json, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::{Datelike, Local};

use crate::{
    error::{AppError, Result},
    models::report::ExpenseQuery,
    services::{
        export::monthly_expense_csv,
        report_service::{monthly_expense_report, yearly_figures},
    },
    state::AppState,
};

fn checked_month(month: u32, name: &str) -> Result<u32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(AppError::BadRequest(format!(
            "{name} must be between 1 and 12, got {month}"
        )))
    }
}

/// Monthly expense report. Defaults to the current year and month, compared against January.
pub async fn monthly_expense(
    State(state): State<AppState>,
    query: std::result::Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = checked_month(query.month.unwrap_or(today.month()), "month")?;
    let compare_month = checked_month(query.compare_month.unwrap_or(1), "compare_month")?;

    let totals = state.proposals.monthly_totals(year).await?;
    let report = monthly_expense_report(year, month, compare_month, &totals);

    Ok((StatusCode::OK, Json(report)))
}

pub async fn monthly_expense_export(
    State(state): State<AppState>,
    query: std::result::Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query?;
    let year = query.year.unwrap_or(Local::now().year());
    let totals = state.proposals.monthly_totals(year).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"laporan-pengeluaran-{year}.csv\""),
            ),
        ],
        monthly_expense_csv(&yearly_figures(&totals)),
    ))
}
