use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{auth, pic, proposal, report, schedule, stakeholder},
    middleware::require_auth,
    state::AppState,
};

async fn banner() -> &'static str {
    "CSR tracker API is running"
}

fn routine_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/stakeholders",
            get(stakeholder::list_stakeholders).post(stakeholder::create_stakeholder),
        )
        .route(
            "/stakeholders/{id}",
            put(stakeholder::update_stakeholder).delete(stakeholder::delete_stakeholder),
        )
        .route(
            "/schedules",
            get(schedule::list_schedules).post(schedule::create_schedule),
        )
        .route("/schedules/by-stakeholder", get(schedule::schedules_by_stakeholder))
        .route("/schedules/generate", post(schedule::generate_monthly_schedules))
        .route("/schedules/bulk-status", post(schedule::bulk_update_schedule_status))
        .route("/schedules/bulk-delete", post(schedule::bulk_delete_schedules))
        .route(
            "/schedules/{id}",
            put(schedule::update_schedule).delete(schedule::delete_schedule),
        )
        .route("/analytics", get(schedule::routine_analytics_handler))
        .route("/export.csv", get(schedule::export_routine_csv))
        .route("/print", get(schedule::print_routine_report))
}

fn proposal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(proposal::list_proposals).post(proposal::create_proposal),
        )
        .route("/summary", get(proposal::proposal_summary))
        .route("/export.csv", get(proposal::export_proposals_csv))
        .route("/print", get(proposal::print_proposals))
        .route("/bulk-delete", post(proposal::bulk_delete_proposals))
        .route("/bulk-status", post(proposal::bulk_update_proposal_status))
        .route(
            "/{id}",
            get(proposal::get_proposal)
                .put(proposal::update_proposal)
                .delete(proposal::delete_proposal),
        )
}

fn pic_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pic::list_pics).post(pic::create_pic))
        .route("/{id}", put(pic::update_pic).delete(pic::delete_pic))
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/routines", routine_routes())
        .nest("/api/proposals", proposal_routes())
        .nest("/api/pic", pic_routes())
        .route("/api/reports/monthly-expense", get(report::monthly_expense))
        .route(
            "/api/reports/monthly-expense.csv",
            get(report::monthly_expense_export),
        )
        .route("/api/auth/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/", get(banner))
        .route("/api/auth/login", post(auth::login))
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
