use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login.html", get(handlers::login_page))
        .route("/signup.html", get(handlers::signup_page))
        .route("/dashboard.html", get(handlers::dashboard_page))
        .route("/api/login", post(handlers::login))
        .route("/api/signup", post(handlers::signup))
        .route("/api/logout", post(handlers::logout))
        .route("/api/shell", get(handlers::shell))
        .route("/api/navigate", post(handlers::navigate))
        .route("/api/calendar/previous", post(handlers::previous_month))
        .route("/api/calendar/next", post(handlers::next_month))
        .route("/api/calendar/select", post(handlers::select_date))
        .route("/api/notifications/read", post(handlers::mark_as_read))
        .route("/api/theme/toggle", post(handlers::toggle_theme))
        .route("/api/sidebar/toggle", post(handlers::toggle_sidebar))
        .route("/api/viewport", post(handlers::viewport))
        .route("/api/dropdown/toggle", post(handlers::toggle_dropdown))
        .route("/api/modal/open", post(handlers::open_modal))
        .route("/api/modal/close", post(handlers::close_modal))
        .route("/api/escape", post(handlers::escape))
        .route("/api/search", post(handlers::search))
        .route("/api/assignments", post(handlers::create_assignment))
        .route("/api/profile", post(handlers::update_profile))
        .route("/api/report", post(handlers::download_report))
        .with_state(state)
}
