use crate::errors::PortalError;
use crate::forms::{AssignmentDraft, FormKind, ProfileUpdate};
use crate::gate::{DASHBOARD_URL, GateDecision, LOGIN_URL, SIGNUP_URL};
use crate::models::{
    ElementRequest, FlowResponse, LoginRequest, NavigateRequest, SearchRequest,
    SelectDateRequest, ShellView, ViewportRequest,
};
use crate::page_state::ClientPageState;
use crate::render::{NotificationKind, Renderer, ShellRenderer};
use crate::session::{SessionRecord, SessionState};
use crate::state::{AppState, PageSlot, today};
use crate::tasks;
use crate::ui::{render_dashboard, render_login, render_signup};
use crate::validation::sanitize_student_id_input;
use axum::{
    Json,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

pub async fn index(State(state): State<AppState>) -> Result<Response, PortalError> {
    dashboard_at(&state, "/").await
}

pub async fn dashboard_page(State(state): State<AppState>) -> Result<Response, PortalError> {
    dashboard_at(&state, DASHBOARD_URL).await
}

pub async fn login_page(State(state): State<AppState>) -> Result<Response, PortalError> {
    let outcome = state.gate.check_existing_session(LOGIN_URL).await?;
    if let GateDecision::Redirect(url) = outcome.decision {
        return Ok(Redirect::to(url).into_response());
    }
    Ok(Html(render_login(&state.config.portal_name)).into_response())
}

pub async fn signup_page(State(state): State<AppState>) -> Result<Response, PortalError> {
    let outcome = state.gate.check_existing_session(SIGNUP_URL).await?;
    if let GateDecision::Redirect(url) = outcome.decision {
        return Ok(Redirect::to(url).into_response());
    }
    Ok(Html(render_signup(&state.config.portal_name)).into_response())
}

/// A full dashboard load: gate first, then a fresh page state.
async fn dashboard_at(state: &AppState, address: &str) -> Result<Response, PortalError> {
    let outcome = state.gate.check_existing_session(address).await?;
    let record = match (outcome.decision, outcome.session) {
        (GateDecision::Redirect(url), _) => return Ok(Redirect::to(url).into_response()),
        (GateDecision::Proceed, SessionState::Authenticated(record)) => record,
        (GateDecision::Proceed, SessionState::Anonymous) => {
            return Ok(Redirect::to(LOGIN_URL).into_response());
        }
    };

    let mut renderer = ShellRenderer::default();
    let mut slot = state.page.lock().await;
    slot.token.cancel();
    slot.token = state.shutdown.child_token();
    slot.state = ClientPageState::initialize(
        state.store(),
        today(),
        &state.config.portal_name,
        &mut renderer,
    )
    .await;
    slot.loaded = true;
    debug!(student_id = %record.student_id, "dashboard loaded");

    let view = ShellView::compose(&record, &mut slot.state, renderer);
    Ok(Html(render_dashboard(&state.config.portal_name, &view)?).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<FlowResponse>, PortalError> {
    let cancel = state.shutdown.child_token();
    let student_id = sanitize_student_id_input(&payload.student_id);
    let success = state
        .gate
        .login(&student_id, &payload.password, &cancel)
        .await?;

    let mut renderer = ShellRenderer::default();
    if let Some(message) = FormKind::Login.success_message() {
        renderer.show_notification(message, NotificationKind::Success);
    }
    renderer.navigate_browser(success.navigation.url);
    Ok(Json(FlowResponse::from_renderer(renderer, success.navigation)))
}

pub async fn signup(State(state): State<AppState>) -> Result<Json<FlowResponse>, PortalError> {
    let cancel = state.shutdown.child_token();
    let navigation = state.gate.signup(&cancel).await?;

    let mut renderer = ShellRenderer::default();
    renderer.navigate_browser(navigation.url);
    Ok(Json(FlowResponse::from_renderer(renderer, navigation)))
}

pub async fn logout(State(state): State<AppState>) -> Result<Json<FlowResponse>, PortalError> {
    let navigation = state.gate.logout().await?;

    let mut slot = state.page.lock().await;
    slot.token.cancel();
    slot.loaded = false;

    let mut renderer = ShellRenderer::default();
    renderer.show_notification("Logging out...", NotificationKind::Info);
    renderer.navigate_browser(navigation.url);
    Ok(Json(FlowResponse::from_renderer(renderer, navigation)))
}

pub async fn shell(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    Ok(Json(access.view(renderer)))
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access
        .page()
        .navigate_to(&payload.page, payload.viewport_width, &mut renderer);
    Ok(Json(access.view(renderer)))
}

pub async fn previous_month(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().previous_month(&mut renderer);
    Ok(Json(access.view(renderer)))
}

pub async fn next_month(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().next_month(&mut renderer);
    Ok(Json(access.view(renderer)))
}

pub async fn select_date(
    State(state): State<AppState>,
    Json(payload): Json<SelectDateRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().select_date(payload.day, &mut renderer);
    Ok(Json(access.view(renderer)))
}

pub async fn mark_as_read(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().mark_as_read(&mut renderer);
    Ok(Json(access.view(renderer)))
}

pub async fn toggle_theme(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access
        .page()
        .toggle_theme(state.store(), &mut renderer)
        .await;
    Ok(Json(access.view(renderer)))
}

pub async fn toggle_sidebar(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().toggle_sidebar();
    Ok(Json(access.view(renderer)))
}

pub async fn viewport(
    State(state): State<AppState>,
    Json(payload): Json<ViewportRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().viewport_resized(payload.width);
    Ok(Json(access.view(renderer)))
}

pub async fn toggle_dropdown(
    State(state): State<AppState>,
    Json(payload): Json<ElementRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().toggle_dropdown(&payload.id);
    Ok(Json(access.view(renderer)))
}

pub async fn open_modal(
    State(state): State<AppState>,
    Json(payload): Json<ElementRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().open_modal_by_id(&payload.id);
    Ok(Json(access.view(renderer)))
}

pub async fn close_modal(
    State(state): State<AppState>,
    Json(payload): Json<ElementRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().close_modal(&payload.id);
    Ok(Json(access.view(renderer)))
}

pub async fn escape(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().escape_pressed();
    Ok(Json(access.view(renderer)))
}

pub async fn search(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().search(&payload.query, &mut renderer);
    Ok(Json(access.view(renderer)))
}

pub async fn create_assignment(
    State(state): State<AppState>,
    Json(draft): Json<AssignmentDraft>,
) -> Result<Json<ShellView>, PortalError> {
    info!(title = %draft.title, course = %draft.course, due = ?draft.due_date, "assignment submitted");
    submit_form(&state, FormKind::Assignment).await
}

pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ShellView>, PortalError> {
    info!(name = %update.full_name, email = %update.email, "profile update submitted");
    submit_form(&state, FormKind::Profile).await
}

/// Starts the report download; completion is announced on a later refresh.
pub async fn download_report(State(state): State<AppState>) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let mut access = page_access(&state, &mut renderer).await?;
    access.page().begin_submission(FormKind::Report)?;
    renderer.show_notification("Downloading report...", NotificationKind::Info);

    let page = Arc::clone(&state.page);
    let delay = state.config.form_latency;
    // Detached: the page token cancels it if the dashboard is reloaded first.
    let _report = tasks::schedule(&access.slot.token, delay, move || async move {
        let mut slot = page.lock().await;
        let mut finished = ShellRenderer::default();
        slot.state.finish_submission(FormKind::Report, &mut finished);
        slot.state.defer(finished.notifications);
    });

    let mut view = access.view(renderer);
    view.refresh_after_ms = Some(delay.as_millis() as u64);
    Ok(Json(view))
}

async fn submit_form(state: &AppState, kind: FormKind) -> Result<Json<ShellView>, PortalError> {
    let mut renderer = ShellRenderer::default();
    let token = {
        let mut access = page_access(state, &mut renderer).await?;
        access.page().begin_submission(kind)?;
        access.slot.token.child_token()
    };

    if let Err(cancelled) = tasks::delay(state.config.form_latency, &token).await {
        warn!(%kind, "submission abandoned");
        return Err(cancelled.into());
    }

    let mut access = page_access(state, &mut renderer).await?;
    access.page().finish_submission(kind, &mut renderer);
    Ok(Json(access.view(renderer)))
}

struct PageAccess<'a> {
    record: SessionRecord,
    slot: MutexGuard<'a, PageSlot>,
}

impl PageAccess<'_> {
    fn page(&mut self) -> &mut ClientPageState {
        &mut self.slot.state
    }

    fn view(&mut self, renderer: ShellRenderer) -> ShellView {
        ShellView::compose(&self.record, &mut self.slot.state, renderer)
    }
}

/// Dashboard endpoints need a live session and an initialized page.
async fn page_access<'a>(
    state: &'a AppState,
    renderer: &mut ShellRenderer,
) -> Result<PageAccess<'a>, PortalError> {
    let record = match state.gate.current_session().await? {
        SessionState::Authenticated(record) => record,
        SessionState::Anonymous => {
            let mut slot = state.page.lock().await;
            slot.token.cancel();
            slot.loaded = false;
            return Err(PortalError::Unauthenticated);
        }
    };

    let mut slot = state.page.lock().await;
    if !slot.loaded {
        slot.token = state.shutdown.child_token();
        slot.state = ClientPageState::initialize(
            state.store(),
            today(),
            &state.config.portal_name,
            renderer,
        )
        .await;
        slot.loaded = true;
    }

    Ok(PageAccess { record, slot })
}
