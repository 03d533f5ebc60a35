use crate::calendar::CalendarGrid;
use crate::forms::FormKind;
use crate::gate::Navigation;
use crate::page_state::{ClientPageState, Theme};
use crate::render::{Notification, ShellRenderer};
use crate::session::SessionRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub student_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    pub page: String,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
}

fn default_viewport_width() -> u32 {
    1280
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub day: u32,
}

#[derive(Debug, Deserialize)]
pub struct ViewportRequest {
    pub width: u32,
}

/// Names a modal or dropdown element.
#[derive(Debug, Deserialize)]
pub struct ElementRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RedirectView {
    pub url: String,
    pub delay_ms: u64,
}

/// Response to login, signup and logout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectView>,
}

impl FlowResponse {
    /// Ships what the flow rendered; any navigation waits `navigation.after`.
    pub fn from_renderer(renderer: ShellRenderer, navigation: Navigation) -> Self {
        Self {
            notifications: renderer.notifications,
            redirect: renderer.navigation.map(|url| RedirectView {
                url,
                delay_ms: navigation.after.as_millis() as u64,
            }),
        }
    }
}

/// Everything the dashboard script needs to bring the DOM up to date.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView {
    pub student_id: String,
    pub active_page: String,
    pub calendar: CalendarGrid,
    pub notification_count: u32,
    pub badge_visible: bool,
    pub theme: Theme,
    pub sidebar_open: bool,
    pub open_modal: Option<String>,
    pub open_dropdown: Option<String>,
    pub submitting: Vec<FormKind>,
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_after_ms: Option<u64>,
}

impl ShellView {
    pub fn compose(record: &SessionRecord, page: &mut ClientPageState, mut renderer: ShellRenderer) -> Self {
        page.flush_deferred(&mut renderer);
        let calendar = renderer.calendar.unwrap_or_else(|| page.calendar_grid());

        Self {
            student_id: record.student_id.to_string(),
            active_page: page.active_page().to_string(),
            calendar,
            notification_count: page.notification_count(),
            badge_visible: page.badge_visible(),
            theme: page.theme(),
            sidebar_open: page.sidebar_open(),
            open_modal: page.open_modal().map(str::to_string),
            open_dropdown: page.open_dropdown().map(str::to_string),
            submitting: page.submissions_in_flight().collect(),
            notifications: renderer.notifications,
            redirect: renderer.navigation.map(|url| RedirectView { url, delay_ms: 0 }),
            refresh_after_ms: None,
        }
    }
}
