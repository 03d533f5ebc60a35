use crate::calendar::CalendarGrid;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

/// Presentation side of the shell. Page state calls into it; it never calls back.
pub trait Renderer: Send {
    fn show_notification(&mut self, message: &str, kind: NotificationKind);
    fn render_calendar_grid(&mut self, month: u32, year: i32, grid: &CalendarGrid);
    fn set_active_page(&mut self, id: &str);
    fn navigate_browser(&mut self, url: &str);
}

/// Collects render calls so they can be shipped to the page in one response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShellRenderer {
    pub notifications: Vec<Notification>,
    pub calendar: Option<CalendarGrid>,
    pub active_page: Option<String>,
    pub navigation: Option<String>,
}

impl Renderer for ShellRenderer {
    fn show_notification(&mut self, message: &str, kind: NotificationKind) {
        self.notifications.push(Notification::new(message, kind));
    }

    fn render_calendar_grid(&mut self, _month: u32, _year: i32, grid: &CalendarGrid) {
        self.calendar = Some(grid.clone());
    }

    fn set_active_page(&mut self, id: &str) {
        self.active_page = Some(id.to_string());
    }

    fn navigate_browser(&mut self, url: &str) {
        self.navigation = Some(url.to_string());
    }
}
