use crate::calendar::{CalendarCursor, CalendarGrid};
use crate::errors::PortalError;
use crate::forms::FormKind;
use crate::render::{Notification, NotificationKind, Renderer};
use crate::storage::{KeyValueStore, THEME_KEY};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const SECTIONS: [&str; 7] = [
    "dashboard",
    "courses",
    "assignments",
    "grades",
    "schedule",
    "attendance",
    "profile",
];
pub const MOBILE_BREAKPOINT: u32 = 768;
pub const INITIAL_NOTIFICATIONS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Self::Light,
            _ => Self::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientPageState {
    active_page: String,
    cursor: CalendarCursor,
    today: NaiveDate,
    notification_count: u32,
    theme: Theme,
    sidebar_open: bool,
    open_modal: Option<String>,
    open_dropdown: Option<String>,
    in_flight: BTreeSet<FormKind>,
    deferred: Vec<Notification>,
}

impl ClientPageState {
    pub fn new(today: NaiveDate, theme: Theme) -> Self {
        Self {
            active_page: SECTIONS[0].to_string(),
            cursor: CalendarCursor::containing(today),
            today,
            notification_count: INITIAL_NOTIFICATIONS,
            theme,
            sidebar_open: false,
            open_modal: None,
            open_dropdown: None,
            in_flight: BTreeSet::new(),
            deferred: Vec::new(),
        }
    }

    pub async fn initialize(
        store: &dyn KeyValueStore,
        today: NaiveDate,
        portal_name: &str,
        renderer: &mut dyn Renderer,
    ) -> Self {
        let theme = load_theme(store).await;
        let state = Self::new(today, theme);
        state.render_calendar(renderer);
        renderer.set_active_page(&state.active_page);
        renderer.show_notification(&format!("Welcome to {portal_name}!"), NotificationKind::Success);
        state
    }

    pub fn active_page(&self) -> &str {
        &self.active_page
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn notification_count(&self) -> u32 {
        self.notification_count
    }

    pub fn badge_visible(&self) -> bool {
        self.notification_count > 0
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn open_modal(&self) -> Option<&str> {
        self.open_modal.as_deref()
    }

    pub fn open_dropdown(&self) -> Option<&str> {
        self.open_dropdown.as_deref()
    }

    pub fn submissions_in_flight(&self) -> impl Iterator<Item = FormKind> + '_ {
        self.in_flight.iter().copied()
    }

    pub fn navigate_to(&mut self, page: &str, viewport_width: u32, renderer: &mut dyn Renderer) {
        if SECTIONS.contains(&page) {
            self.active_page = page.to_string();
            renderer.set_active_page(page);
        } else {
            debug!(page, "no such section");
        }

        if viewport_width <= MOBILE_BREAKPOINT {
            self.sidebar_open = false;
        }

        renderer.show_notification(
            &format!("Navigated to {}", capitalize(page)),
            NotificationKind::Info,
        );
    }

    pub fn calendar_grid(&self) -> CalendarGrid {
        CalendarGrid::build(self.cursor, self.today)
    }

    pub fn render_calendar(&self, renderer: &mut dyn Renderer) {
        renderer.render_calendar_grid(self.cursor.month, self.cursor.year, &self.calendar_grid());
    }

    pub fn previous_month(&mut self, renderer: &mut dyn Renderer) {
        self.cursor = self.cursor.previous();
        self.render_calendar(renderer);
    }

    pub fn next_month(&mut self, renderer: &mut dyn Renderer) {
        self.cursor = self.cursor.next();
        self.render_calendar(renderer);
    }

    pub fn select_date(&self, day: u32, renderer: &mut dyn Renderer) {
        if day == 0 || day > self.cursor.days_in_month() {
            return;
        }
        renderer.show_notification(
            &format!(
                "Selected date: {} {}, {}",
                self.cursor.month_name(),
                day,
                self.cursor.year
            ),
            NotificationKind::Info,
        );
    }

    /// Returns whether a notification was actually consumed; the counter stops at zero.
    pub fn mark_as_read(&mut self, renderer: &mut dyn Renderer) -> bool {
        if self.notification_count == 0 {
            return false;
        }
        self.notification_count -= 1;
        renderer.show_notification("Notification marked as read", NotificationKind::Success);
        true
    }

    pub async fn toggle_theme(&mut self, store: &dyn KeyValueStore, renderer: &mut dyn Renderer) -> Theme {
        self.theme = self.theme.toggled();
        renderer.show_notification(
            &format!("Switched to {} theme", self.theme.as_str()),
            NotificationKind::Info,
        );

        if let Err(err) = store.set(THEME_KEY, self.theme.as_str()).await {
            warn!("theme preference not saved: {err}");
        }
        self.theme
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn viewport_resized(&mut self, width: u32) {
        if width > MOBILE_BREAKPOINT {
            self.sidebar_open = false;
        }
    }

    pub fn toggle_dropdown(&mut self, id: &str) {
        let was_open = self.open_dropdown.as_deref() == Some(id);
        self.close_all_dropdowns();
        if !was_open {
            self.open_dropdown = Some(id.to_string());
        }
    }

    pub fn close_all_dropdowns(&mut self) {
        self.open_dropdown = None;
    }

    pub fn open_modal_by_id(&mut self, id: &str) {
        self.open_modal = Some(id.to_string());
    }

    pub fn close_modal(&mut self, id: &str) {
        if self.open_modal.as_deref() == Some(id) {
            self.open_modal = None;
        }
    }

    pub fn escape_pressed(&mut self) {
        self.open_modal = None;
        self.close_all_dropdowns();
    }

    pub fn search(&self, query: &str, renderer: &mut dyn Renderer) {
        if !query.trim().is_empty() {
            renderer.show_notification(&format!("Searching for: \"{query}\""), NotificationKind::Info);
        }
    }

    pub fn begin_submission(&mut self, kind: FormKind) -> Result<(), PortalError> {
        if !self.in_flight.insert(kind) {
            return Err(PortalError::SubmissionInFlight(kind));
        }
        Ok(())
    }

    pub fn finish_submission(&mut self, kind: FormKind, renderer: &mut dyn Renderer) {
        if !self.in_flight.remove(&kind) {
            return;
        }
        if let Some(modal) = kind.modal() {
            self.close_modal(modal);
        }
        if let Some(message) = kind.success_message() {
            renderer.show_notification(message, NotificationKind::Success);
        }
    }

    /// Queues notifications produced after the response that triggered them.
    pub fn defer(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        self.deferred.extend(notifications);
    }

    pub fn flush_deferred(&mut self, renderer: &mut dyn Renderer) {
        for notification in self.deferred.drain(..) {
            renderer.show_notification(&notification.message, notification.kind);
        }
    }
}

pub async fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY).await {
        Ok(value) => Theme::from_stored(value.as_deref()),
        Err(err) => {
            warn!("theme preference unavailable, using default: {err}");
            Theme::default()
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
