use crate::models::ShellView;

pub fn render_login(portal_name: &str) -> String {
    LOGIN_HTML
        .replace("{{STYLE}}", BASE_STYLE)
        .replace("{{TOAST_SCRIPT}}", TOAST_SCRIPT)
        .replace("{{PORTAL_NAME}}", &escape_html(portal_name))
}

pub fn render_signup(portal_name: &str) -> String {
    SIGNUP_HTML
        .replace("{{STYLE}}", BASE_STYLE)
        .replace("{{TOAST_SCRIPT}}", TOAST_SCRIPT)
        .replace("{{PORTAL_NAME}}", &escape_html(portal_name))
}

pub fn render_dashboard(portal_name: &str, view: &ShellView) -> Result<String, serde_json::Error> {
    // Keep the embedded JSON from closing the script element early.
    let initial = serde_json::to_string(view)?.replace("</", "<\\/");
    Ok(DASHBOARD_HTML
        .replace("{{STYLE}}", BASE_STYLE)
        .replace("{{TOAST_SCRIPT}}", TOAST_SCRIPT)
        .replace("{{PORTAL_NAME}}", &escape_html(portal_name))
        .replace("{{THEME_CLASS}}", view.theme.as_str())
        .replace("{{STUDENT_ID}}", &escape_html(&view.student_id))
        .replace("{{INITIAL_VIEW}}", &initial))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const BASE_STYLE: &str = r#"
    :root {
      --bg: #0f172a;
      --panel: #111c33;
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --accent: #38bdf8;
      --danger: #f87171;
      --ok: #4ade80;
      --radius: 14px;
    }

    body.light-theme {
      --bg: #f1f5f9;
      --panel: #ffffff;
      --ink: #0f172a;
      --muted: #475569;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: #0f172a;
    }

    button:disabled {
      opacity: 0.6;
      cursor: progress;
    }

    .form-input {
      width: 100%;
      padding: 12px 14px;
      border-radius: 10px;
      border: 1px solid rgba(148, 163, 184, 0.4);
      background: transparent;
      color: var(--ink);
    }

    .form-input.error {
      border-color: var(--danger);
    }

    .card {
      background: var(--panel);
      border-radius: var(--radius);
      padding: 28px;
      box-shadow: 0 18px 40px rgba(2, 6, 23, 0.35);
    }

    #toastContainer {
      position: fixed;
      right: 20px;
      bottom: 20px;
      display: grid;
      gap: 10px;
      z-index: 50;
    }

    .toast {
      padding: 12px 16px;
      border-radius: 10px;
      background: var(--panel);
      border-left: 4px solid var(--accent);
      opacity: 0;
      transform: translateY(10px);
      transition: opacity 200ms ease, transform 200ms ease;
    }

    .toast.show {
      opacity: 1;
      transform: none;
    }

    .toast.success {
      border-color: var(--ok);
    }

    .toast.error {
      border-color: var(--danger);
    }
"#;

const TOAST_SCRIPT: &str = r#"
    const showToast = (message, kind = 'info') => {
      const toast = document.createElement('div');
      toast.className = `toast ${kind}`;
      toast.textContent = message;
      document.getElementById('toastContainer').appendChild(toast);
      setTimeout(() => toast.classList.add('show'), 100);
      setTimeout(() => {
        toast.classList.remove('show');
        setTimeout(() => toast.remove(), 300);
      }, 3000);
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body ?? {})
      });
      const data = await res.json().catch(() => ({}));
      if (!res.ok) {
        const err = new Error(data.message || 'Request failed');
        err.details = data;
        throw err;
      }
      return data;
    };

    const followRedirect = (redirect) => {
      if (redirect) {
        setTimeout(() => { window.location.href = redirect.url; }, redirect.delayMs);
      }
    };
"#;

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{PORTAL_NAME}} | Log In</title>
  <style>
{{STYLE}}
    main {
      display: grid;
      place-items: center;
      min-height: 100vh;
      padding: 24px;
    }

    form {
      display: grid;
      gap: 14px;
      width: min(380px, 100%);
    }

    .password-row {
      display: flex;
      gap: 8px;
    }

    .password-toggle {
      background: transparent;
      color: var(--muted);
      padding: 8px;
    }
  </style>
</head>
<body>
  <main>
    <form id="loginForm" class="card" novalidate>
      <h1>{{PORTAL_NAME}}</h1>
      <label for="studentId">Student ID</label>
      <input id="studentId" class="form-input" inputmode="numeric" maxlength="6" autocomplete="username" />
      <label for="password">Password</label>
      <div class="password-row">
        <input id="password" type="password" class="form-input" autocomplete="current-password" />
        <button type="button" class="password-toggle" aria-label="Show password">Show</button>
      </div>
      <button type="submit">Log In</button>
      <p>No account? <a href="/signup.html">Sign up</a></p>
    </form>
  </main>
  <div id="toastContainer"></div>
  <script>
{{TOAST_SCRIPT}}
    const form = document.getElementById('loginForm');
    const idInput = document.getElementById('studentId');
    const passwordInput = document.getElementById('password');
    const submitBtn = form.querySelector('button[type="submit"]');

    idInput.addEventListener('input', () => {
      idInput.classList.remove('error');
      idInput.value = idInput.value.replace(/[^0-9]/g, '');
    });

    idInput.addEventListener('blur', () => {
      idInput.classList.toggle('error', idInput.value !== '' && !/^[0-9]{6}$/.test(idInput.value.trim()));
    });

    document.querySelector('.password-toggle').addEventListener('click', (event) => {
      const showing = passwordInput.type === 'text';
      passwordInput.type = showing ? 'password' : 'text';
      event.target.textContent = showing ? 'Show' : 'Hide';
    });

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      submitBtn.textContent = 'Signing In...';
      submitBtn.disabled = true;
      try {
        const data = await post('/api/login', {
          studentId: idInput.value.trim(),
          password: passwordInput.value
        });
        data.notifications.forEach((n) => showToast(n.message, n.kind));
        followRedirect(data.redirect);
      } catch (err) {
        submitBtn.textContent = 'Log In';
        submitBtn.disabled = false;
        showToast(err.message, 'error');
        if (err.details && err.details.focus) {
          document.getElementById(err.details.focus).focus();
        }
      }
    });
  </script>
</body>
</html>
"#;

const SIGNUP_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{PORTAL_NAME}} | Sign Up</title>
  <style>
{{STYLE}}
    main {
      display: grid;
      place-items: center;
      min-height: 100vh;
      padding: 24px;
    }

    form {
      display: grid;
      gap: 14px;
      width: min(420px, 100%);
    }
  </style>
</head>
<body>
  <main>
    <form id="signupForm" class="card">
      <h1>Create your account</h1>
      <input name="fullName" class="form-input" placeholder="Full name" />
      <input name="email" type="email" class="form-input" placeholder="Email" />
      <input name="password" type="password" class="form-input" placeholder="Password" />
      <button type="submit">Create Account</button>
      <p>Already registered? <a href="/login.html">Log in</a></p>
    </form>
  </main>
  <div id="toastContainer"></div>
  <script>
{{TOAST_SCRIPT}}
    const form = document.getElementById('signupForm');
    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const submitBtn = form.querySelector('button[type="submit"]');
      submitBtn.textContent = 'Creating Account...';
      submitBtn.disabled = true;
      try {
        const data = await post('/api/signup');
        followRedirect(data.redirect);
      } catch (err) {
        submitBtn.textContent = 'Create Account';
        submitBtn.disabled = false;
        showToast(err.message, 'error');
      }
    });
  </script>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{PORTAL_NAME}} | Dashboard</title>
  <style>
{{STYLE}}
    .layout {
      display: grid;
      grid-template-columns: 240px 1fr;
      min-height: 100vh;
    }

    #sidebar {
      background: var(--panel);
      padding: 24px 16px;
      display: grid;
      align-content: start;
      gap: 6px;
    }

    .nav-link {
      display: block;
      padding: 10px 12px;
      border-radius: 10px;
      color: var(--muted);
      text-decoration: none;
      text-transform: capitalize;
    }

    .nav-link.active {
      background: rgba(56, 189, 248, 0.15);
      color: var(--ink);
    }

    header {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 16px 24px;
    }

    header .spacer {
      flex: 1;
    }

    .notification-btn {
      position: relative;
    }

    #notificationCount {
      position: absolute;
      top: -6px;
      right: -6px;
      background: var(--danger);
      color: white;
      border-radius: 999px;
      padding: 2px 7px;
      font-size: 0.75rem;
    }

    .dropdown {
      display: none;
      position: absolute;
      right: 24px;
      top: 64px;
      min-width: 260px;
      z-index: 20;
    }

    .dropdown.show {
      display: block;
    }

    .page-content {
      display: none;
      padding: 0 24px 24px;
    }

    .page-content.active {
      display: block;
    }

    .calendar-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    #calendar-days {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .day {
      padding: 10px 0;
      text-align: center;
      border-radius: 8px;
      cursor: pointer;
    }

    .day.other-month {
      color: var(--muted);
      opacity: 0.5;
    }

    .day.today {
      background: var(--accent);
      color: #0f172a;
    }

    .day.has-event {
      box-shadow: inset 0 -3px 0 var(--ok);
    }

    .modal {
      display: none;
      position: fixed;
      inset: 0;
      background: rgba(2, 6, 23, 0.6);
      place-items: center;
      z-index: 30;
    }

    .modal.show {
      display: grid;
    }

    .modal form {
      display: grid;
      gap: 12px;
      width: min(460px, 92vw);
    }

    @media (max-width: 768px) {
      .layout {
        grid-template-columns: 1fr;
      }

      #sidebar {
        display: none;
      }

      #sidebar.open {
        display: grid;
      }
    }
  </style>
</head>
<body class="{{THEME_CLASS}}-theme">
  <div class="layout">
    <nav id="sidebar"></nav>
    <div>
      <header>
        <button type="button" id="sidebarToggle" aria-label="Menu">Menu</button>
        <input id="searchInput" class="form-input" placeholder="Search" />
        <span class="spacer"></span>
        <button type="button" id="themeToggle">Theme</button>
        <button type="button" class="notification-btn" data-dropdown="notificationDropdown">
          Alerts <span id="notificationCount"></span>
        </button>
        <button type="button" class="user-menu" data-dropdown="userDropdown">{{STUDENT_ID}}</button>
      </header>

      <div id="notificationDropdown" class="dropdown card">
        <div class="notification-item">Grades for Midterm are posted. <button type="button" class="mark-read">Mark read</button></div>
        <div class="notification-item">Library hold is ready. <button type="button" class="mark-read">Mark read</button></div>
        <div class="notification-item">Tuition reminder. <button type="button" class="mark-read">Mark read</button></div>
      </div>

      <div id="userDropdown" class="dropdown card">
        <button type="button" data-modal="profileModal">Edit profile</button>
        <button type="button" id="logoutBtn">Log out</button>
      </div>

      <section id="dashboard" class="page-content">
        <div class="card">
          <div class="calendar-header">
            <button type="button" id="prevMonth">&lsaquo;</button>
            <h2 id="current-month"></h2>
            <button type="button" id="nextMonth">&rsaquo;</button>
          </div>
          <div id="calendar-days"></div>
        </div>
      </section>
      <section id="courses" class="page-content"><div class="card"><h2>Courses</h2></div></section>
      <section id="assignments" class="page-content">
        <div class="card">
          <h2>Assignments</h2>
          <button type="button" data-modal="assignmentModal">New assignment</button>
        </div>
      </section>
      <section id="grades" class="page-content">
        <div class="card">
          <h2>Grades</h2>
          <button type="button" id="downloadReport">Download report</button>
        </div>
      </section>
      <section id="schedule" class="page-content"><div class="card"><h2>Schedule</h2></div></section>
      <section id="attendance" class="page-content"><div class="card"><h2>Attendance</h2></div></section>
      <section id="profile" class="page-content"><div class="card"><h2>Profile</h2></div></section>
    </div>
  </div>

  <div id="assignmentModal" class="modal">
    <form id="assignmentForm" class="card">
      <h2>Create Assignment</h2>
      <input name="title" class="form-input" placeholder="Title" required />
      <input name="course" class="form-input" placeholder="Course" />
      <input name="due_date" type="date" class="form-input" />
      <textarea name="description" class="form-input" placeholder="Description"></textarea>
      <button type="submit">Create Assignment</button>
    </form>
  </div>

  <div id="profileModal" class="modal">
    <form id="profileForm" class="card">
      <h2>Edit Profile</h2>
      <input name="full_name" class="form-input" placeholder="Full name" />
      <input name="email" type="email" class="form-input" placeholder="Email" />
      <input name="phone" class="form-input" placeholder="Phone" />
      <button type="submit">Save Changes</button>
    </form>
  </div>

  <div id="toastContainer"></div>
  <script>
{{TOAST_SCRIPT}}
    const SECTIONS = ['dashboard', 'courses', 'assignments', 'grades', 'schedule', 'attendance', 'profile'];
    const sidebar = document.getElementById('sidebar');

    SECTIONS.forEach((id) => {
      const link = document.createElement('a');
      link.href = '#';
      link.className = 'nav-link';
      link.dataset.page = id;
      link.textContent = id;
      link.addEventListener('click', (event) => {
        event.preventDefault();
        call('/api/navigate', { page: id, viewportWidth: window.innerWidth });
      });
      sidebar.appendChild(link);
    });

    const renderCalendar = (calendar) => {
      document.getElementById('current-month').textContent = calendar.label;
      const days = document.getElementById('calendar-days');
      days.innerHTML = '';
      calendar.cells.forEach((cell) => {
        const el = document.createElement('div');
        el.className = 'day';
        el.textContent = cell.day;
        if (!cell.in_month) {
          el.classList.add('other-month');
        } else {
          el.addEventListener('click', () => call('/api/calendar/select', { day: cell.day }));
        }
        if (cell.today) el.classList.add('today');
        if (cell.has_event) {
          el.classList.add('has-event');
          el.title = 'Event scheduled';
        }
        days.appendChild(el);
      });
    };

    const setBusy = (form, busy, label) => {
      const button = form.querySelector('button[type="submit"]');
      button.disabled = busy;
      if (label) button.textContent = label;
    };

    let refreshTimer = null;

    const apply = (view) => {
      document.body.classList.toggle('light-theme', view.theme === 'light');
      document.querySelectorAll('.page-content').forEach((p) => {
        p.classList.toggle('active', p.id === view.activePage);
      });
      document.querySelectorAll('.nav-link').forEach((link) => {
        link.classList.toggle('active', link.dataset.page === view.activePage);
      });
      sidebar.classList.toggle('open', view.sidebarOpen);
      document.querySelectorAll('.dropdown').forEach((d) => {
        d.classList.toggle('show', d.id === view.openDropdown);
      });
      document.querySelectorAll('.modal').forEach((m) => {
        m.classList.toggle('show', m.id === view.openModal);
      });
      document.body.style.overflow = view.openModal ? 'hidden' : 'auto';

      const badge = document.getElementById('notificationCount');
      badge.textContent = view.notificationCount;
      badge.style.display = view.badgeVisible ? '' : 'none';

      setBusy(document.getElementById('assignmentForm'), view.submitting.includes('assignment'));
      setBusy(document.getElementById('profileForm'), view.submitting.includes('profile'));
      document.getElementById('downloadReport').disabled = view.submitting.includes('report');

      renderCalendar(view.calendar);
      view.notifications.forEach((n) => showToast(n.message, n.kind));
      followRedirect(view.redirect);

      if (view.refreshAfterMs !== undefined) {
        clearTimeout(refreshTimer);
        refreshTimer = setTimeout(() => {
          fetch('/api/shell').then((res) => res.json()).then(apply).catch(() => {});
        }, view.refreshAfterMs + 50);
      }
    };

    const call = (url, body) =>
      post(url, body).then(apply).catch((err) => {
        showToast(err.message, 'error');
        if (err.details && err.details.redirect) {
          followRedirect({ url: err.details.redirect, delayMs: 0 });
        }
      });

    document.getElementById('prevMonth').addEventListener('click', () => call('/api/calendar/previous'));
    document.getElementById('nextMonth').addEventListener('click', () => call('/api/calendar/next'));
    document.getElementById('themeToggle').addEventListener('click', () => call('/api/theme/toggle'));
    document.getElementById('sidebarToggle').addEventListener('click', () => call('/api/sidebar/toggle'));
    document.getElementById('downloadReport').addEventListener('click', () => call('/api/report'));

    document.querySelectorAll('[data-dropdown]').forEach((button) => {
      button.addEventListener('click', (event) => {
        event.stopPropagation();
        call('/api/dropdown/toggle', { id: button.dataset.dropdown });
      });
    });

    document.querySelectorAll('[data-modal]').forEach((button) => {
      button.addEventListener('click', () => call('/api/modal/open', { id: button.dataset.modal }));
    });

    document.querySelectorAll('.mark-read').forEach((button) => {
      button.addEventListener('click', (event) => {
        event.stopPropagation();
        const item = button.closest('.notification-item');
        item.style.opacity = '0.6';
        setTimeout(() => {
          item.remove();
          call('/api/notifications/read');
        }, 300);
      });
    });

    document.getElementById('searchInput').addEventListener('keydown', (event) => {
      if (event.key === 'Enter') {
        call('/api/search', { query: event.target.value });
      }
    });

    document.getElementById('logoutBtn').addEventListener('click', () => {
      post('/api/logout').then((data) => {
        data.notifications.forEach((n) => showToast(n.message, n.kind));
        followRedirect(data.redirect);
      }).catch((err) => showToast(err.message, 'error'));
    });

    const formBody = (form) => {
      const body = {};
      new FormData(form).forEach((value, key) => {
        if (value !== '') body[key] = value;
      });
      return body;
    };

    document.getElementById('assignmentForm').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = event.target;
      setBusy(form, true, 'Creating...');
      call('/api/assignments', formBody(form)).finally(() => {
        setBusy(form, false, 'Create Assignment');
        form.reset();
      });
    });

    document.getElementById('profileForm').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = event.target;
      setBusy(form, true, 'Saving...');
      call('/api/profile', formBody(form)).finally(() => setBusy(form, false, 'Save Changes'));
    });

    document.addEventListener('click', (event) => {
      if (event.target.classList.contains('modal')) {
        call('/api/modal/close', { id: event.target.id });
      } else if (!event.target.closest('.dropdown') && document.querySelector('.dropdown.show')) {
        call('/api/dropdown/toggle', { id: document.querySelector('.dropdown.show').id });
      }
    });

    document.addEventListener('keydown', (event) => {
      if (event.key === 'Escape') call('/api/escape');
    });

    window.addEventListener('resize', () => {
      if (window.innerWidth > 768 && sidebar.classList.contains('open')) {
        call('/api/viewport', { width: window.innerWidth });
      }
    });

    apply({{INITIAL_VIEW}});
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_state::{ClientPageState, Theme};
    use crate::render::ShellRenderer;
    use crate::session::SessionRecord;
    use crate::validation::StudentId;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn login_page_escapes_portal_name() {
        let html = render_login("A & B <Portal>");
        assert!(html.contains("A &amp; B &lt;Portal&gt;"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn dashboard_embeds_initial_view() {
        let record = SessionRecord::new(StudentId::parse("403472").unwrap(), Utc::now());
        let mut page = ClientPageState::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), Theme::Light);
        let view = ShellView::compose(&record, &mut page, ShellRenderer::default());

        let html = render_dashboard("Portal", &view).unwrap();
        assert!(html.contains("<body class=\"light-theme\">"));
        assert!(html.contains("\"studentId\":\"403472\""));
        assert!(html.contains("October 2026"));
        assert!(!html.contains("{{"));
    }
}
