use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode, redirect::Policy};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Redirect {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Notification {
    message: String,
}

#[derive(Debug, Deserialize)]
struct FlowResponse {
    notifications: Vec<Notification>,
    redirect: Option<Redirect>,
}

#[derive(Debug, Deserialize)]
struct Calendar {
    label: String,
    cells: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShellView {
    student_id: String,
    active_page: String,
    calendar: Calendar,
    notification_count: u32,
    badge_visible: bool,
    theme: String,
    submitting: Vec<String>,
    notifications: Vec<Notification>,
    refresh_after_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    kind: String,
    focus: Option<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static SLOW_SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

const SLOW_FORM_LATENCY_MS: u64 = 600;

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PIDS: [AtomicI32; 2] = [AtomicI32::new(0), AtomicI32::new(0)];

    pub fn register(pid: u32) {
        for slot in &PIDS {
            if slot
                .compare_exchange(0, pid as i32, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                break;
            }
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        for slot in &PIDS {
            let pid = slot.load(Ordering::SeqCst);
            if pid > 0 {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_store_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("student_portal_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

async fn wait_until_ready(base_url: &str) {
    let client = client();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/login.html")).send().await {
            if resp.status().is_success() || resp.status().is_redirection() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(form_latency_ms: u64) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_student_portal"))
        .env("PORT", port.to_string())
        .env("PORTAL_STORE_PATH", unique_store_path())
        .env("PORTAL_LOGIN_LATENCY_MS", "0")
        .env("PORTAL_FORM_LATENCY_MS", form_latency_ms.to_string())
        .env("PORTAL_SIGNUP_LATENCY_MS", "0")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn server_from(slot: &Mutex<Option<Arc<TestServer>>>, form_latency_ms: u64) -> Arc<TestServer> {
    let mut guard = slot.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(form_latency_ms).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn shared_server() -> Arc<TestServer> {
    server_from(&SERVER, 0).await
}

async fn slow_server() -> Arc<TestServer> {
    server_from(&SLOW_SERVER, SLOW_FORM_LATENCY_MS).await
}

async fn login(client: &Client, base_url: &str, student_id: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/login"))
        .json(&serde_json::json!({ "studentId": student_id, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn logout(client: &Client, base_url: &str) {
    let response = client
        .post(format!("{base_url}/api/logout"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn http_anonymous_dashboard_redirects_to_login() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = client();
    logout(&client, &server.base_url).await;

    let response = client
        .get(format!("{}/dashboard.html", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login.html");

    let response = client
        .get(format!("{}/signup.html", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/api/calendar/next", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_login_rejects_bad_input() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = client();
    logout(&client, &server.base_url).await;

    let response = login(&client, &server.base_url, "4034", "demo123").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.kind, "validation");
    assert_eq!(body.focus.as_deref(), Some("studentId"));

    let response = login(&client, &server.base_url, "403472", "nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.message, "Invalid credentials");
}

#[tokio::test]
async fn http_login_ignores_non_digits_in_student_id() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = client();
    logout(&client, &server.base_url).await;

    let response = login(&client, &server.base_url, " 403-472 ", "demo123").await;
    assert_eq!(response.status(), StatusCode::OK);

    let view: ShellView = client
        .get(format!("{}/api/shell", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.student_id, "403472");
    logout(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_login_then_dashboard_interactions() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = client();
    logout(&client, &server.base_url).await;

    let response = login(&client, &server.base_url, "403472", "demo123").await;
    assert!(response.status().is_success());
    let flow: FlowResponse = response.json().await.unwrap();
    assert_eq!(flow.notifications[0].message, "Login successful!");
    assert_eq!(flow.redirect.unwrap().url, "/dashboard.html");

    let response = client
        .get(format!("{}/login.html", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/dashboard.html");

    let response = client
        .get(format!("{}/dashboard.html", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("403472"));

    let view: ShellView = client
        .post(format!("{}/api/navigate", server.base_url))
        .json(&serde_json::json!({ "page": "grades", "viewportWidth": 500 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.student_id, "403472");
    assert_eq!(view.active_page, "grades");
    assert_eq!(view.notifications[0].message, "Navigated to Grades");
    assert_eq!(view.calendar.cells.len(), 42);

    let before = view.calendar.label.clone();
    let view: ShellView = client
        .post(format!("{}/api/calendar/next", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(view.calendar.label, before);
    assert_eq!(view.calendar.cells.len(), 42);

    let mut count = view.notification_count;
    for _ in 0..count + 1 {
        let view: ShellView = client
            .post(format!("{}/api/notifications/read", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        count = count.saturating_sub(1);
        assert_eq!(view.notification_count, count);
    }
    let view: ShellView = client
        .get(format!("{}/api/shell", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.notification_count, 0);
    assert!(!view.badge_visible);

    let theme = view.theme.clone();
    let view: ShellView = client
        .post(format!("{}/api/theme/toggle", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(view.theme, theme);

    let view: ShellView = client
        .post(format!("{}/api/assignments", server.base_url))
        .json(&serde_json::json!({ "title": "Lab report", "course": "CHEM 101" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        view.notifications
            .iter()
            .any(|n| n.message == "Assignment created successfully!")
    );

    logout(&client, &server.base_url).await;
    let response = client
        .get(format!("{}/dashboard.html", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/login.html");
}

async fn open_dashboard(client: &Client, base_url: &str) {
    logout(client, base_url).await;
    let response = login(client, base_url, "403472", "demo123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = client
        .get(format!("{base_url}/dashboard.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn http_report_download_finishes_on_later_refresh() {
    let _guard = TEST_LOCK.lock().await;
    let server = slow_server().await;
    let client = client();
    open_dashboard(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/report", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view: ShellView = response.json().await.unwrap();
    assert_eq!(view.submitting, vec!["report".to_string()]);
    assert_eq!(view.refresh_after_ms, Some(SLOW_FORM_LATENCY_MS));
    assert!(view.notifications.iter().any(|n| n.message == "Downloading report..."));

    let response = client
        .post(format!("{}/api/report", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.kind, "submission_in_flight");

    sleep(Duration::from_millis(SLOW_FORM_LATENCY_MS * 2)).await;

    let view: ShellView = client
        .get(format!("{}/api/shell", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(view.submitting.is_empty());
    assert!(
        view.notifications
            .iter()
            .any(|n| n.message == "Report downloaded successfully!")
    );

    let view: ShellView = client
        .get(format!("{}/api/shell", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(view.notifications.is_empty());

    logout(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_dashboard_reload_cancels_pending_submission() {
    let _guard = TEST_LOCK.lock().await;
    let server = slow_server().await;
    let client = client();
    open_dashboard(&client, &server.base_url).await;

    let submit = {
        let client = client.clone();
        let url = format!("{}/api/assignments", server.base_url);
        tokio::spawn(async move {
            client
                .post(url)
                .json(&serde_json::json!({ "title": "Lab report", "course": "CHEM 101" }))
                .send()
                .await
                .unwrap()
        })
    };

    sleep(Duration::from_millis(SLOW_FORM_LATENCY_MS / 4)).await;
    let response = client
        .get(format!("{}/dashboard.html", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = submit.await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.kind, "cancelled");

    let view: ShellView = client
        .get(format!("{}/api/shell", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(view.submitting.is_empty());

    logout(&client, &server.base_url).await;
}
