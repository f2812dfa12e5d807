use once_cell::sync::Lazy;
use axum::{Router, routing::get};
use reqwest::{Client, StatusCode, redirect::Policy};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct WeekResponse {
    start_date: String,
    end_date: String,
    dates: Vec<String>,
    goal: f64,
    daily_mileage: HashMap<String, f64>,
    total: f64,
    remaining: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
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
static PROXY: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Mutex;
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
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

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn unique_data_path() -> String {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "mileage_tracker_http_{}_{}.json",
        std::process::id(),
        unique_suffix()
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/weeks")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(upstream: Option<&str>) -> TestServer {
    let port = pick_free_port();
    let mut command = Command::new(env!("CARGO_BIN_EXE_mileage_tracker"));
    command
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", unique_data_path())
        .env("RUST_LOG", "info")
        .env_remove("APP_SEED_EXAMPLE")
        .env_remove("APP_UPSTREAM_URL")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(url) = upstream {
        command.env("APP_UPSTREAM_URL", url);
    }
    let child = command.spawn().expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(None).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn proxy_server(upstream: &str) -> Arc<TestServer> {
    let mut guard = PROXY.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(Some(upstream)).await);
    *guard = Some(Arc::clone(&server));
    server
}

/// Serves `router` from this test's runtime and returns its base URL.
async fn spawn_stub_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub upstream");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

async fn assert_upstream_failure(upstream: &str, expected: &str) {
    let proxy = spawn_server(Some(upstream)).await;
    let response = Client::new()
        .get(format!("{}/api/week?athlete=1&start=2024-01-01", proxy.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(
        body.error.starts_with(expected),
        "unexpected error message: {}",
        body.error
    );
}

fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("build client")
}

async fn register(base_url: &str, username: &str, goal: &str) -> u64 {
    let response = no_redirect_client()
        .post(format!("{base_url}/register"))
        .form(&[
            ("username", username),
            ("first_name", "Tori"),
            ("last_name", "Runner"),
            ("gender", "F"),
            ("mileage_goal", goal),
            ("long_run_goal", "8"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("missing redirect location")
        .to_string();
    location
        .strip_prefix("/?athlete=")
        .and_then(|id| id.parse().ok())
        .expect("redirect should carry the athlete id")
}

async fn log_run(base_url: &str, athlete: u64, date: &str, distance: f64) {
    let response = Client::new()
        .post(format!("{base_url}/api/athletes/{athlete}/activities"))
        .json(&json!({ "date": date, "distance": distance }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

async fn fetch_week(base_url: &str, athlete: u64, start: &str) -> WeekResponse {
    let response = Client::new()
        .get(format!("{base_url}/api/week?athlete={athlete}&start={start}"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_weekly_summary_buckets_runs() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let athlete = register(&server.base_url, &format!("weekly{}", unique_suffix()), "10").await;

    log_run(&server.base_url, athlete, "2024-01-01", 5.0).await;
    log_run(&server.base_url, athlete, "2024-01-03", 3.0).await;
    log_run(&server.base_url, athlete, "2023-12-25", 6.0).await;
    log_run(&server.base_url, athlete, "2024-01-08", 2.0).await;

    let week = fetch_week(&server.base_url, athlete, "2024-01-01").await;
    assert_eq!(week.start_date, "2024-01-01");
    assert_eq!(week.end_date, "2024-01-07");
    assert_eq!(week.dates.first().map(String::as_str), Some("2024-01-01"));
    assert_eq!(week.dates.last().map(String::as_str), Some("2024-01-07"));
    assert_eq!(week.daily_mileage["Monday"], 5.0);
    assert_eq!(week.daily_mileage["Wednesday"], 3.0);
    assert_eq!(week.daily_mileage.len(), 7);
    assert_eq!(week.total, 8.0);
    assert_eq!(week.goal, 10.0);
    assert_eq!(week.remaining, 2.0);

    // A Sunday start is aligned back to its Monday.
    let aligned = fetch_week(&server.base_url, athlete, "2024-01-07").await;
    assert_eq!(aligned.start_date, "2024-01-01");
    assert_eq!(aligned.total, 8.0);
}

#[tokio::test]
async fn http_register_rejects_duplicate_username() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let username = format!("dup{}", unique_suffix());
    register(&server.base_url, &username, "").await;

    let response = no_redirect_client()
        .post(format!("{}/register", server.base_url))
        .form(&[("username", username.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "User already exists");

    let response = no_redirect_client()
        .post(format!("{}/register", server.base_url))
        .form(&[("username", "someone"), ("mileage_goal", "-3")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_goal_update_changes_remaining() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let athlete = register(&server.base_url, &format!("goal{}", unique_suffix()), "5").await;
    log_run(&server.base_url, athlete, "2024-02-06", 4.0).await;

    let response = client
        .put(format!("{}/api/athletes/{athlete}/goals", server.base_url))
        .json(&json!({ "mileage_goal": 20.0 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let week = fetch_week(&server.base_url, athlete, "2024-02-05").await;
    assert_eq!(week.goal, 20.0);
    assert_eq!(week.remaining, 16.0);

    let response = client
        .put(format!("{}/api/athletes/{athlete}/goals", server.base_url))
        .json(&json!({ "mileage_goal": -1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_unknown_athlete_gets_empty_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let week = fetch_week(&server.base_url, 999_999, "2024-01-01").await;
    assert_eq!(week.total, 0.0);
    assert_eq!(week.goal, 0.0);
    assert_eq!(week.remaining, 0.0);
    assert!(week.daily_mileage.values().all(|miles| *miles == 0.0));

    let response = Client::new()
        .get(format!("{}/api/week?start=last-tuesday", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for start in ["%2B262142-12-31", "-262143-01-01"] {
        let response = Client::new()
            .get(format!("{}/api/week?start={start}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json().await.unwrap();
        assert!(body.error.starts_with("invalid start date"));
    }

    let response = Client::new()
        .get(format!("{}/api/athletes/999999/activities", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_import_and_data_shapes() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let athlete = register(&server.base_url, &format!("strava{}", unique_suffix()), "30").await;

    let response = client
        .post(format!("{}/api/athletes/{athlete}/import", server.base_url))
        .json(&json!([
            { "name": "Easy", "distance": 8046.72, "start_date_local": "2024-03-04T07:15:00Z" },
            { "name": "Long", "distance": 16093.4, "start_date_local": "2024-03-10T08:00:00" }
        ]))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["imported"], 2);
    assert_eq!(body["latest_date"], "2024-03-10");

    let activities: serde_json::Value = client
        .get(format!("{}/api/athletes/{athlete}/activities", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(activities["mileage_goal"], 30.0);
    assert_eq!(activities["activities"][0]["distance"], 5.0);
    assert_eq!(activities["activities"][0]["athlete_id"], athlete);

    let roster: Vec<serde_json::Value> = client
        .get(format!("{}/data", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = roster
        .iter()
        .find(|entry| entry["athlete_id"] == athlete)
        .expect("athlete missing from roster");
    assert_eq!(entry["mileage"].as_array().unwrap().len(), 2);

    let week = fetch_week(&server.base_url, athlete, "2024-03-04").await;
    assert_eq!(week.daily_mileage["Monday"], 5.0);
    assert_eq!(week.daily_mileage["Sunday"], 10.0);
    assert_eq!(week.remaining, 15.0);
}

#[tokio::test]
async fn http_upstream_week_matches_local_week() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let athlete = register(&server.base_url, &format!("proxy{}", unique_suffix()), "12").await;
    log_run(&server.base_url, athlete, "2024-04-02", 7.5).await;

    let proxy = proxy_server(&server.base_url).await;
    let local = fetch_week(&server.base_url, athlete, "2024-04-01").await;
    let remote = fetch_week(&proxy.base_url, athlete, "2024-04-01").await;

    assert_eq!(remote.total, local.total);
    assert_eq!(remote.goal, 12.0);
    assert_eq!(remote.daily_mileage["Tuesday"], 7.5);
    assert_eq!(remote.remaining, 4.5);
}

#[tokio::test]
async fn http_dashboard_pages_render() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("mileageTableBody"));

    let html = client
        .get(format!("{}/register", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("registerForm"));
}

#[tokio::test]
async fn http_unreachable_upstream_is_bad_gateway() {
    let _guard = TEST_LOCK.lock().await;
    let closed = format!("http://127.0.0.1:{}", pick_free_port());
    assert_upstream_failure(&closed, "upstream request failed").await;
}

#[tokio::test]
async fn http_upstream_error_status_is_bad_gateway() {
    let _guard = TEST_LOCK.lock().await;
    let upstream = spawn_stub_upstream(Router::new().route(
        "/data",
        get(|| async { (axum::http::StatusCode::NOT_FOUND, "gone") }),
    ))
    .await;
    assert_upstream_failure(&upstream, "upstream request failed with status 404").await;
}

#[tokio::test]
async fn http_upstream_malformed_body_is_bad_gateway() {
    let _guard = TEST_LOCK.lock().await;
    let upstream = spawn_stub_upstream(
        Router::new().route("/data", get(|| async { "<html>not json</html>" })),
    )
    .await;
    assert_upstream_failure(&upstream, "upstream returned malformed payload").await;
}
