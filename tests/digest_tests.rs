use actix_web::{test, web, App};
use diesel::r2d2::{self, ConnectionManager};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use newsdigest::{
    api::{auth, cron, digest, health, news, users},
    api::cron::types::CronSettings,
    digest::DigestConfig,
    email::EmailGateway,
    news::client::NewsApiClient,
    security::SecurityHeaders,
    DbPool,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/migrations");

fn create_test_db() -> (TempDir, DbPool) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite://{}", db_path.display());

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("Failed to create pool");

    // Run migrations
    let mut conn = pool.get().expect("Failed to get connection");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    (temp_dir, pool)
}

/// Captures every delivery instead of talking to an SMTP server. The
/// `accept` flag drives it as a healthy or a failing mail relay.
struct RecordingGateway {
    accept: AtomicBool,
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingGateway {
    fn new() -> Arc<Self> {
        Arc::new(RecordingGateway {
            accept: AtomicBool::new(true),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    fn digests(&self) -> Vec<(String, String, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, subject, _)| subject.starts_with("Your Daily News"))
            .cloned()
            .collect()
    }

    fn welcome_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, subject, _)| subject.starts_with("Welcome to News Digest!"))
            .count()
    }

    fn last_welcome_body(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, subject, _)| subject.starts_with("Welcome to News Digest!"))
            .map(|(_, _, body)| body.clone())
    }
}

#[async_trait::async_trait]
impl EmailGateway for RecordingGateway {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> bool {
        self.sent.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        self.accept.load(Ordering::SeqCst)
    }
}

fn create_test_app(
    pool: DbPool,
    news_url: &str,
    gateway: Arc<RecordingGateway>,
    cron_secret: Option<String>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        Config = (),
        InitError = (),
    >,
> {
    let news_client = NewsApiClient::new(
        news_url.to_string(),
        "test-key".to_string(),
        Duration::from_secs(5),
    );
    let gateway: Arc<dyn EmailGateway> = gateway;

    // Same composition as main, minus CORS and rate limiting
    App::new()
        .app_data(web::Data::new(pool))
        .app_data(web::Data::new(news_client))
        .app_data(web::Data::from(gateway))
        .app_data(web::Data::new(DigestConfig::default()))
        .app_data(web::Data::new(CronSettings { secret: cron_secret }))
        .wrap(SecurityHeaders)
        .service(
            web::scope("/api/auth")
                .service(auth::handlers::register)
                .service(auth::handlers::login)
                .service(auth::handlers::logout),
        )
        .service(web::scope("/api/digest").service(digest::handlers::send_now))
        .service(health::routes())
        .service(
            web::scope("/api")
                .service(users::routes())
                .service(news::routes())
                .service(cron::routes()),
        )
}

fn article_json(title: &str) -> Value {
    json!({
        "source": { "id": null, "name": "Test Wire" },
        "title": title,
        "description": "A longer look at the story.",
        "url": "https://example.com/story",
        "urlToImage": "https://example.com/story.jpg",
        "publishedAt": "2025-06-01T08:00:00Z"
    })
}

async fn start_news_server(articles: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": articles.len(),
            "articles": articles,
        })))
        .mount(&server)
        .await;
    server
}

// Registers a user, logs in, applies preferences, and yields the
// session cookie value
macro_rules! create_subscriber {
    ($app:expr, $email:expr, $prefs:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&json!({ "email": $email, "password": "password123" }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&json!({ "email": $email, "password": "password123" }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert!(resp.status().is_success());

        let cookie_header = resp
            .headers()
            .get("set-cookie")
            .expect("login should set a cookie")
            .to_str()
            .expect("cookie header should be valid UTF-8");
        let start = cookie_header
            .find("session_id=")
            .expect("cookie should contain session_id")
            + "session_id=".len();
        let session = match cookie_header[start..].find(';') {
            Some(end) => cookie_header[start..start + end].to_string(),
            None => cookie_header[start..].to_string(),
        };

        let req = test::TestRequest::patch()
            .uri("/api/users/me/preferences")
            .cookie(actix_web::cookie::Cookie::new("session_id", &session))
            .set_json(&$prefs)
            .to_request();
        let resp = test::call_service($app, req).await;
        assert!(resp.status().is_success());

        session
    }};
}

#[actix_web::test]
async fn test_cron_trigger_delivers_due_digest() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let _session = create_subscriber!(
        &app,
        "reader@example.com",
        json!({ "topics": ["space"], "is_subscribed": true })
    );

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=12")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Digest check completed successfully.");

    let digests = gateway.digests();
    assert_eq!(digests.len(), 1);
    let (to, subject, html) = &digests[0];
    assert_eq!(to, "reader@example.com");
    assert!(subject.starts_with("Your Daily News for "));
    assert!(html.contains("Telescope spots distant comet"));
    assert!(html.contains("space"));
    assert!(html.contains("Test Wire"));
}

#[actix_web::test]
async fn test_cron_trigger_outside_periodic_hours_sends_nothing() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let _session = create_subscriber!(
        &app,
        "reader@example.com",
        json!({ "topics": ["space"], "is_subscribed": true })
    );

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=9")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    assert!(gateway.digests().is_empty());
}

#[actix_web::test]
async fn test_custom_schedule_honors_exact_hours() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let _session = create_subscriber!(
        &app,
        "custom@example.com",
        json!({
            "topics": ["space"],
            "is_subscribed": true,
            "schedule_kind": "custom",
            "schedule_hours": [8]
        })
    );

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=8")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(gateway.digests().len(), 1);

    // The default periodic hour does nothing for a custom schedule
    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=12")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(gateway.digests().len(), 1);
}

#[actix_web::test]
async fn test_empty_custom_schedule_never_sends() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let _session = create_subscriber!(
        &app,
        "paused@example.com",
        json!({
            "topics": ["space"],
            "is_subscribed": true,
            "schedule_kind": "custom",
            "schedule_hours": []
        })
    );

    for hour in [0, 8, 12, 23] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/cron/trigger-digest?hour={}", hour))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    assert!(gateway.digests().is_empty());
}

#[actix_web::test]
async fn test_cron_trigger_fans_out_to_all_due_subscribers() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let _alice = create_subscriber!(
        &app,
        "alice@example.com",
        json!({ "topics": ["space"], "is_subscribed": true })
    );
    let _bob = create_subscriber!(
        &app,
        "bob@example.com",
        json!({
            "topics": ["art"],
            "is_subscribed": true,
            "schedule_kind": "custom",
            "schedule_hours": [9]
        })
    );

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=12")
        .to_request();
    test::call_service(&app, req).await;

    let digests = gateway.digests();
    assert_eq!(digests.len(), 1);
    assert_eq!(digests[0].0, "alice@example.com");

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=9")
        .to_request();
    test::call_service(&app, req).await;

    let digests = gateway.digests();
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[1].0, "bob@example.com");
}

#[actix_web::test]
async fn test_cron_trigger_requires_bearer_when_secret_set() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(
        pool,
        &server.uri(),
        gateway.clone(),
        Some("cron-secret".to_string()),
    ))
    .await;

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest")
        .insert_header(("authorization", "Bearer wrong-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest")
        .insert_header(("authorization", "Bearer cron-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_cron_trigger_rejects_out_of_range_hour() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest?hour=24")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_cron_trigger_defaults_to_current_hour() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    // No subscribers, so whichever hour it is, the check completes
    let req = test::TestRequest::get()
        .uri("/api/cron/trigger-digest")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Digest check completed successfully.");
}

#[actix_web::test]
async fn test_send_now_ignores_schedule() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    // An empty custom schedule never fires on its own
    let session = create_subscriber!(
        &app,
        "impatient@example.com",
        json!({
            "topics": ["space"],
            "is_subscribed": true,
            "schedule_kind": "custom",
            "schedule_hours": []
        })
    );

    let req = test::TestRequest::post()
        .uri("/api/digest/send-now")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Digest sent successfully!");
    assert_eq!(gateway.digests().len(), 1);
}

#[actix_web::test]
async fn test_send_now_requires_topics() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "topicless@example.com",
        json!({ "is_subscribed": true })
    );

    let req = test::TestRequest::post()
        .uri("/api/digest/send-now")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert!(gateway.digests().is_empty());
}

#[actix_web::test]
async fn test_send_now_requires_session() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let req = test::TestRequest::post().uri("/api/digest/send-now").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_send_now_reports_empty_feed() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "quiet@example.com",
        json!({ "topics": ["space"], "is_subscribed": true })
    );

    let req = test::TestRequest::post()
        .uri("/api/digest/send-now")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No articles found for your topics right now.");
    assert!(gateway.digests().is_empty());
}

#[actix_web::test]
async fn test_failed_delivery_reported_and_retryable() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "flaky@example.com",
        json!({ "topics": ["space"], "is_subscribed": true })
    );

    gateway.set_accept(false);
    let req = test::TestRequest::post()
        .uri("/api/digest/send-now")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);

    // The failed attempt must not count as a delivery
    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["last_digest_sent_at"], 0);

    gateway.set_accept(true);
    let req = test::TestRequest::post()
        .uri("/api/digest/send-now")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/users/me")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body["last_digest_sent_at"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn test_welcome_email_sent_exactly_once() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "greeted@example.com",
        json!({ "topics": ["space"], "is_subscribed": true })
    );
    assert_eq!(gateway.welcome_count(), 1);

    let body = gateway.last_welcome_body().expect("welcome email captured");
    assert!(body.contains("Welcome Aboard!"));
    assert!(body.contains("space"));
    assert!(body.contains("dashboard"));

    // Further preference changes must not greet again
    let req = test::TestRequest::patch()
        .uri("/api/users/me/preferences")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .set_json(&json!({ "name": "Reader" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(gateway.welcome_count(), 1);
}

#[actix_web::test]
async fn test_welcome_email_waits_for_subscription() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "cautious@example.com",
        json!({ "topics": ["space"] })
    );
    assert_eq!(gateway.welcome_count(), 0);

    let req = test::TestRequest::patch()
        .uri("/api/users/me/preferences")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .set_json(&json!({ "is_subscribed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(gateway.welcome_count(), 1);
}

#[actix_web::test]
async fn test_preview_lists_upcoming_articles() {
    let server = start_news_server(vec![article_json("Telescope spots distant comet")]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "curious@example.com",
        json!({ "topics": ["space"] })
    );

    let req = test::TestRequest::get()
        .uri("/api/news/preview")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    let articles = body.as_array().expect("preview should be an array");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "Telescope spots distant comet");
    assert_eq!(articles[0]["topic"], "space");
    assert_eq!(articles[0]["source_name"], "Test Wire");
}

#[actix_web::test]
async fn test_preview_respects_good_news_preference() {
    let server = start_news_server(vec![
        article_json("War deepens recession fears"),
        article_json("Telescope spots distant comet"),
    ])
    .await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let session = create_subscriber!(
        &app,
        "optimist@example.com",
        json!({ "topics": ["space"], "good_news_only": true })
    );

    let req = test::TestRequest::get()
        .uri("/api/news/preview")
        .cookie(actix_web::cookie::Cookie::new("session_id", &session))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    let articles = body.as_array().expect("preview should be an array");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0]["title"], "Telescope spots distant comet");
}

#[actix_web::test]
async fn test_suggestions_require_session() {
    let server = start_news_server(vec![]).await;
    let gateway = RecordingGateway::new();
    let (_temp_dir, pool) = create_test_db();
    let app = test::init_service(create_test_app(pool, &server.uri(), gateway.clone(), None)).await;

    let req = test::TestRequest::get().uri("/api/news/suggestions").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
