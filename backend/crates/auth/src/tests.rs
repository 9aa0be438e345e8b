//! End-to-end auth flow through the router against the in-memory store

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;
use uuid::Uuid;

use crate::application::{CheckSessionUseCase, config::AuthConfig};
use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, session_token::SessionToken, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::memory::MemoryAuthRepository;
use crate::presentation::router::{NO_STORE, auth_router_generic};

const SECRET_PHRASE: &str = "test session secret";

fn config() -> AuthConfig {
    AuthConfig::from_secret_phrase(SECRET_PHRASE)
}

fn app<R>(repo: R) -> Router
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    auth_router_generic(repo, config())
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(path: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn credentials(email: &str, password: &str) -> String {
    format!(
        "username={}&password={}",
        email.replace('@', "%40"),
        password
    )
}

/// `name=value` pair from the response's Set-Cookie, usable as a Cookie header
fn session_cookie(resp: &Response<Body>) -> Option<String> {
    let set_cookie = resp.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    set_cookie.split(';').next().map(str::to_owned)
}

fn location(resp: &Response<Body>) -> Option<&str> {
    resp.headers().get(header::LOCATION)?.to_str().ok()
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> Response<Body> {
    app.clone()
        .oneshot(post_form("/register", &credentials(email, password), None))
        .await
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str, cookie: Option<&str>) -> Response<Body> {
    app.clone()
        .oneshot(post_form("/login", &credentials(email, password), cookie))
        .await
        .unwrap()
}

fn assert_redirect(resp: &Response<Body>, to: &str) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(resp), Some(to));
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_register_login_logout_scenario() {
    let app = app(MemoryAuthRepository::new());

    let resp = register(&app, "a@x.com", "pw1").await;
    assert_redirect(&resp, "/secrets");
    assert!(session_cookie(&resp).is_some());

    let resp = register(&app, "a@x.com", "pw1").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Email already exists. Try logging in.");

    let resp = login(&app, "a@x.com", "wrong", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Incorrect Password");

    let resp = login(&app, "a@x.com", "pw1", None).await;
    assert_redirect(&resp, "/secrets");
    let cookie = session_cookie(&resp).unwrap();

    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_redirect(&resp, "/");

    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn test_register_creates_user_and_session() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    assert_redirect(&resp, "/secrets");

    assert_eq!(repo.user_count().await, 1);
    assert_eq!(repo.sessions_for("a@x.com").await.len(), 1);

    let stored = repo
        .find_by_email(&Email::new("a@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash.as_str(), "pw1");
    assert!(stored.password_hash.as_str().starts_with("$argon2id$"));

    let cookie = session_cookie(&resp).unwrap();
    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let app = app(MemoryAuthRepository::new());

    let resp = register(&app, "a@x.com", "pw1").await;
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();

    assert!(set_cookie.starts_with("secrets.sid="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_duplicate_register_changes_nothing() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    register(&app, "a@x.com", "pw1").await;

    let resp = register(&app, "a@x.com", "other").await;
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(resp).await, "Email already exists. Try logging in.");

    assert_eq!(repo.user_count().await, 1);
    assert_eq!(repo.session_count().await, 1);

    // The first password still stands
    let resp = login(&app, "a@x.com", "other", None).await;
    assert_eq!(body_text(resp).await, "Incorrect Password");
}

#[tokio::test]
async fn test_unknown_user_never_logs_in() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = login(&app, "nobody@x.com", "pw1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(resp).await, "User not found");
    assert_eq!(repo.session_count().await, 0);
}

#[tokio::test]
async fn test_email_is_matched_exactly() {
    let app = app(MemoryAuthRepository::new());

    register(&app, "a@x.com", "pw1").await;

    let resp = login(&app, "A@x.com", "pw1", None).await;
    assert_eq!(body_text(resp).await, "User not found");
}

#[tokio::test]
async fn test_wrong_password_keeps_existing_session() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = login(&app, "a@x.com", "wrong", Some(&cookie)).await;
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(resp).await, "Incorrect Password");

    assert_eq!(repo.session_count().await, 1);
    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rotates_session() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    let first = session_cookie(&resp).unwrap();

    let resp = login(&app, "a@x.com", "pw1", Some(&first)).await;
    assert_redirect(&resp, "/secrets");
    let second = session_cookie(&resp).unwrap();
    assert_ne!(first, second);

    assert_eq!(repo.sessions_for("a@x.com").await.len(), 1);

    let resp = app.clone().oneshot(get("/secrets", Some(&first))).await.unwrap();
    assert_redirect(&resp, "/login");
    let resp = app.clone().oneshot(get("/secrets", Some(&second))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Guard
// ============================================================================

#[tokio::test]
async fn test_secrets_requires_session() {
    let app = app(MemoryAuthRepository::new());

    let resp = app.clone().oneshot(get("/secrets", None)).await.unwrap();
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn test_tampered_token_is_no_session() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    let cookie = session_cookie(&resp).unwrap();
    let session_id = cookie
        .trim_start_matches("secrets.sid=")
        .split_once('.')
        .unwrap()
        .0
        .to_owned();

    // Valid id, unsigned
    let unsigned = format!("secrets.sid={session_id}");
    let resp = app.clone().oneshot(get("/secrets", Some(&unsigned))).await.unwrap();
    assert_redirect(&resp, "/login");

    // Valid id, signed with another secret
    let foreign = SessionToken::issue(session_id.parse().unwrap(), &[7u8; 32]);
    let forged = format!("secrets.sid={}", foreign.as_str());
    let resp = app.clone().oneshot(get("/secrets", Some(&forged))).await.unwrap();
    assert_redirect(&resp, "/login");

    let resp = app
        .clone()
        .oneshot(get("/secrets", Some("secrets.sid=garbage")))
        .await
        .unwrap();
    assert_redirect(&resp, "/login");
}

#[tokio::test]
async fn test_expired_session_does_not_authorize() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let email = Email::new("a@x.com").unwrap();
    let session = Session::for_user(&email, chrono::Duration::seconds(-1));
    repo.insert(&session).await.unwrap();

    let token = SessionToken::issue(session.session_id, &config().session_secret);
    let cookie = format!("secrets.sid={}", token.as_str());

    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_redirect(&resp, "/login");

    assert_eq!(repo.cleanup_expired().await.unwrap(), 1);
    assert_eq!(repo.session_count().await, 0);
}

#[tokio::test]
async fn test_check_session_use_case() {
    let repo = std::sync::Arc::new(MemoryAuthRepository::new());
    let config = std::sync::Arc::new(config());
    let use_case = CheckSessionUseCase::new(repo.clone(), config.clone());

    let email = Email::new("a@x.com").unwrap();
    let session = Session::for_user(&email, chrono::Duration::hours(1));
    repo.insert(&session).await.unwrap();

    let token = SessionToken::issue(session.session_id, &config.session_secret);
    let found = use_case.execute(token.as_str()).await.unwrap().unwrap();
    assert_eq!(found.user(), Some("a@x.com"));

    let unknown = SessionToken::issue(Uuid::new_v4(), &config.session_secret);
    assert!(use_case.execute(unknown.as_str()).await.unwrap().is_none());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_cookie_and_session() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_redirect(&resp, "/");

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("secrets.sid=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    assert_eq!(repo.session_count().await, 0);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = app(MemoryAuthRepository::new());

    let resp = app.clone().oneshot(get("/logout", None)).await.unwrap();
    assert_redirect(&resp, "/");

    let resp = app
        .clone()
        .oneshot(get("/logout", Some("secrets.sid=garbage")))
        .await
        .unwrap();
    assert_redirect(&resp, "/");
}

/// Session store whose deletes always fail
#[derive(Clone, Default)]
struct FailingDeleteRepository(MemoryAuthRepository);

impl UserRepository for FailingDeleteRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.0.find_by_email(email).await
    }

    async fn create(&self, user: &User) -> AuthResult<bool> {
        self.0.create(user).await
    }
}

impl SessionRepository for FailingDeleteRepository {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        self.0.insert(session).await
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        self.0.find_by_id(session_id).await
    }

    async fn delete(&self, _session_id: Uuid) -> AuthResult<()> {
        Err(AuthError::Internal("session store unavailable".into()))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.0.cleanup_expired().await
    }
}

#[tokio::test]
async fn test_logout_failure_returns_to_secrets() {
    let repo = FailingDeleteRepository::default();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    let cookie = session_cookie(&resp).unwrap();

    let resp = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_redirect(&resp, "/secrets");
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    // The session survived
    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Store races and failures
// ============================================================================

/// Credential store whose lookup never sees existing users, so registration
/// only learns about a duplicate from the insert
#[derive(Clone, Default)]
struct BlindLookupRepository(MemoryAuthRepository);

impl UserRepository for BlindLookupRepository {
    async fn find_by_email(&self, _email: &Email) -> AuthResult<Option<User>> {
        Ok(None)
    }

    async fn create(&self, user: &User) -> AuthResult<bool> {
        self.0.create(user).await
    }
}

impl SessionRepository for BlindLookupRepository {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        self.0.insert(session).await
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        self.0.find_by_id(session_id).await
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.0.delete(session_id).await
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.0.cleanup_expired().await
    }
}

#[tokio::test]
async fn test_register_losing_insert_race_reports_email_taken() {
    let repo = BlindLookupRepository::default();
    let app = app(repo.clone());

    let resp = register(&app, "a@x.com", "pw1").await;
    assert_redirect(&resp, "/secrets");

    let resp = register(&app, "a@x.com", "pw2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(resp).await, "Email already exists. Try logging in.");

    assert_eq!(repo.0.user_count().await, 1);
    assert_eq!(repo.0.session_count().await, 1);
}

/// Credential store that cannot be reached
#[derive(Clone, Default)]
struct UnreachableUserRepository(MemoryAuthRepository);

impl UserRepository for UnreachableUserRepository {
    async fn find_by_email(&self, _email: &Email) -> AuthResult<Option<User>> {
        Err(AuthError::Database(sqlx::Error::Protocol(
            "connection reset by 10.0.0.7".into(),
        )))
    }

    async fn create(&self, _user: &User) -> AuthResult<bool> {
        Err(AuthError::Database(sqlx::Error::Protocol(
            "connection reset by 10.0.0.7".into(),
        )))
    }
}

impl SessionRepository for UnreachableUserRepository {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        self.0.insert(session).await
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        self.0.find_by_id(session_id).await
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.0.delete(session_id).await
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.0.cleanup_expired().await
    }
}

#[tokio::test]
async fn test_datastore_failure_is_internal_server_error() {
    let repo = UnreachableUserRepository::default();
    let app = app(repo.clone());

    for resp in [
        register(&app, "a@x.com", "pw1").await,
        login(&app, "a@x.com", "pw1", None).await,
    ] {
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_text(resp).await, "Internal Server Error");
    }

    assert_eq!(repo.0.session_count().await, 0);
}

#[tokio::test]
async fn test_unparseable_stored_hash_is_internal_server_error() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let user = User::new(
        Email::new("a@x.com").unwrap(),
        UserPassword::from_db("pw1"),
    );
    assert!(repo.create(&user).await.unwrap());

    let resp = login(&app, "a@x.com", "pw1", None).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_text(resp).await, "Internal Server Error");
    assert_eq!(repo.session_count().await, 0);
}

/// Session store that hands back one stored session even after it expired
/// and cannot delete anything
#[derive(Clone)]
struct StaleSessionRepository {
    users: MemoryAuthRepository,
    session: Session,
}

impl UserRepository for StaleSessionRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn create(&self, user: &User) -> AuthResult<bool> {
        self.users.create(user).await
    }
}

impl SessionRepository for StaleSessionRepository {
    async fn insert(&self, _session: &Session) -> AuthResult<()> {
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        Ok((session_id == self.session.session_id).then(|| self.session.clone()))
    }

    async fn delete(&self, _session_id: Uuid) -> AuthResult<()> {
        Err(AuthError::Internal("session store unavailable".into()))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_expired_session_with_failing_delete_is_no_session() {
    let email = Email::new("a@x.com").unwrap();
    let session = Session::for_user(&email, chrono::Duration::seconds(-1));
    let token = SessionToken::issue(session.session_id, &config().session_secret);
    let cookie = format!("secrets.sid={}", token.as_str());

    let app = app(StaleSessionRepository {
        users: MemoryAuthRepository::new(),
        session,
    });

    let resp = app.clone().oneshot(get("/secrets", Some(&cookie))).await.unwrap();
    assert_redirect(&resp, "/login");

    let resp = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Input and headers
// ============================================================================

#[tokio::test]
async fn test_empty_username_is_bad_request() {
    let repo = MemoryAuthRepository::new();
    let app = app(repo.clone());

    let resp = app
        .clone()
        .oneshot(post_form("/register", "username=&password=pw1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "Email is required");
    assert_eq!(repo.user_count().await, 0);
}

#[tokio::test]
async fn test_missing_form_field_is_bad_request() {
    let app = app(MemoryAuthRepository::new());

    let resp = app
        .clone()
        .oneshot(post_form("/login", "username=a%40x.com", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_business_messages_are_plain_text() {
    let app = app(MemoryAuthRepository::new());

    let resp = login(&app, "nobody@x.com", "pw1", None).await;
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_pages_render() {
    let app = app(MemoryAuthRepository::new());

    for path in ["/", "/login", "/register"] {
        let resp = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");

        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    let resp = app.clone().oneshot(get("/login", None)).await.unwrap();
    let html = body_text(resp).await;
    assert!(html.contains(r#"action="/login""#));
    assert!(html.contains(r#"name="username""#));
    assert!(html.contains(r#"name="password""#));
}

#[tokio::test]
async fn test_every_response_is_no_store() {
    let app = app(MemoryAuthRepository::new());

    for req in [
        get("/", None),
        get("/secrets", None),
        get("/logout", None),
        post_form("/login", &credentials("nobody@x.com", "pw1"), None),
    ] {
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            NO_STORE
        );
    }
}
