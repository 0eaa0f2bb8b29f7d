use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiClient;

/// Fallback messages when the server gives no usable error payload
const LOGIN_FALLBACK: &str = "Login failed";
const SIGNUP_FALLBACK: &str = "Signup failed";

/// Identity payload returned by the auth endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserIdentity {
    /// Staff and superusers may manage employees and reviews
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() && self.last_name.is_empty() {
            self.username.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string()
        }
    }
}

/// The current tab-lifetime session. Written only by `AuthManager`,
/// read-only to the rest of the application.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserIdentity>,
    pub authenticated: bool,
}

impl Session {
    fn set_user(&mut self, user: UserIdentity) {
        self.user = Some(user);
        self.authenticated = true;
    }

    fn clear(&mut self) {
        self.user = None;
        self.authenticated = false;
    }
}

/// Value-style outcome for auth operations. Network failures never escape
/// this module as errors; they arrive here as a failure with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub success: bool,
    pub error: Option<String>,
}

impl AuthResult {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

// Wire types shared with the client

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

/// Response from `GET /auth/user/`
#[derive(Debug, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

/// Response from login/signup. 2xx bodies only; rejections surface as
/// `ApiError` before this parses.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<UserIdentity>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
}

/// Owns the authentication lifecycle: the session, the login/signup/logout
/// operations, and the admin capability check.
#[derive(Debug, Default)]
pub struct AuthManager {
    session: Session,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.session.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// Pure predicate over the current session, recomputed on every call.
    /// Caching this separately would let a stale value outlive a logout.
    pub fn is_admin(&self) -> bool {
        self.session
            .user
            .as_ref()
            .map(UserIdentity::is_admin)
            .unwrap_or(false)
    }

    /// Startup handshake: fetch an anti-forgery token, then ask who the
    /// session cookie belongs to. Failures land in the unauthenticated
    /// state, which is always safe to show.
    pub async fn initialize(&mut self, api: &mut ApiClient) {
        if let Err(err) = api.fetch_csrf_token().await {
            warn!(error = %err, "Could not fetch anti-forgery token at startup");
            self.session.clear();
            return;
        }

        match api.current_user().await {
            Ok(status) if status.authenticated => match status.user {
                Some(user) => {
                    info!(username = %user.username, "Resumed existing session");
                    self.session.set_user(user);
                }
                None => self.session.clear(),
            },
            Ok(_) => self.session.clear(),
            Err(err) => {
                warn!(error = %err, "Auth status check failed");
                self.session.clear();
            }
        }
    }

    /// Submit credentials. The anti-forgery token is refreshed first and the
    /// two calls are strictly sequential: the server rotates the token when
    /// it establishes the session, so a stale one would be rejected.
    pub async fn login(&mut self, api: &mut ApiClient, credentials: &LoginRequest) -> AuthResult {
        if let Err(err) = api.fetch_csrf_token().await {
            warn!(error = %err, "Token refresh before login failed");
            return AuthResult::failed(err.server_message().unwrap_or(LOGIN_FALLBACK));
        }

        match api.login(credentials).await {
            Ok(response) if response.success => match response.user {
                Some(user) => {
                    info!(username = %user.username, "Login successful");
                    self.session.set_user(user);
                    AuthResult::ok()
                }
                None => AuthResult::failed(LOGIN_FALLBACK),
            },
            Ok(response) => {
                AuthResult::failed(response.error.unwrap_or_else(|| LOGIN_FALLBACK.to_string()))
            }
            Err(err) => {
                warn!(error = %err, "Login failed");
                AuthResult::failed(err.server_message().unwrap_or(LOGIN_FALLBACK))
            }
        }
    }

    /// Same contract as login, against the signup endpoint
    pub async fn signup(&mut self, api: &mut ApiClient, profile: &SignupRequest) -> AuthResult {
        if let Err(err) = api.fetch_csrf_token().await {
            warn!(error = %err, "Token refresh before signup failed");
            return AuthResult::failed(err.server_message().unwrap_or(SIGNUP_FALLBACK));
        }

        match api.signup(profile).await {
            Ok(response) if response.success => match response.user {
                Some(user) => {
                    info!(username = %user.username, "Signup successful");
                    self.session.set_user(user);
                    AuthResult::ok()
                }
                None => AuthResult::failed(SIGNUP_FALLBACK),
            },
            Ok(response) => {
                AuthResult::failed(response.error.unwrap_or_else(|| SIGNUP_FALLBACK.to_string()))
            }
            Err(err) => {
                warn!(error = %err, "Signup failed");
                AuthResult::failed(err.server_message().unwrap_or(SIGNUP_FALLBACK))
            }
        }
    }

    /// End the session. Clearing is a local guarantee: the session empties
    /// even when the server call fails.
    pub async fn logout(&mut self, api: &ApiClient) {
        if let Err(err) = api.logout().await {
            warn!(error = %err, "Logout request failed; clearing session anyway");
        }
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn identity(is_staff: bool, is_superuser: bool) -> UserIdentity {
        UserIdentity {
            id: 1,
            username: "casey".to_string(),
            email: "casey@example.com".to_string(),
            first_name: "Casey".to_string(),
            last_name: "Lee".to_string(),
            is_staff,
            is_superuser,
        }
    }

    fn admin_json() -> serde_json::Value {
        serde_json::json!({
            "id": 1, "username": "admin", "email": "admin@example.com",
            "first_name": "Ada", "last_name": "Min",
            "is_staff": true, "is_superuser": false
        })
    }

    async fn mock_csrf(server: &MockServer, token: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/csrf-token/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"csrfToken": token})),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn test_is_admin_predicate() {
        assert!(identity(true, false).is_admin());
        assert!(identity(false, true).is_admin());
        assert!(identity(true, true).is_admin());
        assert!(!identity(false, false).is_admin());

        // Absent user is never an admin
        let auth = AuthManager::new();
        assert!(!auth.is_admin());
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_session_unauthenticated() {
        let server = MockServer::start().await;
        mock_csrf(&server, "t1").await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let mut api = ApiClient::new(server.uri()).expect("client should build");
        let mut auth = AuthManager::new();

        let credentials = LoginRequest {
            username: "admin".to_string(),
            password: "wrong".to_string(),
        };
        let result = auth.login(&mut api, &credentials).await;

        assert_eq!(
            result,
            AuthResult {
                success: false,
                error: Some("Invalid credentials".to_string()),
            }
        );
        assert!(!auth.is_authenticated());
        assert!(!auth.is_admin());
        assert!(auth.user().is_none());
    }

    #[tokio::test]
    async fn test_successful_login_populates_session() {
        let server = MockServer::start().await;
        mock_csrf(&server, "t1").await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "user": admin_json(),
                "csrfToken": "t2"
            })))
            .mount(&server)
            .await;

        let mut api = ApiClient::new(server.uri()).expect("client should build");
        let mut auth = AuthManager::new();

        let credentials = LoginRequest {
            username: "admin".to_string(),
            password: "right".to_string(),
        };
        let result = auth.login(&mut api, &credentials).await;

        assert!(result.success);
        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
        assert_eq!(auth.user().map(|u| u.username.as_str()), Some("admin"));
        // Session establishment rotated the token
        assert_eq!(api.csrf_token(), Some("t2"));
    }

    #[tokio::test]
    async fn test_application_level_failure_flag() {
        let server = MockServer::start().await;
        mock_csrf(&server, "t1").await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": false, "error": "Account disabled"}),
            ))
            .mount(&server)
            .await;

        let mut api = ApiClient::new(server.uri()).expect("client should build");
        let mut auth = AuthManager::new();

        let credentials = LoginRequest {
            username: "casey".to_string(),
            password: "pw".to_string(),
        };
        let result = auth.login(&mut api, &credentials).await;
        assert_eq!(result.error.as_deref(), Some("Account disabled"));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_on_transport_failure() {
        // Nothing is listening here, so the logout call is a network error
        let api = ApiClient::new("http://127.0.0.1:9").expect("client should build");
        let mut auth = AuthManager::new();
        auth.session.set_user(identity(true, false));
        assert!(auth.is_authenticated());

        auth.logout(&api).await;

        assert!(!auth.is_authenticated());
        assert!(auth.user().is_none());
        assert!(!auth.is_admin());
    }

    #[tokio::test]
    async fn test_initialize_populates_from_status_check() {
        let server = MockServer::start().await;
        mock_csrf(&server, "t1").await;
        Mock::given(method("GET"))
            .and(path("/auth/user/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"authenticated": true, "user": admin_json()}),
            ))
            .mount(&server)
            .await;

        let mut api = ApiClient::new(server.uri()).expect("client should build");
        let mut auth = AuthManager::new();
        auth.initialize(&mut api).await;

        assert!(auth.is_authenticated());
        let user = auth.user().expect("user should be set");
        assert_eq!(user.username, "admin");
        assert_eq!(user.first_name, "Ada");
        assert!(user.is_staff);
    }

    #[tokio::test]
    async fn test_initialize_unauthenticated_and_failing_check() {
        // authenticated: false
        let server = MockServer::start().await;
        mock_csrf(&server, "t1").await;
        Mock::given(method("GET"))
            .and(path("/auth/user/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"authenticated": false})),
            )
            .mount(&server)
            .await;

        let mut api = ApiClient::new(server.uri()).expect("client should build");
        let mut auth = AuthManager::new();
        auth.initialize(&mut api).await;
        assert!(!auth.is_authenticated());

        // failing status check
        let failing = MockServer::start().await;
        mock_csrf(&failing, "t1").await;
        Mock::given(method("GET"))
            .and(path("/auth/user/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&failing)
            .await;

        let mut api = ApiClient::new(failing.uri()).expect("client should build");
        let mut auth = AuthManager::new();
        auth.session.set_user(identity(false, false));
        auth.initialize(&mut api).await;
        assert!(!auth.is_authenticated());
        assert!(auth.user().is_none());
    }
}
