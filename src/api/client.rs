//! API client for communicating with the Employee Performance System REST API.
//!
//! This module provides the `ApiClient` struct for making session-backed
//! requests to the employee, review, and auth endpoint groups.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use crate::auth::{AuthResponse, AuthStatus, LoginRequest, SignupRequest};
use crate::models::{
    Employee, EmployeeInput, EmployeeStats, ListResponse, PerformanceReview, ReviewInput,
    ReviewStats,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the backend API (development server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout in seconds.
/// The backend answers small JSON payloads; anything slower than this is down.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Header the server expects the anti-forgery token echoed back in
const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Deserialize)]
struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// API client for the Employee Performance System backend.
///
/// The inner reqwest client carries a cookie store, so the server-side
/// session cookie set at login rides along automatically. The anti-forgery
/// token is owned here as an explicit value: fetched via
/// [`fetch_csrf_token`](Self::fetch_csrf_token), rotated by login/signup
/// responses, and attached to every mutating request.
///
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            csrf_token: None,
        })
    }

    /// The anti-forgery token currently held, if any
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Attach the anti-forgery header to a mutating request.
    /// Safe methods never carry it; the server does not require it for reads.
    fn with_csrf(&self, request: RequestBuilder) -> RequestBuilder {
        match self.csrf_token {
            Some(ref token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if a response is successful; on failure, log the server's error
    /// payload and surface it to the caller unchanged.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            error!(%status, error = %err, "API request failed");
            Err(err)
        }
    }

    fn log_transport(url: &str, err: reqwest::Error) -> ApiError {
        error!(url, error = %err, "Request could not be sent");
        ApiError::Network(err)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Self::log_transport(&url, e))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let request = self.with_csrf(self.client.post(&url)).json(body);
        let response = request
            .send()
            .await
            .map_err(|e| Self::log_transport(&url, e))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "PUT");

        let request = self.with_csrf(self.client.put(&url)).json(body);
        let response = request
            .send()
            .await
            .map_err(|e| Self::log_transport(&url, e))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(%url, "DELETE");

        let request = self.with_csrf(self.client.delete(&url));
        let response = request
            .send()
            .await
            .map_err(|e| Self::log_transport(&url, e))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // =========================================================================
    // Auth endpoints
    // =========================================================================

    /// Fetch a fresh anti-forgery token and hold it for subsequent mutations
    pub async fn fetch_csrf_token(&mut self) -> Result<(), ApiError> {
        let response: CsrfTokenResponse = self.get("/auth/csrf-token/").await?;
        self.csrf_token = Some(response.csrf_token);
        Ok(())
    }

    /// Ask the server who the session cookie belongs to
    pub async fn current_user(&self) -> Result<AuthStatus, ApiError> {
        self.get("/auth/user/").await
    }

    /// Submit credentials. The server rotates the anti-forgery token when it
    /// establishes the session, so a rotated token in the response replaces
    /// the held one.
    pub async fn login(&mut self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post("/auth/login/", credentials).await?;
        if let Some(ref token) = response.csrf_token {
            self.csrf_token = Some(token.clone());
        }
        Ok(response)
    }

    /// Register a new account; logs the session in on success
    pub async fn signup(&mut self, profile: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post("/auth/signup/", profile).await?;
        if let Some(ref token) = response.csrf_token {
            self.csrf_token = Some(token.clone());
        }
        Ok(response)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post("/auth/logout/", &serde_json::json!({})).await?;
        Ok(())
    }

    // =========================================================================
    // Employee endpoints
    // =========================================================================

    pub async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let response: ListResponse<Employee> = self.get("/employees/").await?;
        Ok(response.into_vec())
    }

    pub async fn get_employee(&self, id: i64) -> Result<Employee, ApiError> {
        self.get(&format!("/employees/{}/", id)).await
    }

    pub async fn create_employee(&self, input: &EmployeeInput) -> Result<Employee, ApiError> {
        self.post("/employees/", input).await
    }

    pub async fn update_employee(
        &self,
        id: i64,
        input: &EmployeeInput,
    ) -> Result<Employee, ApiError> {
        self.put(&format!("/employees/{}/", id), input).await
    }

    pub async fn delete_employee(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/employees/{}/", id)).await
    }

    /// Reviews belonging to one employee
    pub async fn employee_reviews(&self, id: i64) -> Result<Vec<PerformanceReview>, ApiError> {
        let response: ListResponse<PerformanceReview> =
            self.get(&format!("/employees/{}/reviews/", id)).await?;
        Ok(response.into_vec())
    }

    /// Distinct department names in use
    pub async fn list_departments(&self) -> Result<Vec<String>, ApiError> {
        self.get("/employees/departments/").await
    }

    pub async fn employee_statistics(&self) -> Result<EmployeeStats, ApiError> {
        self.get("/employees/statistics/").await
    }

    // =========================================================================
    // Review endpoints
    // =========================================================================

    /// List reviews, optionally scoped to one employee
    pub async fn list_reviews(
        &self,
        employee: Option<i64>,
    ) -> Result<Vec<PerformanceReview>, ApiError> {
        let query: Vec<(&str, String)> = match employee {
            Some(id) => vec![("employee", id.to_string())],
            None => vec![],
        };
        let response: ListResponse<PerformanceReview> =
            self.get_with_query("/reviews/", &query).await?;
        Ok(response.into_vec())
    }

    pub async fn get_review(&self, id: i64) -> Result<PerformanceReview, ApiError> {
        self.get(&format!("/reviews/{}/", id)).await
    }

    pub async fn create_review(&self, input: &ReviewInput) -> Result<PerformanceReview, ApiError> {
        self.post("/reviews/", input).await
    }

    pub async fn update_review(
        &self,
        id: i64,
        input: &ReviewInput,
    ) -> Result<PerformanceReview, ApiError> {
        self.put(&format!("/reviews/{}/", id), input).await
    }

    pub async fn delete_review(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/reviews/{}/", id)).await
    }

    /// Distinct review period labels, sorted by the server
    pub async fn list_review_periods(&self) -> Result<Vec<String>, ApiError> {
        self.get("/reviews/periods/").await
    }

    pub async fn review_statistics(&self) -> Result<ReviewStats, ApiError> {
        self.get("/reviews/statistics/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn employee_json() -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "first_name": "Alice",
            "last_name": "Johnson",
            "full_name": "Alice Johnson",
            "email": "alice@example.com",
            "department": "Engineering",
            "date_of_joining": "2023-04-01",
            "reviews_count": 2,
            "average_rating": 4.5
        })
    }

    #[tokio::test]
    async fn test_fetch_csrf_token_stores_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/csrf-token/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"csrfToken": "tok-1"})),
            )
            .mount(&server)
            .await;

        let mut client = ApiClient::new(server.uri()).expect("client should build");
        assert_eq!(client.csrf_token(), None);

        client.fetch_csrf_token().await.expect("token fetch should succeed");
        assert_eq!(client.csrf_token(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_mutating_call_carries_csrf_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/csrf-token/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"csrfToken": "tok-abc"})),
            )
            .mount(&server)
            .await;
        // The mock only matches when the header equals the held token,
        // so a passing create proves the header was attached.
        Mock::given(method("POST"))
            .and(path("/employees/"))
            .and(header("X-CSRFToken", "tok-abc"))
            .respond_with(ResponseTemplate::new(201).set_body_json(employee_json()))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ApiClient::new(server.uri()).expect("client should build");
        client.fetch_csrf_token().await.expect("token fetch should succeed");

        let input = EmployeeInput {
            first_name: "Alice".to_string(),
            last_name: "Johnson".to_string(),
            email: "alice@example.com".to_string(),
            department: "Engineering".to_string(),
            date_of_joining: "2023-04-01".to_string(),
        };
        let created = client.create_employee(&input).await.expect("create should succeed");
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_delete_carries_csrf_header() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/reviews/9/"))
            .and(header("X-CSRFToken", "tok-del"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = ApiClient::new(server.uri()).expect("client should build");
        client.csrf_token = Some("tok-del".to_string());
        client.delete_review(9).await.expect("delete should succeed");
    }

    #[tokio::test]
    async fn test_login_adopts_rotated_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "user": {"id": 1, "username": "admin", "email": "admin@example.com",
                         "first_name": "", "last_name": "", "is_staff": true, "is_superuser": false},
                "csrfToken": "rotated"
            })))
            .mount(&server)
            .await;

        let mut client = ApiClient::new(server.uri()).expect("client should build");
        client.csrf_token = Some("stale".to_string());

        let credentials = LoginRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        let response = client.login(&credentials).await.expect("login should succeed");
        assert!(response.success);
        assert_eq!(client.csrf_token(), Some("rotated"));
    }

    #[tokio::test]
    async fn test_list_reviews_employee_filter_and_envelope() {
        let server = MockServer::start().await;
        let review = serde_json::json!({
            "id": 3, "employee": 7, "employee_name": "Alice Johnson",
            "review_period": "Q1 2024", "rating": 4, "rating_display": "Good",
            "feedback": null, "review_date": "2024-03-31"
        });
        Mock::given(method("GET"))
            .and(path("/reviews/"))
            .and(query_param("employee", "7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"count": 1, "results": [review]})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("client should build");
        let reviews = client.list_reviews(Some(7)).await.expect("list should succeed");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].employee, 7);
        assert_eq!(reviews[0].rating_label(), "Good");
    }

    #[tokio::test]
    async fn test_failure_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/employees/42/"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Not found."})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("client should build");
        let err = client.get_employee(42).await.expect_err("should fail");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.server_message(), Some("Not found."));
    }
}
