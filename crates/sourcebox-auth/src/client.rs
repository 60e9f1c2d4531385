//! Client for the central auth API.
//!
//! This module provides the [`AuthApi`] trait used by the gateway and the
//! [`HttpAuthClient`] implementation that talks to the remote service.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// Request payload for email/password login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// User's email address.
    pub email: String,
    /// User's password.
    pub password: String,
}

/// Request payload for account registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// User's email address.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Chosen password.
    pub password: String,
}

/// Response from a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub access_token: String,
}

/// Error body returned by the remote API.
#[derive(Debug, Deserialize)]
struct RemoteMessage {
    message: Option<String>,
}

/// Body of `GET /user/id`.
#[derive(Debug, Deserialize)]
struct UserIdResponse {
    user_id: RemoteId,
}

/// The remote API reports ids as numbers or strings depending on the route.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Number(u64),
    Text(String),
}

impl RemoteId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Body of `GET /user/{id}/premium/status`.
#[derive(Debug, Deserialize)]
struct PremiumStatusResponse {
    #[serde(alias = "is_premium")]
    premium: bool,
}

/// Operations SourceBox delegates to the central auth API.
///
/// This trait abstracts the remote service so the gateway can be exercised
/// against mock servers in tests.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with the remote message when the credentials are
    /// refused, or `Network` when the service is unreachable.
    async fn login(&self, req: LoginRequest) -> Result<LoginResponse>;

    /// Create an account. Returns the remote confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` unless the remote answers `201 Created`.
    async fn register(&self, req: RegisterRequest) -> Result<String>;

    /// Check that a bearer token is still accepted.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-200 answer or transport failure.
    async fn whoami(&self, token: &str) -> Result<()>;

    /// Resolve the user id behind a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-200 answer or transport failure.
    async fn user_id(&self, token: &str) -> Result<String>;

    /// Fetch the premium flag for a user.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-200 answer or transport failure.
    async fn premium_status(&self, token: &str, user_id: &str) -> Result<bool>;
}

/// HTTP implementation of [`AuthApi`].
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    config: AuthConfig,
    client: reqwest::Client,
}

impl HttpAuthClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create a new client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: AuthConfig) -> Self {
        Self { config, client }
    }

    /// Get the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    async fn authorized_get(&self, url: &str, token: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))
    }
}

/// Turn a non-success response into `AuthError::Rejected`.
async fn rejection(response: reqwest::Response, fallback: &str) -> AuthError {
    let status = response.status().as_u16();
    let message = response
        .json::<RemoteMessage>()
        .await
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| fallback.to_string());

    AuthError::Rejected { status, message }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        let response = self
            .client
            .post(self.config.login_url())
            .json(&req)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            let err = rejection(response, "Login failed").await;
            tracing::info!(error = %err, "Login rejected by auth service");
            return Err(err);
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    async fn register(&self, req: RegisterRequest) -> Result<String> {
        let response = self
            .client
            .post(self.config.register_url())
            .json(&req)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.status() != reqwest::StatusCode::CREATED {
            return Err(rejection(response, "Registration failed").await);
        }

        let message = response
            .json::<RemoteMessage>()
            .await
            .ok()
            .and_then(|m| m.message)
            .unwrap_or_else(|| "User registered successfully!".to_string());
        Ok(message)
    }

    async fn whoami(&self, token: &str) -> Result<()> {
        let response = self.authorized_get(&self.config.whoami_url(), token).await?;

        if response.status() == reqwest::StatusCode::OK {
            Ok(())
        } else {
            Err(rejection(response, "Session expired").await)
        }
    }

    async fn user_id(&self, token: &str) -> Result<String> {
        let response = self
            .authorized_get(&self.config.user_id_url(), token)
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(rejection(response, "Failed to resolve user").await);
        }

        let body: UserIdResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(body.user_id.into_string())
    }

    async fn premium_status(&self, token: &str, user_id: &str) -> Result<bool> {
        let response = self
            .authorized_get(&self.config.premium_status_url(user_id), token)
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(rejection(response, "Failed to fetch premium status").await);
        }

        let body: PremiumStatusResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(body.premium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpAuthClient {
        HttpAuthClient::new(AuthConfig::new(server.uri())).unwrap()
    }

    #[test]
    fn login_request_serializes() {
        let req = LoginRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({"email": "user@example.com", "password": "secret"})
        );
    }

    #[tokio::test]
    async fn login_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"email": "a@b.c", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
            .expect(1)
            .mount(&server)
            .await;

        let login = client_for(&server)
            .login(LoginRequest {
                email: "a@b.c".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.access_token, "tok");
    }

    #[tokio::test]
    async fn login_surfaces_remote_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(LoginRequest {
                email: "a@b.c".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn login_falls_back_when_body_is_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(LoginRequest {
                email: "a@b.c".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Login failed");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let client = HttpAuthClient::new(AuthConfig::new("http://127.0.0.1:9")).unwrap();
        let err = client.whoami("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[tokio::test]
    async fn register_requires_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "ok"})))
            .mount(&server)
            .await;

        let message = client_for(&server)
            .register(RegisterRequest {
                email: "a@b.c".to_string(),
                username: "a".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(message, "ok");
    }

    #[tokio::test]
    async fn whoami_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user_history"))
            .and(header("authorization", "Bearer good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user_history"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.whoami("good").await.is_ok());
        assert!(matches!(
            client.whoami("bad").await,
            Err(AuthError::Rejected { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn user_id_accepts_numbers_and_strings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/id"))
            .and(header("authorization", "Bearer num"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_id": 17})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/id"))
            .and(header("authorization", "Bearer text"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_id": "u-9"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.user_id("num").await.unwrap(), "17");
        assert_eq!(client.user_id("text").await.unwrap(), "u-9");
    }

    #[tokio::test]
    async fn premium_status_reads_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/17/premium/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_premium": true})))
            .mount(&server)
            .await;

        assert!(client_for(&server)
            .premium_status("tok", "17")
            .await
            .unwrap());
    }
}
