//! Session store: the current identity, persisted under the `user` storage key.
//!
//! `authenticated` is not stored separately; it is `identity.is_some()`.
//! Identities come from an `AuthProvider`, chosen at startup via `AUTH_MODE`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::storage::{KeyValueStore, USER_KEY};
use crate::validation::{is_valid_email, password_strength};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;
const MIN_SIGNUP_STRENGTH: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Authentication boundary
// ────────────────────────────────────────────────────────────────────────────

/// Issues identities for already-validated credentials.
/// Rejections come back as `AppError::Auth` with a user-facing message.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Identity, AppError>;
    async fn signup(&self, name: &str, email: &str, password: &str)
        -> Result<Identity, AppError>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    message: Option<String>,
}

/// Remote identity service: `POST {base}/api/login` and `POST {base}/api/signup`.
#[derive(Clone)]
pub struct RemoteAuth {
    client: Client,
    base_url: String,
}

impl RemoteAuth {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback_message: &str,
    ) -> Result<Identity, AppError> {
        let url = format!("{}{path}", self.base_url);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Auth request to {url} failed: {e}");
                AppError::Auth(format!("{fallback_message}: service unreachable"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<AuthErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback_message.to_string());
            debug!("Auth service returned {status}: {message}");
            return Err(AppError::Auth(message));
        }

        response.json::<Identity>().await.map_err(|e| {
            warn!("Auth service returned an unreadable identity: {e}");
            AppError::Auth(format!("{fallback_message}: unexpected response"))
        })
    }
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    async fn login(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        self.post("/api/login", &LoginRequest { email, password }, "Login failed")
            .await
    }

    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        self.post(
            "/api/signup",
            &SignupRequest {
                name,
                email,
                password,
            },
            "Signup failed",
        )
        .await
    }
}

/// Demo-mode provider: accepts any validated credentials and mints a local identity.
pub struct SimulatedAuth;

#[async_trait]
impl AuthProvider for SimulatedAuth {
    async fn login(&self, email: &str, _password: &str) -> Result<Identity, AppError> {
        let name = email.split('@').next().unwrap_or(email).to_string();
        Ok(Identity {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.to_string(),
        })
    }

    async fn signup(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<Identity, AppError> {
        Ok(Identity {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Signup {
        name: String,
        email: String,
        password: String,
    },
}

/// Validated credentials bound to a provider. `execute` performs the network call
/// and needs no access to the session, so callers run it without holding a lock.
pub struct AuthAttempt {
    auth: Arc<dyn AuthProvider>,
    request: AuthRequest,
}

impl AuthAttempt {
    pub async fn execute(self) -> Result<Identity, AppError> {
        match &self.request {
            AuthRequest::Login { email, password } => self.auth.login(email, password).await,
            AuthRequest::Signup {
                name,
                email,
                password,
            } => self.auth.signup(name, email, password).await,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session store
// ────────────────────────────────────────────────────────────────────────────

pub struct SessionStore {
    identity: Option<Identity>,
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            identity: None,
            auth,
            store,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Validates login input and prepares the provider call. Cheap; safe under the lock.
    pub fn begin_login(&self, email: &str, password: &str) -> Result<AuthAttempt, AppError> {
        if !is_valid_email(email) {
            return Err(AppError::Validation("Please enter a valid email".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        Ok(AuthAttempt {
            auth: self.auth.clone(),
            request: AuthRequest::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
        })
    }

    pub fn begin_signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthAttempt, AppError> {
        if name.chars().count() < MIN_NAME_LEN {
            return Err(AppError::Validation(
                "Name must be at least 2 characters".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(AppError::Validation("Please enter a valid email".to_string()));
        }
        if password_strength(password).score < MIN_SIGNUP_STRENGTH {
            return Err(AppError::Validation("Password is too weak".to_string()));
        }

        Ok(AuthAttempt {
            auth: self.auth.clone(),
            request: AuthRequest::Signup {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
        })
    }

    pub async fn logout(&mut self) {
        if let Some(identity) = self.identity.take() {
            info!("User {} logged out", identity.id);
        }
        if let Err(e) = self.store.remove(USER_KEY).await {
            warn!("Failed to delete persisted identity: {e}");
        }
    }

    /// Loads a persisted identity, if any. Unreadable data is discarded.
    pub async fn restore_session(&mut self) {
        let raw = match self.store.get(USER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not read persisted identity: {e}");
                return;
            }
        };

        match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => {
                info!("Restored session for user {}", identity.id);
                self.identity = Some(identity);
            }
            Err(e) => {
                warn!("Discarding malformed persisted identity: {e}");
                if let Err(e) = self.store.remove(USER_KEY).await {
                    warn!("Failed to delete malformed identity: {e}");
                }
            }
        }
    }

    /// Adopts an identity returned by `AuthAttempt::execute` and persists it.
    pub async fn establish(&mut self, identity: Identity) -> Result<Identity, AppError> {
        let serialized =
            serde_json::to_string(&identity).map_err(|e| AppError::Internal(e.into()))?;
        // The in-memory session stays valid even if persistence fails.
        if let Err(e) = self.store.set(USER_KEY, &serialized).await {
            warn!("Failed to persist identity: {e}");
        }
        info!("User {} authenticated", identity.id);
        self.identity = Some(identity.clone());
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};
    use crate::testing::spawn_server;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn simulated_session(store: Arc<MemoryStore>) -> SessionStore {
        SessionStore::new(Arc::new(SimulatedAuth), store)
    }

    async fn login(
        session: &mut SessionStore,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let identity = session.begin_login(email, password)?.execute().await?;
        session.establish(identity).await
    }

    async fn signup(
        session: &mut SessionStore,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let identity = session.begin_signup(name, email, password)?.execute().await?;
        session.establish(identity).await
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_email() {
        let mut session = simulated_session(Arc::new(MemoryStore::new()));
        let err = login(&mut session, "not-an-email", "secret123").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("valid email")));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_rejects_short_password() {
        let mut session = simulated_session(Arc::new(MemoryStore::new()));
        let err = login(&mut session, "jane@example.com", "12345").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("6 characters")));
    }

    #[tokio::test]
    async fn test_signup_validations() {
        let mut session = simulated_session(Arc::new(MemoryStore::new()));
        assert!(matches!(
            signup(&mut session, "J", "jane@example.com", "Abcdef12").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            signup(&mut session, "Jane", "jane@", "Abcdef12").await,
            Err(AppError::Validation(_))
        ));
        // "abcdef" scores 25: lowercase only, too short
        let err = signup(&mut session, "Jane", "jane@example.com", "abcdef")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Password is too weak"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_persists_and_restore_recovers_identity() {
        let store = Arc::new(MemoryStore::new());
        let mut session = simulated_session(store.clone());
        let identity = login(&mut session, "jane@example.com", "secret123").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(identity.name, "jane");

        // Simulated restart: a fresh session over the same storage.
        let mut restarted = simulated_session(store);
        assert!(!restarted.is_authenticated());
        restarted.restore_session().await;
        assert!(restarted.is_authenticated());
        assert_eq!(restarted.identity(), Some(&identity));
    }

    #[tokio::test]
    async fn test_logout_clears_identity_and_storage() {
        let store = Arc::new(MemoryStore::new());
        let mut session = simulated_session(store.clone());
        signup(&mut session, "Jane Doe", "jane@example.com", "Abcdef12")
            .await
            .unwrap();

        session.logout().await;

        assert!(!session.is_authenticated());
        assert_eq!(store.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_discards_malformed_identity() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_KEY, "{not json").await.unwrap();

        let mut session = simulated_session(store.clone());
        session.restore_session().await;

        assert!(!session.is_authenticated());
        assert_eq!(store.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_after_corrupt_storage_file_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let mut session = SessionStore::new(
            Arc::new(SimulatedAuth),
            Arc::new(JsonFileStore::new(&path)),
        );
        session.restore_session().await;
        assert!(!session.is_authenticated());
        let identity = login(&mut session, "jane@example.com", "secret123")
            .await
            .unwrap();

        let mut restarted = SessionStore::new(
            Arc::new(SimulatedAuth),
            Arc::new(JsonFileStore::new(&path)),
        );
        restarted.restore_session().await;
        assert_eq!(restarted.identity(), Some(&identity));
    }

    #[test]
    fn test_first_name() {
        let identity = Identity {
            id: "1".to_string(),
            name: "Jane Q Doe".to_string(),
            email: "jane@example.com".to_string(),
        };
        assert_eq!(identity.first_name(), "Jane");
    }

    async fn login_ok(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({ "id": "u-42", "name": "Jane Doe", "email": body["email"] }))
    }

    async fn signup_rejected() -> (StatusCode, Json<Value>) {
        (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Email already registered" })),
        )
    }

    async fn login_rejected_without_body() -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    #[tokio::test]
    async fn test_remote_auth_login_success() {
        let base = spawn_server(Router::new().route("/api/login", post(login_ok))).await;
        let auth = RemoteAuth::new(base, Duration::from_secs(5)).unwrap();

        let identity = auth.login("jane@example.com", "secret123").await.unwrap();
        assert_eq!(identity.id, "u-42");
        assert_eq!(identity.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_remote_auth_surfaces_boundary_message() {
        let base = spawn_server(Router::new().route("/api/signup", post(signup_rejected))).await;
        let mut session = SessionStore::new(
            Arc::new(RemoteAuth::new(base, Duration::from_secs(5)).unwrap()),
            Arc::new(MemoryStore::new()),
        );

        let err = signup(&mut session, "Jane", "jane@example.com", "Abcdef12")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == "Email already registered"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_remote_auth_default_message_when_body_missing() {
        let base = spawn_server(
            Router::new().route("/api/login", post(login_rejected_without_body)),
        )
        .await;
        let auth = RemoteAuth::new(base, Duration::from_secs(5)).unwrap();

        let err = auth.login("jane@example.com", "secret123").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(ref m) if m == "Login failed"));
    }
}
