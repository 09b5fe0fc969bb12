//! AuthGate - Login / Register / Logout

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::constants::{MSG_CREDENTIALS_REQUIRED, MSG_LOGIN_FAILED, MSG_REGISTER_FAILED};
use crate::error::{Error, Result};
use crate::eventing::app_event::{AppEvent, EventBus};
use crate::services::{Credentials, EquipmentApi};

use super::session_state::DatasetSession;

/// Which screen the gate shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    LoggedOut { showing_register: bool },
    LoggedIn,
}

impl Default for AuthView {
    fn default() -> Self {
        AuthView::LoggedOut {
            showing_register: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub view: AuthView,
    /// Form error shown on the login/register screen
    pub error: Option<String>,
    pub busy: bool,
    pub username: Option<String>,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.view == AuthView::LoggedIn
    }

    /// Enter the logged-in view after a successful login
    pub fn login_success(&mut self, username: impl Into<String>) {
        self.view = AuthView::LoggedIn;
        self.error = None;
        self.username = Some(username.into());
    }

    /// Registration logs the user straight in
    pub fn register_success(&mut self, username: impl Into<String>) {
        self.login_success(username);
    }

    pub fn switch_to_register(&mut self) {
        if let AuthView::LoggedOut { showing_register } = &mut self.view {
            *showing_register = true;
            self.error = None;
        }
    }

    pub fn switch_to_login(&mut self) {
        if let AuthView::LoggedOut { showing_register } = &mut self.view {
            *showing_register = false;
            self.error = None;
        }
    }

    fn logged_out(&mut self) {
        *self = AuthState::default();
    }
}

/// Owns the auth state and clears the session on logout
pub struct AuthGate {
    api: Arc<dyn EquipmentApi>,
    session: DatasetSession,
    events: EventBus,
    state: RwLock<AuthState>,
}

impl AuthGate {
    pub fn new(api: Arc<dyn EquipmentApi>, session: DatasetSession, events: EventBus) -> Self {
        Self {
            api,
            session,
            events,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().is_logged_in()
    }

    pub fn switch_to_register(&self) {
        self.state.write().switch_to_register();
    }

    pub fn switch_to_login(&self) {
        self.state.write().switch_to_login();
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.begin(credentials)?;
        let result = self.try_login(credentials).await;
        self.finish(result, MSG_LOGIN_FAILED, |state| {
            state.login_success(credentials.username.clone())
        })
    }

    /// Register, then log in with the same credentials
    pub async fn register(&self, credentials: &Credentials) -> Result<()> {
        self.begin(credentials)?;
        let result = match self.api.register(credentials).await {
            Ok(()) => {
                tracing::info!("Registered user {}", credentials.username);
                self.try_login(credentials).await
            }
            Err(e) => Err(e),
        };
        self.finish(result, MSG_REGISTER_FAILED, |state| {
            state.register_success(credentials.username.clone())
        })
    }

    /// Log out locally, then tell the server
    ///
    /// The session is cleared before the request goes out; a failing request
    /// is logged and otherwise ignored.
    pub async fn logout(&self) {
        self.session.clear();
        let username = {
            let mut state = self.state.write();
            let username = state.username.take();
            state.logged_out();
            username
        };
        self.events.emit(AppEvent::AuthChanged { logged_in: false });
        tracing::info!("Logged out {}", username.as_deref().unwrap_or("<unknown>"));

        if let Err(e) = self.api.logout().await {
            tracing::warn!("Server logout failed: {}", e.user_message());
        }
    }

    fn begin(&self, credentials: &Credentials) -> Result<()> {
        let mut state = self.state.write();
        if !credentials.is_complete() {
            state.error = Some(MSG_CREDENTIALS_REQUIRED.to_string());
            return Err(Error::validation(MSG_CREDENTIALS_REQUIRED));
        }
        state.error = None;
        state.busy = true;
        Ok(())
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<()> {
        let body = self.api.login(credentials).await?;
        if is_truthy(&body) {
            Ok(())
        } else {
            Err(Error::transport(None, MSG_LOGIN_FAILED))
        }
    }

    fn finish(
        &self,
        result: Result<()>,
        fallback: &str,
        on_success: impl FnOnce(&mut AuthState),
    ) -> Result<()> {
        let mut state = self.state.write();
        state.busy = false;
        match result {
            Ok(()) => {
                on_success(&mut state);
                tracing::info!(
                    "Logged in as {}",
                    state.username.as_deref().unwrap_or_default()
                );
                drop(state);
                self.events.emit(AppEvent::AuthChanged { logged_in: true });
                Ok(())
            }
            Err(e) => {
                let message = e.user_message_or(fallback);
                tracing::error!("{}: {}", fallback, message);
                state.error = Some(message);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("state", &*self.state.read())
            .finish()
    }
}

/// A login response counts only if it carries something
fn is_truthy(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(_) | Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::DatasetId;
    use crate::services::fake::FakeApi;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn gate_with(api: Arc<FakeApi>) -> (AuthGate, DatasetSession) {
        let session = DatasetSession::default();
        let gate = AuthGate::new(api, session.clone(), EventBus::detached());
        (gate, session)
    }

    #[test]
    fn test_pure_transitions() {
        let mut state = AuthState::default();
        assert_eq!(
            state.view,
            AuthView::LoggedOut {
                showing_register: false
            }
        );

        state.switch_to_register();
        assert_eq!(
            state.view,
            AuthView::LoggedOut {
                showing_register: true
            }
        );
        state.switch_to_login();
        state.switch_to_register();

        state.register_success("bob");
        assert!(state.is_logged_in());
        assert_eq!(state.username.as_deref(), Some("bob"));

        // Toggling has no effect once logged in
        state.switch_to_login();
        assert!(state.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_success_and_failure() {
        let api = Arc::new(FakeApi::new());
        api.add_user("alice", "pw");
        let (gate, _) = gate_with(api);

        let err = gate
            .login(&Credentials::new("alice", "wrong"))
            .await
            .expect_err("bad password");
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(gate.state().error.as_deref(), Some("Invalid credentials"));
        assert!(!gate.is_logged_in());

        gate.login(&Credentials::new("alice", "pw")).await.expect("login");
        let state = gate.state();
        assert!(state.is_logged_in());
        assert!(state.error.is_none());
        assert!(!state.busy);
    }

    #[tokio::test]
    async fn test_empty_login_body_is_failure() {
        let api = Arc::new(FakeApi::new());
        api.add_user("alice", "pw");
        api.set_login_body(json!({}));
        let (gate, _) = gate_with(api);

        assert!(gate.login(&Credentials::new("alice", "pw")).await.is_err());
        assert_eq!(gate.state().error.as_deref(), Some(MSG_LOGIN_FAILED));
    }

    #[tokio::test]
    async fn test_blank_credentials_are_local_error() {
        let (gate, _) = gate_with(Arc::new(FakeApi::new()));
        let err = gate
            .login(&Credentials::new("", ""))
            .await
            .expect_err("blank");
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(gate.state().error.as_deref(), Some(MSG_CREDENTIALS_REQUIRED));
    }

    #[tokio::test]
    async fn test_register_logs_in() {
        let api = Arc::new(FakeApi::new());
        let (gate, _) = gate_with(api.clone());
        gate.switch_to_register();

        gate.register(&Credentials::new("carol", "pw")).await.expect("register");
        assert!(gate.is_logged_in());

        let (other, _) = gate_with(api);
        let err = other
            .register(&Credentials::new("carol", "pw"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.user_message(), "Username already exists");
        assert_eq!(
            other.state().view,
            AuthView::LoggedOut {
                showing_register: false
            }
        );
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_server_fails() {
        let api = Arc::new(FakeApi::new());
        api.add_user("alice", "pw");
        api.fail_logout("Network Error");
        let (gate, session) = gate_with(api.clone());

        gate.login(&Credentials::new("alice", "pw")).await.expect("login");
        session.replace(Vec::new(), Some(FakeApi::pump_summary()), Some(DatasetId::from("2")));

        gate.logout().await;
        assert!(!gate.is_logged_in());
        assert!(session.snapshot().is_empty());
        assert_eq!(api.logout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.state(), AuthState::default());
    }

    #[test]
    fn test_truthy_bodies() {
        assert!(is_truthy(&json!({"token": "x"})));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
    }
}
