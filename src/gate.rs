use crate::config::{LogoutThemePolicy, PortalConfig};
use crate::errors::PortalError;
use crate::forms::FormKind;
use crate::identity::IdentityProvider;
use crate::session::{SessionRecord, SessionState, StoredSession, classify, encode_token};
use crate::storage::{
    AUTH_TOKEN_KEY, KeyValueStore, LOGGED_IN_KEY, StoreError, THEME_KEY, USER_DATA_KEY,
};
use crate::tasks;
use crate::validation::validate_login_form;
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const LOGIN_URL: &str = "/login.html";
pub const SIGNUP_URL: &str = "/signup.html";
pub const DASHBOARD_URL: &str = "/dashboard.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Login,
    Signup,
    Protected,
}

impl PageKind {
    pub fn from_address(address: &str) -> Self {
        if address.contains("login.html") {
            Self::Login
        } else if address.contains("signup.html") {
            Self::Signup
        } else {
            Self::Protected
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Redirect(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub session: SessionState,
    pub decision: GateDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub url: &'static str,
    pub after: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub record: SessionRecord,
    pub navigation: Navigation,
}

pub struct SessionGate {
    store: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityProvider>,
    config: Arc<PortalConfig>,
    login_in_flight: Mutex<()>,
    signup_in_flight: Mutex<()>,
}

impl SessionGate {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<PortalConfig>,
    ) -> Self {
        Self {
            store,
            identity,
            config,
            login_in_flight: Mutex::new(()),
            signup_in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn current_session(&self) -> Result<SessionState, StoreError> {
        self.current_session_at(Utc::now()).await
    }

    pub async fn current_session_at(&self, now: DateTime<Utc>) -> Result<SessionState, StoreError> {
        let flag = self.store.get(LOGGED_IN_KEY).await?;
        let token = self.store.get(AUTH_TOKEN_KEY).await?;
        let payload = self.store.get(USER_DATA_KEY).await?;

        match classify(flag.as_deref(), token.as_deref(), payload.as_deref(), now) {
            StoredSession::Valid(state) => Ok(state),
            StoredSession::Stale(reason) => {
                warn!(?reason, "discarding stored session");
                self.clear_session_keys().await?;
                Ok(SessionState::Anonymous)
            }
        }
    }

    pub async fn check_existing_session(&self, address: &str) -> Result<GateOutcome, StoreError> {
        self.check_existing_session_at(address, Utc::now()).await
    }

    pub async fn check_existing_session_at(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<GateOutcome, StoreError> {
        let session = self.current_session_at(now).await?;
        let decision = match (session.is_authenticated(), PageKind::from_address(address)) {
            (true, PageKind::Login) => GateDecision::Redirect(DASHBOARD_URL),
            (false, PageKind::Protected) => GateDecision::Redirect(LOGIN_URL),
            _ => GateDecision::Proceed,
        };
        debug!(address, ?decision, "gate evaluated");
        Ok(GateOutcome { session, decision })
    }

    pub async fn authenticate(&self, student_id: &str, password: &str) -> bool {
        self.identity.authenticate(student_id, password).await
    }

    pub async fn login(
        &self,
        student_id: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<LoginSuccess, PortalError> {
        let student_id = validate_login_form(student_id, password)?;

        let Ok(_in_flight) = self.login_in_flight.try_lock() else {
            return Err(PortalError::SubmissionInFlight(FormKind::Login));
        };

        tasks::delay(self.config.login_latency, cancel).await?;

        if !self.authenticate(student_id.as_str(), password).await {
            info!(student_id = %student_id, "login rejected");
            return Err(PortalError::Authentication);
        }

        let record = SessionRecord::new(student_id, Utc::now());
        self.save_session(&record).await?;
        info!(student_id = %record.student_id, "login succeeded");

        Ok(LoginSuccess {
            record,
            navigation: Navigation {
                url: DASHBOARD_URL,
                after: self.config.redirect_delay,
            },
        })
    }

    pub async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.save_session_at(record, Utc::now()).await
    }

    pub async fn save_session_at(
        &self,
        record: &SessionRecord,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let token = encode_token(record, now + self.config.session_ttl)?;
        let payload = serde_json::to_string(record)?;

        self.store.set(AUTH_TOKEN_KEY, &token).await?;
        self.store.set(USER_DATA_KEY, &payload).await?;
        self.store.set(LOGGED_IN_KEY, "true").await
    }

    /// Drops the session and reports where the page should go, if anywhere.
    pub async fn clear_session(&self, address: &str) -> Result<Option<Navigation>, StoreError> {
        self.clear_session_keys().await?;
        self.apply_theme_policy().await?;

        Ok((PageKind::from_address(address) != PageKind::Login).then_some(Navigation {
            url: LOGIN_URL,
            after: Duration::ZERO,
        }))
    }

    pub async fn logout(&self) -> Result<Navigation, StoreError> {
        self.clear_session_keys().await?;
        self.apply_theme_policy().await?;
        info!("logged out");

        Ok(Navigation {
            url: LOGIN_URL,
            after: self.config.redirect_delay,
        })
    }

    /// Simulated account creation. No session is created.
    pub async fn signup(&self, cancel: &CancellationToken) -> Result<Navigation, PortalError> {
        let Ok(_in_flight) = self.signup_in_flight.try_lock() else {
            return Err(PortalError::SubmissionInFlight(FormKind::Signup));
        };

        tasks::delay(self.config.signup_latency, cancel).await?;

        Ok(Navigation {
            url: DASHBOARD_URL,
            after: Duration::ZERO,
        })
    }

    async fn clear_session_keys(&self) -> Result<(), StoreError> {
        self.store.remove(LOGGED_IN_KEY).await?;
        self.store.remove(AUTH_TOKEN_KEY).await?;
        self.store.remove(USER_DATA_KEY).await
    }

    async fn apply_theme_policy(&self) -> Result<(), StoreError> {
        match self.config.logout_theme {
            LogoutThemePolicy::Clear => self.store.remove(THEME_KEY).await,
            LogoutThemePolicy::Keep => Ok(()),
        }
    }
}
