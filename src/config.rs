use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Whether logging out also forgets the theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutThemePolicy {
    Clear,
    Keep,
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub port: u16,
    pub store_path: PathBuf,
    pub portal_name: String,
    pub login_latency: Duration,
    pub signup_latency: Duration,
    pub form_latency: Duration,
    pub redirect_delay: Duration,
    pub session_ttl: chrono::Duration,
    pub logout_theme: LogoutThemePolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            store_path: PathBuf::from("data/local_storage.json"),
            portal_name: "YMIT Student Portal".to_string(),
            login_latency: Duration::from_millis(800),
            signup_latency: Duration::from_millis(1500),
            form_latency: Duration::from_millis(2000),
            redirect_delay: Duration::from_millis(1000),
            session_ttl: chrono::Duration::hours(24),
            logout_theme: LogoutThemePolicy::Clear,
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let defaults = Self::default();
        let port = parse_var("PORT")?.unwrap_or(defaults.port);
        let store_path = env::var("PORTAL_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);
        let portal_name = env::var("PORTAL_NAME").unwrap_or(defaults.portal_name);

        let millis = |name: &'static str, fallback: Duration| -> Result<Duration, ConfigError> {
            Ok(parse_var::<u64>(name)?
                .map(Duration::from_millis)
                .unwrap_or(fallback))
        };

        let session_ttl = match parse_var::<i64>("PORTAL_SESSION_TTL_HOURS")? {
            Some(hours) if hours > 0 => chrono::Duration::hours(hours),
            Some(hours) => {
                return Err(ConfigError::InvalidValue(
                    "PORTAL_SESSION_TTL_HOURS",
                    format!("{hours} is not a positive number of hours"),
                ));
            }
            None => defaults.session_ttl,
        };

        let logout_theme = match parse_var::<bool>("PORTAL_LOGOUT_CLEARS_THEME")? {
            Some(false) => LogoutThemePolicy::Keep,
            Some(true) => LogoutThemePolicy::Clear,
            None => defaults.logout_theme,
        };

        Ok(Self {
            port,
            store_path,
            portal_name,
            login_latency: millis("PORTAL_LOGIN_LATENCY_MS", defaults.login_latency)?,
            signup_latency: millis("PORTAL_SIGNUP_LATENCY_MS", defaults.signup_latency)?,
            form_latency: millis("PORTAL_FORM_LATENCY_MS", defaults.form_latency)?,
            redirect_delay: millis("PORTAL_REDIRECT_DELAY_MS", defaults.redirect_delay)?,
            session_ttl,
            logout_theme,
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Zero delays everywhere; used by tests driving the flows directly.
    pub fn immediate() -> Self {
        Self {
            login_latency: Duration::ZERO,
            signup_latency: Duration::ZERO,
            form_latency: Duration::ZERO,
            redirect_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn parse_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| ConfigError::InvalidValue(name, format!("'{raw}': {err}"))),
        Err(_) => Ok(None),
    }
}
