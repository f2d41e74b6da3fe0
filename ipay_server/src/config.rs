use std::{env, time::Duration};

use ipay_common::{helpers::env_flag, Secret};
use ipay_engine::SQLITE_DB_URL;
use log::*;

use crate::errors::ServerError;

const DEFAULT_IPAY_HOST: &str = "127.0.0.1";
const DEFAULT_IPAY_PORT: u16 = 5000;
const DEFAULT_LOGIN_RATE_LIMIT: u32 = 100;
const DEFAULT_LOGIN_RATE_WINDOW_MINS: u64 = 15;
const DEFAULT_REGISTER_RATE_LIMIT: u32 = 3;
const DEFAULT_REGISTER_RATE_WINDOW_MINS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    pub login_rate: RateLimitConfig,
    pub register_rate: RateLimitConfig,
}

impl ServerConfig {
    /// Builds the configuration from `IPAY_*` environment variables.
    ///
    /// Everything except the JWT secret has a sensible default. A missing or blank `IPAY_JWT_SECRET` is an error, since
    /// the server cannot issue or check access tokens without it.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("IPAY_HOST").ok().unwrap_or_else(|| DEFAULT_IPAY_HOST.into());
        let port = env::var("IPAY_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for IPAY_PORT. {e} Using the default, {DEFAULT_IPAY_PORT}, instead."
                    );
                    DEFAULT_IPAY_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_IPAY_PORT);
        let database_url = env::var("IPAY_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ IPAY_DATABASE_URL is not set. Using the default, {SQLITE_DB_URL}.");
            SQLITE_DB_URL.to_string()
        });
        let auth = AuthConfig::try_from_env()?;
        let use_x_forwarded_for = env_flag("IPAY_USE_X_FORWARDED_FOR", false);
        let use_forwarded = env_flag("IPAY_USE_FORWARDED", false);
        let login_rate = RateLimitConfig::from_env(
            "IPAY_LOGIN_RATE_LIMIT",
            "IPAY_LOGIN_RATE_WINDOW_MINS",
            DEFAULT_LOGIN_RATE_LIMIT,
            DEFAULT_LOGIN_RATE_WINDOW_MINS,
        );
        let register_rate = RateLimitConfig::from_env(
            "IPAY_REGISTER_RATE_LIMIT",
            "IPAY_REGISTER_RATE_WINDOW_MINS",
            DEFAULT_REGISTER_RATE_LIMIT,
            DEFAULT_REGISTER_RATE_WINDOW_MINS,
        );
        Ok(Self { host, port, database_url, auth, use_x_forwarded_for, use_forwarded, login_rate, register_rate })
    }

    pub fn new(host: &str, port: u16, auth: AuthConfig) -> Self {
        Self {
            host: host.to_string(),
            port,
            database_url: SQLITE_DB_URL.to_string(),
            auth,
            use_x_forwarded_for: false,
            use_forwarded: false,
            login_rate: RateLimitConfig::login_default(),
            register_rate: RateLimitConfig::register_default(),
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC key used to sign and verify access tokens (HS256).
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let jwt_secret = env::var("IPAY_JWT_SECRET")
            .map(Secret::new)
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [IPAY_JWT_SECRET]")))?;
        if jwt_secret.is_blank() {
            return Err(ServerError::ConfigurationError("IPAY_JWT_SECRET must not be blank.".into()));
        }
        Ok(Self { jwt_secret })
    }
}

//-----------------------------------------------  RateLimitConfig  ----------------------------------------------------
/// At most `max_requests` per caller in every fixed `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self { max_requests, window }
    }

    pub fn login_default() -> Self {
        Self::new(DEFAULT_LOGIN_RATE_LIMIT, Duration::from_secs(DEFAULT_LOGIN_RATE_WINDOW_MINS * 60))
    }

    pub fn register_default() -> Self {
        Self::new(DEFAULT_REGISTER_RATE_LIMIT, Duration::from_secs(DEFAULT_REGISTER_RATE_WINDOW_MINS * 60))
    }

    fn from_env(limit_var: &str, window_var: &str, default_limit: u32, default_mins: u64) -> Self {
        let max_requests = env::var(limit_var)
            .map_err(|_| trace!("🪛️ {limit_var} is not set. Using the default value of {default_limit}."))
            .and_then(|s| {
                s.parse::<u32>().map_err(|e| warn!("🪛️ Invalid configuration value for {limit_var}. {e}"))
            })
            .ok()
            .unwrap_or(default_limit);
        let window_mins = env::var(window_var)
            .map_err(|_| trace!("🪛️ {window_var} is not set. Using the default value of {default_mins} mins."))
            .and_then(|s| {
                s.parse::<u64>()
                    .ok()
                    .filter(|m| *m > 0)
                    .ok_or_else(|| warn!("🪛️ Invalid configuration value for {window_var}. Must be a positive integer."))
            })
            .ok()
            .unwrap_or(default_mins);
        Self::new(max_requests, Duration::from_secs(window_mins * 60))
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
