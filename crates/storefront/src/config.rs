//! Marketplace configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKET_DATABASE_URL` - SQLite connection string (e.g. `sqlite://data/market.db`)
//! - `MARKET_BASE_URL` - Public URL for the marketplace
//! - `MARKET_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `STRIPE_SECRET_KEY` - Payment gateway secret key
//!
//! ## Optional
//! - `MARKET_HOST` - Bind address (default: 127.0.0.1)
//! - `MARKET_PORT` - Listen port (default: 3000)
//! - `MARKET_UPLOAD_DIR` - Offer image directory (default: imgs)
//! - `STRIPE_API_BASE` - Gateway base URL (default: `https://api.stripe.com`)
//! - `STRIPE_TIMEOUT_SECS` - Gateway request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Shortest session secret we accept.
const SESSION_SECRET_MIN_LEN: usize = 32;

/// Secrets below this Shannon entropy (bits per character) are refused.
/// Randomly generated keys land well above it; English words well below.
const SECRET_MIN_BITS_PER_CHAR: f64 = 3.3;

/// Fragments that mark a secret as a template value someone forgot to
/// replace, checked case-insensitively.
const SUSPECT_SECRET_FRAGMENTS: &[&str] = &[
    "changeme",
    "placeholder",
    "example",
    "password",
    "your-",
    "replace",
    "fixme",
    "insert",
    "xxx",
];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(String),
    #[error("bad value for {name}: {reason}")]
    BadVar { name: String, reason: String },
    #[error("refusing weak secret in {name}: {reason}")]
    WeakSecret { name: String, reason: String },
}

impl ConfigError {
    fn bad(name: &str, reason: impl ToString) -> Self {
        Self::BadVar {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    fn weak(name: &str, reason: impl Into<String>) -> Self {
        Self::WeakSecret {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Marketplace application configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// SQLite database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the marketplace
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Directory where offer images are stored
    pub upload_dir: PathBuf,
    /// Payment gateway configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Payment gateway (Stripe) configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
    /// API base URL; overridable for tests
    pub api_base: String,
    /// Bound on how long a checkout-session request may take
    pub timeout: Duration,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MarketConfig {
    /// Load configuration from the environment, reading `.env` first when
    /// one is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent, fails to
    /// parse, or a secret looks like a placeholder or has too little entropy.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = database_url_var()?;

        let host_raw = var_or("MARKET_HOST", "127.0.0.1");
        let host = host_raw
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::bad("MARKET_HOST", e))?;

        let port = var_or("MARKET_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::bad("MARKET_PORT", e))?;

        let base_url = require_var("MARKET_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| ConfigError::bad("MARKET_BASE_URL", e))?;

        let session_secret = secret_var("MARKET_SESSION_SECRET")?;
        if session_secret.expose_secret().len() < SESSION_SECRET_MIN_LEN {
            return Err(ConfigError::weak(
                "MARKET_SESSION_SECRET",
                format!("shorter than {SESSION_SECRET_MIN_LEN} characters"),
            ));
        }

        let upload_dir = PathBuf::from(var_or("MARKET_UPLOAD_DIR", "imgs"));

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            upload_dir,
            stripe: StripeConfig::from_env()?,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// The socket address the server binds.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = var_or("STRIPE_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| ConfigError::bad("STRIPE_TIMEOUT_SECS", e))?;

        Ok(Self {
            secret_key: secret_var("STRIPE_SECRET_KEY")?,
            api_base: var_or("STRIPE_API_BASE", "https://api.stripe.com"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_owned()))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// The database URL, also honoring plain `DATABASE_URL` so sqlx tooling and
/// the server read the same variable.
fn database_url_var() -> Result<SecretString, ConfigError> {
    std::env::var("MARKET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingVar("MARKET_DATABASE_URL".to_owned()))
}

/// Load a secret and refuse obvious placeholders and low-entropy values.
fn secret_var(name: &str) -> Result<SecretString, ConfigError> {
    let value = require_var(name)?;

    let lowered = value.to_lowercase();
    if let Some(fragment) = SUSPECT_SECRET_FRAGMENTS
        .iter()
        .find(|f| lowered.contains(*f))
    {
        return Err(ConfigError::weak(
            name,
            format!("looks like an unreplaced template value (contains '{fragment}')"),
        ));
    }

    let bits = entropy_bits_per_char(&value);
    if bits < SECRET_MIN_BITS_PER_CHAR {
        return Err(ConfigError::weak(
            name,
            format!(
                "entropy is {bits:.2} bits/char, below the {SECRET_MIN_BITS_PER_CHAR:.1} floor; generate a random secret"
            ),
        ));
    }

    Ok(SecretString::from(value))
}

/// Shannon entropy of the character distribution, in bits per character.
fn entropy_bits_per_char(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }

    #[allow(clippy::cast_precision_loss)] // secret lengths are tiny
    let total = s.chars().count() as f64;
    counts
        .into_values()
        .map(|n| {
            #[allow(clippy::cast_precision_loss)]
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
