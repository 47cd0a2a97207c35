use crate::auth::JwtConfig;
use shared::models::ShippingMethod;
use std::path::PathBuf;
use thiserror::Error;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Database and log directory |
/// | HTTP_PORT | 3000 | HTTP port |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | Default log level (`RUST_LOG` wins) |
/// | PUBLIC_BASE_URL | http://localhost:3000 | Base of links in emails (gift tracking) |
/// | JWT_SECRET | generated in development | HS256 secret shared with the identity provider |
/// | JWT_ISSUER / JWT_AUDIENCE | zellow-identity / zellow-storefront | Expected token claims |
/// | JWT_EXPIRATION_MINUTES | 1440 | Lifetime of tokens minted by this server (tests, tooling) |
/// | MAIL_HOST / MAIL_PORT | unset / 443 | Mail relay; unset logs mail instead of sending |
/// | MAIL_USERNAME / MAIL_PASSWORD | unset | Relay credentials |
/// | MAIL_FROM | Zellow Enterprises <no-reply@zellow.local> | Sender address |
/// | VAPID_PUBLIC_KEY / VAPID_PRIVATE_KEY_PEM | unset | Web Push keys; unset disables push |
/// | VAPID_SUBJECT | mailto:support@zellow.local | VAPID contact |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown limit |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub public_base_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
    pub push: Option<VapidConfig>,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    /// Capacity of the order event broadcast channel
    pub event_buffer: usize,
    pub shipping_methods: Vec<ShippingMethod>,
}

/// Outbound mail relay settings
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    /// `None` selects the logging transport
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Web Push VAPID keys
#[derive(Debug, Clone)]
pub struct VapidConfig {
    /// Base64url uncompressed P-256 public key, sent in the `k=` parameter
    pub public_key: String,
    /// PKCS#8 PEM of the matching private key
    pub private_key_pem: String,
    pub subject: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in {1} environment")]
    MissingSecret(String, String),

    #[error("{0} must not be empty in {1} environment")]
    EmptySecret(String, String),

    #[error("{0} must be at least {1} characters long")]
    SecretTooShort(String, usize),
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let http_port = parse_or(lookup("HTTP_PORT"), 3000);

        let mail_host = lookup("MAIL_HOST").filter(|h| !h.is_empty());
        let mail_password = match &mail_host {
            Some(_) => Some(Self::require_secret(&lookup, "MAIL_PASSWORD", &environment)?),
            None => lookup("MAIL_PASSWORD"),
        };

        let push = match (lookup("VAPID_PUBLIC_KEY"), lookup("VAPID_PRIVATE_KEY_PEM")) {
            (Some(public_key), Some(private_key_pem))
                if !public_key.is_empty() && !private_key_pem.is_empty() =>
            {
                Some(VapidConfig {
                    public_key,
                    private_key_pem,
                    subject: lookup("VAPID_SUBJECT")
                        .unwrap_or_else(|| "mailto:support@zellow.local".into()),
                })
            }
            _ => None,
        };

        Ok(Self {
            work_dir: lookup("WORK_DIR").unwrap_or_else(|| "./data".into()),
            http_port,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", http_port)),
            jwt: JwtConfig::from_lookup(&lookup, &environment)?,
            mail: MailConfig {
                host: mail_host,
                port: parse_or(lookup("MAIL_PORT"), 443),
                username: lookup("MAIL_USERNAME"),
                password: mail_password,
                from: lookup("MAIL_FROM")
                    .unwrap_or_else(|| "Zellow Enterprises <no-reply@zellow.local>".into()),
            },
            push,
            request_timeout_ms: parse_or(lookup("REQUEST_TIMEOUT_MS"), 30_000),
            shutdown_timeout_ms: parse_or(lookup("SHUTDOWN_TIMEOUT_MS"), 10_000),
            event_buffer: 256,
            shipping_methods: ShippingMethod::default_catalog(),
            environment,
        })
    }

    /// Require a secret: must be set and non-empty outside development
    pub(crate) fn require_secret<F>(
        lookup: &F,
        name: &str,
        environment: &str,
    ) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let val = match lookup(name) {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(ConfigError::MissingSecret(name.into(), environment.into()));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ConfigError::EmptySecret(name.into(), environment.into()));
        }
        Ok(val)
    }

    /// Use custom values for a few fields, mostly for tests
    ///
    /// Ignores the process environment so results do not depend on the host.
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        jwt_secret: &str,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| match key {
            "JWT_SECRET" => Some(jwt_secret.to_string()),
            _ => None,
        })?;
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("zellow.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn shipping_method(&self, id: &str) -> Option<&ShippingMethod> {
        self.shipping_methods.iter().find(|m| m.id == id)
    }

    /// Public link a gift recipient can open without signing in
    pub fn tracking_url(&self, order_id: &str) -> String {
        format!(
            "{}/api/track?token={}",
            self.public_base_url.trim_end_matches('/'),
            order_id
        )
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
