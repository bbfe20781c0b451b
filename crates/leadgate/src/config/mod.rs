use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
///
/// Every external collaborator (verdict service, mail provider, chat model,
/// admin credentials) is optional: an unset key degrades that feature
/// instead of failing startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub contact: ContactSettings,
    pub captcha: CaptchaSettings,
    pub mail: MailSettings,
    pub admin: AdminSettings,
    pub chat: ChatSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let score_threshold = match optional("RECAPTCHA_SCORE_THRESHOLD") {
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|value| (0.0..=1.0).contains(value))
                .ok_or(ConfigError::InvalidThreshold { value: raw })?,
            None => DEFAULT_SCORE_THRESHOLD,
        };

        let admin = match (optional("ADMIN_USERNAME"), optional("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => AdminSettings {
                credentials: Some(AdminCredentials { username, password }),
            },
            _ => AdminSettings { credentials: None },
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store: StoreConfig {
                path: PathBuf::from(
                    env::var("SUBMISSIONS_PATH")
                        .unwrap_or_else(|_| "data/submissions.json".to_string()),
                ),
            },
            contact: ContactSettings {
                country_prefix: env::var("CONTACT_COUNTRY_PREFIX")
                    .unwrap_or_else(|_| "+91".to_string()),
                email_domain: env::var("CONTACT_EMAIL_DOMAIN")
                    .unwrap_or_else(|_| "@gmail.com".to_string()),
            },
            captcha: CaptchaSettings {
                secret: optional("RECAPTCHA_SECRET_KEY"),
                score_threshold,
            },
            mail: MailSettings {
                api_key: optional("RESEND_API_KEY"),
                from_address: env::var("FROM_EMAIL")
                    .unwrap_or_else(|_| "onboarding@resend.dev".to_string()),
                operator_address: optional("ADMIN_EMAIL"),
            },
            admin,
            chat: ChatSettings {
                api_key: optional("GEMINI_API_KEY"),
                model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            },
        })
    }
}

/// Score floor applied when `RECAPTCHA_SCORE_THRESHOLD` is unset.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the file-backed submission store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// Deployment constants for contact-form validation.
#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub country_prefix: String,
    pub email_domain: String,
}

/// Bot-verification collaborator; no secret means verification is skipped.
#[derive(Debug, Clone)]
pub struct CaptchaSettings {
    pub secret: Option<String>,
    pub score_threshold: f32,
}

/// Mail provider settings; no API key means notifications are skipped.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub api_key: Option<String>,
    pub from_address: String,
    pub operator_address: Option<String>,
}

/// Fixed dashboard credentials; absent credentials disable login.
#[derive(Debug, Clone)]
pub struct AdminSettings {
    pub credentials: Option<AdminCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Chat model collaborator; no API key disables the endpoint.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { value } => {
                write!(
                    f,
                    "RECAPTCHA_SCORE_THRESHOLD must be a number in 0.0..=1.0, got '{}'",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidThreshold { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
