//! Server configuration
//!
//! Read once at startup. Every variable is checked and all problems are
//! reported together, so a broken `.env` is fixed in one pass.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use auth::application::config::MIN_JWT_SECRET_LENGTH;
use auth::{AuthConfig, Sender};
use platform::otp::{DEFAULT_TOKEN_TTL, OtpPolicy};
use platform::password::HashParams;
use secrecy::Secret;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024;
pub const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_JWT_EXPIRES_IN: &str = "1d";

#[derive(Debug, Error)]
#[error("Invalid environment configuration:\n  - {}", .0.join("\n  - "))]
pub struct ConfigError(pub Vec<String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl AppEnv {
    pub fn is_development(&self) -> bool {
        *self == AppEnv::Development
    }
}

impl FromStr for AppEnv {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(AppEnv::Development),
            "production" => Ok(AppEnv::Production),
            "test" => Ok(AppEnv::Test),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
            AppEnv::Test => "test",
        })
    }
}

/// Mail HTTP API endpoint and server token
#[derive(Debug, Clone)]
pub struct MailApiConfig {
    pub url: String,
    pub token: Secret<String>,
}

/// HTTP surface settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub env: AppEnv,
    pub body_limit: usize,
    pub frontend_origins: Vec<String>,
}

/// Connection settings, shared with the seed binary
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut reader = Reader::new(&lookup);
        let database = reader.database();
        reader.finish()?;
        Ok(database)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub auth: AuthConfig,
    /// `None` logs mail instead of sending it
    pub mail_api: Option<MailApiConfig>,
    pub sender: Sender,
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut reader = Reader::new(&lookup);

        let env = reader.parsed("APP_ENV", AppEnv::default(), "development, production or test");
        let port = reader.parsed("PORT", DEFAULT_PORT, "a port number");
        let database = reader.database();

        let jwt_secret = reader.required("JWT_SECRET");
        if let Some(secret) = &jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LENGTH {
                reader.error(format!(
                    "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters"
                ));
            }
        }
        let jwt_ttl = reader
            .optional("JWT_EXPIRES_IN")
            .unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string());
        let jwt_ttl = parse_expires_in(&jwt_ttl).unwrap_or_else(|| {
            reader.error(format!(
                "JWT_EXPIRES_IN must look like 90s, 15m, 12h, 1d or a number of seconds, got {jwt_ttl}"
            ));
            Duration::ZERO
        });

        let defaults = OtpPolicy::default();
        let otp = OtpPolicy {
            length: reader.parsed("OTP_LENGTH", defaults.length, "a positive integer"),
            ttl: reader.millis("OTP_TTL_MS", defaults.ttl),
        };
        let reset_token_ttl = reader.millis("PASSWORD_RESET_TTL_MS", DEFAULT_TOKEN_TTL);

        let hash_defaults = HashParams::default();
        let hash_params = HashParams {
            memory_kib: reader.parsed("HASH_MEMORY_COST", hash_defaults.memory_kib, "a positive integer"),
            iterations: reader.parsed("HASH_TIME_COST", hash_defaults.iterations, "a positive integer"),
            parallelism: reader.parsed("HASH_PARALLELISM", hash_defaults.parallelism, "a positive integer"),
        };

        let mail_api = match (reader.optional("MAIL_API_URL"), reader.optional("MAIL_API_TOKEN")) {
            (Some(url), Some(token)) => Some(MailApiConfig {
                url,
                token: Secret::new(token),
            }),
            (None, None) => None,
            _ => {
                reader.error("MAIL_API_URL and MAIL_API_TOKEN must be set together".to_string());
                None
            }
        };
        let sender = Sender {
            name: reader
                .optional("EMAIL_FROM_NAME")
                .unwrap_or_else(|| "Natours".to_string()),
            address: reader
                .optional("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|| "no-reply@natours.dev".to_string()),
        };

        let frontend_origins = reader
            .optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        let body_limit = reader.parsed("BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT, "a number of bytes");

        let public_base_url = match env {
            AppEnv::Production => reader.required("PUBLIC_BASE_URL").unwrap_or_default(),
            _ => format!("http://localhost:{port}"),
        };

        reader.finish()?;

        let auth = AuthConfig {
            jwt_ttl,
            otp,
            reset_token_ttl,
            hash_params,
            public_base_url,
            ..AuthConfig::new(jwt_secret.unwrap_or_default())
        };

        Ok(Self {
            port,
            database,
            http: HttpConfig {
                env,
                body_limit,
                frontend_origins,
            },
            auth,
            mail_api,
            sender,
        })
    }

    pub fn env(&self) -> AppEnv {
        self.http.env
    }
}

struct Reader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
    errors: Vec<String>,
}

impl<'a> Reader<'a> {
    fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            lookup,
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError(self.errors))
        }
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    /// Trimmed value; empty counts as unset
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&mut self, key: &str) -> Option<String> {
        let value = self.optional(key);
        if value.is_none() {
            self.error(format!("{key} is required"));
        }
        value
    }

    fn parsed<T: FromStr>(&mut self, key: &str, default: T, expected: &str) -> T {
        match self.optional(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                self.error(format!("{key} must be {expected}, got {raw}"));
                default
            }),
        }
    }

    fn millis(&mut self, key: &str, default: Duration) -> Duration {
        let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(self.parsed(key, default_ms, "a number of milliseconds"))
    }

    fn database(&mut self) -> DatabaseConfig {
        let url = self.database_url().unwrap_or_default();
        let max_connections =
            self.parsed("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS, "a positive integer");
        DatabaseConfig {
            url: Secret::new(url),
            max_connections,
        }
    }

    /// `DATABASE_URL` with its credential placeholders filled in
    fn database_url(&mut self) -> Option<String> {
        let mut url = self.required("DATABASE_URL")?;
        for (placeholder, key) in [
            ("<USERNAME>", "DATABASE_USERNAME"),
            ("<PASSWORD>", "DATABASE_PASSWORD"),
            ("<DATABASE_NAME>", "DATABASE_NAME"),
        ] {
            if url.contains(placeholder) {
                match self.optional(key) {
                    Some(value) => url = url.replace(placeholder, &value),
                    None => self.error(format!("{key} is required to fill {placeholder} in DATABASE_URL")),
                }
            }
        }
        Some(url)
    }
}

/// `90s`, `15m`, `12h`, `1d` or plain seconds
pub fn parse_expires_in(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let amount: u64 = digits.parse().ok()?;
    let seconds = match unit {
        "" | "s" => amount,
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(3_600)?,
        "d" => amount.checked_mul(86_400)?,
        _ => return None,
    };
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/natours"), ("JWT_SECRET", SECRET)])
            .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.env(), AppEnv::Development);
        assert_eq!(config.auth.jwt_ttl, Duration::from_secs(86_400));
        assert_eq!(config.auth.otp.length, 6);
        assert_eq!(config.auth.otp.ttl, Duration::from_secs(900));
        assert_eq!(config.auth.reset_token_ttl, Duration::from_secs(600));
        assert_eq!(config.auth.public_base_url, "http://localhost:3000");
        assert_eq!(config.http.body_limit, 10_240);
        assert!(config.mail_api.is_none());
    }

    #[test]
    fn test_every_problem_is_reported() {
        let err = load(&[
            ("APP_ENV", "staging"),
            ("PORT", "eighty"),
            ("JWT_SECRET", "short"),
            ("MAIL_API_URL", "https://api.postmarkapp.com"),
        ])
        .unwrap_err();

        let messages = err.0.join("\n");
        assert!(messages.contains("APP_ENV must be development, production or test, got staging"));
        assert!(messages.contains("PORT must be a port number, got eighty"));
        assert!(messages.contains("DATABASE_URL is required"));
        assert!(messages.contains("JWT_SECRET must be at least 32 characters"));
        assert!(messages.contains("MAIL_API_URL and MAIL_API_TOKEN must be set together"));
        assert_eq!(err.0.len(), 5);
    }

    #[test]
    fn test_database_placeholders() {
        let config = load(&[
            ("DATABASE_URL", "postgres://<USERNAME>:<PASSWORD>@db:5432/<DATABASE_NAME>"),
            ("DATABASE_USERNAME", "natours"),
            ("DATABASE_PASSWORD", "hunter2"),
            ("DATABASE_NAME", "natours_dev"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();
        assert_eq!(
            config.database.url.expose_secret(),
            "postgres://natours:hunter2@db:5432/natours_dev"
        );

        let err = load(&[
            ("DATABASE_URL", "postgres://<USERNAME>@db/natours"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap_err();
        assert_eq!(
            err.0,
            vec!["DATABASE_USERNAME is required to fill <USERNAME> in DATABASE_URL".to_string()]
        );
    }

    #[test]
    fn test_database_alone_ignores_other_variables() {
        let database = DatabaseConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/natours".to_string())
        })
        .unwrap();
        assert_eq!(database.max_connections, 5);

        let err = DatabaseConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err.0, vec!["DATABASE_URL is required".to_string()]);
    }

    #[test]
    fn test_production_needs_public_url() {
        let err = load(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/natours"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap_err();
        assert_eq!(err.0, vec!["PUBLIC_BASE_URL is required".to_string()]);
    }

    #[test]
    fn test_expires_in() {
        assert_eq!(parse_expires_in("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_expires_in("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_expires_in("12h"), Some(Duration::from_secs(43_200)));
        assert_eq!(parse_expires_in("1d"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_expires_in("0"), None);
        assert_eq!(parse_expires_in("1w"), None);
        assert_eq!(parse_expires_in("d"), None);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = load(&[
            ("DATABASE_URL", "postgres://natours:hunter2@db/natours"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains(SECRET));
    }
}
