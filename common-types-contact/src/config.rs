use ::std::fmt;
use ::std::str::FromStr;
use ::std::time::Duration;
use thiserror::Error;

use crate::Constants::{
    AUDIT_LOG_MESSAGE_MAX_LENGTH,
    DEFAULT_SMTP_PORT,
    DEFAULT_SMTP_TIMEOUT_SECS,
    EMAIL_MESSAGE_MAX_LENGTH,
    MESSAGE_MIN_LENGTH,
};

pub const CONTACT_DISPATCH: &str = "CONTACT_DISPATCH";
pub const CONTACT_LOCALE: &str = "CONTACT_LOCALE";
pub const CONTACT_MESSAGE_MAX_LENGTH: &str = "CONTACT_MESSAGE_MAX_LENGTH";
pub const SMTP_HOST: &str = "SMTP_HOST";
pub const SMTP_PORT: &str = "SMTP_PORT";
pub const SMTP_USER: &str = "SMTP_USER";
pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const SMTP_FROM: &str = "SMTP_FROM";
pub const SMTP_TIMEOUT_SECS: &str = "SMTP_TIMEOUT_SECS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Email,
    AuditLog,
}

impl DispatchMode {
    pub fn default_message_max_length(&self) -> usize {
        match self {
            DispatchMode::Email => EMAIL_MESSAGE_MAX_LENGTH,
            DispatchMode::AuditLog => AUDIT_LOG_MESSAGE_MAX_LENGTH,
        }
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "smtp" => Ok(DispatchMode::Email),
            "log" | "audit-log" | "audit_log" => Ok(DispatchMode::AuditLog),
            _ => Err(format!("'{}' is not a valid DispatchMode", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Russian,
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Russian),
            "en" => Ok(Locale::English),
            _ => Err(format!("'{}' is not a valid Locale", s)),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Sender address, when the login is not one (e.g. an API key user)
    pub from: Option<String>,
    pub timeout: Duration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        SmtpConfig {
            host: None,
            port: DEFAULT_SMTP_PORT,
            user: None,
            password: None,
            from: None,
            timeout: Duration::from_secs(DEFAULT_SMTP_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmtpConfig {
    /// Credentials for one submission, or the names of the settings that
    /// are missing (host, user, password in that order).
    pub fn settings(&self) -> Result<SmtpSettings, Vec<&'static str>> {
        match (&self.host, &self.user, &self.password) {
            (Some(host), Some(user), Some(password)) => Ok(SmtpSettings {
                host: host.clone(),
                port: self.port,
                user: user.clone(),
                password: password.clone(),
                from: self.from.clone().unwrap_or_else(|| user.clone()),
                timeout: self.timeout,
            }),
            _ => Err([
                    (SMTP_HOST, self.host.is_none()),
                    (SMTP_USER, self.user.is_none()),
                    (SMTP_PASSWORD, self.password.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(key, _)| key)
                .collect()),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Read-only configuration, loaded once per cold start.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub dispatch: DispatchMode,
    pub locale: Locale,
    pub message_max_length: usize,
    pub smtp: SmtpConfig,
}

impl ContactConfig {
    pub fn new(dispatch: DispatchMode) -> Self {
        ContactConfig {
            dispatch,
            locale: Locale::Russian,
            message_max_length: dispatch.default_message_max_length(),
            smtp: SmtpConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let dispatch = match read(CONTACT_DISPATCH) {
            Some(value) => value.parse::<DispatchMode>().map_err(|_| ConfigError::InvalidValue { key: CONTACT_DISPATCH, value })?,
            None => DispatchMode::Email,
        };
        let locale = match read(CONTACT_LOCALE) {
            Some(value) => value.parse::<Locale>().map_err(|_| ConfigError::InvalidValue { key: CONTACT_LOCALE, value })?,
            None => Locale::Russian,
        };
        let message_max_length = parse_or_default(&read, CONTACT_MESSAGE_MAX_LENGTH, dispatch.default_message_max_length(), |max| *max >= MESSAGE_MIN_LENGTH);
        let port = parse_or_default(&read, SMTP_PORT, DEFAULT_SMTP_PORT, |port| *port > 0);
        let timeout_secs = parse_or_default(&read, SMTP_TIMEOUT_SECS, DEFAULT_SMTP_TIMEOUT_SECS, |secs| *secs > 0);

        Ok(ContactConfig {
            dispatch,
            locale,
            message_max_length,
            smtp: SmtpConfig {
                host: read(SMTP_HOST),
                port,
                user: read(SMTP_USER),
                password: read(SMTP_PASSWORD),
                from: read(SMTP_FROM),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_or_default<T, F, P>(read: &F, key: &str, default: T, accept: P) -> T
where
    T: FromStr + fmt::Display,
    F: Fn(&str) -> Option<String>,
    P: Fn(&T) -> bool,
{
    let Some(raw) = read(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => {
            tracing::info!("Using custom {key}: {value}");
            value
        },
        _ => {
            tracing::warn!("Failed to parse {key}, using default, {default}");
            default
        },
    }
}
