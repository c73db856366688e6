use crate::error::{Error, Result};
use dotenvy::dotenv;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

/// What to do with an `answeredTime` that is numeric but cannot be
/// turned into a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsweredTimePolicy {
    Reject,
    Fallback,
}

impl std::str::FromStr for AnsweredTimePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "fallback" => Ok(Self::Fallback),
            other => Err(format!("expected `reject` or `fallback`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database: DatabaseConfig,
    pub allowed_languages: Option<Vec<String>>,
    pub answered_time_policy: AnsweredTimePolicy,
    pub cors_max_age: Duration,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            database: DatabaseConfig {
                connect_options: database_connect_options()?,
                max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 10)?,
                idle_timeout: Duration::from_secs(get_env_parse_or("DB_IDLE_TIMEOUT_SECS", 30)?),
                connect_timeout: Duration::from_secs(get_env_parse_or(
                    "DB_CONNECT_TIMEOUT_SECS",
                    10,
                )?),
            },
            allowed_languages: env::var("ALLOWED_LANGUAGES")
                .ok()
                .and_then(|raw| parse_language_list(&raw)),
            answered_time_policy: get_env_parse_or(
                "ANSWERED_TIME_POLICY",
                AnsweredTimePolicy::Reject,
            )?,
            cors_max_age: Duration::from_secs(get_env_parse_or("CORS_MAX_AGE_SECS", 600)?),
        })
    }
}

/// `DATABASE_URL` wins; otherwise the `DB_*` parts are used as given,
/// without any URL escaping.
fn database_connect_options() -> Result<PgConnectOptions> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for DATABASE_URL: {}", e)));
    }
    let host = get_env_or("DB_HOST", "localhost");
    let port: u16 = get_env_parse_or("DB_PORT", 5432)?;
    let user = get_env_or("DB_USER", "pguser");
    let password = get_env("DB_PASSWORD")?;
    let name = get_env_or("DB_NAME", "survey");
    Ok(connect_options_from_parts(&host, port, &user, &password, &name))
}

pub fn connect_options_from_parts(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    name: &str,
) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(user)
        .password(password)
        .database(name)
}

/// Empty or whitespace-only lists mean "accept any language".
pub fn parse_language_list(raw: &str) -> Option<Vec<String>> {
    let codes: Vec<String> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if codes.is_empty() {
        None
    } else {
        Some(codes)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::ConnectOptions;

    #[test]
    fn language_list_trims_and_drops_blanks() {
        assert_eq!(
            parse_language_list(" zh, en ,,ja "),
            Some(vec!["zh".to_string(), "en".to_string(), "ja".to_string()])
        );
        assert_eq!(parse_language_list(" , "), None);
        assert_eq!(parse_language_list(""), None);
    }

    #[test]
    fn answered_time_policy_parses_case_insensitively() {
        assert_eq!("Reject".parse::<AnsweredTimePolicy>(), Ok(AnsweredTimePolicy::Reject));
        assert_eq!(" fallback ".parse::<AnsweredTimePolicy>(), Ok(AnsweredTimePolicy::Fallback));
        assert!("drop".parse::<AnsweredTimePolicy>().is_err());
    }

    #[test]
    fn connect_options_keep_reserved_characters_in_the_password() {
        let opts = connect_options_from_parts("db", 5433, "svc", "p@ss/w#rd", "survey");
        assert_eq!(opts.get_host(), "db");
        assert_eq!(opts.get_port(), 5433);
        assert_eq!(opts.get_username(), "svc");
        assert_eq!(opts.get_database(), Some("survey"));

        let url = opts.to_url_lossy();
        assert_eq!(url.password(), Some("p%40ss%2Fw%23rd"));

        let reparsed: PgConnectOptions = url.as_str().parse().unwrap();
        assert_eq!(reparsed.get_host(), "db");
        assert_eq!(reparsed.get_port(), 5433);
        assert_eq!(reparsed.get_database(), Some("survey"));
    }
}
