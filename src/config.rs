use crate::error::AppError;
use std::env;

const DEFAULT_DB_HOST: &str = "cluster0.mzwsigq.mongodb.net";
const DEFAULT_DB_NAME: &str = "aircncDb";
const DEFAULT_MAIL_RELAY: &str = "smtp.gmail.com";

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_uri: String,
    pub database_name: String,
    pub access_token_secret: String,
    pub payment_secret_key: String,
    pub mail_user: String,
    pub mail_password: String,
    pub mail_relay: String,
    pub mail_max_attempts: u32,
    pub mail_queue_capacity: usize,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// `DB_URI` wins over `DB_USER`/`DB_PASS`/`DB_HOST` when set, which is how local
    /// and test deployments point at a non-Atlas server.
    pub fn from_env() -> Result<Self, AppError> {
        let database_uri = match env::var("DB_URI") {
            Ok(uri) => uri,
            Err(_) => format!(
                "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
                required("DB_USER")?,
                required("DB_PASS")?,
                env::var("DB_HOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string())
            ),
        };

        Ok(Self {
            database_uri,
            database_name: env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string()),
            access_token_secret: required("ACCESS_TOKEN_SECRET")?,
            payment_secret_key: required("PAYMENT_SECRET_KEY")?,
            mail_user: required("EMAIL")?,
            mail_password: required("PASS")?,
            mail_relay: env::var("MAIL_RELAY").unwrap_or_else(|_| DEFAULT_MAIL_RELAY.to_string()),
            mail_max_attempts: parsed("MAIL_MAX_ATTEMPTS", 3)?,
            mail_queue_capacity: parsed("MAIL_QUEUE_CAPACITY", 1024)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parsed("PORT", 5000)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalServerError(format!("{} must be set", key)))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} must be a number", key))),
        Err(_) => Ok(default),
    }
}
