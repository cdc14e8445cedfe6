// src/config.rs

use std::env;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the static frontend, served for every non-API path.
    pub static_dir: String,
    pub admin_username: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub firebase: FirebaseSettings,
}

/// Raw Firebase settings as read from the environment.
///
/// Nothing is parsed or validated here; the storage layer decides whether the
/// values are usable and falls back to the memory store when they are not.
#[derive(Debug, Clone, Default)]
pub struct FirebaseSettings {
    /// Complete service-account JSON in a single variable.
    pub service_account: Option<String>,
    pub project_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    pub database_url: Option<String>,
    /// Legacy database secret, sent as the `auth` query parameter.
    pub database_secret: Option<String>,
    /// `host:port` of a local Realtime Database emulator.
    pub emulator_host: Option<String>,
}

impl FirebaseSettings {
    pub fn from_env() -> Self {
        Self {
            service_account: non_empty("FIREBASE_SERVICE_ACCOUNT"),
            project_id: non_empty("FIREBASE_PROJECT_ID"),
            client_email: non_empty("FIREBASE_CLIENT_EMAIL"),
            private_key: non_empty("FIREBASE_PRIVATE_KEY"),
            database_url: non_empty("FIREBASE_DATABASE_URL"),
            database_secret: non_empty("FIREBASE_DATABASE_SECRET"),
            emulator_host: non_empty("FIREBASE_DATABASE_EMULATOR_HOST"),
        }
    }

    /// True when enough credentials are present to attempt remote mode.
    pub fn is_configured(&self) -> bool {
        let individual =
            self.project_id.is_some() && self.client_email.is_some() && self.private_key.is_some();

        self.service_account.is_some()
            || individual
            || (self.database_secret.is_some() && self.database_url.is_some())
            || self.emulator_host.is_some()
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let static_dir = env::var("STATIC_DIR")
            .unwrap_or_else(|_| "public".to_string());

        Self {
            port,
            rust_log,
            static_dir,
            admin_username: non_empty("ADMIN_USERNAME"),
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
            firebase: FirebaseSettings::from_env(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
