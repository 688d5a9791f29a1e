//! Application-level configuration loading from the process environment.

use std::env;

use tracing::{info, warn};

/// Shared party secret accepted for admin routes when no override is set.
const DEFAULT_ADMIN_SECRET: &str = "chikin123";
/// Environment variable that overrides [`DEFAULT_ADMIN_SECRET`].
const ADMIN_SECRET_ENV: &str = "ADMIN_SECRET";
/// Port the server binds when neither `PORT` nor `SERVER_PORT` is set.
const DEFAULT_PORT: u16 = 8080;

/// Number of mystery boxes seeded per event.
pub const BOXES_PER_EVENT: u8 = 6;

/// Candidate origin places seeded when an event is created or when the place
/// table is found empty.
pub const DEFAULT_PLACES: [&str; 6] = [
    "Popeyes",
    "Jollibee",
    "The Bird",
    "Proposition Chicken",
    "KFC",
    "Starbird",
];

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    admin_secret: String,
    port: u16,
}

impl AppConfig {
    /// Load the configuration from the environment, falling back to the
    /// baked-in party defaults.
    pub fn load() -> Self {
        let admin_secret = match env::var(ADMIN_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => {
                info!("admin secret overridden from environment");
                secret
            }
            Ok(_) => {
                warn!("{ADMIN_SECRET_ENV} is set but empty; using the built-in party secret");
                DEFAULT_ADMIN_SECRET.to_string()
            }
            Err(_) => DEFAULT_ADMIN_SECRET.to_string(),
        };

        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self { admin_secret, port }
    }

    /// Build a configuration with an explicit secret, used by tests.
    pub fn with_admin_secret(secret: impl Into<String>) -> Self {
        Self {
            admin_secret: secret.into(),
            port: DEFAULT_PORT,
        }
    }

    /// Check a caller-presented secret against the configured admin secret.
    pub fn admin_secret_matches(&self, presented: &str) -> bool {
        self.admin_secret == presented
    }

    /// Port the HTTP server should bind.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
