use std::env;

use gleamora_common::{helpers::parse_boolean_flag, Secret};
use log::*;

use crate::errors::ServerError;

const DEFAULT_GJM_HOST: &str = "127.0.0.1";
const DEFAULT_GJM_PORT: u16 = 8360;
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The payment identity offered for UPI payments when an order spans more than one vendor.
    /// UPI cannot split a single payment across payees, so the platform collects and disburses.
    pub platform_upi: PlatformUpiConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address,
    /// rather than the connection's remote address.
    pub use_x_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GJM_HOST.to_string(),
            port: DEFAULT_GJM_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            platform_upi: PlatformUpiConfig::default(),
            use_x_forwarded_for: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GJM_HOST").ok().unwrap_or_else(|| DEFAULT_GJM_HOST.into());
        let port = env::var("GJM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for GJM_PORT. {e} Using the default, {DEFAULT_GJM_PORT}, instead."
                    );
                    DEFAULT_GJM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_GJM_PORT);
        let database_url = env::var("GJM_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ GJM_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let platform_upi = PlatformUpiConfig::from_env_or_default();
        let use_x_forwarded_for = parse_boolean_flag(env::var("GJM_USE_X_FORWARDED_FOR").ok(), false);
        Self { host, port, database_url, auth, platform_upi, use_x_forwarded_for }
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long issued tokens remain valid, in hours.
    pub token_lifetime_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. DO NOT \
             operate on production like this, since all issued tokens become invalid when the server restarts. Set \
             GJM_JWT_SECRET instead. 🚨️🚨️🚨️"
        );
        let secret = format!("{:032x}{:032x}", rand::random::<u128>(), rand::random::<u128>());
        Self { jwt_secret: Secret::new(secret), token_lifetime_hours: DEFAULT_TOKEN_LIFETIME_HOURS }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("GJM_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [GJM_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("GJM_JWT_SECRET is empty".to_string()));
        }
        let token_lifetime_hours = env::var("GJM_JWT_LIFETIME_HOURS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for GJM_JWT_LIFETIME_HOURS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_HOURS);
        Ok(Self { jwt_secret: Secret::new(secret), token_lifetime_hours })
    }
}

//----------------------------------------------  PlatformUpiConfig  --------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct PlatformUpiConfig {
    pub upi_id: String,
    pub qr_code: Option<String>,
}

impl PlatformUpiConfig {
    pub fn from_env_or_default() -> Self {
        let upi_id = env::var("GJM_PLATFORM_UPI_ID").ok().unwrap_or_else(|| {
            info!("🪛️ GJM_PLATFORM_UPI_ID is not set. Multi-vendor UPI payment requests will be rejected.");
            String::default()
        });
        let qr_code = env::var("GJM_PLATFORM_UPI_QR").ok();
        Self { upi_id, qr_code }
    }
}
