use std::fmt;
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::config_spec::ConfigSpec;
use crate::config::errors::ApplicationError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://brokerage.db?mode=rwc";

/// Infrastructure settings read once at startup
pub struct BootstrapSettings {
    database_url: String,
    server_host: String,
    server_port: u16,
    jwt_expiration_minutes: i64,
}

impl BootstrapSettings {
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        let database_url = ConfigSpec::new(env_provider.clone())
            .env_override("DATABASE_URL")
            .default_value(DEFAULT_DATABASE_URL)
            .min_length(1)
            .load()?;

        let server_host = ConfigSpec::new(env_provider.clone())
            .env_override("HOST")
            .default_value("0.0.0.0")
            .validator(ConfigSpec::validate_host_address)
            .load()?;

        let port_value = ConfigSpec::new(env_provider.clone())
            .env_override("PORT")
            .default_value("3000")
            .validator(|value| ConfigSpec::validate_port_range(value, 1, 65535))
            .load()?;
        let server_port = ConfigSpec::parse_port(&port_value, "PORT")?;

        let expiration_value = ConfigSpec::new(env_provider)
            .env_override("JWT_EXPIRATION_MINUTES")
            .default_value("60")
            .validator(|value| ConfigSpec::validate_integer_range(value, 1, 24 * 60))
            .load()?;
        let jwt_expiration_minutes =
            ConfigSpec::parse_integer(&expiration_value, "JWT_EXPIRATION_MINUTES")?;

        Ok(Self {
            database_url,
            server_host: server_host.trim().to_string(),
            server_port,
            jwt_expiration_minutes,
        })
    }

    pub fn from_env() -> Result<Self, ApplicationError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn jwt_expiration_minutes(&self) -> i64 {
        self.jwt_expiration_minutes
    }

    pub fn server_address(&self) -> String {
        if self.server_host.contains(':') {
            format!("[{}]:{}", self.server_host, self.server_port)
        } else {
            format!("{}:{}", self.server_host, self.server_port)
        }
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .finish()
    }
}
