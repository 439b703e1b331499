use std::fmt;
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::errors::ApplicationError;

pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Holds the signing secret and password pepper
pub struct SecretManager {
    jwt_secret: String,
    password_pepper: String,
}

impl SecretManager {
    /// Load and validate every secret
    ///
    /// # Errors
    /// * `MissingSecret` - `JWT_SECRET` or `PASSWORD_PEPPER` unset or empty
    /// * `InvalidSecretLength` - `JWT_SECRET` shorter than 32 characters
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        let jwt_secret = Self::load_secret(env_provider.as_ref(), "JWT_SECRET", MIN_JWT_SECRET_LENGTH)?;
        let password_pepper = Self::load_secret(env_provider.as_ref(), "PASSWORD_PEPPER", 1)?;

        Ok(Self {
            jwt_secret,
            password_pepper,
        })
    }

    pub fn from_env() -> Result<Self, ApplicationError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    fn load_secret(
        env_provider: &(dyn EnvironmentProvider + Send + Sync),
        name: &str,
        min_length: usize,
    ) -> Result<String, ApplicationError> {
        let value = env_provider
            .get_var(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApplicationError::MissingSecret {
                secret_name: name.to_string(),
            })?;

        if value.len() < min_length {
            return Err(ApplicationError::InvalidSecretLength {
                secret_name: name.to_string(),
                expected: min_length,
                actual: value.len(),
            });
        }

        Ok(value)
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    const VALID_SECRET: &str = "this-is-a-valid-jwt-secret-with-32-characters";

    fn load(vars: &[(&str, &str)]) -> Result<SecretManager, ApplicationError> {
        SecretManager::from_env_provider(Arc::new(MockEnvironment::empty().with_vars(vars)))
    }

    #[test]
    fn test_loads_valid_secrets() {
        let manager = load(&[("JWT_SECRET", VALID_SECRET), ("PASSWORD_PEPPER", "pepper")]).unwrap();

        assert_eq!(manager.jwt_secret(), VALID_SECRET);
        assert_eq!(manager.password_pepper(), "pepper");
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let result = load(&[("JWT_SECRET", "short"), ("PASSWORD_PEPPER", "pepper")]);

        assert!(matches!(
            result,
            Err(ApplicationError::InvalidSecretLength { expected: 32, actual: 5, .. })
        ));
    }

    #[test]
    fn test_missing_pepper_is_rejected() {
        for vars in [
            vec![("JWT_SECRET", VALID_SECRET)],
            vec![("JWT_SECRET", VALID_SECRET), ("PASSWORD_PEPPER", "")],
        ] {
            let result = load(&vars);
            assert!(matches!(
                result,
                Err(ApplicationError::MissingSecret { secret_name }) if secret_name == "PASSWORD_PEPPER"
            ));
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let manager = load(&[("JWT_SECRET", VALID_SECRET), ("PASSWORD_PEPPER", "pepper")]).unwrap();

        let debug = format!("{:?}", manager);

        assert!(!debug.contains(VALID_SECRET));
        assert!(!debug.contains("pepper\""));
        assert!(debug.contains("<redacted>"));
    }
}
