#[cfg(test)]
use std::collections::HashMap;

/// Source of environment variables
///
/// Settings are read through this trait so tests can supply values without
/// touching the process environment, which parallel tests share.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables for tests
#[cfg(test)]
#[derive(Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

#[cfg(test)]
impl MockEnvironment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(mut self, vars: &[(&str, &str)]) -> Self {
        for (key, value) in vars {
            self.vars.insert(key.to_string(), value.to_string());
        }
        self
    }
}

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_environment_reads_process_env() {
        let provider = SystemEnvironment;

        unsafe {
            std::env::set_var("BROKERAGE_TEST_VAR_4821", "present");
        }

        assert_eq!(provider.get_var("BROKERAGE_TEST_VAR_4821"), Some("present".to_string()));
        assert_eq!(provider.get_var("BROKERAGE_MISSING_VAR_4821"), None);

        unsafe {
            std::env::remove_var("BROKERAGE_TEST_VAR_4821");
        }
    }

    #[test]
    fn test_mock_environment_later_values_win() {
        let provider = MockEnvironment::empty()
            .with_vars(&[("PORT", "8080"), ("HOST", "127.0.0.1")])
            .with_var("PORT", "9090");

        assert_eq!(provider.get_var("PORT"), Some("9090".to_string()));
        assert_eq!(provider.get_var("HOST"), Some("127.0.0.1".to_string()));
        assert_eq!(provider.get_var("DATABASE_URL"), None);
    }
}
