//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.host.system.is_empty() {
        return Err(MigrateError::Config("host.system is required".into()));
    }
    if config.host.user.is_empty() {
        return Err(MigrateError::Config("host.user is required".into()));
    }
    if config.host.driver.is_empty() {
        return Err(MigrateError::Config("host.driver must not be empty".into()));
    }

    // Migration config validation - only check if explicitly set
    if let Some(0) = config.migration.workers {
        return Err(MigrateError::Config(
            "migration.workers must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    fn base_yaml() -> &'static str {
        "host:\n  system: pub400.com\n  user: QUSER\n  password: pw\n"
    }

    #[test]
    fn test_valid_config_passes() {
        let config = Config::from_yaml(base_yaml()).unwrap();
        assert_eq!(config.host.system, "pub400.com");
        assert_eq!(config.host.driver, "IBM i Access ODBC Driver");
    }

    #[test]
    fn test_empty_system_rejected() {
        let yaml = "host:\n  system: \"\"\n  user: QUSER\n  password: pw\n";
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("host.system"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let yaml = format!("{}migration:\n  workers: 0\n", base_yaml());
        let err = Config::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn test_explicit_workers_accepted() {
        let yaml = format!("{}migration:\n  workers: 12\n", base_yaml());
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.migration.workers, Some(12));
    }
}
