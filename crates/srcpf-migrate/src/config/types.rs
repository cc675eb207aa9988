//! Configuration type definitions with auto-tuning based on system resources.

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

/// System resource information for auto-tuning.
#[derive(Debug, Clone)]
pub struct SystemResources {
    /// Number of CPU cores.
    pub cpu_cores: usize,
    /// Total RAM in GB.
    pub total_memory_gb: f64,
}

impl SystemResources {
    /// Detect system resources.
    pub fn detect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        let cpu_cores = sys.cpus().len();
        let total_memory_gb = sys.total_memory() as f64 / (1024.0 * 1024.0 * 1024.0);

        Self {
            cpu_cores,
            total_memory_gb,
        }
    }

    /// Log detected system resources.
    pub fn log(&self) {
        info!(
            "System resources: {:.1} GB RAM, {} CPU cores",
            self.total_memory_gb, self.cpu_cores
        );
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IBM i host connection configuration.
    pub host: HostConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

impl Config {
    /// Apply auto-tuned defaults based on system resources.
    /// Only fills in values that weren't explicitly set in the config file.
    pub fn with_auto_tuning(mut self) -> Self {
        let resources = SystemResources::detect();
        resources.log();
        self.migration = self.migration.with_auto_tuning(&resources);
        self
    }
}

/// IBM i host connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Host name or address of the IBM i system.
    pub system: String,

    /// User profile.
    pub user: String,

    /// Password.
    #[serde(skip_serializing)]
    pub password: String,

    /// ODBC driver name (default: "IBM i Access ODBC Driver").
    #[serde(default = "default_driver")]
    pub driver: String,
}

/// Migration behavior configuration.
///
/// `workers` uses `Option<usize>` to distinguish between "not set"
/// (use the auto-tuned default) and "explicitly set".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MigrationConfig {
    /// Maximum concurrent member transfers. Auto-tuned based on CPU
    /// cores if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl MigrationConfig {
    /// Fill unset knobs from detected system resources.
    pub fn with_auto_tuning(mut self, resources: &SystemResources) -> Self {
        if self.workers.is_none() {
            // One in-flight transfer per core, capped - each transfer is
            // a host-side command, not local CPU work.
            let workers = resources.cpu_cores.clamp(2, 16);
            info!("Auto-tuned workers: {}", workers);
            self.workers = Some(workers);
        }
        self
    }

    /// Effective worker count.
    pub fn get_workers(&self) -> usize {
        self.workers.unwrap_or(4)
    }
}

fn default_driver() -> String {
    "IBM i Access ODBC Driver".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_tuning_fills_workers() {
        let resources = SystemResources {
            cpu_cores: 8,
            total_memory_gb: 16.0,
        };
        let migration = MigrationConfig::default().with_auto_tuning(&resources);
        assert_eq!(migration.workers, Some(8));
    }

    #[test]
    fn test_auto_tuning_respects_explicit_workers() {
        let resources = SystemResources {
            cpu_cores: 8,
            total_memory_gb: 16.0,
        };
        let migration = MigrationConfig {
            workers: Some(2),
        }
        .with_auto_tuning(&resources);
        assert_eq!(migration.workers, Some(2));
    }

    #[test]
    fn test_auto_tuning_clamps_core_count() {
        let resources = SystemResources {
            cpu_cores: 64,
            total_memory_gb: 256.0,
        };
        let migration = MigrationConfig::default().with_auto_tuning(&resources);
        assert_eq!(migration.workers, Some(16));

        let resources = SystemResources {
            cpu_cores: 1,
            total_memory_gb: 1.0,
        };
        let migration = MigrationConfig::default().with_auto_tuning(&resources);
        assert_eq!(migration.workers, Some(2));
    }

    #[test]
    fn test_password_not_serialized() {
        let config = HostConfig {
            system: "pub400.com".to_string(),
            user: "QUSER".to_string(),
            password: "secret_password".to_string(),
            driver: default_driver(),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(
            !json.contains("secret_password"),
            "Password was serialized: {}",
            json
        );
    }
}
