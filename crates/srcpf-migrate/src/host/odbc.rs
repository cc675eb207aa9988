//! ODBC-based IBM i host binding.
//!
//! Implements both [`Catalog`] (queries against `QSYS2.SYSPARTITIONSTAT`)
//! and [`Copier`] (CL commands through `QSYS2.QCMDEXC`) over a single
//! ODBC connection to the system.
//!
//! **Requirements:**
//! - The `odbc` feature must be enabled
//! - The IBM i Access ODBC driver must be installed:
//!   - Linux: install `ibm-iaccess` from the IBM i Access Client
//!     Solutions Linux Application Package
//!   - Windows/macOS: install IBM i Access Client Solutions

use crate::catalog::{Catalog, Member};
use crate::config::HostConfig;
use crate::error::{MigrateError, Result};
use crate::query::{self, escape_sql_string};
use crate::transfer::{cpytostmf_command, Copier, MigrationTarget, TransferOutcome};
use async_trait::async_trait;
use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// ODBC connection to an IBM i system.
pub struct OdbcHost {
    env: Arc<Environment>,
    connection_string: String,
    /// Serializes catalog queries and connection creation; member
    /// transfers each run on their own connection and overlap.
    conn_mutex: Mutex<()>,
}

/// Build the ODBC connection string for an IBM i host.
fn build_connection_string(config: &HostConfig) -> String {
    format!(
        "Driver={{{}}};System={};Uid={};Pwd={};",
        config.driver, config.system, config.user, config.password
    )
}

impl OdbcHost {
    /// Connect to the host and verify the connection.
    ///
    /// # Errors
    ///
    /// Returns a catalog error if the ODBC environment cannot be
    /// created, the driver is missing, or the sign-on fails.
    pub async fn connect(config: &HostConfig) -> Result<Self> {
        let env = Environment::new().map_err(|e| {
            MigrateError::catalog(
                format!(
                    "Failed to create ODBC environment: {}. \
                     Make sure the IBM i Access ODBC driver is installed.",
                    e
                ),
                "ODBC connection",
            )
        })?;

        let connection_string = build_connection_string(config);
        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};System={};...",
            config.driver, config.system
        );

        // Test connection - use a scope so conn is dropped before we
        // move env
        {
            let conn = env
                .connect_with_connection_string(&connection_string, ConnectionOptions::default())
                .map_err(|e| {
                    MigrateError::catalog(
                        format!(
                            "Failed to connect to {} via ODBC: {}. \
                             Check the system name and the user's password.",
                            config.system, e
                        ),
                        "ODBC connection",
                    )
                })?;

            let _ = conn.execute("SELECT 1 FROM SYSIBM.SYSDUMMY1", ());
        }

        info!("Connected to IBM i system {} as {}", config.system, config.user);

        Ok(Self {
            env: Arc::new(env),
            connection_string,
            conn_mutex: Mutex::new(()),
        })
    }

    /// Get a new ODBC connection.
    fn get_connection(&self) -> Result<odbc_api::Connection<'_>> {
        self.env
            .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())
            .map_err(|e| {
                MigrateError::catalog(
                    format!("ODBC connection failed: {}", e),
                    "getting ODBC connection",
                )
            })
    }

    /// Execute a query and return rows as trimmed strings.
    fn execute_query(&self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        let conn = self.get_connection()?;

        let mut rows = Vec::new();

        if let Some(mut cursor) = conn
            .execute(sql, ())
            .map_err(|e| MigrateError::catalog(format!("{} - SQL: {}", e, sql), "catalog query"))?
        {
            let num_cols = cursor.num_result_cols().map_err(|e| {
                MigrateError::catalog(format!("Failed to get column count: {}", e), "catalog query")
            })? as usize;

            let mut buffers = TextRowSet::for_cursor(1000, &mut cursor, Some(4096)).map_err(|e| {
                MigrateError::catalog(format!("Failed to create row buffer: {}", e), "catalog query")
            })?;

            let mut row_cursor = cursor.bind_buffer(&mut buffers).map_err(|e| {
                MigrateError::catalog(format!("Failed to bind buffer: {}", e), "catalog query")
            })?;

            while let Some(batch) = row_cursor.fetch().map_err(|e| {
                MigrateError::catalog(format!("Failed to fetch rows: {}", e), "catalog query")
            })? {
                for row_idx in 0..batch.num_rows() {
                    let mut row = Vec::with_capacity(num_cols);
                    for col_idx in 0..num_cols {
                        let value = batch
                            .at(col_idx, row_idx)
                            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string());
                        row.push(value);
                    }
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    /// Run a CL command through `QSYS2.QCMDEXC` on a connection.
    fn execute_command(
        conn: &odbc_api::Connection<'_>,
        command: &str,
    ) -> std::result::Result<(), String> {
        let sql = format!("CALL QSYS2.QCMDEXC('{}')", escape_sql_string(command));
        match conn.execute(&sql, ()) {
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Name of the connected system (`CURRENT SERVER`).
    pub async fn system_name(&self) -> Result<String> {
        let _lock = self.conn_mutex.lock().await;
        let rows = self.execute_query("SELECT CURRENT SERVER FROM SYSIBM.SYSDUMMY1")?;
        Ok(rows
            .first()
            .and_then(|r| r.first())
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string()))
    }

    /// CCSID the system reports for the catalog's name columns.
    pub async fn ccsid(&self) -> Result<String> {
        let _lock = self.conn_mutex.lock().await;
        let rows = self.execute_query(&query::system_ccsid_query())?;
        Ok(rows
            .first()
            .and_then(|r| r.first())
            .and_then(|v| v.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string()))
    }
}

#[async_trait]
impl Catalog for OdbcHost {
    async fn library_exists(&self, library: &str) -> Result<bool> {
        let _lock = self.conn_mutex.lock().await;
        let rows = self.execute_query(&query::library_exists_query(library))?;
        Ok(!rows.is_empty())
    }

    async fn source_file_exists(&self, library: &str, file: &str) -> Result<bool> {
        let _lock = self.conn_mutex.lock().await;
        let rows = self.execute_query(&query::source_file_exists_query(library, file))?;
        Ok(!rows.is_empty())
    }

    async fn list_source_files(&self, library: &str) -> Result<Vec<String>> {
        let _lock = self.conn_mutex.lock().await;
        let rows = self.execute_query(&query::source_files_query(library))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect())
    }

    async fn list_members(&self, library: &str, file: &str) -> Result<Vec<Member>> {
        let _lock = self.conn_mutex.lock().await;
        let rows = self.execute_query(&query::members_query(library, Some(file)))?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let name = row.get(1).cloned().flatten()?;
                let source_type = row.get(2).cloned().flatten()?;
                Some(Member { name, source_type })
            })
            .collect())
    }
}

#[async_trait]
impl Copier for OdbcHost {
    async fn copy(&self, target: &MigrationTarget) -> Result<TransferOutcome> {
        // Only connection creation is serialized. Each transfer runs
        // the command on its own connection, so copies bounded by the
        // orchestrator's worker semaphore genuinely overlap.
        let conn = {
            let _lock = self.conn_mutex.lock().await;
            self.get_connection()
        };
        let conn = match conn {
            Ok(conn) => conn,
            Err(e) => return Ok(TransferOutcome::Failure(e.to_string())),
        };

        // A host-side command failure is an outcome, not an error:
        // it must never abort sibling transfers.
        match Self::execute_command(&conn, &cpytostmf_command(target)) {
            Ok(()) => Ok(TransferOutcome::Success),
            Err(reason) => Ok(TransferOutcome::Failure(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_uses_configured_driver() {
        let config = HostConfig {
            system: "pub400.com".to_string(),
            user: "QUSER".to_string(),
            password: "pw".to_string(),
            driver: "IBM i Access ODBC Driver".to_string(),
        };
        assert_eq!(
            build_connection_string(&config),
            "Driver={IBM i Access ODBC Driver};System=pub400.com;Uid=QUSER;Pwd=pw;"
        );
    }
}
